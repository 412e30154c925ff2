use clap::Parser;
use roadsage::cli::{
    handle_completions, handle_config_init, plan, routes, serve, Cli, Commands, ConfigCommands,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve(args) => serve::run_serve(args).await,
        Commands::Plan(args) => plan::handle_plan(&args).await.map(|output| {
            println!("{}", output);
        }),
        Commands::Routes(args) => routes::handle_routes(&args).map(|output| {
            println!("{}", output);
        }),
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Init(args) => handle_config_init(&args),
        },
        Commands::Completions(args) => {
            handle_completions(&args);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
