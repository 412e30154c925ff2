//! CLI module for Roadsage
//!
//! Command-line interface definitions and handlers.
//!
//! # Commands
//!
//! - `serve` - Start the planning API server
//! - `plan` - Plan a route from the terminal
//! - `routes` - List candidate routes and locations
//! - `config` - Configuration utilities (init)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! roadsage serve -c roadsage.toml
//! roadsage plan --from "Berkeley, California" --to "Santa Clara, California" --ticks 5
//! roadsage completions bash > ~/.bash_completion.d/roadsage
//! ```

pub mod completions;
pub mod config;
pub mod output;
pub mod plan;
pub mod routes;
pub mod serve;

pub use completions::handle_completions;
pub use config::handle_config_init;

use crate::config::RoadsageConfig;
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Roadsage - route planning agent
#[derive(Parser, Debug)]
#[command(
    name = "roadsage",
    version,
    about = "Picks the best route between two locations and keeps re-checking it against live traffic"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the planning API server
    Serve(ServeArgs),
    /// Plan a route between two locations
    Plan(PlanArgs),
    /// List candidate routes
    Routes(RoutesArgs),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "roadsage.toml")]
    pub config: PathBuf,

    /// Override server port
    #[arg(short, long, env = "ROADSAGE_PORT")]
    pub port: Option<u16>,

    /// Override server host
    #[arg(short = 'H', long, env = "ROADSAGE_HOST")]
    pub host: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "ROADSAGE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Override the route directory
    #[arg(long)]
    pub routes_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Start location
    #[arg(long)]
    pub from: String,

    /// Destination
    #[arg(long)]
    pub to: String,

    /// Planning steps to run (direct, static, then live re-checks)
    #[arg(short = 'n', long, default_value = "3")]
    pub ticks: u32,

    /// Seconds to wait between steps
    #[arg(short, long, default_value = "0")]
    pub interval: u64,

    /// Read live traffic from this JSON snapshot instead of the configured hosts
    #[arg(long)]
    pub live_traffic: Option<PathBuf>,

    /// Override the route directory
    #[arg(long)]
    pub routes_dir: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Set log level (logs go to stderr)
    #[arg(short, long, default_value = "warn")]
    pub log_level: String,

    /// Path to configuration file
    #[arg(short, long, default_value = "roadsage.toml")]
    pub config: PathBuf,
}

#[derive(Args, Debug)]
pub struct RoutesArgs {
    /// Only routes starting here
    #[arg(long, requires = "to")]
    pub from: Option<String>,

    /// Only routes ending here
    #[arg(long, requires = "from")]
    pub to: Option<String>,

    /// List locations instead of routes
    #[arg(long, conflicts_with_all = ["from", "to"])]
    pub locations: bool,

    /// Override the route directory
    #[arg(long)]
    pub routes_dir: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Path to configuration file
    #[arg(short, long, default_value = "roadsage.toml")]
    pub config: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = "roadsage.toml")]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

/// Load the config file if it exists, otherwise defaults, then apply
/// environment overrides.
pub fn load_config(path: &Path) -> anyhow::Result<RoadsageConfig> {
    let config = if path.exists() {
        RoadsageConfig::load(Some(path))
            .with_context(|| format!("Failed to load {}", path.display()))?
    } else {
        tracing::debug!(path = %path.display(), "Config file not found, using defaults");
        RoadsageConfig::default()
    };
    Ok(config.with_env_overrides())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_parse_serve_defaults() {
        let cli = Cli::try_parse_from(["roadsage", "serve"]).unwrap();
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.config, PathBuf::from("roadsage.toml"));
                assert!(args.port.is_none());
                assert!(args.routes_dir.is_none());
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_parse_serve_with_port() {
        let cli = Cli::try_parse_from(["roadsage", "serve", "-p", "9000"]).unwrap();
        match cli.command {
            Commands::Serve(args) => assert_eq!(args.port, Some(9000)),
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_parse_plan() {
        let cli = Cli::try_parse_from([
            "roadsage", "plan", "--from", "Berkeley", "--to", "Santa Clara", "-n", "5", "--json",
        ])
        .unwrap();
        match cli.command {
            Commands::Plan(args) => {
                assert_eq!(args.from, "Berkeley");
                assert_eq!(args.to, "Santa Clara");
                assert_eq!(args.ticks, 5);
                assert_eq!(args.interval, 0);
                assert!(args.json);
                assert!(args.live_traffic.is_none());
            }
            _ => panic!("Expected Plan command"),
        }
    }

    #[test]
    fn test_cli_plan_requires_locations() {
        assert!(Cli::try_parse_from(["roadsage", "plan", "--from", "Berkeley"]).is_err());
    }

    #[test]
    fn test_cli_routes_from_requires_to() {
        assert!(Cli::try_parse_from(["roadsage", "routes", "--from", "A"]).is_err());
        assert!(Cli::try_parse_from(["roadsage", "routes", "--from", "A", "--to", "B"]).is_ok());
    }

    #[test]
    fn test_cli_routes_locations_conflicts_with_filter() {
        assert!(Cli::try_parse_from([
            "roadsage",
            "routes",
            "--locations",
            "--from",
            "A",
            "--to",
            "B"
        ])
        .is_err());
    }

    #[test]
    fn test_cli_parse_config_init() {
        let cli = Cli::try_parse_from(["roadsage", "config", "init", "--force"]).unwrap();
        match cli.command {
            Commands::Config(ConfigCommands::Init(args)) => {
                assert!(args.force);
                assert_eq!(args.output, PathBuf::from("roadsage.toml"));
            }
            _ => panic!("Expected Config Init command"),
        }
    }

    #[test]
    fn test_load_config_missing_file_uses_defaults() {
        let config = load_config(Path::new("/nonexistent/roadsage.toml")).unwrap();
        assert_eq!(config.catalog.routes_dir, PathBuf::from("data/routes"));
    }

    #[test]
    fn test_load_config_invalid_file_errors() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "[server\nport=").unwrap();
        let err = load_config(temp.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to load"));
    }
}
