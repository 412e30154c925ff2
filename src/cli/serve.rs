//! Serve command implementation

use crate::api::{create_router, AppState};
use crate::cli::{load_config, ServeArgs};
use crate::config::RoadsageConfig;
use crate::planner::RoutePlanner;
use crate::session::SessionManager;
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Load configuration with CLI overrides
pub fn load_config_with_overrides(args: &ServeArgs) -> anyhow::Result<RoadsageConfig> {
    let mut config = load_config(&args.config)?;

    // CLI overrides (highest priority)
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ref host) = args.host {
        config.server.host = host.clone();
    }
    if let Some(ref log_level) = args.log_level {
        config.logging.level = log_level.clone();
    }
    if let Some(ref dir) = args.routes_dir {
        config.catalog.routes_dir = dir.clone();
    }

    Ok(config)
}

/// Build the shared state; sessions stop when `cancel_token` fires.
pub fn build_app_state(
    config: RoadsageConfig,
    cancel_token: CancellationToken,
) -> anyhow::Result<Arc<AppState>> {
    let planner = Arc::new(RoutePlanner::from_config(&config).context("Failed to build planner")?);
    tracing::info!(
        routes = planner.catalog().len(),
        locations = planner.catalog().locations().len(),
        "Route catalog loaded"
    );

    let sessions = Arc::new(SessionManager::with_cancel_token(
        Arc::clone(&planner),
        Duration::from_secs(config.planner.tick_interval_seconds),
        cancel_token,
    ));

    Ok(Arc::new(AppState::new(Arc::new(config), planner, sessions)))
}

/// Wait for shutdown signal (SIGINT or SIGTERM)
async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for CTRL+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
        _ = cancel_token.cancelled() => {}
    }

    cancel_token.cancel();
}

/// Main serve command handler
pub async fn run_serve(args: ServeArgs) -> anyhow::Result<()> {
    // 1. Load and merge configuration
    let config = load_config_with_overrides(&args)?;
    config.validate()?;

    // 2. Initialize tracing
    crate::logging::init_tracing(&config.logging)?;
    tracing::info!("Starting Roadsage server");
    tracing::debug!(?config, "Loaded configuration");

    // 3. Planner, sessions and router
    let cancel_token = CancellationToken::new();
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app_state = build_app_state(config, cancel_token.clone())?;
    let app = create_router(Arc::clone(&app_state));

    // 4. Bind and serve
    tracing::info!(addr = %addr, "Roadsage API server listening");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel_token.clone()))
        .await?;

    // 5. Cleanup
    tracing::info!(sessions = app_state.sessions.len(), "Stopping planning sessions");
    app_state.sessions.shutdown().await;

    tracing::info!("Roadsage server stopped");
    Ok(())
}
