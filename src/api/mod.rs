//! # Planning API
//!
//! HTTP endpoints for route planning.
//!
//! ## Endpoints
//!
//! - `GET /health` - Service health with route and session counts
//! - `GET /v1/routes` - Candidate routes, optionally filtered by endpoints
//! - `GET /v1/locations` - Known start and end locations
//! - `POST /v1/plan` - Run one planning step
//! - `POST /v1/sessions` - Start a continuously re-evaluated plan
//! - `GET /v1/sessions`, `GET|DELETE /v1/sessions/:id` - Inspect or stop sessions
//! - `GET /metrics`, `GET /v1/stats` - Prometheus and JSON metrics
//!
//! ## Example
//!
//! ```no_run
//! use roadsage::api::{create_router, AppState};
//! use roadsage::config::RoadsageConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RoadsageConfig::load(None)?;
//! let state = AppState::from_config(config)?;
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Errors share one envelope:
//! ```json
//! {
//!   "error": {
//!     "message": "Session '42' not found",
//!     "type": "invalid_request_error",
//!     "param": "id",
//!     "code": "session_not_found"
//!   }
//! }
//! ```

mod health;
mod plan;
mod routes;
mod sessions;
pub mod types;

pub use types::*;

use crate::config::RoadsageConfig;
use crate::metrics::MetricsCollector;
use crate::planner::{PlannerError, RoutePlanner};
use crate::session::SessionManager;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

/// Maximum request body size (1 MB). Prior states are small.
const MAX_BODY_SIZE: usize = 1024 * 1024;

/// Shared application state accessible to all handlers.
pub struct AppState {
    pub config: Arc<RoadsageConfig>,
    pub planner: Arc<RoutePlanner>,
    pub sessions: Arc<SessionManager>,
    /// Server startup time for uptime tracking
    pub start_time: Instant,
    pub metrics_collector: Arc<MetricsCollector>,
}

impl AppState {
    pub fn new(
        config: Arc<RoadsageConfig>,
        planner: Arc<RoutePlanner>,
        sessions: Arc<SessionManager>,
    ) -> Self {
        let start_time = Instant::now();

        let prometheus_handle = crate::metrics::setup_metrics().unwrap_or_else(|e| {
            tracing::debug!("Metrics already initialized, creating new handle: {}", e);
            crate::metrics::detached_handle()
        });

        let metrics_collector = Arc::new(MetricsCollector::new(
            planner.catalog().clone(),
            Arc::clone(&sessions),
            start_time,
            prometheus_handle,
        ));

        Self {
            config,
            planner,
            sessions,
            start_time,
            metrics_collector,
        }
    }

    /// Build the planner and session manager described by `config`.
    pub fn from_config(config: RoadsageConfig) -> Result<Arc<Self>, PlannerError> {
        let planner = Arc::new(RoutePlanner::from_config(&config)?);
        let sessions = Arc::new(SessionManager::new(
            Arc::clone(&planner),
            Duration::from_secs(config.planner.tick_interval_seconds),
        ));
        Ok(Arc::new(Self::new(Arc::new(config), planner, sessions)))
    }
}

/// Create the main API router with all endpoints configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    let timeout = Duration::from_secs(state.config.server.request_timeout_seconds);

    Router::new()
        .route("/health", get(health::handle))
        .route("/v1/routes", get(routes::list_routes))
        .route("/v1/locations", get(routes::list_locations))
        .route("/v1/plan", post(plan::handle))
        .route(
            "/v1/sessions",
            post(sessions::create).get(sessions::list),
        )
        .route(
            "/v1/sessions/:id",
            get(sessions::get).delete(sessions::delete),
        )
        .route("/metrics", get(crate::metrics::handler::metrics_handler))
        .route("/v1/stats", get(crate::metrics::handler::stats_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(timeout)),
        )
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .with_state(state)
}
