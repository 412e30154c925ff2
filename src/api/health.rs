//! Health check endpoint handler.

use crate::api::AppState;
use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: u64,
    pub routes: usize,
    pub sessions: usize,
}

/// GET /health - Return service health.
///
/// An empty route catalog cannot plan anything and reports `degraded`.
pub async fn handle(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let routes = state.planner.catalog().len();
    let status = if routes > 0 { "healthy" } else { "degraded" };

    Json(HealthResponse {
        status: status.to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        routes,
        sessions: state.sessions.len(),
    })
}
