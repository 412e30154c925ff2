//! # Metrics HTTP Handlers
//!
//! Axum handlers for metrics endpoints.

use super::{SessionStats, StatsResponse};
use crate::api::AppState;
use crate::session::SessionManager;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

/// Handler for GET /metrics endpoint (Prometheus text format).
///
/// Always returns 200, with an empty body if nothing was recorded yet.
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.metrics_collector.update_gauges();

    let metrics = state.metrics_collector.render_metrics();
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        metrics,
    )
}

/// Handler for GET /v1/stats endpoint (JSON format).
pub async fn stats_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.metrics_collector.update_gauges();

    let catalog = state.metrics_collector.catalog();
    Json(StatsResponse {
        uptime_seconds: state.metrics_collector.uptime_seconds(),
        routes: catalog.len(),
        locations: catalog.locations().len(),
        sessions: compute_session_stats(state.metrics_collector.sessions()),
    })
}

/// Per-session statistics, oldest session first.
pub fn compute_session_stats(sessions: &SessionManager) -> Vec<SessionStats> {
    sessions
        .list()
        .into_iter()
        .map(|info| {
            let snapshot = sessions.snapshot(&info.id).unwrap_or_default();
            let (optimal_route, blocked_routes) = match &snapshot.state {
                Some(state) => (
                    state.optimal_route_name().map(str::to_string),
                    state.blocked_routes.len(),
                ),
                None => (None, 0),
            };
            SessionStats {
                id: info.id.to_string(),
                source: info.source,
                destination: info.destination,
                ticks: snapshot.ticks,
                optimal_route,
                blocked_routes,
                last_error: snapshot.last_error,
            }
        })
        .collect()
}
