//! One-shot planning endpoint.

use super::{ApiError, PlanRequest, PlanResponse};
use crate::api::AppState;
use crate::planner::PlanReport;
use axum::{extract::State, Json};
use std::sync::Arc;

/// POST /v1/plan - Run one planning step.
///
/// Clients continue a plan by sending back the `state` and `history` they
/// received. History entries beyond the configured capacity are dropped
/// oldest first.
pub async fn handle(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PlanRequest>,
) -> Result<Json<PlanResponse>, ApiError> {
    let mut history = state.planner.new_history();
    history.extend(request.history);
    let planned = state
        .planner
        .plan(
            &request.source,
            &request.destination,
            request.state,
            &mut history,
        )
        .await?;

    tracing::debug!(
        source = %request.source,
        destination = %request.destination,
        optimal = ?planned.optimal_route_name(),
        "Plan request served"
    );

    Ok(Json(PlanResponse {
        report: PlanReport::from(planned),
        history: history.entries().cloned().collect(),
    }))
}
