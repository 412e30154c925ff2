//! Route catalog endpoints.

use super::{ApiError, LocationsResponse, RouteSummaryView, RoutesQuery, RoutesResponse};
use crate::api::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

/// GET /v1/routes - List candidate routes.
///
/// With both `source` and `destination`, only routes connecting them are
/// returned, shortest first.
pub async fn list_routes(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RoutesQuery>,
) -> Result<Json<RoutesResponse>, ApiError> {
    let catalog = state.planner.catalog();
    let routes = match (query.source.as_deref(), query.destination.as_deref()) {
        (Some(source), Some(destination)) => catalog.routes_between(source, destination),
        (None, None) => catalog.routes(),
        (Some(_), None) => {
            return Err(ApiError::invalid_param(
                "destination",
                "destination is required when source is given",
            ))
        }
        (None, Some(_)) => {
            return Err(ApiError::invalid_param(
                "source",
                "source is required when destination is given",
            ))
        }
    };

    Ok(Json(RoutesResponse {
        routes: routes.into_iter().map(RouteSummaryView::from).collect(),
    }))
}

/// GET /v1/locations - List route endpoint labels.
pub async fn list_locations(State(state): State<Arc<AppState>>) -> Json<LocationsResponse> {
    Json(LocationsResponse {
        locations: state.planner.catalog().locations(),
    })
}
