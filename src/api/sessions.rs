//! Planning session endpoints.

use super::{ApiError, SessionListResponse, SessionRequest, SessionView};
use crate::api::AppState;
use crate::session::SessionInfo;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

fn parse_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::invalid_param("id", "session id must be a UUID"))
}

/// POST /v1/sessions - Start a session.
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SessionRequest>,
) -> Result<(StatusCode, Json<SessionInfo>), ApiError> {
    let info = state
        .sessions
        .start(&request.source, &request.destination)?;
    Ok((StatusCode::CREATED, Json(info)))
}

/// GET /v1/sessions - List running sessions.
pub async fn list(State(state): State<Arc<AppState>>) -> Json<SessionListResponse> {
    Json(SessionListResponse {
        sessions: state.sessions.list(),
    })
}

/// GET /v1/sessions/:id - Latest result of a session.
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let uuid = parse_id(&id)?;
    let info = state
        .sessions
        .info(&uuid)
        .ok_or_else(|| ApiError::session_not_found(&id))?;
    let snapshot = state.sessions.snapshot(&uuid).unwrap_or_default();
    Ok(Json(SessionView::new(info, snapshot)))
}

/// DELETE /v1/sessions/:id - Stop a session.
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let uuid = parse_id(&id)?;
    if state.sessions.stop(&uuid).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::session_not_found(&id))
    }
}
