//! Request and response types for the planning API.

use crate::catalog::RouteSummary;
use crate::planner::{LiveTrafficSummary, PlanReport, PlannerError, PlanningState};
use crate::session::{SessionInfo, SessionSnapshot};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of `POST /v1/plan`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlanRequest {
    pub source: String,
    pub destination: String,
    /// State returned by the previous call, to continue that plan
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<PlanningState>,
    /// Live-traffic history returned by the previous call, oldest first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<LiveTrafficSummary>,
}

/// Response of `POST /v1/plan`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanResponse {
    #[serde(flatten)]
    pub report: PlanReport,
    /// Live-traffic history after this step; send it back with `state`
    pub history: Vec<LiveTrafficSummary>,
}

/// Body of `POST /v1/sessions`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionRequest {
    pub source: String,
    pub destination: String,
}

/// Query string of `GET /v1/routes`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoutesQuery {
    pub source: Option<String>,
    pub destination: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutesResponse {
    pub routes: Vec<RouteSummaryView>,
}

/// Route listing entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteSummaryView {
    pub name: String,
    pub distance_km: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    pub points: usize,
}

impl From<RouteSummary> for RouteSummaryView {
    fn from(summary: RouteSummary) -> Self {
        Self {
            name: summary.name,
            distance_km: summary.distance,
            start: summary.start,
            end: summary.end,
            points: summary.points,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationsResponse {
    pub locations: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionListResponse {
    pub sessions: Vec<SessionInfo>,
}

/// Latest state of a running session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    #[serde(flatten)]
    pub info: SessionInfo,
    pub ticks: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<PlanReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl SessionView {
    pub fn new(info: SessionInfo, snapshot: SessionSnapshot) -> Self {
        Self {
            info,
            ticks: snapshot.ticks,
            report: snapshot.state.map(PlanReport::from),
            last_error: snapshot.last_error,
            updated_at: snapshot.updated_at,
        }
    }
}

/// Error response envelope.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiError {
    pub error: ApiErrorBody,
}

/// Error details.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiErrorBody {
    pub message: String,
    pub r#type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ApiError {
    /// Create a bad request error (400).
    pub fn bad_request(message: &str) -> Self {
        Self {
            error: ApiErrorBody {
                message: message.to_string(),
                r#type: "invalid_request_error".to_string(),
                param: None,
                code: Some("invalid_request_error".to_string()),
            },
        }
    }

    /// Bad request naming the offending field.
    pub fn invalid_param(param: &str, message: &str) -> Self {
        let mut error = Self::bad_request(message);
        error.error.param = Some(param.to_string());
        error
    }

    /// Create a session not found error (404).
    pub fn session_not_found(id: &str) -> Self {
        Self {
            error: ApiErrorBody {
                message: format!("Session '{}' not found", id),
                r#type: "invalid_request_error".to_string(),
                param: Some("id".to_string()),
                code: Some("session_not_found".to_string()),
            },
        }
    }

    /// Create an internal error (500).
    pub fn internal(message: &str) -> Self {
        Self {
            error: ApiErrorBody {
                message: message.to_string(),
                r#type: "server_error".to_string(),
                param: None,
                code: Some("internal_error".to_string()),
            },
        }
    }

    fn status_code(&self) -> StatusCode {
        match self.error.code.as_deref() {
            Some("invalid_request_error") => StatusCode::BAD_REQUEST,
            Some("session_not_found") => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<PlannerError> for ApiError {
    fn from(err: PlannerError) -> Self {
        match err {
            PlannerError::InvalidRequest(message) => Self::bad_request(&message),
            other => {
                tracing::error!(error = %other, "Planning failed");
                Self::internal(&other.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}
