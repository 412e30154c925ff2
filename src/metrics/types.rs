//! # Metrics Types
//!
//! Data structures for the JSON stats API.

use serde::Serialize;

/// JSON response for GET /v1/stats endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub uptime_seconds: u64,
    pub routes: usize,
    pub locations: usize,
    pub sessions: Vec<SessionStats>,
}

/// Per-session statistics.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStats {
    pub id: String,
    pub source: String,
    pub destination: String,
    pub ticks: u64,
    /// Route currently recommended, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimal_route: Option<String>,
    pub blocked_routes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}
