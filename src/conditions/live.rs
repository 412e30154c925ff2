//! Live intersection telemetry.
//!
//! Unlike the point-keyed tables, live providers return the whole snapshot
//! of every monitored intersection; the reconciliation stage matches records
//! against route geometry itself.

use super::{IncidentStatus, ProviderError, WeatherStatus};
use crate::config::LiveTrafficConfig;
use crate::geo::GeoPoint;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::RwLock;
use std::time::Duration;

/// One intersection's live report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveTraffic {
    pub location: GeoPoint,
    pub intersection_name: String,
    #[serde(default)]
    pub timestamp: String,
    /// Vehicle density at the intersection
    pub density: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_status: Option<WeatherStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incident_status: Option<IncidentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl LiveTraffic {
    /// Weather or incident reported as something other than clear.
    pub fn reports_issue(&self) -> bool {
        self.weather_status.unwrap_or(WeatherStatus::Clear) != WeatherStatus::Clear
            || self.incident_status.unwrap_or(IncidentStatus::Clear) != IncidentStatus::Clear
    }
}

/// Source of live-traffic snapshots.
///
/// Implementations apply their own timeout policy and must be safe to call
/// from many sessions at once.
#[async_trait]
pub trait LiveTrafficProvider: Send + Sync {
    /// Degrees of slack when matching a record to a route point.
    fn proximity_tolerance(&self) -> f64 {
        0.0
    }

    /// Fetch every intersection's current report.
    async fn fetch_all(&self) -> Result<Vec<LiveTraffic>, ProviderError>;
}

// ============================================================================
// HTTP provider
// ============================================================================

/// Intersection API response.
#[derive(Deserialize)]
struct IntersectionResponse {
    #[serde(default)]
    data: Option<IntersectionData>,
    #[serde(default)]
    weather_data: Option<WeatherData>,
    #[serde(default)]
    incident: Option<IncidentData>,
}

#[derive(Deserialize)]
struct IntersectionData {
    #[serde(default = "unknown_intersection")]
    intersection_name: String,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    timestamp: String,
    #[serde(default)]
    total_density: u32,
    #[serde(default)]
    traffic_description: Option<String>,
}

#[derive(Deserialize)]
struct WeatherData {
    #[serde(default)]
    short_forecast: Option<String>,
}

#[derive(Deserialize)]
struct IncidentData {
    #[serde(default)]
    incident_type: Option<String>,
}

fn unknown_intersection() -> String {
    "Unknown Intersection".to_string()
}

/// Parse one intersection API body. `Ok(None)` when the body has no `data`.
pub fn parse_intersection_response(body: &str) -> Result<Option<LiveTraffic>, ProviderError> {
    let response: IntersectionResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::ParseError(e.to_string()))?;

    let Some(data) = response.data else {
        return Ok(None);
    };

    let weather_status = response
        .weather_data
        .and_then(|w| w.short_forecast)
        .map(|s| WeatherStatus::parse_lossy(&s))
        .unwrap_or(WeatherStatus::Clear);
    let incident_status = response
        .incident
        .and_then(|i| i.incident_type)
        .map(|s| IncidentStatus::parse_lossy(&s))
        .unwrap_or(IncidentStatus::Clear);

    Ok(Some(LiveTraffic {
        location: GeoPoint::new(data.latitude, data.longitude),
        intersection_name: data.intersection_name,
        timestamp: data.timestamp,
        density: data.total_density,
        weather_status: Some(weather_status),
        incident_status: Some(incident_status),
        description: data.traffic_description,
    }))
}

/// Polls every configured intersection API host.
pub struct HttpLiveTrafficProvider {
    client: reqwest::Client,
    endpoint: String,
    hosts: Vec<String>,
    timeout_seconds: u64,
    tolerance: f64,
}

impl HttpLiveTrafficProvider {
    /// Create a provider with its own HTTP client.
    pub fn new(config: &LiveTrafficConfig, tolerance: f64) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ProviderError::ConnectionFailed(e.to_string()))?;
        Ok(Self::with_client(config, tolerance, client))
    }

    /// Create a provider with a custom HTTP client (for testing).
    pub fn with_client(config: &LiveTrafficConfig, tolerance: f64, client: reqwest::Client) -> Self {
        Self {
            client,
            endpoint: config.endpoint.clone(),
            hosts: config.hosts.clone(),
            timeout_seconds: config.timeout_seconds,
            tolerance,
        }
    }

    async fn fetch_host(&self, host: &str) -> Result<Option<LiveTraffic>, ProviderError> {
        let url = format!("{}{}", host.trim_end_matches('/'), self.endpoint);
        tracing::debug!(url = %url, "Requesting intersection status");

        let response = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(self.timeout_seconds))
            .send()
            .await
            .map_err(|e| Self::classify_error(e, self.timeout_seconds))?;

        if !response.status().is_success() {
            return Err(ProviderError::HttpError(response.status().as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;
        parse_intersection_response(&body)
    }

    fn classify_error(e: reqwest::Error, timeout_seconds: u64) -> ProviderError {
        if e.is_timeout() {
            ProviderError::Timeout(timeout_seconds)
        } else {
            ProviderError::ConnectionFailed(e.to_string())
        }
    }
}

#[async_trait]
impl LiveTrafficProvider for HttpLiveTrafficProvider {
    fn proximity_tolerance(&self) -> f64 {
        self.tolerance
    }

    async fn fetch_all(&self) -> Result<Vec<LiveTraffic>, ProviderError> {
        let requests = self.hosts.iter().map(|host| self.fetch_host(host));
        let results = futures::future::join_all(requests).await;

        let mut records = Vec::with_capacity(results.len());
        for (host, result) in self.hosts.iter().zip(results) {
            match result {
                Ok(Some(record)) => {
                    tracing::debug!(
                        host = %host,
                        intersection = %record.intersection_name,
                        density = record.density,
                        "Received intersection status"
                    );
                    records.push(record);
                }
                Ok(None) => {
                    tracing::debug!(host = %host, "Intersection response without data");
                }
                Err(e) => {
                    tracing::warn!(host = %host, error = %e, "Failed to fetch intersection status");
                }
            }
        }

        Ok(records)
    }
}

// ============================================================================
// File provider
// ============================================================================

/// Reads a JSON array of [`LiveTraffic`] from disk on every fetch.
#[derive(Debug, Clone)]
pub struct FileLiveTrafficProvider {
    path: PathBuf,
    tolerance: f64,
}

impl FileLiveTrafficProvider {
    pub fn new(path: impl Into<PathBuf>, tolerance: f64) -> Self {
        Self {
            path: path.into(),
            tolerance,
        }
    }
}

#[async_trait]
impl LiveTrafficProvider for FileLiveTrafficProvider {
    fn proximity_tolerance(&self) -> f64 {
        self.tolerance
    }

    async fn fetch_all(&self) -> Result<Vec<LiveTraffic>, ProviderError> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        serde_json::from_str(&content).map_err(|e| ProviderError::ParseError(e.to_string()))
    }
}

// ============================================================================
// In-memory provider
// ============================================================================

/// Serves a snapshot held in memory; replaceable between ticks.
#[derive(Debug, Default)]
pub struct InMemoryLiveTraffic {
    records: RwLock<Vec<LiveTraffic>>,
    tolerance: f64,
}

impl InMemoryLiveTraffic {
    pub fn new(records: Vec<LiveTraffic>) -> Self {
        Self {
            records: RwLock::new(records),
            tolerance: 0.0,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Replace the snapshot served by subsequent fetches.
    pub fn set(&self, records: Vec<LiveTraffic>) {
        match self.records.write() {
            Ok(mut guard) => *guard = records,
            Err(poisoned) => *poisoned.into_inner() = records,
        }
    }
}

#[async_trait]
impl LiveTrafficProvider for InMemoryLiveTraffic {
    fn proximity_tolerance(&self) -> f64 {
        self.tolerance
    }

    async fn fetch_all(&self) -> Result<Vec<LiveTraffic>, ProviderError> {
        let records = match self.records.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        Ok(records)
    }
}
