//! Route catalog and condition provider configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where route files live
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub routes_dir: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            routes_dir: PathBuf::from("data/routes"),
        }
    }
}

/// CSV sources for the static providers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub traffic_trends_file: PathBuf,
    pub weather_file: PathBuf,
    pub planned_events_file: PathBuf,
    pub tolerances: ToleranceConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            traffic_trends_file: PathBuf::from("data/csv/traffic_trends.csv"),
            weather_file: PathBuf::from("data/csv/weather_report.csv"),
            planned_events_file: PathBuf::from("data/csv/planned_events.csv"),
            tolerances: ToleranceConfig::default(),
        }
    }
}

/// Proximity tolerance per provider, in degrees on each axis
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToleranceConfig {
    pub traffic_trend: f64,
    pub weather: f64,
    pub planned_events: f64,
    /// `0.0` means exact coordinate match
    pub live_traffic: f64,
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self {
            traffic_trend: 0.0005,
            weather: 0.005,
            planned_events: 0.01,
            live_traffic: 0.0,
        }
    }
}

/// Live intersection telemetry source
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveTrafficConfig {
    /// Path appended to every host
    pub endpoint: String,
    /// Intersection API base URLs
    pub hosts: Vec<String>,
    pub timeout_seconds: u64,
    /// Read snapshots from this JSON file instead of the API
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_file: Option<PathBuf>,
}

impl Default for LiveTrafficConfig {
    fn default() -> Self {
        Self {
            endpoint: "/api/v1/traffic/directional/summary".to_string(),
            hosts: Vec::new(),
            timeout_seconds: 5,
            snapshot_file: None,
        }
    }
}
