//! Point-keyed condition tables loaded from CSV.
//!
//! # CSV formats
//!
//! ```csv
//! latitude,longitude,congestion_level,vehicle_count,average_speed
//! 37.7749,-122.4194,High,120,18.5
//! ```
//!
//! ```csv
//! latitude,longitude,condition,temperature,visibility
//! 37.5585,-122.2711,fog,12.0,0.4
//! ```
//!
//! ```csv
//! latitude,longitude,traffic_impact,event_name
//! 37.4030,-121.9700,Severe,Stadium Concert
//! ```

use super::{
    CongestionLevel, ConditionProvider, ProviderError, RouteCondition, WeatherStatus,
};
use crate::geo::GeoPoint;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct TrafficTrendRecord {
    latitude: f64,
    longitude: f64,
    congestion_level: String,
    #[serde(default)]
    vehicle_count: u32,
    #[serde(default)]
    average_speed: f64,
}

#[derive(Deserialize)]
struct WeatherRecord {
    latitude: f64,
    longitude: f64,
    condition: String,
    #[serde(default)]
    temperature: f64,
    #[serde(default)]
    visibility: f64,
}

#[derive(Deserialize)]
struct PlannedEventRecord {
    latitude: f64,
    longitude: f64,
    traffic_impact: String,
    event_name: String,
}

// ── Provider ──────────────────────────────────────────────────────────────────

/// A fixed table of conditions answered by proximity lookup.
///
/// `fetch` returns at most one condition: the first row within tolerance
/// on both axes, relocated to the queried point.
#[derive(Debug, Clone)]
pub struct ConditionTable {
    name: &'static str,
    tolerance: f64,
    rows: Vec<RouteCondition>,
}

impl ConditionTable {
    pub fn new(name: &'static str, tolerance: f64, rows: Vec<RouteCondition>) -> Self {
        Self {
            name,
            tolerance,
            rows,
        }
    }

    /// A table with no rows; every lookup finds nothing.
    pub fn empty(name: &'static str, tolerance: f64) -> Self {
        Self::new(name, tolerance, Vec::new())
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Historical traffic trends from `traffic_trends.csv`.
    pub fn traffic_trends_csv(path: &Path, tolerance: f64) -> Result<Self, ProviderError> {
        Self::traffic_trends_reader(std::fs::File::open(path)?, tolerance)
    }

    /// Like [`ConditionTable::traffic_trends_csv`] but accepts any `Read` source.
    pub fn traffic_trends_reader<R: Read>(reader: R, tolerance: f64) -> Result<Self, ProviderError> {
        let rows = read_rows(reader, "traffic_trends", |r: TrafficTrendRecord| {
            RouteCondition::TrafficTrend {
                location: GeoPoint::new(r.latitude, r.longitude),
                congestion_level: CongestionLevel::parse_lossy(&r.congestion_level),
                vehicle_count: r.vehicle_count,
                average_speed: r.average_speed,
            }
        })?;
        Ok(Self::new("traffic_trends", tolerance, rows))
    }

    /// Weather reports from `weather_report.csv`.
    pub fn weather_csv(path: &Path, tolerance: f64) -> Result<Self, ProviderError> {
        Self::weather_reader(std::fs::File::open(path)?, tolerance)
    }

    pub fn weather_reader<R: Read>(reader: R, tolerance: f64) -> Result<Self, ProviderError> {
        let rows = read_rows(reader, "weather_report", |r: WeatherRecord| {
            RouteCondition::Weather {
                location: GeoPoint::new(r.latitude, r.longitude),
                condition: WeatherStatus::parse_lossy(&r.condition),
                temperature: r.temperature,
                visibility: r.visibility,
            }
        })?;
        Ok(Self::new("weather_report", tolerance, rows))
    }

    /// Planned events from `planned_events.csv`.
    pub fn planned_events_csv(path: &Path, tolerance: f64) -> Result<Self, ProviderError> {
        Self::planned_events_reader(std::fs::File::open(path)?, tolerance)
    }

    pub fn planned_events_reader<R: Read>(reader: R, tolerance: f64) -> Result<Self, ProviderError> {
        let rows = read_rows(reader, "planned_events", |r: PlannedEventRecord| {
            RouteCondition::PlannedEvent {
                location: GeoPoint::new(r.latitude, r.longitude),
                congestion_level: CongestionLevel::parse_lossy(&r.traffic_impact),
                event_name: r.event_name,
            }
        })?;
        Ok(Self::new("planned_events", tolerance, rows))
    }
}

impl ConditionProvider for ConditionTable {
    fn proximity_tolerance(&self) -> f64 {
        self.tolerance
    }

    fn fetch(&self, point: GeoPoint) -> Result<Vec<RouteCondition>, ProviderError> {
        Ok(self
            .rows
            .iter()
            .find(|row| row.location().within(&point, self.tolerance))
            .map(|row| row.clone().at(point))
            .into_iter()
            .collect())
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Deserialize every row, skipping the ones that do not parse.
fn read_rows<R, T, F>(reader: R, table: &str, convert: F) -> Result<Vec<RouteCondition>, ProviderError>
where
    R: Read,
    T: serde::de::DeserializeOwned,
    F: Fn(T) -> RouteCondition,
{
    let mut csv_reader = csv::Reader::from_reader(reader);
    // Fail early on a missing or unreadable header
    csv_reader.headers()?;

    let mut rows = Vec::new();
    for (line, result) in csv_reader.deserialize::<T>().enumerate() {
        match result {
            Ok(record) => rows.push(convert(record)),
            Err(e) => {
                tracing::warn!(table, row = line + 1, error = %e, "Skipping malformed row");
            }
        }
    }

    tracing::debug!(table, rows = rows.len(), "Loaded condition table");
    Ok(rows)
}
