//! Route conditions and the providers that report them.
//!
//! Three point-keyed providers (historical traffic, weather, planned events)
//! feed the static optimization stage; the live-traffic provider feeds
//! real-time reconciliation. Every provider is read-only and shared across
//! sessions.

mod error;
mod live;
mod reference;
mod table;
mod types;

pub use error::ProviderError;
pub use live::{
    parse_intersection_response, FileLiveTrafficProvider, HttpLiveTrafficProvider,
    InMemoryLiveTraffic, LiveTraffic, LiveTrafficProvider,
};
pub use reference::{IssueClass, ReferenceIssues};
pub use table::ConditionTable;
pub use types::{CongestionLevel, IncidentStatus, WeatherStatus};

use crate::config::RoadsageConfig;
use crate::geo::GeoPoint;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// A condition observed at a location, one variant per provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RouteCondition {
    TrafficTrend {
        location: GeoPoint,
        congestion_level: CongestionLevel,
        vehicle_count: u32,
        average_speed: f64,
    },
    Weather {
        location: GeoPoint,
        condition: WeatherStatus,
        temperature: f64,
        visibility: f64,
    },
    PlannedEvent {
        location: GeoPoint,
        congestion_level: CongestionLevel,
        event_name: String,
    },
    LiveTraffic(LiveTraffic),
}

impl RouteCondition {
    pub fn location(&self) -> GeoPoint {
        match self {
            Self::TrafficTrend { location, .. }
            | Self::Weather { location, .. }
            | Self::PlannedEvent { location, .. } => *location,
            Self::LiveTraffic(record) => record.location,
        }
    }

    /// The same condition reported at `point`.
    pub fn at(mut self, point: GeoPoint) -> Self {
        match &mut self {
            Self::TrafficTrend { location, .. }
            | Self::Weather { location, .. }
            | Self::PlannedEvent { location, .. } => *location = point,
            Self::LiveTraffic(record) => record.location = point,
        }
        self
    }
}

/// Point lookup of route conditions.
pub trait ConditionProvider: Send + Sync {
    /// Degrees of slack on each axis when matching a stored location.
    fn proximity_tolerance(&self) -> f64;

    /// Conditions recorded near `point`.
    fn fetch(&self, point: GeoPoint) -> Result<Vec<RouteCondition>, ProviderError>;
}

// ============================================================================
// Static optimizers
// ============================================================================

/// The issue that made the static stage move off a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RouteIssue {
    TrafficHistory {
        congestion: CongestionLevel,
    },
    Weather {
        condition: WeatherStatus,
    },
    PlannedEvent {
        congestion: CongestionLevel,
        event_name: String,
    },
}

impl fmt::Display for RouteIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlannedEvent {
                congestion,
                event_name,
            } => write!(
                f,
                "planned event '{}' with expected {} traffic congestion on the route.",
                event_name, congestion
            ),
            Self::TrafficHistory { congestion } => {
                write!(f, "'{}' historical traffic trends on the route.", congestion)
            }
            Self::Weather { condition } => {
                write!(f, "'{}' weather condition on the route.", condition)
            }
        }
    }
}

/// One-shot condition checks applied by the static stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StaticOptimizer {
    #[serde(rename = "traffic_trend")]
    TrafficTrend,
    #[serde(rename = "weather_conditions")]
    Weather,
    #[serde(rename = "planned_events")]
    PlannedEvents,
}

impl StaticOptimizer {
    /// Default stack, consumed from the end: historical traffic first.
    pub const DEFAULT_STACK: [StaticOptimizer; 3] = [
        StaticOptimizer::PlannedEvents,
        StaticOptimizer::Weather,
        StaticOptimizer::TrafficTrend,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TrafficTrend => "traffic_trend",
            Self::Weather => "weather_conditions",
            Self::PlannedEvents => "planned_events",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::TrafficTrend => "Historical Traffic Trends",
            Self::Weather => "Weather Conditions",
            Self::PlannedEvents => "Planned Events",
        }
    }

    /// Severity policy: the issue this condition raises, if any.
    ///
    /// Conditions from another provider never fire.
    pub fn evaluate(&self, condition: &RouteCondition) -> Option<RouteIssue> {
        match (self, condition) {
            (
                Self::TrafficTrend,
                RouteCondition::TrafficTrend {
                    congestion_level, ..
                },
            ) if congestion_level.is_heavy() => Some(RouteIssue::TrafficHistory {
                congestion: *congestion_level,
            }),
            (Self::Weather, RouteCondition::Weather { condition, .. })
                if condition.is_adverse() =>
            {
                Some(RouteIssue::Weather {
                    condition: *condition,
                })
            }
            (
                Self::PlannedEvents,
                RouteCondition::PlannedEvent {
                    congestion_level,
                    event_name,
                    ..
                },
            ) if congestion_level.is_heavy() => Some(RouteIssue::PlannedEvent {
                congestion: *congestion_level,
                event_name: event_name.clone(),
            }),
            _ => None,
        }
    }
}

impl fmt::Display for StaticOptimizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StaticOptimizer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "traffic_trend" => Ok(Self::TrafficTrend),
            "weather_conditions" => Ok(Self::Weather),
            "planned_events" => Ok(Self::PlannedEvents),
            other => Err(format!("unknown static optimizer: {}", other)),
        }
    }
}

// ============================================================================
// Provider set
// ============================================================================

/// Every provider one planner consults.
#[derive(Clone)]
pub struct ConditionProviders {
    pub traffic_trends: Arc<dyn ConditionProvider>,
    pub weather: Arc<dyn ConditionProvider>,
    pub planned_events: Arc<dyn ConditionProvider>,
    pub live_traffic: Arc<dyn LiveTrafficProvider>,
}

impl ConditionProviders {
    /// Providers that never report anything.
    pub fn empty() -> Self {
        Self {
            traffic_trends: Arc::new(ConditionTable::empty("traffic_trends", 0.0)),
            weather: Arc::new(ConditionTable::empty("weather_report", 0.0)),
            planned_events: Arc::new(ConditionTable::empty("planned_events", 0.0)),
            live_traffic: Arc::new(InMemoryLiveTraffic::default()),
        }
    }

    /// The provider an optimizer consults.
    pub fn for_optimizer(&self, optimizer: StaticOptimizer) -> &dyn ConditionProvider {
        match optimizer {
            StaticOptimizer::TrafficTrend => self.traffic_trends.as_ref(),
            StaticOptimizer::Weather => self.weather.as_ref(),
            StaticOptimizer::PlannedEvents => self.planned_events.as_ref(),
        }
    }

    pub fn with_live_traffic(mut self, provider: Arc<dyn LiveTrafficProvider>) -> Self {
        self.live_traffic = provider;
        self
    }

    /// Build providers from configuration.
    ///
    /// A missing CSV file leaves that provider empty. The live-traffic source
    /// is the snapshot file when configured, else the intersection API hosts.
    pub fn from_config(config: &RoadsageConfig) -> Result<Self, ProviderError> {
        let providers = &config.providers;
        let tolerances = &providers.tolerances;

        let traffic_trends = load_table(&providers.traffic_trends_file, |p| {
            ConditionTable::traffic_trends_csv(p, tolerances.traffic_trend)
        })?
        .unwrap_or_else(|| ConditionTable::empty("traffic_trends", tolerances.traffic_trend));
        let weather = load_table(&providers.weather_file, |p| {
            ConditionTable::weather_csv(p, tolerances.weather)
        })?
        .unwrap_or_else(|| ConditionTable::empty("weather_report", tolerances.weather));
        let planned_events = load_table(&providers.planned_events_file, |p| {
            ConditionTable::planned_events_csv(p, tolerances.planned_events)
        })?
        .unwrap_or_else(|| ConditionTable::empty("planned_events", tolerances.planned_events));

        let live = &config.live_traffic;
        let live_traffic: Arc<dyn LiveTrafficProvider> = match &live.snapshot_file {
            Some(path) => {
                tracing::info!(path = %path.display(), "Using live-traffic snapshot file");
                Arc::new(FileLiveTrafficProvider::new(path, tolerances.live_traffic))
            }
            None if !live.hosts.is_empty() => {
                tracing::info!(
                    hosts = live.hosts.len(),
                    endpoint = %live.endpoint,
                    "Using intersection API"
                );
                Arc::new(HttpLiveTrafficProvider::new(live, tolerances.live_traffic)?)
            }
            None => {
                tracing::warn!("No live-traffic source configured, real-time reconciliation sees no data");
                Arc::new(InMemoryLiveTraffic::default().with_tolerance(tolerances.live_traffic))
            }
        };

        Ok(Self {
            traffic_trends: Arc::new(traffic_trends),
            weather: Arc::new(weather),
            planned_events: Arc::new(planned_events),
            live_traffic,
        })
    }
}

fn load_table<F>(path: &Path, load: F) -> Result<Option<ConditionTable>, ProviderError>
where
    F: FnOnce(&Path) -> Result<ConditionTable, ProviderError>,
{
    if !path.exists() {
        tracing::warn!(path = %path.display(), "Condition data file not found, provider disabled");
        return Ok(None);
    }
    let table = load(path)?;
    tracing::info!(
        table = table.name(),
        rows = table.len(),
        path = %path.display(),
        "Loaded condition data"
    );
    Ok(Some(table))
}
