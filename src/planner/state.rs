//! Planning state carried across ticks.

use crate::catalog::RouteCandidate;
use crate::conditions::{LiveTraffic, RouteIssue, StaticOptimizer};
use crate::geo::GeoPoint;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Longest live-traffic description quoted in an issue summary.
const MAX_DESCRIPTION_CHARS: usize = 900;

/// The route currently recommended, with the issue that led to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimalRoute {
    pub route: RouteCandidate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue: Option<RouteIssue>,
}

impl OptimalRoute {
    pub fn new(route: RouteCandidate) -> Self {
        Self { route, issue: None }
    }

    pub fn with_issue(route: RouteCandidate, issue: RouteIssue) -> Self {
        Self {
            route,
            issue: Some(issue),
        }
    }

    pub fn name(&self) -> &str {
        &self.route.name
    }
}

/// The live-traffic observation that last disqualified a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveTrafficSummary {
    pub route: String,
    pub distance: f64,
    pub intersection_name: String,
    pub timestamp: String,
    pub location: GeoPoint,
    pub density: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl LiveTrafficSummary {
    pub fn new(route: &RouteCandidate, record: &LiveTraffic) -> Self {
        Self {
            route: route.name.clone(),
            distance: route.distance,
            intersection_name: record.intersection_name.clone(),
            timestamp: record.timestamp.clone(),
            location: record.location,
            density: record.density,
            description: record.description.clone(),
        }
    }
}

/// Which planning step runs next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlannerNode {
    Direct,
    Static,
    Realtime,
}

impl PlannerNode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct_route_planner",
            Self::Static => "optimal_route_planner",
            Self::Realtime => "realtime_route_planner",
        }
    }
}

impl std::fmt::Display for PlannerNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything one planning session carries from tick to tick.
///
/// Stages take the state by value and hand back the updated state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningState {
    pub source: String,
    pub destination: String,
    /// Routes excluded from every search. Append-only within a session.
    pub no_fly_list: Vec<String>,
    pub direct_route: Option<RouteCandidate>,
    pub optimal_route: Option<OptimalRoute>,
    /// Consumed from the end.
    pub static_optimizers: Vec<StaticOptimizer>,
    pub live_traffic: Option<LiveTrafficSummary>,
    pub is_sub_optimal: bool,
    pub is_unique_route: bool,
    /// Blocked by issues the reference maps confirm.
    pub blocked_routes: BTreeSet<String>,
    /// Blocked by issues the reference maps do not corroborate.
    pub blocked_routes_invalid: BTreeSet<String>,
    pub all_live_traffic: Vec<LiveTraffic>,
}

impl PlanningState {
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            ..Default::default()
        }
    }

    /// Selector: direct search first, then static optimizers until the
    /// stack empties, then real-time reconciliation forever after.
    pub fn next_node(&self) -> PlannerNode {
        if self.direct_route.is_none() {
            PlannerNode::Direct
        } else if !self.static_optimizers.is_empty() {
            PlannerNode::Static
        } else {
            PlannerNode::Realtime
        }
    }

    pub fn optimal_route_name(&self) -> Option<&str> {
        self.optimal_route.as_ref().map(OptimalRoute::name)
    }

    /// What the planner analyses on the next invocation.
    pub fn next_data_source(&self) -> &'static str {
        self.static_optimizers
            .last()
            .map(StaticOptimizer::description)
            .unwrap_or("Real-Time Traffic Scenarios")
    }

    /// Human explanation of the current choice, if there is anything to say.
    pub fn issue_summary(&self) -> Option<String> {
        if self.is_unique_route {
            return Some(
                "ONLY ONE possible route exists. \
                 All other routes are either BLOCKED or no other route exists!"
                    .to_string(),
            );
        }

        let Some(optimal) = &self.optimal_route else {
            return Some("Sorry, No Optimal Route Found!".to_string());
        };

        if let Some(issue) = &optimal.issue {
            return Some(issue.to_string());
        }

        let live = self.live_traffic.as_ref().filter(|l| l.density > 0)?;
        let mut summary = format!(
            "high traffic density of {} at {}",
            live.density, live.intersection_name
        );
        if self.is_sub_optimal {
            summary = format!("Sub-optimal route found: {}", summary);
        }
        if let Some(description) = live.description.as_deref().filter(|d| !d.is_empty()) {
            let quoted: String = description.chars().take(MAX_DESCRIPTION_CHARS).collect();
            summary.push_str(&format!(" - {} ...", quoted));
        }
        Some(summary)
    }
}

/// A planning result as shown to API and CLI users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanReport {
    pub state: PlanningState,
    pub issue: Option<String>,
    pub next_data_source: String,
}

impl From<PlanningState> for PlanReport {
    fn from(state: PlanningState) -> Self {
        Self {
            issue: state.issue_summary(),
            next_data_source: state.next_data_source().to_string(),
            state,
        }
    }
}
