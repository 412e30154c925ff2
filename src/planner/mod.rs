//! Route planner.
//!
//! A small state machine over [`PlanningState`]:
//!
//! ```text
//! NeedsDirectRoute ──► NeedsStaticOptimization (until the stack is empty)
//!                                  │
//!                                  ▼
//!                      NeedsRealtimeReconciliation (every later call)
//! ```
//!
//! Each [`RoutePlanner::plan`] call runs the step the selector picks and
//! returns. Calling it repeatedly with the returned state walks the planner
//! from the direct route through the static optimizers into continuous
//! real-time reconciliation.

mod error;
mod history;
mod realtime;
mod state;
mod static_stage;

pub use error::PlannerError;
pub use history::{LiveTrafficHistory, DEFAULT_HISTORY_CAPACITY};
pub use realtime::{RealtimeReconciliationStage, DEFAULT_DENSITY_THRESHOLD};
pub use state::{LiveTrafficSummary, OptimalRoute, PlanReport, PlannerNode, PlanningState};
pub use static_stage::StaticOptimizationStage;

use crate::catalog::RouteCatalog;
use crate::conditions::{ConditionProviders, ReferenceIssues, StaticOptimizer};
use crate::config::RoadsageConfig;
use std::sync::Arc;

/// Tunables the planner reads at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerSettings {
    pub density_threshold: u32,
    pub history_capacity: usize,
    /// Routes never offered, seeded into every new `no_fly_list`.
    pub ignored_routes: Vec<String>,
    /// Optimizer stack given to every new plan, consumed from the end.
    pub static_optimizers: Vec<StaticOptimizer>,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            density_threshold: DEFAULT_DENSITY_THRESHOLD,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            ignored_routes: Vec::new(),
            static_optimizers: StaticOptimizer::DEFAULT_STACK.to_vec(),
        }
    }
}

/// Orchestrates the planning stages for any number of sessions.
///
/// The planner itself holds no per-session state: sessions own their
/// `PlanningState` and `LiveTrafficHistory` and pass them in.
pub struct RoutePlanner {
    catalog: RouteCatalog,
    providers: ConditionProviders,
    settings: PlannerSettings,
    static_stage: StaticOptimizationStage,
    realtime_stage: RealtimeReconciliationStage,
}

impl RoutePlanner {
    pub fn new(
        catalog: RouteCatalog,
        providers: ConditionProviders,
        reference: ReferenceIssues,
        settings: PlannerSettings,
    ) -> Self {
        let static_stage = StaticOptimizationStage::new(catalog.clone(), providers.clone());
        let realtime_stage = RealtimeReconciliationStage::new(
            catalog.clone(),
            Arc::new(reference),
            settings.density_threshold,
            providers.live_traffic.proximity_tolerance(),
        );
        Self {
            catalog,
            providers,
            settings,
            static_stage,
            realtime_stage,
        }
    }

    /// Build the catalog, providers and planner described by `config`.
    pub fn from_config(config: &RoadsageConfig) -> Result<Self, PlannerError> {
        let catalog = RouteCatalog::load_dir(&config.catalog.routes_dir)?;
        let providers = ConditionProviders::from_config(config)?;
        Ok(Self::new(
            catalog,
            providers,
            config.reference_issues.clone(),
            PlannerSettings::from(&config.planner),
        ))
    }

    pub fn catalog(&self) -> &RouteCatalog {
        &self.catalog
    }

    pub fn settings(&self) -> &PlannerSettings {
        &self.settings
    }

    /// A history buffer sized for this planner.
    pub fn new_history(&self) -> LiveTrafficHistory {
        LiveTrafficHistory::new(self.settings.history_capacity)
    }

    /// Both locations present and different.
    pub fn validate_request(source: &str, destination: &str) -> Result<(), PlannerError> {
        if source.trim().is_empty() || destination.trim().is_empty() {
            return Err(PlannerError::InvalidRequest(
                "source and destination are required".to_string(),
            ));
        }
        if source == destination {
            return Err(PlannerError::InvalidRequest(
                "source and destination must be different".to_string(),
            ));
        }
        Ok(())
    }

    /// Run one planning step.
    ///
    /// `prior` continues an earlier plan for the same pair; a prior state for
    /// a different pair is discarded and planning starts over.
    pub async fn plan(
        &self,
        source: &str,
        destination: &str,
        prior: Option<PlanningState>,
        history: &mut LiveTrafficHistory,
    ) -> Result<PlanningState, PlannerError> {
        Self::validate_request(source, destination)?;

        let state = match prior {
            Some(state) if state.source == source && state.destination == destination => state,
            Some(_) => {
                tracing::debug!(source, destination, "Locations changed, starting a new plan");
                PlanningState::new(source, destination)
            }
            None => PlanningState::new(source, destination),
        };

        let node = state.next_node();
        tracing::info!(source, destination, node = %node, "Planning route");
        metrics::counter!("roadsage_planner_runs_total", "node" => node.as_str()).increment(1);

        match node {
            PlannerNode::Direct => Ok(self.find_direct_route(state)),
            PlannerNode::Static => {
                let mut state = state;
                while !state.static_optimizers.is_empty() {
                    state = self.static_stage.apply(state)?;
                }
                Ok(state)
            }
            PlannerNode::Realtime => {
                let snapshot = match self.providers.live_traffic.fetch_all().await {
                    Ok(records) => records,
                    Err(e) => {
                        tracing::warn!(error = %e, "Live traffic unavailable, reconciling without data");
                        Vec::new()
                    }
                };
                tracing::debug!(records = snapshot.len(), "Fetched live traffic");
                Ok(self.realtime_stage.reconcile(state, snapshot, history))
            }
        }
    }

    /// Shortest route outside the ignored routes; seeds the optimizer stack.
    fn find_direct_route(&self, mut state: PlanningState) -> PlanningState {
        let ignored = &self.settings.ignored_routes;
        match self
            .catalog
            .shortest_available(&state.source, &state.destination, ignored)
        {
            Some(route) => {
                tracing::info!(
                    route = %route.name,
                    distance = route.distance,
                    "Direct route found"
                );
                state.optimal_route = Some(OptimalRoute::new(route.clone()));
                state.direct_route = Some(route);
                state.no_fly_list = ignored.clone();
                state.static_optimizers = self.settings.static_optimizers.clone();
            }
            None => {
                tracing::warn!(
                    source = %state.source,
                    destination = %state.destination,
                    "No route found between locations"
                );
            }
        }
        state
    }
}

/// One source/destination pair followed over time.
pub struct PlanningSession {
    planner: Arc<RoutePlanner>,
    source: String,
    destination: String,
    state: Option<PlanningState>,
    history: LiveTrafficHistory,
    ticks: u64,
}

impl PlanningSession {
    pub fn new(
        planner: Arc<RoutePlanner>,
        source: impl Into<String>,
        destination: impl Into<String>,
    ) -> Result<Self, PlannerError> {
        let source = source.into();
        let destination = destination.into();
        RoutePlanner::validate_request(&source, &destination)?;
        let history = planner.new_history();
        Ok(Self {
            planner,
            source,
            destination,
            state: None,
            history,
            ticks: 0,
        })
    }

    /// Run one planning step and keep its result.
    pub async fn tick(&mut self) -> Result<&PlanningState, PlannerError> {
        let next = self
            .planner
            .plan(
                &self.source,
                &self.destination,
                self.state.clone(),
                &mut self.history,
            )
            .await?;
        self.ticks += 1;
        Ok(self.state.insert(next))
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn state(&self) -> Option<&PlanningState> {
        self.state.as_ref()
    }

    pub fn history(&self) -> &LiveTrafficHistory {
        &self.history
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
