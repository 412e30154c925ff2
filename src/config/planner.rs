//! Planner configuration

use crate::conditions::StaticOptimizer;
use crate::planner::{PlannerSettings, DEFAULT_DENSITY_THRESHOLD, DEFAULT_HISTORY_CAPACITY};
use serde::{Deserialize, Serialize};

/// Planning behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Live density above which an intersection counts as congested
    pub density_threshold: u32,
    /// Live-traffic summaries kept per session
    pub history_capacity: usize,
    /// Seconds between ticks of a planning session
    pub tick_interval_seconds: u64,
    /// Routes never offered
    pub ignored_routes: Vec<String>,
    /// Static optimizer stack, applied from the last entry backwards
    pub static_optimizers: Vec<StaticOptimizer>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            density_threshold: DEFAULT_DENSITY_THRESHOLD,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            tick_interval_seconds: 5,
            ignored_routes: Vec::new(),
            static_optimizers: StaticOptimizer::DEFAULT_STACK.to_vec(),
        }
    }
}

impl From<&PlannerConfig> for PlannerSettings {
    fn from(config: &PlannerConfig) -> Self {
        Self {
            density_threshold: config.density_threshold,
            history_capacity: config.history_capacity,
            ignored_routes: config.ignored_routes.clone(),
            static_optimizers: config.static_optimizers.clone(),
        }
    }
}
