//! Planner error types.

use crate::catalog::CatalogError;
use crate::conditions::ProviderError;
use thiserror::Error;

/// Errors surfaced by the route planner.
///
/// Missing routes and provider outages are not errors: they degrade the plan
/// instead.
#[derive(Debug, Error)]
pub enum PlannerError {
    /// Source/destination pair is unusable
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Static stage entered without an optimizer to apply
    #[error("static optimization invoked with an empty optimizer stack")]
    EmptyOptimizerStack,

    /// Route catalog could not be built
    #[error("route catalog: {0}")]
    Catalog(#[from] CatalogError),

    /// Condition providers could not be built
    #[error("condition provider: {0}")]
    Provider(#[from] ProviderError),
}
