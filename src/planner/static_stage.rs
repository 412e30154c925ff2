//! Static optimization stage.
//!
//! Pops one optimizer per invocation and walks the current route looking
//! for the first point where that optimizer's provider reports a condition
//! severe enough to look for an alternative.

use super::{OptimalRoute, PlannerError, PlanningState};
use crate::catalog::RouteCatalog;
use crate::conditions::ConditionProviders;

pub struct StaticOptimizationStage {
    catalog: RouteCatalog,
    providers: ConditionProviders,
}

impl StaticOptimizationStage {
    pub fn new(catalog: RouteCatalog, providers: ConditionProviders) -> Self {
        Self { catalog, providers }
    }

    pub fn name(&self) -> &'static str {
        "static"
    }

    /// Apply the optimizer on top of the stack.
    ///
    /// On the first firing point the current route is rejected: the shortest
    /// route outside `no_fly_list` and the rejected route becomes optimal and
    /// the rejected route joins `no_fly_list`. With no alternative left the
    /// route stays, annotated with the issue. Provider failures count as
    /// "no condition" for that point.
    pub fn apply(&self, mut state: PlanningState) -> Result<PlanningState, PlannerError> {
        let Some(optimizer) = state.static_optimizers.pop() else {
            tracing::error!("Static optimization invoked with no optimizers left");
            return Err(PlannerError::EmptyOptimizerStack);
        };

        let Some(current) = state.optimal_route.clone() else {
            tracing::debug!(optimizer = %optimizer, "No route to optimize");
            return Ok(state);
        };

        tracing::info!(
            optimizer = %optimizer,
            route = %current.name(),
            "Analyzing route against static conditions"
        );

        let provider = self.providers.for_optimizer(optimizer);

        for point in self.catalog.geometry(current.name()) {
            let conditions = match provider.fetch(point) {
                Ok(conditions) => conditions,
                Err(e) => {
                    tracing::warn!(
                        optimizer = %optimizer,
                        point = %point,
                        error = %e,
                        "Condition lookup failed, treating point as clear"
                    );
                    continue;
                }
            };

            let Some(issue) = conditions.iter().find_map(|c| optimizer.evaluate(c)) else {
                continue;
            };

            tracing::info!(
                optimizer = %optimizer,
                route = %current.name(),
                point = %point,
                issue = %issue,
                "Condition fired on route"
            );

            let mut excluded = state.no_fly_list.clone();
            excluded.push(current.route.name.clone());

            match self
                .catalog
                .shortest_available(&state.source, &state.destination, &excluded)
            {
                Some(alternative) => {
                    tracing::info!(
                        from = %current.name(),
                        to = %alternative.name,
                        distance = alternative.distance,
                        "Rerouting around static condition"
                    );
                    metrics::counter!("roadsage_reroutes_total", "stage" => self.name())
                        .increment(1);
                    if !state.no_fly_list.contains(&current.route.name) {
                        state.no_fly_list.push(current.route.name.clone());
                    }
                    state.optimal_route = Some(OptimalRoute::with_issue(alternative, issue));
                }
                None => {
                    tracing::warn!(
                        route = %current.name(),
                        "No alternative route, keeping current route"
                    );
                    state.optimal_route = Some(OptimalRoute::with_issue(current.route, issue));
                }
            }

            return Ok(state);
        }

        tracing::debug!(
            optimizer = %optimizer,
            route = %current.name(),
            "No condition found on route"
        );
        Ok(state)
    }
}
