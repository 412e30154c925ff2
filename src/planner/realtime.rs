//! Real-time reconciliation stage.
//!
//! Walks candidate routes shortest first against a live-traffic snapshot.
//! The first route with no high-density intersection and no reported issue
//! becomes optimal. High density alone makes a route a sub-optimal fallback;
//! weather or incident reports at its intersections block it, as confirmed
//! (`blocked_routes`) when every report agrees with the reference maps and
//! as unconfirmed (`blocked_routes_invalid`) otherwise.

use super::{LiveTrafficHistory, LiveTrafficSummary, OptimalRoute, PlanningState};
use crate::catalog::{RouteCandidate, RouteCatalog};
use crate::conditions::{IssueClass, LiveTraffic, ReferenceIssues};
use crate::geo::GeoPoint;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

/// Default density above which an intersection counts as congested.
pub const DEFAULT_DENSITY_THRESHOLD: u32 = 5;

pub struct RealtimeReconciliationStage {
    catalog: RouteCatalog,
    reference: Arc<ReferenceIssues>,
    density_threshold: u32,
    tolerance: f64,
}

/// Per-route findings from one scan.
#[derive(Debug, Default)]
struct RouteScan {
    intersections: usize,
    valid_issues: usize,
    invalid_issues: usize,
    congested: bool,
}

impl RouteScan {
    fn has_issues(&self) -> bool {
        self.valid_issues + self.invalid_issues > 0
    }
}

/// Mutable bookkeeping for one reconciliation pass.
struct Pass<'a> {
    prior_blocked: &'a BTreeSet<String>,
    prior_blocked_invalid: &'a BTreeSet<String>,
    sub_optimal: Option<(RouteCandidate, u32)>,
    live_summary: Option<LiveTrafficSummary>,
}

impl RealtimeReconciliationStage {
    pub fn new(
        catalog: RouteCatalog,
        reference: Arc<ReferenceIssues>,
        density_threshold: u32,
        tolerance: f64,
    ) -> Self {
        Self {
            catalog,
            reference,
            density_threshold,
            tolerance,
        }
    }

    pub fn name(&self) -> &'static str {
        "realtime"
    }

    pub fn density_threshold(&self) -> u32 {
        self.density_threshold
    }

    /// Reconcile `state` against `snapshot`.
    ///
    /// `no_fly_list` is copied, never modified. The blocked sets are rebuilt
    /// from the routes examined this pass; the prior sets only decide which
    /// routes may still update the live-traffic display.
    pub fn reconcile(
        &self,
        mut state: PlanningState,
        snapshot: Vec<LiveTraffic>,
        history: &mut LiveTrafficHistory,
    ) -> PlanningState {
        let started = Instant::now();

        let prior_blocked = std::mem::take(&mut state.blocked_routes);
        let prior_blocked_invalid = std::mem::take(&mut state.blocked_routes_invalid);
        let mut blocked = BTreeSet::new();
        let mut blocked_invalid = BTreeSet::new();
        let mut no_fly = state.no_fly_list.clone();
        let mut optimal = state.optimal_route.clone();

        let mut pass = Pass {
            prior_blocked: &prior_blocked,
            prior_blocked_invalid: &prior_blocked_invalid,
            sub_optimal: None,
            live_summary: None,
        };

        let mut examined = 0usize;
        let mut blocked_this_tick = 0usize;
        let mut last_examined: Option<RouteCandidate> = None;
        let mut unique = false;

        loop {
            tracing::trace!(excluded = ?no_fly, "Searching next candidate route");

            let Some(candidate) =
                self.catalog
                    .shortest_available(&state.source, &state.destination, &no_fly)
            else {
                if examined.saturating_sub(blocked_this_tick) == 1 || examined == 1 {
                    unique = true;
                    pass.live_summary = None;
                }
                tracing::info!(examined, blocked = blocked_this_tick, unique, "No more alternate routes");
                break;
            };

            examined += 1;
            let geometry = self.catalog.geometry(&candidate.name);
            tracing::debug!(route = %candidate.name, points = geometry.len(), "Analyzing route");

            let scan = self.scan_route(&candidate, &geometry, &snapshot, &mut pass, history);
            let mut not_optimal = scan.congested;

            if scan.has_issues() {
                tracing::info!(
                    route = %candidate.name,
                    valid = scan.valid_issues,
                    invalid = scan.invalid_issues,
                    intersections = scan.intersections,
                    "Intersections on route report issues"
                );
                not_optimal = true;
                history.purge_route(&candidate.name);

                if pass
                    .sub_optimal
                    .as_ref()
                    .is_some_and(|(route, _)| route.name == candidate.name)
                {
                    pass.sub_optimal = None;
                }
                if optimal
                    .as_ref()
                    .is_some_and(|o| o.name() == candidate.name)
                {
                    optimal = None;
                }

                if scan.valid_issues == scan.intersections {
                    blocked.insert(candidate.name.clone());
                } else {
                    blocked_invalid.insert(candidate.name.clone());
                }
                blocked_this_tick += 1;
            }

            tracing::debug!(
                route = %candidate.name,
                blocked = ?blocked,
                blocked_invalid = ?blocked_invalid,
                "Route analysis done"
            );

            if !not_optimal {
                if geometry.is_empty() {
                    tracing::warn!(route = %candidate.name, "Route has no geometry, cannot verify it");
                } else {
                    tracing::info!(route = %candidate.name, "Route is optimal");
                    pass.sub_optimal = None;
                    let issue = optimal
                        .as_ref()
                        .filter(|o| o.name() == candidate.name)
                        .and_then(|o| o.issue.clone());
                    optimal = Some(OptimalRoute {
                        route: candidate,
                        issue,
                    });
                    last_examined = None;
                    break;
                }
            }

            no_fly.push(candidate.name.clone());
            last_examined = Some(candidate);
        }

        // A single issue-bearing route is still the route to show.
        if unique && examined == 1 && optimal.is_none() && pass.sub_optimal.is_none() {
            if let Some(route) = last_examined {
                optimal = Some(OptimalRoute::new(route));
            }
        }

        // The newest summary describes the sub-optimal pick itself; show the
        // observation that pushed the planner onto it instead.
        if let Some((sub_route, _)) = &pass.sub_optimal {
            let describes_sub = pass
                .live_summary
                .as_ref()
                .is_some_and(|s| s.route == sub_route.name);
            if describes_sub {
                if let Some(previous) = history.previous() {
                    tracing::info!("Showing previous live-traffic observation for sub-optimal route");
                    pass.live_summary = Some(previous.clone());
                }
            }
        }

        let is_sub_optimal = pass.sub_optimal.is_some();
        let new_optimal = match pass.sub_optimal {
            Some((route, density)) => {
                tracing::info!(route = %route.name, density, "Falling back to sub-optimal route");
                Some(OptimalRoute::new(route))
            }
            None => optimal,
        };

        let previous_name = state.optimal_route_name().map(str::to_string);
        let new_name = new_optimal.as_ref().map(|o| o.name().to_string());
        if new_name.is_some() && previous_name != new_name {
            tracing::info!(
                from = ?previous_name,
                to = ?new_name,
                "Optimal route changed"
            );
            metrics::counter!("roadsage_reroutes_total", "stage" => self.name()).increment(1);
        }

        state.optimal_route = new_optimal;
        state.live_traffic = pass.live_summary;
        state.is_sub_optimal = is_sub_optimal;
        state.is_unique_route = unique;
        state.blocked_routes = blocked;
        state.blocked_routes_invalid = blocked_invalid;
        state.all_live_traffic = snapshot;

        metrics::histogram!("roadsage_reconcile_duration_seconds")
            .record(started.elapsed().as_secs_f64());

        state
    }

    /// Match every live record against every point of the route.
    ///
    /// Counting covers all points; a congested intersection only ends the
    /// record loop for its own point.
    fn scan_route(
        &self,
        candidate: &RouteCandidate,
        geometry: &[GeoPoint],
        snapshot: &[LiveTraffic],
        pass: &mut Pass<'_>,
        history: &mut LiveTrafficHistory,
    ) -> RouteScan {
        let mut scan = RouteScan::default();
        let adjudicated = pass.prior_blocked.contains(&candidate.name)
            || pass.prior_blocked_invalid.contains(&candidate.name);

        for point in geometry {
            for record in snapshot {
                if !record.location.within(point, self.tolerance) {
                    continue;
                }

                scan.intersections += 1;
                match self.reference.classify(&candidate.name, record) {
                    IssueClass::Valid => scan.valid_issues += 1,
                    IssueClass::Invalid => scan.invalid_issues += 1,
                    IssueClass::Clear => {}
                }

                if adjudicated || record.density <= self.density_threshold {
                    continue;
                }

                tracing::info!(
                    route = %candidate.name,
                    intersection = %record.intersection_name,
                    density = record.density,
                    threshold = self.density_threshold,
                    "High traffic density on route"
                );
                scan.congested = true;

                let lower = pass
                    .sub_optimal
                    .as_ref()
                    .map_or(true, |(_, density)| *density > record.density);
                if lower {
                    pass.sub_optimal = Some((candidate.clone(), record.density));
                }

                let summary = LiveTrafficSummary::new(candidate, record);
                history.push(summary.clone());
                pass.live_summary = Some(summary);
                break;
            }
        }

        scan
    }
}
