//! Route catalog.
//!
//! Enumerates the pre-defined whole routes between named locations and
//! answers the one question the planner keeps asking: which is the shortest
//! route between two locations once a set of routes has been ruled out.
//!
//! Route geometry comes from a [`RouteSource`]; the catalog never looks at
//! file formats itself.

mod error;
mod loader;
mod route;

pub use error::CatalogError;
pub use loader::{load_route_dir, parse_gpx};
pub use route::{RouteCandidate, RouteDefinition, RouteEndpoints, Track, Waypoint};

use crate::geo::GeoPoint;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Provider of route identities, endpoints, distances and geometry.
///
/// Implementations must be safe for concurrent reads; every planning
/// session shares one source.
pub trait RouteSource: Send + Sync {
    /// All route identifiers, in enumeration order.
    fn list_routes(&self) -> Vec<String>;

    /// Start and end waypoint names/descriptions.
    fn endpoints(&self, route: &str) -> Option<RouteEndpoints>;

    /// Total distance in kilometers.
    fn distance_km(&self, route: &str) -> Option<f64>;

    /// Ordered points: waypoints first, then track points.
    fn geometry(&self, route: &str) -> Option<Vec<GeoPoint>>;
}

/// Route source backed by definitions held in memory.
///
/// Enumeration order is insertion order.
#[derive(Debug, Default)]
pub struct InMemoryRouteSource {
    routes: Vec<RouteDefinition>,
    index: HashMap<String, usize>,
}

impl InMemoryRouteSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a source from definitions, rejecting duplicate names.
    pub fn from_definitions(definitions: Vec<RouteDefinition>) -> Result<Self, CatalogError> {
        let mut source = Self::new();
        for definition in definitions {
            source.add_route(definition)?;
        }
        Ok(source)
    }

    pub fn add_route(&mut self, definition: RouteDefinition) -> Result<(), CatalogError> {
        if self.index.contains_key(&definition.name) {
            return Err(CatalogError::DuplicateRoute(definition.name));
        }
        self.index
            .insert(definition.name.clone(), self.routes.len());
        self.routes.push(definition);
        Ok(())
    }

    fn get(&self, route: &str) -> Option<&RouteDefinition> {
        self.index.get(route).map(|&i| &self.routes[i])
    }
}

impl RouteSource for InMemoryRouteSource {
    fn list_routes(&self) -> Vec<String> {
        self.routes.iter().map(|r| r.name.clone()).collect()
    }

    fn endpoints(&self, route: &str) -> Option<RouteEndpoints> {
        self.get(route).and_then(RouteDefinition::endpoints)
    }

    fn distance_km(&self, route: &str) -> Option<f64> {
        self.get(route).map(RouteDefinition::distance_km)
    }

    fn geometry(&self, route: &str) -> Option<Vec<GeoPoint>> {
        self.get(route).map(RouteDefinition::geometry)
    }
}

/// One catalog entry as shown by listings.
#[derive(Debug, Clone, Serialize)]
pub struct RouteSummary {
    pub name: String,
    pub distance: f64,
    pub start: Option<String>,
    pub end: Option<String>,
    pub points: usize,
}

/// The set of candidate routes available to the planner.
#[derive(Clone)]
pub struct RouteCatalog {
    source: Arc<dyn RouteSource>,
}

impl RouteCatalog {
    pub fn new(source: Arc<dyn RouteSource>) -> Self {
        Self { source }
    }

    /// Catalog over in-memory definitions.
    pub fn from_definitions(definitions: Vec<RouteDefinition>) -> Result<Self, CatalogError> {
        let source = InMemoryRouteSource::from_definitions(definitions)?;
        Ok(Self::new(Arc::new(source)))
    }

    /// Catalog over every route file in `dir`.
    pub fn load_dir(dir: &Path) -> Result<Self, CatalogError> {
        Self::from_definitions(load_route_dir(dir)?)
    }

    /// Shortest route from `source` to `destination` not listed in `excluded`.
    ///
    /// Endpoints match when the start waypoint's name or description equals
    /// `source` and the end waypoint's name or description equals
    /// `destination`. Among equal distances the first route in enumeration
    /// order wins. `None` means there are no more alternatives.
    pub fn shortest_available(
        &self,
        source: &str,
        destination: &str,
        excluded: &[String],
    ) -> Option<RouteCandidate> {
        let mut shortest: Option<RouteCandidate> = None;

        for route in self.source.list_routes() {
            if excluded.contains(&route) {
                continue;
            }
            let connects = self
                .source
                .endpoints(&route)
                .is_some_and(|e| e.connects(source, destination));
            if !connects {
                continue;
            }
            let Some(distance) = self.source.distance_km(&route) else {
                continue;
            };
            if shortest.as_ref().map_or(true, |s| distance < s.distance) {
                shortest = Some(RouteCandidate::new(route, distance));
            }
        }

        shortest
    }

    /// Geometry of `route`; empty when the route is unknown.
    pub fn geometry(&self, route: &str) -> Vec<GeoPoint> {
        self.source.geometry(route).unwrap_or_default()
    }

    /// Every route in enumeration order.
    pub fn routes(&self) -> Vec<RouteSummary> {
        self.source
            .list_routes()
            .into_iter()
            .map(|name| self.summary(name))
            .collect()
    }

    /// Routes connecting `source` to `destination`, shortest first.
    pub fn routes_between(&self, source: &str, destination: &str) -> Vec<RouteSummary> {
        let mut routes: Vec<RouteSummary> = self
            .source
            .list_routes()
            .into_iter()
            .filter(|name| {
                self.source
                    .endpoints(name)
                    .is_some_and(|e| e.connects(source, destination))
            })
            .map(|name| self.summary(name))
            .collect();
        routes.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        routes
    }

    /// Distinct endpoint labels, in first-seen order.
    pub fn locations(&self) -> Vec<String> {
        let mut locations: Vec<String> = Vec::new();
        for route in self.source.list_routes() {
            let Some(endpoints) = self.source.endpoints(&route) else {
                continue;
            };
            for label in [endpoints.start_label(), endpoints.end_label()]
                .into_iter()
                .flatten()
            {
                if !locations.iter().any(|l| l == label) {
                    locations.push(label.to_string());
                }
            }
        }
        locations
    }

    pub fn len(&self) -> usize {
        self.source.list_routes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn summary(&self, name: String) -> RouteSummary {
        let endpoints = self.source.endpoints(&name);
        RouteSummary {
            distance: self.source.distance_km(&name).unwrap_or(0.0),
            start: endpoints
                .as_ref()
                .and_then(|e| e.start_label().map(str::to_string)),
            end: endpoints
                .as_ref()
                .and_then(|e| e.end_label().map(str::to_string)),
            points: self.source.geometry(&name).map_or(0, |g| g.len()),
            name,
        }
    }
}

impl std::fmt::Debug for RouteCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteCatalog")
            .field("routes", &self.source.list_routes())
            .finish()
    }
}
