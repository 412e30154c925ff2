//! Shared test utilities for Roadsage integration tests.
//!
//! Builds a small catalog of competing routes between two locations, live
//! traffic records placed on those routes, and planners/routers around them.

#![allow(dead_code)]

use axum::body::Body;
use roadsage::api::{create_router, AppState};
use roadsage::catalog::{RouteCatalog, RouteDefinition, Track, Waypoint};
use roadsage::conditions::{ConditionProviders, InMemoryLiveTraffic, LiveTraffic, ReferenceIssues};
use roadsage::config::RoadsageConfig;
use roadsage::geo::GeoPoint;
use roadsage::planner::{PlannerSettings, RoutePlanner};
use roadsage::session::SessionManager;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

// =============================================================================
// Locations
// =============================================================================

pub const BERKELEY: &str = "Berkeley, California";
pub const SANTA_CLARA: &str = "Santa Clara, California";
pub const OAKLAND: &str = "Oakland, California";

pub const BERKELEY_POINT: (f64, f64) = (37.8715, -122.2730);
pub const SANTA_CLARA_POINT: (f64, f64) = (37.3541, -121.9552);
pub const OAKLAND_POINT: (f64, f64) = (37.8044, -122.2712);

/// Mid-route points, one per corridor route. Shared endpoints are never
/// used for conditions since they lie on every route.
pub const EAST_VIA: (f64, f64) = (37.7000, -122.1000);
pub const BAY_VIA: (f64, f64) = (37.6000, -122.2000);
pub const HILLS_VIA: (f64, f64) = (37.6500, -121.9000);

pub const EAST: &str = "east.json";
pub const BAY: &str = "bay.json";
pub const HILLS: &str = "hills.json";
pub const OAKLAND_ROUTE: &str = "oakland.json";

// =============================================================================
// Route Builders
// =============================================================================

fn waypoint(point: (f64, f64), label: &str) -> Waypoint {
    Waypoint {
        latitude: point.0,
        longitude: point.1,
        name: Some(label.split(',').next().unwrap_or(label).to_string()),
        description: Some(label.to_string()),
    }
}

/// A route between two labelled points passing through `via`.
pub fn make_route(
    name: &str,
    from: (f64, f64, &str),
    to: (f64, f64, &str),
    distance_km: f64,
    via: (f64, f64),
) -> RouteDefinition {
    RouteDefinition {
        name: name.to_string(),
        waypoints: vec![waypoint((from.0, from.1), from.2), waypoint((to.0, to.1), to.2)],
        tracks: vec![Track {
            name: None,
            points: vec![GeoPoint::new(via.0, via.1)],
        }],
        distance_km: Some(distance_km),
    }
}

/// Berkeley → Santa Clara route through `via`.
pub fn corridor_route(name: &str, distance_km: f64, via: (f64, f64)) -> RouteDefinition {
    make_route(
        name,
        (BERKELEY_POINT.0, BERKELEY_POINT.1, BERKELEY),
        (SANTA_CLARA_POINT.0, SANTA_CLARA_POINT.1, SANTA_CLARA),
        distance_km,
        via,
    )
}

/// Three Berkeley → Santa Clara routes (50, 60, 70 km) plus a short
/// Berkeley → Oakland hop.
pub fn corridor_routes() -> Vec<RouteDefinition> {
    vec![
        corridor_route(HILLS, 70.0, HILLS_VIA),
        corridor_route(EAST, 50.0, EAST_VIA),
        corridor_route(BAY, 60.0, BAY_VIA),
        make_route(
            OAKLAND_ROUTE,
            (BERKELEY_POINT.0, BERKELEY_POINT.1, BERKELEY),
            (OAKLAND_POINT.0, OAKLAND_POINT.1, OAKLAND),
            8.0,
            (37.84, -122.27),
        ),
    ]
}

pub fn corridor_catalog() -> RouteCatalog {
    RouteCatalog::from_definitions(corridor_routes()).unwrap()
}

/// Write each route as `<name>` into `dir`.
pub fn write_route_dir(dir: &Path, routes: &[RouteDefinition]) {
    for route in routes {
        let json = serde_json::to_string_pretty(route).unwrap();
        std::fs::write(dir.join(&route.name), json).unwrap();
    }
}

// =============================================================================
// Live Traffic
// =============================================================================

pub fn make_live(point: (f64, f64), name: &str, density: u32) -> LiveTraffic {
    LiveTraffic {
        location: GeoPoint::new(point.0, point.1),
        intersection_name: name.to_string(),
        timestamp: "2025-06-01T08:00:00Z".to_string(),
        density,
        weather_status: None,
        incident_status: None,
        description: None,
    }
}

// =============================================================================
// Planners and Routers
// =============================================================================

pub fn make_planner(
    providers: ConditionProviders,
    reference: ReferenceIssues,
    settings: PlannerSettings,
) -> Arc<RoutePlanner> {
    Arc::new(RoutePlanner::new(
        corridor_catalog(),
        providers,
        reference,
        settings,
    ))
}

/// Planner over the corridor with no static conditions and a settable
/// live feed.
pub fn live_planner(reference: ReferenceIssues) -> (Arc<RoutePlanner>, Arc<InMemoryLiveTraffic>) {
    let live = Arc::new(InMemoryLiveTraffic::default());
    let providers = ConditionProviders::empty().with_live_traffic(live.clone());
    (
        make_planner(providers, reference, PlannerSettings::default()),
        live,
    )
}

pub fn create_test_app(planner: Arc<RoutePlanner>, tick: Duration) -> (axum::Router, Arc<AppState>) {
    let sessions = Arc::new(SessionManager::new(Arc::clone(&planner), tick));
    let state = Arc::new(AppState::new(
        Arc::new(RoadsageConfig::default()),
        planner,
        sessions,
    ));
    (create_router(Arc::clone(&state)), state)
}

pub async fn body_json(body: Body) -> serde_json::Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
