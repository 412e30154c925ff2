//! End-to-end planning flows through `PlanningSession`.
//!
//! Each test drives the direct, static and real-time steps over the shared
//! Berkeley → Santa Clara corridor (east 50 km, bay 60 km, hills 70 km).

mod common;

use common::*;
use roadsage::catalog::RouteCatalog;
use roadsage::conditions::{
    ConditionProviders, ConditionTable, IncidentStatus, InMemoryLiveTraffic, ReferenceIssues,
    RouteIssue, WeatherStatus,
};
use roadsage::planner::{PlannerNode, PlannerSettings, PlanningSession, PlanningState, RoutePlanner};
use std::sync::Arc;

fn reference() -> ReferenceIssues {
    let mut reference = ReferenceIssues::default();
    reference.weather.insert(EAST.to_string(), WeatherStatus::Flood);
    reference.incidents.insert(BAY.to_string(), IncidentStatus::Maintenance);
    reference
}

/// Runs the direct and static steps so the next tick is real-time.
async fn session_in_live_mode(planner: Arc<RoutePlanner>) -> PlanningSession {
    let mut session = PlanningSession::new(planner, BERKELEY, SANTA_CLARA).unwrap();
    session.tick().await.unwrap();
    session.tick().await.unwrap();
    assert_eq!(
        session.state().unwrap().next_node(),
        PlannerNode::Realtime
    );
    session
}

fn assert_state_invariants(state: &PlanningState) {
    assert!(state
        .blocked_routes
        .intersection(&state.blocked_routes_invalid)
        .next()
        .is_none());
    if let Some(name) = state.optimal_route_name() {
        assert!(!state.no_fly_list.iter().any(|n| n == name));
    }
}

// =============================================================================
// Direct and Static Steps
// =============================================================================

#[tokio::test]
async fn test_direct_step_picks_shortest_route() {
    let (planner, _live) = live_planner(ReferenceIssues::default());
    let mut session = PlanningSession::new(planner, BERKELEY, SANTA_CLARA).unwrap();

    let state = session.tick().await.unwrap();
    assert_eq!(state.direct_route.as_ref().unwrap().name, EAST);
    assert_eq!(state.optimal_route_name(), Some(EAST));
    assert_eq!(state.static_optimizers.len(), 3);
    assert_eq!(state.next_data_source(), "Historical Traffic Trends");
}

#[tokio::test]
async fn test_direct_step_matches_waypoint_names() {
    let (planner, _live) = live_planner(ReferenceIssues::default());
    let mut session = PlanningSession::new(planner, "Berkeley", "Santa Clara").unwrap();

    let state = session.tick().await.unwrap();
    assert_eq!(state.optimal_route_name(), Some(EAST));
}

#[tokio::test]
async fn test_ignored_routes_never_offered() {
    let live = Arc::new(InMemoryLiveTraffic::default());
    let settings = PlannerSettings {
        ignored_routes: vec![EAST.to_string()],
        ..PlannerSettings::default()
    };
    let planner = make_planner(
        ConditionProviders::empty().with_live_traffic(live),
        ReferenceIssues::default(),
        settings,
    );
    let mut session = PlanningSession::new(planner, BERKELEY, SANTA_CLARA).unwrap();

    let state = session.tick().await.unwrap();
    assert_eq!(state.optimal_route_name(), Some(BAY));
    assert_eq!(state.no_fly_list, vec![EAST.to_string()]);
}

#[tokio::test]
async fn test_unknown_locations_retry_direct_step() {
    let (planner, _live) = live_planner(ReferenceIssues::default());
    let mut session = PlanningSession::new(planner, BERKELEY, "Reno, Nevada").unwrap();

    let state = session.tick().await.unwrap();
    assert!(state.direct_route.is_none());
    assert_eq!(state.next_node(), PlannerNode::Direct);
    assert_eq!(
        state.issue_summary().as_deref(),
        Some("Sorry, No Optimal Route Found!")
    );
}

#[tokio::test]
async fn test_static_conditions_chain_reroutes() {
    let weather = ConditionTable::weather_reader(
        format!(
            "latitude,longitude,condition,temperature,visibility\n{},{},fog,11.0,0.3\n",
            EAST_VIA.0, EAST_VIA.1
        )
        .as_bytes(),
        0.005,
    )
    .unwrap();
    let events = ConditionTable::planned_events_reader(
        format!(
            "latitude,longitude,traffic_impact,event_name\n{},{},Severe,Harbor Marathon\n",
            BAY_VIA.0, BAY_VIA.1
        )
        .as_bytes(),
        0.01,
    )
    .unwrap();

    let mut providers = ConditionProviders::empty();
    providers.weather = Arc::new(weather);
    providers.planned_events = Arc::new(events);
    let planner = make_planner(providers, ReferenceIssues::default(), PlannerSettings::default());

    let mut session = PlanningSession::new(planner, BERKELEY, SANTA_CLARA).unwrap();
    session.tick().await.unwrap();
    let state = session.tick().await.unwrap();

    // Weather moves the plan off east, the event then moves it off bay
    assert_eq!(state.optimal_route_name(), Some(HILLS));
    assert_eq!(state.no_fly_list, vec![EAST.to_string(), BAY.to_string()]);
    assert!(state.static_optimizers.is_empty());
    assert_eq!(
        state.optimal_route.as_ref().unwrap().issue,
        Some(RouteIssue::PlannedEvent {
            congestion: roadsage::conditions::CongestionLevel::Severe,
            event_name: "Harbor Marathon".to_string(),
        })
    );
    assert_eq!(
        state.issue_summary().as_deref(),
        Some("planned event 'Harbor Marathon' with expected Severe traffic congestion on the route.")
    );
    assert_state_invariants(state);
}

#[tokio::test]
async fn test_static_issue_survives_clean_live_tick() {
    let weather = ConditionTable::weather_reader(
        format!(
            "latitude,longitude,condition,temperature,visibility\n{},{},rain,9.0,2.0\n",
            EAST_VIA.0, EAST_VIA.1
        )
        .as_bytes(),
        0.005,
    )
    .unwrap();
    let mut providers = ConditionProviders::empty();
    providers.weather = Arc::new(weather);
    let planner = make_planner(providers, ReferenceIssues::default(), PlannerSettings::default());

    let mut session = session_in_live_mode(planner).await;
    let state = session.tick().await.unwrap();

    assert_eq!(state.optimal_route_name(), Some(BAY));
    assert_eq!(
        state.issue_summary().as_deref(),
        Some("'rain' weather condition on the route.")
    );
}

// =============================================================================
// Real-Time Step
// =============================================================================

#[tokio::test]
async fn test_clean_snapshot_keeps_direct_route() {
    let (planner, live) = live_planner(reference());
    live.set(vec![make_live(EAST_VIA, "Mission & 5th", 3)]);
    let mut session = session_in_live_mode(planner).await;

    let state = session.tick().await.unwrap();
    assert_eq!(state.optimal_route_name(), Some(EAST));
    assert!(!state.is_sub_optimal);
    assert!(state.blocked_routes.is_empty());
    assert_eq!(state.all_live_traffic.len(), 1);
    assert!(state.issue_summary().is_none());
}

#[tokio::test]
async fn test_congestion_moves_to_next_clean_route() {
    let (planner, live) = live_planner(reference());
    live.set(vec![make_live(EAST_VIA, "Mission & 5th", 9)]);
    let mut session = session_in_live_mode(planner).await;

    let state = session.tick().await.unwrap();
    assert_eq!(state.optimal_route_name(), Some(BAY));
    assert!(!state.is_sub_optimal);
    let summary = state.live_traffic.as_ref().unwrap();
    assert_eq!(summary.route, EAST);
    assert_eq!(summary.density, 9);
    assert_eq!(
        state.issue_summary().as_deref(),
        Some("high traffic density of 9 at Mission & 5th")
    );
    assert_eq!(session.history().len(), 1);
}

#[tokio::test]
async fn test_all_routes_congested_picks_least_dense() {
    let (planner, live) = live_planner(reference());
    live.set(vec![
        make_live(EAST_VIA, "East Gate", 9),
        make_live(BAY_VIA, "Bay Bridge Toll", 7),
        make_live(HILLS_VIA, "Hills Summit", 8),
    ]);
    let mut session = session_in_live_mode(planner).await;

    let state = session.tick().await.unwrap();
    assert_eq!(state.optimal_route_name(), Some(BAY));
    assert!(state.is_sub_optimal);
    assert!(!state.is_unique_route);
    assert!(state
        .issue_summary()
        .unwrap()
        .starts_with("Sub-optimal route found: high traffic density"));
    assert_eq!(session.history().len(), 3);
    assert_state_invariants(session.state().unwrap());
}

#[tokio::test]
async fn test_confirmed_issue_blocks_route() {
    let (planner, live) = live_planner(reference());
    let mut flood = make_live(EAST_VIA, "East Gate", 2);
    flood.weather_status = Some(WeatherStatus::Flood);
    live.set(vec![flood]);
    let mut session = session_in_live_mode(planner).await;

    let state = session.tick().await.unwrap();
    assert_eq!(state.optimal_route_name(), Some(BAY));
    assert!(state.blocked_routes.contains(EAST));
    assert!(state.blocked_routes_invalid.is_empty());
    assert_state_invariants(state);
}

#[tokio::test]
async fn test_unconfirmed_issue_blocks_route_as_invalid() {
    let (planner, live) = live_planner(reference());
    let mut crash = make_live(EAST_VIA, "East Gate", 2);
    crash.incident_status = Some(IncidentStatus::Accident);
    live.set(vec![crash]);
    let mut session = session_in_live_mode(planner).await;

    let state = session.tick().await.unwrap();
    assert_eq!(state.optimal_route_name(), Some(BAY));
    assert!(state.blocked_routes.is_empty());
    assert!(state.blocked_routes_invalid.contains(EAST));
}

#[tokio::test]
async fn test_every_route_blocked_leaves_no_route() {
    let (planner, live) = live_planner(reference());
    let mut flood = make_live(EAST_VIA, "East Gate", 1);
    flood.weather_status = Some(WeatherStatus::Flood);
    let mut works = make_live(BAY_VIA, "Bay Bridge Toll", 1);
    works.incident_status = Some(IncidentStatus::Maintenance);
    let mut block = make_live(HILLS_VIA, "Hills Summit", 1);
    block.incident_status = Some(IncidentStatus::Roadblock);
    live.set(vec![flood, works, block]);
    let mut session = session_in_live_mode(planner).await;

    let state = session.tick().await.unwrap();
    assert!(state.optimal_route.is_none());
    assert!(!state.is_unique_route);
    assert_eq!(state.blocked_routes.len(), 2);
    assert!(state.blocked_routes_invalid.contains(HILLS));
    assert_eq!(
        state.issue_summary().as_deref(),
        Some("Sorry, No Optimal Route Found!")
    );
    assert_state_invariants(state);
}

#[tokio::test]
async fn test_blocked_route_recovers_when_issue_clears() {
    let (planner, live) = live_planner(reference());
    let mut flood = make_live(EAST_VIA, "East Gate", 2);
    flood.weather_status = Some(WeatherStatus::Flood);
    live.set(vec![flood]);
    let mut session = session_in_live_mode(planner).await;

    let state = session.tick().await.unwrap();
    assert!(state.blocked_routes.contains(EAST));

    live.set(vec![make_live(EAST_VIA, "East Gate", 2)]);
    let state = session.tick().await.unwrap();
    assert_eq!(state.optimal_route_name(), Some(EAST));
    assert!(state.blocked_routes.is_empty());
    assert_eq!(session.ticks(), 4);
}

#[tokio::test]
async fn test_single_route_with_issue_is_unique() {
    let (planner, live) = live_planner(ReferenceIssues::default());
    let mut crash = make_live((37.84, -122.27), "Ashby Ave", 1);
    crash.incident_status = Some(IncidentStatus::Crowding);
    live.set(vec![crash]);

    let mut session = PlanningSession::new(planner, BERKELEY, OAKLAND).unwrap();
    session.tick().await.unwrap();
    session.tick().await.unwrap();
    let state = session.tick().await.unwrap();

    assert!(state.is_unique_route);
    assert_eq!(state.optimal_route_name(), Some(OAKLAND_ROUTE));
    assert!(state.live_traffic.is_none());
    assert!(state
        .issue_summary()
        .unwrap()
        .starts_with("ONLY ONE possible route exists"));
}

// =============================================================================
// Orchestration
// =============================================================================

#[tokio::test]
async fn test_prior_state_for_other_pair_restarts() {
    let (planner, _live) = live_planner(ReferenceIssues::default());
    let mut history = planner.new_history();

    let first = planner
        .plan(BERKELEY, SANTA_CLARA, None, &mut history)
        .await
        .unwrap();
    assert_eq!(first.next_node(), PlannerNode::Static);

    let restarted = planner
        .plan(BERKELEY, OAKLAND, Some(first), &mut history)
        .await
        .unwrap();
    assert_eq!(restarted.destination, OAKLAND);
    assert_eq!(restarted.optimal_route_name(), Some(OAKLAND_ROUTE));
    assert_eq!(restarted.next_node(), PlannerNode::Static);
}

#[tokio::test]
async fn test_invalid_requests_rejected() {
    let (planner, _live) = live_planner(ReferenceIssues::default());
    let mut history = planner.new_history();

    assert!(planner.plan("", SANTA_CLARA, None, &mut history).await.is_err());
    assert!(planner
        .plan(BERKELEY, BERKELEY, None, &mut history)
        .await
        .is_err());
    assert!(PlanningSession::new(planner, BERKELEY, "").is_err());
}

#[tokio::test]
async fn test_catalog_loaded_from_directory_plans_like_in_memory() {
    let dir = tempfile::tempdir().unwrap();
    write_route_dir(dir.path(), &corridor_routes());
    let catalog = RouteCatalog::load_dir(dir.path()).unwrap();
    assert_eq!(catalog.len(), 4);

    let planner = Arc::new(RoutePlanner::new(
        catalog,
        ConditionProviders::empty(),
        ReferenceIssues::default(),
        PlannerSettings::default(),
    ));
    let mut session = PlanningSession::new(planner, BERKELEY, SANTA_CLARA).unwrap();
    let state = session.tick().await.unwrap();
    assert_eq!(state.optimal_route_name(), Some(EAST));
}
