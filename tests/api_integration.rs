//! HTTP API integration tests.
//!
//! Requests go straight into the router through `tower::Service`.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::*;
use roadsage::conditions::ReferenceIssues;
use std::time::Duration;
use tower::Service;

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

// =============================================================================
// Catalog Endpoints
// =============================================================================

#[tokio::test]
async fn test_health_reports_routes() {
    let (planner, _live) = live_planner(ReferenceIssues::default());
    let (mut app, _state) = create_test_app(planner, Duration::from_secs(60));

    let response = app.call(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["routes"], 4);
    assert_eq!(json["sessions"], 0);
}

#[tokio::test]
async fn test_routes_between_locations_shortest_first() {
    let (planner, _live) = live_planner(ReferenceIssues::default());
    let (mut app, _state) = create_test_app(planner, Duration::from_secs(60));

    let uri = "/v1/routes?source=Berkeley%2C%20California&destination=Santa%20Clara%2C%20California";
    let response = app.call(get(uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response.into_body()).await;
    let names: Vec<&str> = json["routes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec![EAST, BAY, HILLS]);
    assert_eq!(json["routes"][0]["distance_km"], 50.0);
    assert_eq!(json["routes"][0]["start"], BERKELEY);
}

#[tokio::test]
async fn test_routes_without_filter_lists_catalog() {
    let (planner, _live) = live_planner(ReferenceIssues::default());
    let (mut app, _state) = create_test_app(planner, Duration::from_secs(60));

    let response = app.call(get("/v1/routes")).await.unwrap();
    let json = body_json(response.into_body()).await;
    assert_eq!(json["routes"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_routes_with_one_endpoint_is_bad_request() {
    let (planner, _live) = live_planner(ReferenceIssues::default());
    let (mut app, _state) = create_test_app(planner, Duration::from_secs(60));

    let response = app.call(get("/v1/routes?source=Berkeley")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response.into_body()).await;
    assert_eq!(json["error"]["param"], "destination");
    assert_eq!(json["error"]["type"], "invalid_request_error");
}

#[tokio::test]
async fn test_locations_lists_endpoint_labels() {
    let (planner, _live) = live_planner(ReferenceIssues::default());
    let (mut app, _state) = create_test_app(planner, Duration::from_secs(60));

    let response = app.call(get("/v1/locations")).await.unwrap();
    let json = body_json(response.into_body()).await;
    let locations = json["locations"].as_array().unwrap();
    assert_eq!(locations.len(), 3);
    assert!(locations.iter().any(|l| l == OAKLAND));
}

// =============================================================================
// Plan Endpoint
// =============================================================================

#[tokio::test]
async fn test_plan_walks_through_steps() {
    let (planner, live) = live_planner(ReferenceIssues::default());
    live.set(vec![make_live(EAST_VIA, "East Gate", 9)]);
    let (mut app, _state) = create_test_app(planner, Duration::from_secs(60));

    let request = serde_json::json!({"source": BERKELEY, "destination": SANTA_CLARA});
    let response = app.call(post_json("/v1/plan", request)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let direct = body_json(response.into_body()).await;
    assert_eq!(direct["state"]["optimal_route"]["route"]["name"], EAST);
    assert_eq!(direct["next_data_source"], "Historical Traffic Trends");

    let request = serde_json::json!({
        "source": BERKELEY,
        "destination": SANTA_CLARA,
        "state": direct["state"],
    });
    let response = app.call(post_json("/v1/plan", request)).await.unwrap();
    let statically = body_json(response.into_body()).await;
    assert_eq!(statically["next_data_source"], "Real-Time Traffic Scenarios");

    let request = serde_json::json!({
        "source": BERKELEY,
        "destination": SANTA_CLARA,
        "state": statically["state"],
    });
    let response = app.call(post_json("/v1/plan", request)).await.unwrap();
    let live_step = body_json(response.into_body()).await;
    assert_eq!(live_step["state"]["optimal_route"]["route"]["name"], BAY);
    assert_eq!(live_step["issue"], "high traffic density of 9 at East Gate");
}

#[tokio::test]
async fn test_plan_carries_live_history_between_calls() {
    let (planner, live) = live_planner(ReferenceIssues::default());
    live.set(vec![make_live(EAST_VIA, "East Gate", 9)]);
    let (mut app, _state) = create_test_app(planner, Duration::from_secs(60));

    let mut step = serde_json::json!({"state": null, "history": []});
    for _ in 0..3 {
        let request = serde_json::json!({
            "source": BERKELEY,
            "destination": SANTA_CLARA,
            "state": step["state"],
            "history": step["history"],
        });
        let response = app.call(post_json("/v1/plan", request)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        step = body_json(response.into_body()).await;
    }
    let first_live = step["history"].as_array().unwrap();
    assert_eq!(first_live.len(), 1);
    assert_eq!(first_live[0]["route"], EAST);
    assert_eq!(first_live[0]["density"], 9);

    let request = serde_json::json!({
        "source": BERKELEY,
        "destination": SANTA_CLARA,
        "state": step["state"],
        "history": step["history"],
    });
    let response = app.call(post_json("/v1/plan", request)).await.unwrap();
    let carried = body_json(response.into_body()).await;
    assert_eq!(carried["history"].as_array().unwrap().len(), 2);
    assert_eq!(carried["state"]["optimal_route"]["route"]["name"], BAY);

    let request = serde_json::json!({
        "source": BERKELEY,
        "destination": SANTA_CLARA,
        "state": step["state"],
    });
    let response = app.call(post_json("/v1/plan", request)).await.unwrap();
    let fresh = body_json(response.into_body()).await;
    assert_eq!(fresh["history"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_plan_same_locations_is_bad_request() {
    let (planner, _live) = live_planner(ReferenceIssues::default());
    let (mut app, _state) = create_test_app(planner, Duration::from_secs(60));

    let request = serde_json::json!({"source": BERKELEY, "destination": BERKELEY});
    let response = app.call(post_json("/v1/plan", request)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response.into_body()).await;
    assert_eq!(json["error"]["code"], "invalid_request_error");
}

#[tokio::test]
async fn test_plan_malformed_body_is_rejected() {
    let (planner, _live) = live_planner(ReferenceIssues::default());
    let (mut app, _state) = create_test_app(planner, Duration::from_secs(60));

    let request = serde_json::json!({"source": BERKELEY});
    let response = app.call(post_json("/v1/plan", request)).await.unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_plan_unknown_pair_reports_no_route() {
    let (planner, _live) = live_planner(ReferenceIssues::default());
    let (mut app, _state) = create_test_app(planner, Duration::from_secs(60));

    let request = serde_json::json!({"source": BERKELEY, "destination": "Reno, Nevada"});
    let response = app.call(post_json("/v1/plan", request)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response.into_body()).await;
    assert!(json["state"]["optimal_route"].is_null());
    assert_eq!(json["issue"], "Sorry, No Optimal Route Found!");
}

// =============================================================================
// Session Endpoints
// =============================================================================

#[tokio::test]
async fn test_session_lifecycle() {
    let (planner, live) = live_planner(ReferenceIssues::default());
    live.set(vec![make_live(EAST_VIA, "East Gate", 2)]);
    let (mut app, state) = create_test_app(planner, Duration::from_millis(20));

    let request = serde_json::json!({"source": BERKELEY, "destination": SANTA_CLARA});
    let response = app.call(post_json("/v1/sessions", request)).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response.into_body()).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["source"], BERKELEY);

    let uuid = uuid::Uuid::parse_str(&id).unwrap();
    let snapshot = tokio::time::timeout(
        Duration::from_secs(5),
        state.sessions.wait_for_ticks(&uuid, 3),
    )
    .await
    .unwrap()
    .unwrap();
    assert!(snapshot.ticks >= 3);

    let response = app.call(get(&format!("/v1/sessions/{}", id))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let view = body_json(response.into_body()).await;
    assert_eq!(view["id"], id.as_str());
    assert!(view["ticks"].as_u64().unwrap() >= 3);
    assert_eq!(view["report"]["state"]["optimal_route"]["route"]["name"], EAST);
    assert_eq!(view["report"]["next_data_source"], "Real-Time Traffic Scenarios");

    let response = app.call(get("/v1/sessions")).await.unwrap();
    let listed = body_json(response.into_body()).await;
    assert_eq!(listed["sessions"].as_array().unwrap().len(), 1);

    let response = app.call(get("/v1/stats")).await.unwrap();
    let stats = body_json(response.into_body()).await;
    assert_eq!(stats["routes"], 4);
    assert_eq!(stats["sessions"][0]["optimal_route"], EAST);

    let response = app
        .call(delete(&format!("/v1/sessions/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(state.sessions.is_empty());

    let response = app
        .call(delete(&format!("/v1/sessions/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_session_invalid_request_is_bad_request() {
    let (planner, _live) = live_planner(ReferenceIssues::default());
    let (mut app, state) = create_test_app(planner, Duration::from_secs(60));

    let request = serde_json::json!({"source": "", "destination": SANTA_CLARA});
    let response = app.call(post_json("/v1/sessions", request)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(state.sessions.is_empty());
}

#[tokio::test]
async fn test_unknown_session_is_not_found() {
    let (planner, _live) = live_planner(ReferenceIssues::default());
    let (mut app, _state) = create_test_app(planner, Duration::from_secs(60));

    let id = uuid::Uuid::new_v4();
    let response = app.call(get(&format!("/v1/sessions/{}", id))).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response.into_body()).await;
    assert_eq!(json["error"]["code"], "session_not_found");
    assert_eq!(json["error"]["param"], "id");
}

#[tokio::test]
async fn test_malformed_session_id_is_bad_request() {
    let (planner, _live) = live_planner(ReferenceIssues::default());
    let (mut app, _state) = create_test_app(planner, Duration::from_secs(60));

    let response = app.call(get("/v1/sessions/not-a-uuid")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Metrics
// =============================================================================

#[tokio::test]
async fn test_metrics_endpoint_is_prometheus_text() {
    let (planner, _live) = live_planner(ReferenceIssues::default());
    let (mut app, _state) = create_test_app(planner, Duration::from_secs(60));

    let response = app.call(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers().get("content-type").unwrap();
    assert!(content_type.to_str().unwrap().starts_with("text/plain"));
}

#[tokio::test]
async fn test_oversized_plan_body_is_rejected() {
    let (planner, _live) = live_planner(ReferenceIssues::default());
    let (mut app, _state) = create_test_app(planner, Duration::from_secs(60));

    let padding = "x".repeat(2 * 1024 * 1024);
    let body = serde_json::json!({
        "source": BERKELEY,
        "destination": SANTA_CLARA,
        "note": padding,
    })
    .to_string();
    let request = Request::builder()
        .method("POST")
        .uri("/v1/plan")
        .header("content-type", "application/json")
        .header("content-length", body.len())
        .body(Body::from(body))
        .unwrap();

    let response = app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
