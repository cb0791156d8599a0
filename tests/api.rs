//! End-to-end API tests: mock routing service, mock detector.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::time::Duration;
use tower::ServiceExt;

use route_refiner::http::HttpServer;
use route_refiner::lifecycle::Shutdown;

mod common;

async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

async fn app(replies: Vec<(u16, Value)>, key_env: &str, probability: f64) -> (Router, common::MockOrs) {
    let ors = common::start_mock_ors(replies).await;
    let mut config = common::test_config(&ors, key_env, probability);
    config.refinement.max_attempts = 2;
    let server = HttpServer::new(config, Shutdown::new()).unwrap();
    (server.router(), ors)
}

#[tokio::test]
async fn test_health() {
    let (app, _ors) = app(vec![common::directions_ok(10.0)], "REFINER_API_TEST_KEY_HEALTH", 0.0).await;

    let response = app.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let (_, body) = call(&app, get("/health")).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["detector"], "mock");
}

#[tokio::test]
async fn test_route_with_block_areas() {
    let (app, ors) = app(vec![common::directions_ok(10.0)], "REFINER_API_TEST_KEY_ROUTE", 0.0).await;

    let (status, body) = call(
        &app,
        post_json(
            "/api/route",
            json!({
                "origin": "10.0,0.0",
                "destination": "10.0,0.044",
                "profile": "bike",
                "block_areas": ["10.0,0.01,20", "10.0,0.02,20"]
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["coordinates"].as_array().unwrap().len(), common::ROUTE_POINTS);

    let request = &ors.requests()[0];
    assert_eq!(request.profile, "cycling-regular");
    assert_eq!(request.body["options"]["avoid_polygons"]["type"], "MultiPolygon");
}

#[tokio::test]
async fn test_route_rejects_bad_input() {
    let (app, ors) = app(vec![common::directions_ok(10.0)], "REFINER_API_TEST_KEY_BAD", 0.0).await;

    let (status, body) = call(
        &app,
        post_json(
            "/api/route",
            json!({ "origin": "10.0,0.0", "destination": "10.0,0.044", "block_areas": ["10.0,0.01"] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("invalid block area"));

    let (status, _) = call(
        &app,
        post_json("/api/route", json!({ "origin": "Atlantis", "destination": "10.0,0.044" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(
        &app,
        post_json("/api/route", json!({ "origin": "40.4,-3.7", "destination": "-33.8,151.2" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(ors.requests().is_empty());
}

#[tokio::test]
async fn test_route_unavailable_is_not_found() {
    let (app, _ors) = app(vec![common::route_not_found()], "REFINER_API_TEST_KEY_404", 0.0).await;
    let (status, body) = call(
        &app,
        post_json("/api/route", json!({ "origin": "10.0,0.0", "destination": "10.0,0.044" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "route unavailable: Route could not be found");
}

#[tokio::test]
async fn test_analyze_and_survey() {
    let (app, _ors) = app(vec![common::directions_ok(10.0)], "REFINER_API_TEST_KEY_SURVEY", 1.0).await;

    let (status, body) = call(&app, post_json("/api/analyze?lat=37.31&lng=-5.94", Value::Null)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["obstacle_types"], json!(["stairs"]));
    assert_eq!(body["evidence_ref"], Value::Null);

    let (status, _) = call(&app, post_json("/api/analyze?lat=137.0&lng=0.0", Value::Null)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let coordinates: Vec<Value> = (0..common::ROUTE_POINTS)
        .map(|i| json!({ "lat": 10.0, "lng": i as f64 * 0.001 }))
        .collect();
    let (status, body) = call(
        &app,
        post_json("/api/survey", json!({ "route": { "coordinates": coordinates } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["obstacle_count"], 3);
    assert_eq!(body["obstacles"][1]["location"]["lng"], 0.015);
}

#[tokio::test]
async fn test_refine_clear_route_succeeds_without_iterating() {
    let (app, ors) = app(vec![common::directions_ok(10.0)], "REFINER_API_TEST_KEY_CLEAR", 0.0).await;

    let (status, body) = call(
        &app,
        post_json("/api/refine", json!({ "origin": "10.0,0.0", "destination": "10.0,0.044" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["status"], "succeeded");
    assert_eq!(body["result"]["attempts_used"], 0);
    assert_eq!(body["result"]["outcome"]["kind"], "cleared");
    // Only the initial route was requested.
    assert_eq!(ors.requests().len(), 1);
}

#[tokio::test]
async fn test_refine_exhausts_and_is_stored() {
    let (app, ors) = app(vec![common::directions_ok(10.0)], "REFINER_API_TEST_KEY_EXHAUST", 1.0).await;

    let (status, record) = call(
        &app,
        post_json(
            "/api/refine",
            json!({ "origin": "10.0,0.0", "destination": "10.0,0.044", "profile": "wheelchair" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let result = &record["result"];
    assert_eq!(result["status"], "exhausted");
    assert_eq!(result["attempts_used"], 2);
    assert_eq!(result["initial_obstacle_count"], 3);
    assert_eq!(result["outcome"], json!({ "kind": "no_improvement", "count": 3 }));
    assert_eq!(result["accumulated_zones"].as_array().unwrap().len(), 9);
    assert!(result.get("abort_reason").is_none());
    assert_eq!(ors.requests().len(), 3);

    let id = record["id"].as_str().unwrap();
    let (status, stored) = call(&app, get(&format!("/api/refine/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored, record);

    let (status, _) = call(&app, get(&format!("/api/refine/{}", uuid::Uuid::new_v4()))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_refine_with_supplied_route_and_obstacles() {
    let (app, ors) = app(
        vec![common::directions_ok(10.0), common::route_not_found()],
        "REFINER_API_TEST_KEY_SUPPLIED",
        0.0,
    )
    .await;

    let coordinates: Vec<Value> = (0..common::ROUTE_POINTS)
        .map(|i| json!({ "lat": 10.0, "lng": i as f64 * 0.001 }))
        .collect();
    let (status, record) = call(
        &app,
        post_json(
            "/api/refine",
            json!({
                "origin": "10.0,0.0",
                "destination": "10.0,0.044",
                "route": { "coordinates": coordinates },
                "obstacles": [{ "location": { "lat": 10.0, "lng": 0.015 }, "obstacle_types": ["stairs"] }],
                "zones": [{ "center": { "lat": 10.0, "lng": 0.03 }, "radius_m": 15.0 }]
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let result = &record["result"];
    assert_eq!(result["status"], "succeeded");
    assert_eq!(result["attempts_used"], 1);
    assert_eq!(result["outcome"]["kind"], "cleared");
    assert_eq!(result["final_zones"].as_array().unwrap().len(), 2);

    let requests = ors.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].body["options"]["avoid_polygons"]["type"], "MultiPolygon");
}

#[tokio::test]
async fn test_slow_refinement_outlives_request_timeout() {
    // Each route takes 700 ms, so the session outlasts `request_secs` and
    // hits its own one-second deadline on the third iteration.
    let ors =
        common::start_mock_ors_with_delay(vec![common::directions_ok(10.0)], Duration::from_millis(700))
            .await;
    let mut config = common::test_config(&ors, "REFINER_API_TEST_KEY_DEADLINE", 1.0);
    config.timeouts.request_secs = 1;
    config.refinement.session_deadline_secs = 1;
    let app = HttpServer::new(config, Shutdown::new()).unwrap().router();

    let (status, record) = call(
        &app,
        post_json("/api/refine", json!({ "origin": "10.0,0.0", "destination": "10.0,0.044" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let result = &record["result"];
    assert_eq!(result["status"], "aborted");
    assert_eq!(result["abort_reason"], json!({ "kind": "deadline" }));
    let attempts = result["attempts_used"].as_u64().unwrap();
    assert!((1..5).contains(&attempts), "attempts_used = {}", attempts);
    assert_eq!(result["outcome"], json!({ "kind": "no_improvement", "count": 3 }));
    assert_eq!(
        result["final_route"]["coordinates"].as_array().unwrap().len(),
        common::ROUTE_POINTS
    );
    assert_eq!(ors.requests().len() as u64, attempts + 1);

    let id = record["id"].as_str().unwrap();
    let (status, stored) = call(&app, get(&format!("/api/refine/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored, record);
}

#[tokio::test]
async fn test_slow_route_request_still_times_out() {
    let ors =
        common::start_mock_ors_with_delay(vec![common::directions_ok(10.0)], Duration::from_millis(1500))
            .await;
    let mut config = common::test_config(&ors, "REFINER_API_TEST_KEY_TIMEOUT", 0.0);
    config.timeouts.request_secs = 1;
    let app = HttpServer::new(config, Shutdown::new()).unwrap().router();

    let (status, _) = call(
        &app,
        post_json("/api/route", json!({ "origin": "10.0,0.0", "destination": "10.0,0.044" })),
    )
    .await;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
}

#[tokio::test]
async fn test_graceful_shutdown() {
    let ors = common::start_mock_ors(vec![common::directions_ok(10.0)]).await;
    let config = common::test_config(&ors, "REFINER_API_TEST_KEY_SHUTDOWN", 0.0);
    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, shutdown.clone()).unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(server.run(listener));

    let res = reqwest::get(format!("http://{}/health", addr)).await.unwrap();
    assert_eq!(res.status(), 200);
    drop(res);

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server should stop")
        .unwrap()
        .unwrap();
}
