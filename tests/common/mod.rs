//! Shared utilities for integration testing.

#![allow(dead_code)]

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

use route_refiner::config::{DetectionMode, RefinerConfig, RoutingServiceConfig};

/// Points in every generated route; the default sampler probes 0, 15 and 30.
pub const ROUTE_POINTS: usize = 45;

pub const TEST_KEY: &str = "test-key";

/// Geocoder hit for the text "Seville".
pub const SEVILLE: (f64, f64) = (37.3891, -5.9845);

/// A directions request as seen by the mock routing service.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub profile: String,
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct OrsState {
    replies: Arc<Vec<(u16, Value)>>,
    calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    delay: Duration,
}

/// Mock OpenRouteService. Directions replies are served in order and the
/// last one repeats once the script runs out.
pub struct MockOrs {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockOrs {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Client config pointing at this mock.
    pub fn routing_config(&self) -> RoutingServiceConfig {
        RoutingServiceConfig {
            base_url: self.base_url(),
            timeout_secs: 5,
            ..RoutingServiceConfig::default()
        }
    }
}

pub async fn start_mock_ors(replies: Vec<(u16, Value)>) -> MockOrs {
    start_mock_ors_with_delay(replies, Duration::ZERO).await
}

/// Like `start_mock_ors`, but every directions reply waits `delay` first.
pub async fn start_mock_ors_with_delay(replies: Vec<(u16, Value)>, delay: Duration) -> MockOrs {
    assert!(!replies.is_empty(), "mock needs at least one reply");
    let requests = Arc::new(Mutex::new(Vec::new()));
    let state = OrsState {
        replies: Arc::new(replies),
        calls: Arc::new(AtomicUsize::new(0)),
        requests: requests.clone(),
        delay,
    };

    let app = Router::new()
        .route("/v2/directions/{profile}/geojson", post(directions))
        .route("/geocode/search", get(geocode))
        .with_state(state);

    MockOrs {
        addr: serve(app).await,
        requests,
    }
}

async fn directions(
    State(state): State<OrsState>,
    Path(profile): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.requests.lock().unwrap().push(RecordedRequest {
        profile,
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });

    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }

    let call = state.calls.fetch_add(1, Ordering::SeqCst);
    let (status, reply) = &state.replies[call.min(state.replies.len() - 1)];
    (StatusCode::from_u16(*status).unwrap(), Json(reply.clone()))
}

async fn geocode(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let hit = params.get("text").map(String::as_str) == Some("Seville")
        && params.get("api_key").map(String::as_str) == Some(TEST_KEY);
    if hit {
        Json(json!({
            "features": [{ "geometry": { "type": "Point", "coordinates": [SEVILLE.1, SEVILLE.0] } }]
        }))
    } else {
        Json(json!({ "features": [] }))
    }
}

/// Serve `app` on an ephemeral local port.
pub async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// A successful GeoJSON directions reply along latitude `lat`.
pub fn directions_ok(lat: f64) -> (u16, Value) {
    let coordinates: Vec<[f64; 3]> = (0..ROUTE_POINTS)
        .map(|i| [i as f64 * 0.001, lat, 5.0])
        .collect();
    let reply = json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "geometry": { "type": "LineString", "coordinates": coordinates },
            "properties": {
                "summary": { "distance": 3900.0, "duration": 2800.0 },
                "segments": [{ "steps": [
                    { "instruction": "Head east", "distance": 3900.0, "duration": 2800.0 },
                    { "instruction": "Arrive at your destination", "distance": 0.0, "duration": 0.0 }
                ]}]
            }
        }]
    });
    (200, reply)
}

/// ORS "route not found" reply.
pub fn route_not_found() -> (u16, Value) {
    (
        404,
        json!({ "error": { "code": 2009, "message": "Route could not be found" } }),
    )
}

/// Server config against `ors`, probing with the mock detector.
///
/// The routing key is read from `key_env`, which this sets.
pub fn test_config(ors: &MockOrs, key_env: &str, obstacle_probability: f64) -> RefinerConfig {
    std::env::set_var(key_env, TEST_KEY);

    let mut config = RefinerConfig::default();
    config.routing = ors.routing_config();
    config.routing.api_key_env = key_env.to_string();
    config.detection.mode = DetectionMode::Mock;
    config.detection.mock_obstacle_probability = obstacle_probability;
    config
}
