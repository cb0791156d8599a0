//! API handlers.
//!
//! Locations are accepted as `"lat,lng"` or free text; free text is
//! geocoded before routing.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::geo::{Coordinate, Profile, Route};
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::refinement::{ExclusionZone, ProgressEvent, RefinementRequest, SessionRecord};
use crate::services::{ObstacleDetector, RoutingService};
use crate::survey::ObstacleReport;

#[derive(Serialize)]
pub struct HealthStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub detector: &'static str,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "ok",
        detector: state.engine.detector().name(),
    })
}

#[derive(Debug, Deserialize)]
pub struct RouteBody {
    pub origin: String,
    pub destination: String,
    #[serde(default)]
    pub profile: Profile,
    /// `"lat,lng,radius"` entries.
    #[serde(default)]
    pub block_areas: Vec<String>,
}

pub async fn route(
    State(state): State<AppState>,
    Json(body): Json<RouteBody>,
) -> Result<Json<Route>, ApiError> {
    let zones = body
        .block_areas
        .iter()
        .map(|area| {
            area.parse::<ExclusionZone>()
                .map_err(|e| ApiError::BadRequest(format!("invalid block area {:?}: {}", area, e)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let (origin, destination) = resolve_endpoints(&state, &body.origin, &body.destination).await?;
    let route = state
        .engine
        .routing()
        .compute_route(origin, destination, body.profile, &zones)
        .await?;
    Ok(Json(route))
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeQuery {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub location: Coordinate,
    pub evidence_ref: Option<String>,
    pub obstacle_types: BTreeSet<String>,
}

pub async fn analyze(
    State(state): State<AppState>,
    Query(query): Query<AnalyzeQuery>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let location = Coordinate::new(query.lat, query.lng);
    if !location.is_valid() {
        return Err(ApiError::BadRequest(format!("coordinate out of range: {}", location)));
    }

    let detection = state.engine.detector().detect(location).await?;
    Ok(Json(AnalyzeResponse {
        location,
        evidence_ref: detection.evidence_ref,
        obstacle_types: detection.obstacle_types,
    }))
}

#[derive(Debug, Deserialize)]
pub struct SurveyBody {
    pub route: Route,
}

#[derive(Debug, Serialize)]
pub struct SurveyResponse {
    pub obstacle_count: usize,
    pub obstacles: Vec<ObstacleReport>,
}

pub async fn survey(
    State(state): State<AppState>,
    Json(body): Json<SurveyBody>,
) -> Result<Json<SurveyResponse>, ApiError> {
    if body.route.is_empty() {
        return Err(ApiError::BadRequest("route has no coordinates".to_string()));
    }
    let obstacles = state.engine.survey(&body.route).await;
    Ok(Json(SurveyResponse {
        obstacle_count: obstacles.len(),
        obstacles,
    }))
}

#[derive(Debug, Deserialize)]
pub struct RefineBody {
    pub origin: String,
    pub destination: String,
    #[serde(default)]
    pub profile: Profile,
    /// Route to start from. Computed and surveyed when absent.
    #[serde(default)]
    pub route: Option<Route>,
    /// Survey of `route`. Ignored when `route` is absent.
    #[serde(default)]
    pub obstacles: Vec<ObstacleReport>,
    #[serde(default)]
    pub zones: Vec<ExclusionZone>,
}

/// Run a refinement session.
///
/// The session runs in its own task and stores its record even when the
/// client goes away before it finishes.
pub async fn refine(
    State(state): State<AppState>,
    Json(body): Json<RefineBody>,
) -> Result<Json<SessionRecord>, ApiError> {
    let record = tokio::spawn(run_session(state, body))
        .await
        .map_err(|e| ApiError::Internal(format!("refinement task failed: {}", e)))??;
    Ok(Json(record))
}

async fn run_session(state: AppState, body: RefineBody) -> Result<SessionRecord, ApiError> {
    let (origin, destination) = resolve_endpoints(&state, &body.origin, &body.destination).await?;

    let (initial_route, initial_obstacles) = match body.route {
        Some(route) if route.is_empty() => {
            return Err(ApiError::BadRequest("route has no coordinates".to_string()));
        }
        Some(route) => (route, body.obstacles),
        None => {
            let route = state
                .engine
                .routing()
                .compute_route(origin, destination, body.profile, &body.zones)
                .await?;
            let obstacles = state.engine.survey(&route).await;
            (route, obstacles)
        }
    };

    let request = RefinementRequest {
        origin,
        destination,
        profile: body.profile,
        initial_route,
        initial_obstacles,
        initial_zones: body.zones,
    };

    let (tx, rx) = mpsc::unbounded_channel();
    let session = async {
        let result = state.engine.refine(request, Some(&tx)).await;
        drop(tx);
        result
    };
    let (result, ()) = tokio::join!(session, log_progress(rx));

    Ok(state.sessions.insert(origin, destination, body.profile, result))
}

async fn log_progress(mut rx: mpsc::UnboundedReceiver<ProgressEvent>) {
    while let Some(event) = rx.recv().await {
        match event {
            ProgressEvent::Status { attempt, message } => {
                tracing::debug!(attempt, message = %message, "Refinement status");
            }
            ProgressEvent::RouteUpdated { attempt, route } => {
                tracing::debug!(attempt, points = route.len(), "Refinement route updated");
            }
            ProgressEvent::ObstacleCount { attempt, current, best } => {
                tracing::debug!(attempt, current, best, "Refinement obstacle count");
            }
        }
    }
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionRecord>, ApiError> {
    state
        .sessions
        .get(&id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("refinement session {} not found", id)))
}

async fn resolve_endpoints(
    state: &AppState,
    origin: &str,
    destination: &str,
) -> Result<(Coordinate, Coordinate), ApiError> {
    let routing = state.engine.routing();
    let (origin, destination) = tokio::try_join!(routing.resolve(origin), routing.resolve(destination))?;
    Ok((origin, destination))
}
