//! OpenRouteService routing and geocoding client.
//!
//! # Responsibilities
//! - Map travel profiles to ORS profiles
//! - Translate exclusion zones into `avoid_polygons`
//! - Classify upstream failures (over-constrained vs. transport)
//! - Resolve free-text locations through the geocoder

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;

use crate::config::RoutingServiceConfig;
use crate::geo::coordinate::METERS_PER_DEGREE;
use crate::geo::{Coordinate, Instruction, Profile, Route};
use crate::refinement::ExclusionZone;
use crate::services::types::{RouteError, RoutingService};

/// ORS error codes meaning "no route under these constraints".
const UNAVAILABLE_CODES: [u64; 3] = [2004, 2009, 2010];

/// ORS profile name for a travel profile.
pub fn ors_profile(profile: Profile) -> &'static str {
    match profile {
        Profile::Foot => "foot-walking",
        Profile::Car => "driving-car",
        Profile::Bike => "cycling-regular",
        Profile::Wheelchair => "wheelchair",
    }
}

/// Closed square ring (GeoJSON order) approximating a zone.
fn zone_ring(zone: &ExclusionZone) -> Vec<[f64; 2]> {
    let offset = zone.radius_m / METERS_PER_DEGREE;
    let Coordinate { lat, lng } = zone.center;
    vec![
        [lng - offset, lat - offset],
        [lng + offset, lat - offset],
        [lng + offset, lat + offset],
        [lng - offset, lat + offset],
        [lng - offset, lat - offset],
    ]
}

/// `avoid_polygons` option for a set of zones, `None` when there are none.
pub fn avoid_polygons(zones: &[ExclusionZone]) -> Option<Value> {
    match zones {
        [] => None,
        [zone] => Some(json!({
            "type": "Polygon",
            "coordinates": [zone_ring(zone)],
        })),
        many => Some(json!({
            "type": "MultiPolygon",
            "coordinates": many.iter().map(|z| vec![zone_ring(z)]).collect::<Vec<_>>(),
        })),
    }
}

/// Request body for the directions endpoint.
pub fn directions_body(origin: Coordinate, destination: Coordinate, zones: &[ExclusionZone]) -> Value {
    let mut body = json!({
        "coordinates": [origin.to_lng_lat(), destination.to_lng_lat()],
        "elevation": "true",
        "instructions": "true",
        "preference": "recommended",
    });
    if let Some(polygons) = avoid_polygons(zones) {
        body["options"] = json!({ "avoid_polygons": polygons });
    }
    body
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: Geometry,
    #[serde(default)]
    properties: Properties,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    coordinates: Vec<Vec<f64>>,
}

#[derive(Debug, Default, Deserialize)]
struct Properties {
    #[serde(default)]
    summary: Summary,
    #[serde(default)]
    segments: Vec<Segment>,
}

#[derive(Debug, Default, Deserialize)]
struct Summary {
    #[serde(default)]
    distance: f64,
    #[serde(default)]
    duration: f64,
}

#[derive(Debug, Deserialize)]
struct Segment {
    #[serde(default)]
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
struct Step {
    #[serde(default)]
    instruction: String,
    #[serde(default)]
    distance: f64,
    #[serde(default)]
    duration: f64,
}

/// Convert a GeoJSON directions response into a `Route`.
pub fn parse_directions(body: &str) -> Result<Route, RouteError> {
    let collection: FeatureCollection =
        serde_json::from_str(body).map_err(|e| RouteError::InvalidResponse(e.to_string()))?;
    let feature = collection
        .features
        .into_iter()
        .next()
        .ok_or_else(|| RouteError::InvalidResponse("no features in response".to_string()))?;

    let coordinates = feature
        .geometry
        .coordinates
        .iter()
        .map(|position| Coordinate::from_lng_lat(position))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| RouteError::InvalidResponse("malformed position".to_string()))?;
    if coordinates.is_empty() {
        return Err(RouteError::InvalidResponse("empty route geometry".to_string()));
    }

    let instructions = feature
        .properties
        .segments
        .into_iter()
        .flat_map(|segment| segment.steps)
        .map(|step| Instruction {
            text: step.instruction,
            distance_m: step.distance,
            duration_s: step.duration,
        })
        .collect();

    Ok(Route {
        coordinates,
        instructions,
        distance_m: feature.properties.summary.distance,
        duration_s: feature.properties.summary.duration,
    })
}

/// Map a non-success directions response to an error.
pub fn classify_failure(status: StatusCode, body: &str) -> RouteError {
    let error = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").cloned());
    let code = error.as_ref().and_then(|e| e.get("code")).and_then(Value::as_u64);
    let message = error
        .as_ref()
        .and_then(|e| e.get("message").and_then(Value::as_str).or_else(|| e.as_str()))
        .unwrap_or(body)
        .to_string();

    let unavailable = status == StatusCode::NOT_FOUND
        || code.is_some_and(|c| UNAVAILABLE_CODES.contains(&c));

    if unavailable {
        RouteError::Unavailable(message)
    } else {
        RouteError::Transport(format!("HTTP {}: {}", status.as_u16(), message))
    }
}

/// HTTP client for OpenRouteService.
#[derive(Clone)]
pub struct OpenRouteClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    max_distance_km: u64,
}

impl OpenRouteClient {
    /// Create a client, reading the API key from the configured variable.
    pub fn from_config(config: &RoutingServiceConfig) -> Result<Self, RouteError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| RouteError::MissingApiKey(config.api_key_env.clone()))?;
        Self::new(config, api_key)
    }

    pub fn new(config: &RoutingServiceConfig, api_key: String) -> Result<Self, RouteError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| RouteError::Transport(format!("invalid base URL '{}': {}", config.base_url, e)))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            api_key,
            max_distance_km: config.max_distance_km,
        })
    }

    /// Reject trips the service cannot route anyway.
    pub fn check_distance(&self, origin: Coordinate, destination: Coordinate) -> Result<(), RouteError> {
        let distance_km = (origin.haversine_m(&destination) / 1000.0) as u64;
        if distance_km > self.max_distance_km {
            return Err(RouteError::TooLong {
                distance_km,
                max_km: self.max_distance_km,
            });
        }
        Ok(())
    }

    /// Geocode free text to its best match.
    pub async fn geocode(&self, query: &str) -> Result<Coordinate, RouteError> {
        let response = self
            .client
            .get(format!("{}/geocode/search", self.base_url))
            .query(&[("api_key", self.api_key.as_str()), ("text", query), ("size", "1")])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(RouteError::Geocode(format!("HTTP {}: {}", status.as_u16(), body)));
        }

        let value: Value = serde_json::from_str(&body).map_err(|e| RouteError::Geocode(e.to_string()))?;
        let position: Option<Vec<f64>> = value
            .pointer("/features/0/geometry/coordinates")
            .and_then(|c| serde_json::from_value(c.clone()).ok());

        position
            .as_deref()
            .and_then(Coordinate::from_lng_lat)
            .ok_or_else(|| RouteError::Geocode(format!("no results found for address: {}", query)))
    }

    /// Use `"lat,lng"` verbatim, geocode anything else.
    pub async fn resolve(&self, location: &str) -> Result<Coordinate, RouteError> {
        match location.parse::<Coordinate>() {
            Ok(coord) => Ok(coord),
            Err(_) => {
                let coord = self.geocode(location).await?;
                tracing::debug!(query = %location, resolved = %coord, "Location geocoded");
                Ok(coord)
            }
        }
    }
}

impl RoutingService for OpenRouteClient {
    async fn compute_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        profile: Profile,
        zones: &[ExclusionZone],
    ) -> Result<Route, RouteError> {
        self.check_distance(origin, destination)?;

        let url = format!("{}/v2/directions/{}/geojson", self.base_url, ors_profile(profile));
        tracing::debug!(url = %url, zones = zones.len(), "Calling routing service");

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, &self.api_key)
            .json(&directions_body(origin, destination, zones))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(classify_failure(status, &body));
        }
        parse_directions(&body)
    }
}

impl std::fmt::Debug for OpenRouteClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenRouteClient")
            .field("base_url", &self.base_url)
            .field("max_distance_km", &self.max_distance_km)
            .finish()
    }
}
