//! Service contracts and error definitions.

use std::collections::BTreeSet;
use std::future::Future;

use thiserror::Error;

use crate::geo::{Coordinate, Profile, Route};
use crate::refinement::ExclusionZone;

/// Errors returned by a routing service.
#[derive(Debug, Error)]
pub enum RouteError {
    /// No route satisfies the requested exclusion zones.
    #[error("route unavailable: {0}")]
    Unavailable(String),

    /// Network, timeout or unexpected upstream status.
    #[error("routing transport error: {0}")]
    Transport(String),

    /// The upstream answered but the body could not be understood.
    #[error("invalid routing response: {0}")]
    InvalidResponse(String),

    /// Straight-line distance exceeds the configured maximum.
    #[error("route is too long ({distance_km} km); maximum allowed is {max_km} km")]
    TooLong { distance_km: u64, max_km: u64 },

    /// A location string could not be resolved to a coordinate.
    #[error("geocoding failed: {0}")]
    Geocode(String),

    #[error("API key not set: {0}")]
    MissingApiKey(String),
}

impl RouteError {
    /// `true` when the service is reachable but over-constrained.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, RouteError::Unavailable(_))
    }
}

impl From<reqwest::Error> for RouteError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            RouteError::InvalidResponse(e.to_string())
        } else {
            RouteError::Transport(e.to_string())
        }
    }
}

/// A single-point probe error. Always absorbed by the prober.
#[derive(Debug, Error)]
pub enum DetectionFailure {
    #[error("detection transport error: {0}")]
    Transport(String),

    #[error("detection service error: {0}")]
    Service(String),

    #[error("could not decode detection result: {0}")]
    Decode(String),

    #[error("API key not set: {0}")]
    MissingApiKey(String),
}

impl From<reqwest::Error> for DetectionFailure {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            DetectionFailure::Decode(e.to_string())
        } else {
            DetectionFailure::Transport(e.to_string())
        }
    }
}

/// What the detector saw at one coordinate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Detection {
    pub obstacle_types: BTreeSet<String>,
    /// Opaque locator of the evidence (e.g. image URL).
    pub evidence_ref: Option<String>,
}

impl Detection {
    pub fn clear(evidence_ref: Option<String>) -> Self {
        Self {
            obstacle_types: BTreeSet::new(),
            evidence_ref,
        }
    }

    pub fn with_types<I, S>(types: I, evidence_ref: Option<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            obstacle_types: types.into_iter().map(Into::into).collect(),
            evidence_ref,
        }
    }

    pub fn has_obstacles(&self) -> bool {
        !self.obstacle_types.is_empty()
    }
}

/// External path-finding service.
pub trait RoutingService: Send + Sync {
    fn compute_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        profile: Profile,
        zones: &[ExclusionZone],
    ) -> impl Future<Output = Result<Route, RouteError>> + Send;
}

/// External visual-obstacle detector, keyed by a single coordinate.
pub trait ObstacleDetector: Send + Sync {
    fn detect(
        &self,
        at: Coordinate,
    ) -> impl Future<Output = Result<Detection, DetectionFailure>> + Send;
}

impl<T: RoutingService> RoutingService for std::sync::Arc<T> {
    fn compute_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        profile: Profile,
        zones: &[ExclusionZone],
    ) -> impl Future<Output = Result<Route, RouteError>> + Send {
        (**self).compute_route(origin, destination, profile, zones)
    }
}

impl<T: ObstacleDetector> ObstacleDetector for std::sync::Arc<T> {
    fn detect(
        &self,
        at: Coordinate,
    ) -> impl Future<Output = Result<Detection, DetectionFailure>> + Send {
        (**self).detect(at)
    }
}
