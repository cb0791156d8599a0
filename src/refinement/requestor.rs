//! Route requests parameterized by the session's exclusion zones.

use std::time::Instant;

use crate::geo::{Coordinate, Profile, Route};
use crate::observability::metrics;
use crate::refinement::ExclusionSet;
use crate::services::{RouteError, RoutingService};

/// Fixed trip (origin, destination, profile) against one routing service.
#[derive(Debug)]
pub struct RouteRequestor<'a, R> {
    service: &'a R,
    origin: Coordinate,
    destination: Coordinate,
    profile: Profile,
}

impl<'a, R: RoutingService> RouteRequestor<'a, R> {
    pub fn new(service: &'a R, origin: Coordinate, destination: Coordinate, profile: Profile) -> Self {
        Self {
            service,
            origin,
            destination,
            profile,
        }
    }

    /// Request a route avoiding every zone in `zones`.
    pub async fn request(&self, zones: &ExclusionSet) -> Result<Route, RouteError> {
        let start = Instant::now();
        let result = self
            .service
            .compute_route(self.origin, self.destination, self.profile, zones.as_slice())
            .await;

        let outcome = match &result {
            Ok(_) => "ok",
            Err(e) if e.is_unavailable() => "unavailable",
            Err(_) => "error",
        };
        metrics::record_route_request(outcome, start);

        match &result {
            Ok(route) => tracing::debug!(
                zones = zones.len(),
                points = route.len(),
                distance_m = route.distance_m,
                "Route received"
            ),
            Err(e) => tracing::warn!(zones = zones.len(), error = %e, "Route request failed"),
        }
        result
    }
}
