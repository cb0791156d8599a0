//! Bounded iterative search for an obstacle-free route.
//!
//! # Responsibilities
//! - Drive `RefinementState` through its transitions
//! - Perform the I/O between transitions (route request, survey)
//! - Publish progress and stop on route failure or cancellation
//!
//! # Design Decisions
//! - Iterations are strictly sequential; zones for k+1 depend on k
//! - Cancellation and the session deadline are checked between iterations
//!   only, so an in-flight survey always settles before the session stops

use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedSender;

use crate::config::RefinementConfig;
use crate::geo::Route;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::refinement::requestor::RouteRequestor;
use crate::refinement::state::RefinementState;
use crate::refinement::types::{
    AbortReason, ProgressEvent, RefinementRequest, RefinementResult, RefinementSnapshot,
};
use crate::refinement::ExclusionSet;
use crate::services::{ObstacleDetector, RoutingService};
use crate::survey::{ObstacleProber, ObstacleReport, Sampler};

/// Refinement engine over a routing service and an obstacle detector.
pub struct RefinementEngine<R, D> {
    routing: R,
    prober: ObstacleProber<D>,
    sampler: Sampler,
    config: RefinementConfig,
    shutdown: Option<Shutdown>,
    deadline: Option<Duration>,
}

impl<R: RoutingService, D: ObstacleDetector> RefinementEngine<R, D> {
    pub fn new(routing: R, detector: D, config: RefinementConfig) -> Self {
        Self {
            routing,
            prober: ObstacleProber::new(detector),
            sampler: Sampler::new(config.min_step, config.target_samples),
            deadline: (config.session_deadline_secs > 0)
                .then(|| Duration::from_secs(config.session_deadline_secs)),
            config,
            shutdown: None,
        }
    }

    /// Stop sessions between iterations once `shutdown` is triggered.
    pub fn with_shutdown(mut self, shutdown: Shutdown) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Override the per-session wall-clock budget.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn routing(&self) -> &R {
        &self.routing
    }

    pub fn detector(&self) -> &D {
        self.prober.detector()
    }

    pub fn config(&self) -> &RefinementConfig {
        &self.config
    }

    /// Sample `route` and probe every sample point.
    pub async fn survey(&self, route: &Route) -> Vec<ObstacleReport> {
        self.prober.survey(self.sampler.sample(&route.coordinates)).await
    }

    /// Run one refinement session to completion.
    ///
    /// Never fails: route failures, cancellation and the deadline end the
    /// session with the best snapshot seen so far.
    pub async fn refine(
        &self,
        request: RefinementRequest,
        progress: Option<&UnboundedSender<ProgressEvent>>,
    ) -> RefinementResult {
        let start = Instant::now();
        let publish = |event: ProgressEvent| {
            if let Some(tx) = progress {
                let _ = tx.send(event);
            }
        };

        let seed = RefinementSnapshot::new(
            request.initial_route,
            request.initial_obstacles,
            ExclusionSet::from(request.initial_zones),
        );
        let mut state = RefinementState::new(seed, &self.config).begin();

        tracing::info!(
            origin = %request.origin,
            destination = %request.destination,
            profile = %request.profile,
            initial_obstacles = state.min_obstacle_count(),
            zones = state.zones().len(),
            "Refinement session started"
        );

        let requestor = RouteRequestor::new(
            &self.routing,
            request.origin,
            request.destination,
            request.profile,
        );

        while let Some(attempt) = state.next_attempt() {
            if self.is_cancelled() {
                tracing::info!(attempt, "Refinement cancelled");
                state = state.abort(AbortReason::Cancelled);
                break;
            }
            if self.deadline.is_some_and(|d| start.elapsed() >= d) {
                tracing::warn!(
                    attempt,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Refinement deadline reached, keeping best route so far"
                );
                state = state.abort(AbortReason::Deadline);
                break;
            }

            match attempt {
                1 => publish(ProgressEvent::Status {
                    attempt,
                    message: "Searching for a route around known obstacles".to_string(),
                }),
                3 => publish(ProgressEvent::Status {
                    attempt,
                    message: "Still searching, trying wider detours".to_string(),
                }),
                _ => {}
            }

            let route = match requestor.request(state.zones()).await {
                Ok(route) => route,
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "Stopping refinement, keeping best route so far");
                    state = state.abort(AbortReason::from(&e));
                    break;
                }
            };

            let obstacles = self.survey(&route).await;
            let found = obstacles.len();

            publish(ProgressEvent::RouteUpdated {
                attempt,
                route: route.clone(),
            });
            state = state.advance(route, obstacles);
            publish(ProgressEvent::ObstacleCount {
                attempt,
                current: found,
                best: state.min_obstacle_count(),
            });

            tracing::info!(
                attempt,
                obstacles = found,
                best = state.min_obstacle_count(),
                zones = state.zones().len(),
                "Refinement iteration complete"
            );
        }

        let result = state.finish();
        metrics::record_session(result.status.as_str(), result.attempts_used, start);
        tracing::info!(
            status = result.status.as_str(),
            attempts = result.attempts_used,
            obstacles = result.obstacle_count(),
            initial_obstacles = result.initial_obstacle_count,
            "Refinement session finished"
        );
        result
    }

    fn is_cancelled(&self) -> bool {
        self.shutdown.as_ref().is_some_and(Shutdown::is_triggered)
    }
}
