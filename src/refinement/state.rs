//! Refinement session state machine.
//!
//! Every transition consumes the state and returns the next one; the engine
//! only performs I/O between transitions. The exclusion set and the best
//! snapshot live here and nowhere else.

use crate::config::RefinementConfig;
use crate::geo::Route;
use crate::refinement::types::{
    AbortReason, RefinementOutcome, RefinementResult, RefinementSnapshot, RefinementStatus,
    SessionPhase,
};
use crate::refinement::ExclusionSet;
use crate::survey::ObstacleReport;

/// Explicit state of one refinement session.
#[derive(Debug, Clone)]
pub struct RefinementState {
    phase: SessionPhase,
    zones: ExclusionSet,
    best: RefinementSnapshot,
    current: RefinementSnapshot,
    initial_obstacle_count: usize,
    attempts_used: u32,
    max_attempts: u32,
    zone_radius_m: f64,
}

impl RefinementState {
    /// Idle session seeded with the route the caller already has.
    pub fn new(initial: RefinementSnapshot, config: &RefinementConfig) -> Self {
        Self {
            phase: SessionPhase::Idle,
            zones: initial.exclusion_zones.clone(),
            initial_obstacle_count: initial.obstacle_count,
            best: initial.clone(),
            current: initial,
            attempts_used: 0,
            max_attempts: config.max_attempts,
            zone_radius_m: config.zone_radius_m,
        }
    }

    /// `Idle → Iterating`.
    ///
    /// Already-known obstacles are folded in first so no attempt is spent
    /// rediscovering them. A seed with nothing to avoid succeeds at once.
    pub fn begin(mut self) -> Self {
        if self.phase != SessionPhase::Idle {
            return self;
        }
        if self.initial_obstacle_count == 0 {
            self.phase = SessionPhase::Succeeded;
            return self;
        }
        let known = self.best.obstacles.clone();
        self.zones.fold(&known, self.zone_radius_m);
        self.phase = if self.max_attempts == 0 {
            SessionPhase::Exhausted
        } else {
            SessionPhase::Iterating
        };
        self
    }

    /// Attempt number of the next iteration, if another one is allowed.
    pub fn next_attempt(&self) -> Option<u32> {
        (self.phase == SessionPhase::Iterating && self.attempts_used < self.max_attempts)
            .then_some(self.attempts_used + 1)
    }

    /// Fold one iteration's route and survey into the state.
    pub fn advance(mut self, route: Route, obstacles: Vec<ObstacleReport>) -> Self {
        if self.phase != SessionPhase::Iterating {
            return self;
        }
        self.attempts_used += 1;

        let snapshot = RefinementSnapshot::new(route, obstacles, self.zones.clone());

        if snapshot.obstacle_count == 0 {
            self.best = snapshot.clone();
            self.current = snapshot;
            self.phase = SessionPhase::Succeeded;
            return self;
        }

        if snapshot.obstacle_count < self.best.obstacle_count {
            self.best = snapshot.clone();
        }
        self.zones.fold(&snapshot.obstacles, self.zone_radius_m);
        self.current = snapshot;

        if self.attempts_used >= self.max_attempts {
            self.phase = SessionPhase::Exhausted;
        }
        self
    }

    /// Stop the session, keeping the best snapshot.
    pub fn abort(mut self, reason: AbortReason) -> Self {
        if !self.phase.is_terminal() {
            self.phase = SessionPhase::Aborted(reason);
        }
        self
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn zones(&self) -> &ExclusionSet {
        &self.zones
    }

    pub fn best(&self) -> &RefinementSnapshot {
        &self.best
    }

    pub fn current(&self) -> &RefinementSnapshot {
        &self.current
    }

    pub fn attempts_used(&self) -> u32 {
        self.attempts_used
    }

    /// Lowest obstacle count seen so far, the seed included.
    pub fn min_obstacle_count(&self) -> usize {
        self.best.obstacle_count
    }

    /// Commit the best snapshot as the session's result.
    ///
    /// A session that never reached a terminal phase is reported as
    /// exhausted.
    pub fn finish(self) -> RefinementResult {
        let (status, abort_reason) = match self.phase {
            SessionPhase::Succeeded => (RefinementStatus::Succeeded, None),
            SessionPhase::Aborted(reason) => (RefinementStatus::Aborted, Some(reason)),
            SessionPhase::Exhausted | SessionPhase::Idle | SessionPhase::Iterating => {
                (RefinementStatus::Exhausted, None)
            }
        };

        RefinementResult {
            status,
            outcome: RefinementOutcome::classify(self.initial_obstacle_count, self.best.obstacle_count),
            final_route: self.best.route,
            final_obstacles: self.best.obstacles,
            final_zones: self.best.exclusion_zones.into_vec(),
            attempts_used: self.attempts_used,
            initial_obstacle_count: self.initial_obstacle_count,
            accumulated_zones: self.zones.into_vec(),
            abort_reason,
        }
    }
}
