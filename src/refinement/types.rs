//! Refinement session types.

use serde::{Deserialize, Serialize};

use crate::geo::{Coordinate, Profile, Route};
use crate::refinement::{ExclusionSet, ExclusionZone};
use crate::services::RouteError;
use crate::survey::ObstacleReport;

/// A route paired with the survey performed against that exact route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinementSnapshot {
    pub route: Route,
    pub obstacles: Vec<ObstacleReport>,
    /// Zones the route was computed with.
    pub exclusion_zones: ExclusionSet,
    pub obstacle_count: usize,
}

impl RefinementSnapshot {
    pub fn new(route: Route, obstacles: Vec<ObstacleReport>, exclusion_zones: ExclusionSet) -> Self {
        let obstacle_count = obstacles.len();
        Self {
            route,
            obstacles,
            exclusion_zones,
            obstacle_count,
        }
    }
}

/// Lifecycle of a session: `Idle → Iterating → {Succeeded, Exhausted, Aborted}`.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionPhase {
    Idle,
    Iterating,
    Succeeded,
    Exhausted,
    Aborted(AbortReason),
}

impl SessionPhase {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionPhase::Idle | SessionPhase::Iterating)
    }
}

/// Terminal status reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefinementStatus {
    Succeeded,
    Exhausted,
    Aborted,
}

impl RefinementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefinementStatus::Succeeded => "succeeded",
            RefinementStatus::Exhausted => "exhausted",
            RefinementStatus::Aborted => "aborted",
        }
    }
}

/// Why a session stopped early.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum AbortReason {
    /// The routing service could not satisfy the exclusion zones.
    RouteUnavailable(String),
    /// A route request failed below the routing contract (network, upstream error).
    SessionAborted(String),
    /// The caller abandoned the session.
    Cancelled,
    /// The session ran past its wall-clock budget.
    Deadline,
}

impl From<&RouteError> for AbortReason {
    fn from(e: &RouteError) -> Self {
        match e {
            RouteError::Unavailable(detail) => AbortReason::RouteUnavailable(detail.clone()),
            other => AbortReason::SessionAborted(other.to_string()),
        }
    }
}

/// How the best result compares with the route the session started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RefinementOutcome {
    /// No obstacles left.
    Cleared,
    /// Fewer obstacles than at the start, but not zero.
    Improved { from: usize, to: usize },
    /// Best count is not below the starting count.
    NoImprovement { count: usize },
}

impl RefinementOutcome {
    pub fn classify(initial: usize, best: usize) -> Self {
        if best == 0 {
            RefinementOutcome::Cleared
        } else if best < initial {
            RefinementOutcome::Improved {
                from: initial,
                to: best,
            }
        } else {
            RefinementOutcome::NoImprovement { count: best }
        }
    }
}

/// Input of a refinement session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinementRequest {
    pub origin: Coordinate,
    pub destination: Coordinate,
    #[serde(default)]
    pub profile: Profile,
    pub initial_route: Route,
    /// Obstacles from the survey of `initial_route`.
    #[serde(default)]
    pub initial_obstacles: Vec<ObstacleReport>,
    /// Zones `initial_route` was computed with.
    #[serde(default)]
    pub initial_zones: Vec<ExclusionZone>,
}

impl RefinementRequest {
    /// Take origin and destination from the route's own endpoints.
    ///
    /// Returns `None` for an empty route.
    pub fn from_route(
        initial_route: Route,
        profile: Profile,
        initial_obstacles: Vec<ObstacleReport>,
        initial_zones: Vec<ExclusionZone>,
    ) -> Option<Self> {
        Some(Self {
            origin: initial_route.origin()?,
            destination: initial_route.destination()?,
            profile,
            initial_route,
            initial_obstacles,
            initial_zones,
        })
    }
}

/// Final state of a refinement session. Always carries the best snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinementResult {
    pub status: RefinementStatus,
    pub outcome: RefinementOutcome,
    pub final_route: Route,
    pub final_obstacles: Vec<ObstacleReport>,
    pub final_zones: Vec<ExclusionZone>,
    /// Route-request iterations that completed (route + survey).
    pub attempts_used: u32,
    pub initial_obstacle_count: usize,
    /// Every zone accumulated during the session.
    pub accumulated_zones: Vec<ExclusionZone>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abort_reason: Option<AbortReason>,
}

impl RefinementResult {
    pub fn obstacle_count(&self) -> usize {
        self.final_obstacles.len()
    }
}

/// Interim state published after each iteration. Purely observational.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Status { attempt: u32, message: String },
    RouteUpdated { attempt: u32, route: Route },
    ObstacleCount {
        attempt: u32,
        current: usize,
        best: usize,
    },
}
