//! Adaptive obstacle-avoidance refinement.
//!
//! # Data Flow
//! ```text
//! RefinementRequest (route + known obstacles + zones)
//!     → state.rs (fold known obstacles, Idle → Iterating)
//!     → loop in engine.rs, at most max_attempts times:
//!         requestor.rs (route with current zones)
//!         → survey/ (sample + probe)
//!         → state.rs (best tracking, fold into exclusion.rs)
//!     → RefinementResult (best snapshot, status, outcome)
//!     → store.rs (kept for later lookup by id)
//! ```
//!
//! # Design Decisions
//! - The best snapshot's obstacle count only ever decreases
//! - Exclusion zones are append-only within a session
//! - Route failures end the session; probe failures never do

pub mod engine;
pub mod exclusion;
pub mod requestor;
pub mod state;
pub mod store;
pub mod types;

pub use engine::RefinementEngine;
pub use exclusion::{ExclusionSet, ExclusionZone, AVOIDANCE_RADIUS_M};
pub use requestor::RouteRequestor;
pub use state::RefinementState;
pub use store::{SessionRecord, SessionStore};
pub use types::{
    AbortReason, ProgressEvent, RefinementOutcome, RefinementRequest, RefinementResult,
    RefinementSnapshot, RefinementStatus, SessionPhase,
};
