//! Geographic primitives shared by every subsystem.
//!
//! # Data Flow
//! ```text
//! "lat,lng" strings (API, CLI)
//!     → coordinate.rs (parse, haversine)
//!     → route.rs (Route geometry + instructions, travel Profile)
//!     → consumed by survey/ and refinement/
//! ```
//!
//! # Design Decisions
//! - Coordinates are `Copy` values in degrees; no projection is ever applied
//! - Routes are immutable once returned by the routing service

pub mod coordinate;
pub mod route;

pub use coordinate::{Coordinate, CoordinateParseError};
pub use route::{Instruction, Profile, ProfileParseError, Route};
