//! External services: routing, geocoding and obstacle detection.
//!
//! # Data Flow
//! ```text
//! refinement engine
//!     → RoutingService  (openroute.rs: directions + avoid_polygons)
//!     → ObstacleDetector (backend.rs)
//!         → vision.rs (streetview.rs image → vision model)
//!         → mock.rs   (random, no keys required)
//! ```
//!
//! # Design Decisions
//! - The engine only sees the two traits; clients are swappable in tests
//! - Over-constrained routing is a distinct error from transport failure
//! - API keys come from the environment, never from config files

pub mod backend;
pub mod mock;
pub mod openroute;
pub mod streetview;
pub mod types;
pub mod vision;

pub use backend::DetectionBackend;
pub use mock::MockDetector;
pub use openroute::OpenRouteClient;
pub use streetview::StreetViewImagery;
pub use types::{Detection, DetectionFailure, ObstacleDetector, RouteError, RoutingService};
pub use vision::VisionDetector;
