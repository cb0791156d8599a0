//! Adaptive obstacle-avoidance route refinement.
//!
//! # Architecture Overview
//!
//! ```text
//!   CLI (bin/route-cli) ──▶ HTTP API (http/)
//!                                 │
//!          ┌──────────────────────┘
//!          ▼
//!   refinement/engine ──▶ requestor ──▶ RoutingService   (services/)
//!          │
//!          ├──▶ survey/ sampler ──▶ prober ──▶ ObstacleDetector
//!          │
//!          └──▶ refinement/state (best snapshot, exclusion set)
//!                     │
//!                     ▼
//!               refinement/store
//!
//!   Cross-cutting: config/  observability/  lifecycle/  geo/
//! ```

// Core subsystems
pub mod geo;
pub mod refinement;
pub mod services;
pub mod survey;

// Surfaces
pub mod http;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;

pub use config::schema::RefinerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use refinement::{RefinementEngine, RefinementRequest, RefinementResult};
