//! Obstacle survey subsystem.
//!
//! # Data Flow
//! ```text
//! Route geometry
//!     → sampler.rs (bounded, strided sample points)
//!     → prober.rs (concurrent detector fan-out, failures absorbed)
//!     → Vec<ObstacleReport> (only points with obstacles)
//! ```
//!
//! # Design Decisions
//! - Sampling is lazy and restartable; nothing is allocated per point
//! - Probes are joined in the calling task, never spawned
//! - A failed probe means "no obstacle here", never a failed survey

pub mod prober;
pub mod sampler;
pub mod types;

pub use prober::ObstacleProber;
pub use sampler::{SamplePoints, Sampler, MIN_STEP, TARGET_SAMPLES};
pub use types::ObstacleReport;
