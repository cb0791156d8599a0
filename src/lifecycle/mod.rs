//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Ctrl+C
//!     → Shutdown::trigger
//!     → HTTP server stops accepting, drains in-flight requests
//!     → refinement sessions stop before their next iteration
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
