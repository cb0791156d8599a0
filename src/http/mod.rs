//! HTTP API subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, timeout, tracing)
//!     → handlers.rs (resolve locations, call engine / services)
//!     → error.rs (service errors → status codes)
//!     → JSON response
//! ```

pub mod error;
pub mod handlers;
pub mod server;

pub use error::ApiError;
pub use server::{AppState, Engine, HttpServer, StartupError};
