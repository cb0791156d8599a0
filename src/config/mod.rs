//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RefinerConfig (validated, immutable)
//!     → cloned into each subsystem at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - API keys are never stored in the file, only the names of the
//!   environment variables that hold them

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, resolve_config, ConfigError};
pub use schema::{
    DetectionConfig, DetectionMode, ListenerConfig, ObservabilityConfig, RefinementConfig,
    RefinerConfig, RoutingServiceConfig, SessionConfig, TimeoutConfig,
};
pub use validation::{validate_config, ValidationError};
