//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the refiner.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::refinement::AVOIDANCE_RADIUS_M;
use crate::survey::{MIN_STEP, TARGET_SAMPLES};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RefinerConfig {
    /// HTTP API listener.
    pub listener: ListenerConfig,

    /// External routing service.
    pub routing: RoutingServiceConfig,

    /// External obstacle detection.
    pub detection: DetectionConfig,

    /// Refinement loop parameters.
    pub refinement: RefinementConfig,

    /// Finished-session storage.
    pub sessions: SessionConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
        }
    }
}

/// OpenRouteService connection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingServiceConfig {
    /// Base URL, without the `/v2/directions` suffix.
    pub base_url: String,

    /// Environment variable holding the API key.
    pub api_key_env: String,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Maximum straight-line trip length in kilometers.
    pub max_distance_km: u64,
}

impl Default for RoutingServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openrouteservice.org".to_string(),
            api_key_env: "ORS_API_KEY".to_string(),
            timeout_secs: 20,
            max_distance_km: 6000,
        }
    }
}

/// Which obstacle detector backs the prober.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMode {
    /// Street-level imagery analysed by a vision model.
    Vision,
    /// Random obstacles, for development without API keys.
    Mock,
}

/// Obstacle detection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub mode: DetectionMode,

    /// Fall back to the mock detector when vision keys are missing.
    pub fallback_to_mock: bool,

    /// Street View static image endpoint.
    pub street_view_url: String,

    /// Requested image size, e.g. "600x400".
    pub image_size: String,

    /// Environment variable holding the maps API key.
    pub maps_key_env: String,

    /// Generative Language API base URL.
    pub vision_base_url: String,

    /// Environment variable holding the vision API key.
    pub vision_key_env: String,

    /// Candidate models, tried in order.
    pub models: Vec<String>,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Probability that the mock detector reports stairs at a point.
    pub mock_obstacle_probability: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            mode: DetectionMode::Vision,
            fallback_to_mock: true,
            street_view_url: "https://maps.googleapis.com/maps/api/streetview".to_string(),
            image_size: "600x400".to_string(),
            maps_key_env: "GOOGLE_MAPS_API_KEY".to_string(),
            vision_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            vision_key_env: "GEMINI_API_KEY".to_string(),
            models: vec![
                "gemini-1.5-flash".to_string(),
                "gemini-1.5-pro".to_string(),
                "gemini-2.0-flash-exp".to_string(),
            ],
            timeout_secs: 30,
            mock_obstacle_probability: 0.3,
        }
    }
}

/// Refinement loop parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RefinementConfig {
    /// Maximum route-request iterations per session.
    pub max_attempts: u32,

    /// Minimum geometry vertices between two probes.
    pub min_step: usize,

    /// Desired probe count on long routes.
    pub target_samples: usize,

    /// Radius of the zone placed around each avoided obstacle.
    pub zone_radius_m: f64,

    /// Wall-clock budget for one session, checked between iterations
    /// (0 = no limit).
    pub session_deadline_secs: u64,
}

impl Default for RefinementConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            min_step: MIN_STEP,
            target_samples: TARGET_SAMPLES,
            zone_radius_m: AVOIDANCE_RADIUS_M,
            session_deadline_secs: 600,
        }
    }
}

/// Finished-session storage.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Maximum stored sessions (0 = unbounded).
    pub capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { capacity: 1000 }
    }
}

/// Timeout configuration for the HTTP API.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    ///
    /// Must cover a full refinement session.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 300 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
