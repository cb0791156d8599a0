//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, attempts > 0, probabilities)
//! - Check that service URLs parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RefinerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;
use url::Url;

use crate::config::schema::RefinerConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check every semantic constraint and collect all violations.
pub fn validate_config(config: &RefinerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("not a socket address: {:?}", config.listener.bind_address),
        ));
    }

    check_url(&mut errors, "routing.base_url", &config.routing.base_url);
    check_url(&mut errors, "detection.street_view_url", &config.detection.street_view_url);
    check_url(&mut errors, "detection.vision_base_url", &config.detection.vision_base_url);

    if config.routing.timeout_secs == 0 {
        errors.push(ValidationError::new("routing.timeout_secs", "must be > 0"));
    }
    if config.routing.max_distance_km == 0 {
        errors.push(ValidationError::new("routing.max_distance_km", "must be > 0"));
    }
    if config.detection.timeout_secs == 0 {
        errors.push(ValidationError::new("detection.timeout_secs", "must be > 0"));
    }
    if config.detection.models.is_empty() {
        errors.push(ValidationError::new("detection.models", "at least one model is required"));
    }
    if !(0.0..=1.0).contains(&config.detection.mock_obstacle_probability) {
        errors.push(ValidationError::new(
            "detection.mock_obstacle_probability",
            "must be within [0, 1]",
        ));
    }
    if config.detection.image_size.split_once('x').is_none() {
        errors.push(ValidationError::new(
            "detection.image_size",
            "expected WIDTHxHEIGHT",
        ));
    }

    let refinement = &config.refinement;
    if refinement.max_attempts == 0 {
        errors.push(ValidationError::new("refinement.max_attempts", "must be > 0"));
    }
    if refinement.min_step == 0 {
        errors.push(ValidationError::new("refinement.min_step", "must be > 0"));
    }
    if refinement.target_samples == 0 {
        errors.push(ValidationError::new("refinement.target_samples", "must be > 0"));
    }
    if !refinement.zone_radius_m.is_finite() || refinement.zone_radius_m <= 0.0 {
        errors.push(ValidationError::new("refinement.zone_radius_m", "must be > 0"));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be > 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("not a socket address: {:?}", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            field,
            format!("unsupported scheme {:?}", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(field, format!("invalid URL: {}", e))),
    }
}
