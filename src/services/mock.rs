//! Random obstacle detector for development without API keys.

use crate::geo::Coordinate;
use crate::services::types::{Detection, DetectionFailure, ObstacleDetector};

/// Reports `stairs` at a point with a fixed probability.
#[derive(Debug, Clone, Copy)]
pub struct MockDetector {
    probability: f64,
}

impl MockDetector {
    pub fn new(probability: f64) -> Self {
        Self {
            probability: probability.clamp(0.0, 1.0),
        }
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }
}

impl ObstacleDetector for MockDetector {
    async fn detect(&self, _at: Coordinate) -> Result<Detection, DetectionFailure> {
        if fastrand::f64() < self.probability {
            Ok(Detection::with_types(["stairs"], None))
        } else {
            Ok(Detection::clear(None))
        }
    }
}
