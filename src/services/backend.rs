//! Detector selection from configuration.

use crate::config::{DetectionConfig, DetectionMode};
use crate::geo::Coordinate;
use crate::services::mock::MockDetector;
use crate::services::types::{Detection, DetectionFailure, ObstacleDetector};
use crate::services::vision::VisionDetector;

/// The detector a running server probes with.
#[derive(Debug)]
pub enum DetectionBackend {
    Vision(VisionDetector),
    Mock(MockDetector),
}

impl DetectionBackend {
    /// Pick the configured detector.
    ///
    /// In vision mode a missing API key falls back to the mock detector
    /// when `fallback_to_mock` is set; any other construction error is
    /// returned.
    pub fn from_config(config: &DetectionConfig) -> Result<Self, DetectionFailure> {
        let mock = || MockDetector::new(config.mock_obstacle_probability);

        match config.mode {
            DetectionMode::Mock => Ok(Self::Mock(mock())),
            DetectionMode::Vision => match VisionDetector::from_config(config) {
                Ok(vision) => Ok(Self::Vision(vision)),
                Err(DetectionFailure::MissingApiKey(var)) if config.fallback_to_mock => {
                    tracing::warn!(
                        variable = %var,
                        probability = config.mock_obstacle_probability,
                        "Vision API key not set, using mock detector"
                    );
                    Ok(Self::Mock(mock()))
                }
                Err(e) => Err(e),
            },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Vision(_) => "vision",
            Self::Mock(_) => "mock",
        }
    }
}

impl ObstacleDetector for DetectionBackend {
    async fn detect(&self, at: Coordinate) -> Result<Detection, DetectionFailure> {
        match self {
            Self::Vision(detector) => detector.detect(at).await,
            Self::Mock(detector) => detector.detect(at).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_mode() {
        let config = DetectionConfig {
            mode: DetectionMode::Mock,
            ..Default::default()
        };
        assert_eq!(DetectionBackend::from_config(&config).unwrap().name(), "mock");
    }

    #[test]
    fn test_missing_keys() {
        let mut config = DetectionConfig {
            maps_key_env: "ROUTE_REFINER_TEST_NO_MAPS_KEY".to_string(),
            vision_key_env: "ROUTE_REFINER_TEST_NO_VISION_KEY".to_string(),
            ..Default::default()
        };
        assert_eq!(DetectionBackend::from_config(&config).unwrap().name(), "mock");

        config.fallback_to_mock = false;
        assert!(matches!(
            DetectionBackend::from_config(&config),
            Err(DetectionFailure::MissingApiKey(_))
        ));
    }

    #[test]
    fn test_vision_with_keys() {
        let config = DetectionConfig::default();
        let vision = VisionDetector::new(&config, "maps".to_string(), "gemini".to_string()).unwrap();
        assert_eq!(DetectionBackend::Vision(vision).name(), "vision");
    }
}
