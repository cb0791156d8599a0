//! Survey result types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::geo::Coordinate;
use crate::services::Detection;

/// Obstacles found at one sample point.
///
/// Reports from different points are never merged or deduplicated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleReport {
    pub location: Coordinate,
    pub obstacle_types: BTreeSet<String>,
    /// Opaque locator of the evidence (image URL for street-level imagery).
    #[serde(default)]
    pub evidence_ref: Option<String>,
}

impl ObstacleReport {
    /// Pair a detection with its coordinate, dropping obstacle-free results.
    pub fn from_detection(location: Coordinate, detection: Detection) -> Option<Self> {
        if !detection.has_obstacles() {
            return None;
        }
        Some(Self {
            location,
            obstacle_types: detection.obstacle_types,
            evidence_ref: detection.evidence_ref,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_detection_is_dropped() {
        let at = Coordinate::new(0.0, 0.0);
        assert!(ObstacleReport::from_detection(at, Detection::clear(None)).is_none());

        let report = ObstacleReport::from_detection(
            at,
            Detection::with_types(["construction"], Some("img://1".into())),
        )
        .unwrap();
        assert_eq!(report.location, at);
        assert_eq!(report.evidence_ref.as_deref(), Some("img://1"));
    }

    #[test]
    fn test_report_json_shape() {
        let json = r#"{"location":{"lat":37.31,"lng":-5.94},"obstacle_types":["stairs"]}"#;
        let report: ObstacleReport = serde_json::from_str(json).unwrap();
        assert!(report.obstacle_types.contains("stairs"));
        assert!(report.evidence_ref.is_none());
    }
}
