//! Concurrent obstacle probing.
//!
//! # Responsibilities
//! - Issue one detection request per sample point
//! - Wait for every request to settle (join barrier)
//! - Absorb per-point failures as "no obstacle at this point"

use futures_util::future::join_all;

use crate::geo::Coordinate;
use crate::observability::metrics;
use crate::services::{DetectionFailure, ObstacleDetector};
use crate::survey::ObstacleReport;

/// Probes sample points against an obstacle detector.
#[derive(Debug, Clone)]
pub struct ObstacleProber<D> {
    detector: D,
}

impl<D: ObstacleDetector> ObstacleProber<D> {
    pub fn new(detector: D) -> Self {
        Self { detector }
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Probe every point and return the ones that yielded obstacles.
    ///
    /// All requests are created before any is polled to completion; the
    /// call returns only once every one of them has settled. Never fails.
    pub async fn survey<I>(&self, points: I) -> Vec<ObstacleReport>
    where
        I: IntoIterator<Item = Coordinate>,
    {
        let probes: Vec<_> = points
            .into_iter()
            .map(|at| async move { (at, self.probe(at).await) })
            .collect();
        let issued = probes.len();

        let settled = join_all(probes).await;

        let mut failed = 0usize;
        let reports: Vec<ObstacleReport> = settled
            .into_iter()
            .filter_map(|(at, result)| match result {
                Ok(report) => report,
                Err(e) => {
                    failed += 1;
                    tracing::warn!(lat = at.lat, lng = at.lng, error = %e, "Obstacle probe failed, treating point as clear");
                    None
                }
            })
            .collect();

        tracing::debug!(
            probes = issued,
            failed,
            obstacles = reports.len(),
            "Obstacle survey complete"
        );
        reports
    }

    async fn probe(&self, at: Coordinate) -> Result<Option<ObstacleReport>, DetectionFailure> {
        match self.detector.detect(at).await {
            Ok(detection) => {
                let report = ObstacleReport::from_detection(at, detection);
                metrics::record_probe(if report.is_some() { "obstacle" } else { "clear" });
                Ok(report)
            }
            Err(e) => {
                metrics::record_probe("failed");
                Err(e)
            }
        }
    }
}
