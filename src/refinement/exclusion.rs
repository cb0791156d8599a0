//! Exclusion zones and the append-only set that accumulates them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::geo::{Coordinate, CoordinateParseError};
use crate::survey::ObstacleReport;

/// Radius used for every avoided obstacle. Kept small so a zone never
/// swallows the route's own origin or destination.
pub const AVOIDANCE_RADIUS_M: f64 = 15.0;

/// A circular region the routing service must not route through.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExclusionZone {
    pub center: Coordinate,
    pub radius_m: f64,
}

impl ExclusionZone {
    pub fn new(center: Coordinate, radius_m: f64) -> Self {
        Self { center, radius_m }
    }

    pub fn contains(&self, point: &Coordinate) -> bool {
        self.center.haversine_m(point) <= self.radius_m
    }
}

/// `"lat,lng,radius"`
impl fmt::Display for ExclusionZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.center, self.radius_m)
    }
}

impl FromStr for ExclusionZone {
    type Err = CoordinateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (coord, radius) = s
            .rsplit_once(',')
            .ok_or_else(|| CoordinateParseError::Format(s.to_string()))?;
        let radius_m: f64 = radius
            .trim()
            .parse()
            .map_err(|_| CoordinateParseError::Format(s.to_string()))?;
        if !radius_m.is_finite() || radius_m <= 0.0 {
            return Err(CoordinateParseError::Format(s.to_string()));
        }
        Ok(Self::new(coord.parse()?, radius_m))
    }
}

/// Exclusion zones accumulated during one refinement session.
///
/// Append-only: there is no removal API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExclusionSet {
    zones: Vec<ExclusionZone>,
}

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold obstacle reports into the set, one zone per report.
    ///
    /// Returns the number of zones added. Overlapping and duplicate zones
    /// are kept as-is.
    pub fn fold(&mut self, reports: &[ObstacleReport], radius_m: f64) -> usize {
        self.zones.extend(
            reports
                .iter()
                .map(|report| ExclusionZone::new(report.location, radius_m)),
        );
        reports.len()
    }

    pub fn extend<I: IntoIterator<Item = ExclusionZone>>(&mut self, zones: I) {
        self.zones.extend(zones);
    }

    pub fn as_slice(&self) -> &[ExclusionZone] {
        &self.zones
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExclusionZone> {
        self.zones.iter()
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn into_vec(self) -> Vec<ExclusionZone> {
        self.zones
    }
}

impl From<Vec<ExclusionZone>> for ExclusionSet {
    fn from(zones: Vec<ExclusionZone>) -> Self {
        Self { zones }
    }
}
