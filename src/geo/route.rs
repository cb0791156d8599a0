//! Route geometry and travel profiles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::geo::Coordinate;

/// Travel mode requested from the routing service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    #[default]
    Foot,
    Car,
    Bike,
    Wheelchair,
}

#[derive(Debug, Error, PartialEq)]
#[error("unknown travel profile {0:?} (expected foot, car, bike or wheelchair)")]
pub struct ProfileParseError(pub String);

impl Profile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Foot => "foot",
            Profile::Car => "car",
            Profile::Bike => "bike",
            Profile::Wheelchair => "wheelchair",
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Profile {
    type Err = ProfileParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "foot" => Ok(Profile::Foot),
            "car" => Ok(Profile::Car),
            "bike" => Ok(Profile::Bike),
            "wheelchair" => Ok(Profile::Wheelchair),
            other => Err(ProfileParseError(other.to_string())),
        }
    }
}

/// A single turn-by-turn step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    pub text: String,
    pub distance_m: f64,
    pub duration_s: f64,
}

/// A path returned by the routing service.
///
/// Superseded, never mutated, by each refinement iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Ordered geometry, origin first.
    pub coordinates: Vec<Coordinate>,
    #[serde(default)]
    pub instructions: Vec<Instruction>,
    #[serde(default)]
    pub distance_m: f64,
    #[serde(default)]
    pub duration_s: f64,
}

impl Route {
    /// A route with geometry only.
    pub fn from_coordinates(coordinates: Vec<Coordinate>) -> Self {
        Self {
            coordinates,
            instructions: Vec::new(),
            distance_m: 0.0,
            duration_s: 0.0,
        }
    }

    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    pub fn origin(&self) -> Option<Coordinate> {
        self.coordinates.first().copied()
    }

    pub fn destination(&self) -> Option<Coordinate> {
        self.coordinates.last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_parsing() {
        assert_eq!("Wheelchair".parse::<Profile>().unwrap(), Profile::Wheelchair);
        assert_eq!(" bike ".parse::<Profile>().unwrap(), Profile::Bike);
        assert!("hovercraft".parse::<Profile>().is_err());
        assert_eq!(Profile::default(), Profile::Foot);
    }

    #[test]
    fn test_profile_serde() {
        let json = serde_json::to_string(&Profile::Car).unwrap();
        assert_eq!(json, "\"car\"");
        let p: Profile = serde_json::from_str("\"wheelchair\"").unwrap();
        assert_eq!(p, Profile::Wheelchair);
    }

    #[test]
    fn test_route_endpoints() {
        let route = Route::from_coordinates(vec![
            Coordinate::new(1.0, 2.0),
            Coordinate::new(3.0, 4.0),
        ]);
        assert_eq!(route.origin(), Some(Coordinate::new(1.0, 2.0)));
        assert_eq!(route.destination(), Some(Coordinate::new(3.0, 4.0)));
        assert!(Route::from_coordinates(Vec::new()).origin().is_none());
    }
}
