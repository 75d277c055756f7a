//! Resolved places used as departure, destination and waypoints.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{MapzipError, Result};

/// A place picked from the map provider's search results.
///
/// Points are never built from raw text in the wizard: the caller must hand
/// over a resolved result with coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationPoint {
    /// Display name of the place
    pub name: String,
    /// Street address, empty when the provider returned none
    #[serde(default)]
    pub address: String,
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lng: f64,
}

impl LocationPoint {
    pub fn new(name: impl Into<String>, address: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            lat,
            lng,
        }
    }

    /// Checks that the point has a name and sane coordinates.
    pub fn validate(&self, field: &str) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(MapzipError::validation(field).with_reason("place name is empty"));
        }
        if !(-90.0..=90.0).contains(&self.lat) || !(-180.0..=180.0).contains(&self.lng) {
            return Err(MapzipError::validation(field).with_reason(format!(
                "coordinates ({}, {}) are out of range",
                self.lat, self.lng
            )));
        }
        Ok(())
    }
}

impl fmt::Display for LocationPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.address.is_empty() {
            write!(f, " ({})", self.address)?;
        }
        Ok(())
    }
}
