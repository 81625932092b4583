use serde::{Deserialize, Serialize};

use crate::error::CalendarError;

/// Geographic location used for horizon-relative calculations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observer {
    /// Geodetic latitude in degrees, north positive
    pub latitude: f64,
    /// Longitude in degrees, east positive
    pub longitude: f64,
    /// Height above sea level in meters
    #[serde(default)]
    pub elevation_m: f64,
}

impl Observer {
    /// Paris, the location used until the client reports its own.
    pub const PARIS: Observer = Observer {
        latitude: 48.8566,
        longitude: 2.3522,
        elevation_m: 0.0,
    };

    pub fn new(latitude: f64, longitude: f64, elevation_m: f64) -> Self {
        Self {
            latitude,
            longitude,
            elevation_m,
        }
    }

    /// Check that the coordinates are finite and within range.
    pub fn validate(&self) -> Result<(), CalendarError> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(CalendarError::InvalidObserver(format!(
                "latitude {} outside [-90, 90]",
                self.latitude
            )));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(CalendarError::InvalidObserver(format!(
                "longitude {} outside [-180, 180]",
                self.longitude
            )));
        }
        if !self.elevation_m.is_finite() {
            return Err(CalendarError::InvalidObserver(
                "elevation must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Observer {
    fn default() -> Self {
        Self::PARIS
    }
}
