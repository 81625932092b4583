//! Service and engine configuration.
//!
//! Values come from an optional TOML file named by `ASTROCAL_CONFIG`, then from
//! individual environment variables, then from the defaults below.
//!
//! ```toml
//! host = "0.0.0.0"
//! port = 8080
//! ephemeris_path = "data/ephemeris-2024.json"
//!
//! [observer]
//! latitude = 48.8566
//! longitude = 2.3522
//!
//! [scan]
//! utc_offset_minutes = 60
//! cache_capacity = 12
//! ```

use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::{CivilClock, Observer};

/// Environment variable holding the path of the TOML config file.
pub const CONFIG_PATH_ENV: &str = "ASTROCAL_CONFIG";

/// Longest accepted rise/set search look-ahead.
pub const MAX_SEARCH_LIMIT_DAYS: f64 = 30.0;

/// Latest accepted visibility check after sunset, in minutes.
pub const MAX_VISIBILITY_OFFSET_MINUTES: i64 = 720;

/// Most months a single index may scan.
pub const MAX_WINDOW_MONTHS: u32 = 12;

/// Most month indices the memo may hold.
pub const MAX_CACHE_CAPACITY: usize = 240;

/// Tunables of the detection engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Offset of the civil time zone days are bucketed in, east positive.
    pub utc_offset_minutes: i32,
    /// Local hour at which daily signals are sampled.
    pub sample_hour: u32,
    /// Moon-planet separation below which a local minimum is a conjunction.
    pub moon_conjunction_deg: f64,
    /// Planet-planet separation below which a local minimum is a conjunction.
    pub planet_conjunction_deg: f64,
    /// Elongation above which a local maximum is an opposition.
    pub opposition_deg: f64,
    /// Look-ahead of the rise/set searches.
    pub search_limit_days: f64,
    /// Minimum altitude for a planet to be listed as visible.
    pub visibility_min_altitude_deg: f64,
    /// Minutes after sunset / before sunrise at which visibility is checked.
    pub visibility_offset_minutes: i64,
    /// Months scanned per month index, starting at the requested month.
    pub window_months: u32,
    /// Month indices kept in memory. 0 rebuilds on every request.
    pub cache_capacity: usize,
    /// Local hour used for calendar entries of untimed events.
    pub ics_default_hour: u32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 0,
            sample_hour: 12,
            moon_conjunction_deg: 6.0,
            planet_conjunction_deg: 2.0,
            opposition_deg: 178.0,
            search_limit_days: 1.0,
            visibility_min_altitude_deg: 5.0,
            visibility_offset_minutes: 45,
            window_months: 2,
            cache_capacity: 6,
            ics_default_hour: 12,
        }
    }
}

impl ScanConfig {
    /// Civil clock for [`Self::utc_offset_minutes`].
    ///
    /// Falls back to UTC for an out-of-range offset; [`Self::validate`] rejects those.
    pub fn clock(&self) -> CivilClock {
        CivilClock::from_offset_minutes(self.utc_offset_minutes).unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if CivilClock::from_offset_minutes(self.utc_offset_minutes).is_none() {
            return Err(ConfigError::Invalid(format!(
                "utc_offset_minutes {} is outside +/-24h",
                self.utc_offset_minutes
            )));
        }
        if self.sample_hour > 23 || self.ics_default_hour > 23 {
            return Err(ConfigError::Invalid(
                "sample_hour and ics_default_hour must be in 0..=23".to_string(),
            ));
        }
        for (name, value) in [
            ("moon_conjunction_deg", self.moon_conjunction_deg),
            ("planet_conjunction_deg", self.planet_conjunction_deg),
            ("opposition_deg", self.opposition_deg),
        ] {
            if !(0.0..=180.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be within 0..=180, got {}",
                    name, value
                )));
            }
        }
        if !(self.search_limit_days > 0.0 && self.search_limit_days <= MAX_SEARCH_LIMIT_DAYS) {
            return Err(ConfigError::Invalid(format!(
                "search_limit_days must be within (0, {}], got {}",
                MAX_SEARCH_LIMIT_DAYS, self.search_limit_days
            )));
        }
        if !(-90.0..=90.0).contains(&self.visibility_min_altitude_deg) {
            return Err(ConfigError::Invalid(format!(
                "visibility_min_altitude_deg must be within -90..=90, got {}",
                self.visibility_min_altitude_deg
            )));
        }
        if !(0..=MAX_VISIBILITY_OFFSET_MINUTES).contains(&self.visibility_offset_minutes) {
            return Err(ConfigError::Invalid(format!(
                "visibility_offset_minutes must be within 0..={}, got {}",
                MAX_VISIBILITY_OFFSET_MINUTES, self.visibility_offset_minutes
            )));
        }
        if !(1..=MAX_WINDOW_MONTHS).contains(&self.window_months) {
            return Err(ConfigError::Invalid(format!(
                "window_months must be within 1..={}, got {}",
                MAX_WINDOW_MONTHS, self.window_months
            )));
        }
        if self.cache_capacity > MAX_CACHE_CAPACITY {
            return Err(ConfigError::Invalid(format!(
                "cache_capacity must be at most {}, got {}",
                MAX_CACHE_CAPACITY, self.cache_capacity
            )));
        }
        Ok(())
    }
}

/// Top-level configuration of the query service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Ephemeris table loaded by the server.
    pub ephemeris_path: Option<PathBuf>,
    /// Observer used when a request does not supply coordinates.
    pub observer: Observer,
    pub scan: ScanConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            ephemeris_path: None,
            observer: Observer::default(),
            scan: ScanConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Load the effective configuration.
    ///
    /// # Environment Variables
    /// - `ASTROCAL_CONFIG`: TOML file read first (optional)
    /// - `HOST`, `PORT`: bind address (default: 0.0.0.0:8080)
    /// - `ASTROCAL_EPHEMERIS`: ephemeris table path
    /// - `ASTROCAL_UTC_OFFSET_MINUTES`: civil time zone offset (default: 0)
    /// - `ASTROCAL_LATITUDE`, `ASTROCAL_LONGITUDE`, `ASTROCAL_ELEVATION_M`:
    ///   default observer (default: Paris)
    /// - `ASTROCAL_CACHE_CAPACITY`: month indices kept in memory (default: 6)
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if a variable
    /// is set to an unparsable or out-of-range value.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::from_path(path.trim())?,
            _ => Self::default(),
        };
        config.apply_overrides(|key| env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup, then re-validate.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.host = host;
        }
        if let Some(port) = parse_var(&lookup, "PORT")? {
            self.port = port;
        }
        if let Some(path) = lookup("ASTROCAL_EPHEMERIS") {
            self.ephemeris_path = Some(PathBuf::from(path));
        }
        if let Some(offset) = parse_var(&lookup, "ASTROCAL_UTC_OFFSET_MINUTES")? {
            self.scan.utc_offset_minutes = offset;
        }
        if let Some(latitude) = parse_var(&lookup, "ASTROCAL_LATITUDE")? {
            self.observer.latitude = latitude;
        }
        if let Some(longitude) = parse_var(&lookup, "ASTROCAL_LONGITUDE")? {
            self.observer.longitude = longitude;
        }
        if let Some(elevation) = parse_var(&lookup, "ASTROCAL_ELEVATION_M")? {
            self.observer.elevation_m = elevation;
        }
        if let Some(capacity) = parse_var(&lookup, "ASTROCAL_CACHE_CAPACITY")? {
            self.scan.cache_capacity = capacity;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.observer
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        self.scan.validate()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv {
                key: key.to_string(),
                value: raw,
            }),
    }
}
