//! Ephemeris collaborator contract.
//!
//! The calendar never computes positions itself. Everything numerical comes
//! through [`EphemerisProvider`]; the engine only samples scalar signals and
//! compares the calendar dates of the instants it gets back.
//!
//! A search that legitimately finds nothing returns `Ok(None)`. An `Err` means
//! the provider could not answer (body not covered, instant out of range, ...).
//! Callers treat both the same way: the check that asked produces no event.

pub mod search;
pub mod tabulated;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{ApsisKind, Body, EclipseBody, EclipseKind, MoonQuarter, Observer, SeasonKind};

pub use tabulated::TabulatedEphemeris;

/// Result type for ephemeris queries.
pub type EphemerisResult<T> = Result<T, EphemerisError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EphemerisError {
    /// The provider has no data for this body.
    #[error("Body {0:?} is not covered by the ephemeris")]
    UnsupportedBody(Body),

    /// The instant lies outside the provider's time coverage.
    #[error("Instant {0} is outside the ephemeris coverage")]
    OutOfRange(DateTime<Utc>),

    /// Any other failure inside the provider.
    #[error("Ephemeris computation failed: {0}")]
    Computation(String),
}

/// Whether a search looks for the body rising or setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Rise,
    Set,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuarterEvent {
    pub time: DateTime<Utc>,
    pub quarter: MoonQuarter,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LunarApsis {
    pub time: DateTime<Utc>,
    pub kind: ApsisKind,
    pub distance_km: f64,
}

/// Greatest angular distance of an inner planet from the Sun.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MaxElongation {
    pub time: DateTime<Utc>,
    pub elongation_deg: f64,
}

/// Equinox and solstice instants of one year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Seasons {
    pub march_equinox: DateTime<Utc>,
    pub june_solstice: DateTime<Utc>,
    pub september_equinox: DateTime<Utc>,
    pub december_solstice: DateTime<Utc>,
}

impl Seasons {
    pub fn instants(&self) -> [(SeasonKind, DateTime<Utc>); 4] {
        [
            (SeasonKind::MarchEquinox, self.march_equinox),
            (SeasonKind::JuneSolstice, self.june_solstice),
            (SeasonKind::SeptemberEquinox, self.september_equinox),
            (SeasonKind::DecemberSolstice, self.december_solstice),
        ]
    }
}

/// Peak of a global solar or lunar eclipse.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EclipseEvent {
    pub body: EclipseBody,
    pub kind: EclipseKind,
    pub peak: DateTime<Utc>,
}

/// Source of raw positions, illumination and primitive searches.
///
/// Angles are in degrees. `limit_days` bounds how far a search may look past
/// `start`; providers may still return an instant on an adjacent civil day,
/// which is why callers check the calendar date of every result.
pub trait EphemerisProvider: Send + Sync {
    /// Sun–Moon ecliptic longitude difference in [0, 360).
    fn moon_phase(&self, at: DateTime<Utc>) -> EphemerisResult<f64>;

    /// Illuminated fraction of the disc in [0, 1].
    fn illumination(&self, body: Body, at: DateTime<Utc>) -> EphemerisResult<f64>;

    fn search_rise_set(
        &self,
        body: Body,
        observer: &Observer,
        direction: Direction,
        start: DateTime<Utc>,
        limit_days: f64,
    ) -> EphemerisResult<Option<DateTime<Utc>>>;

    /// Next lunar perigee or apogee after `start`.
    fn search_lunar_apsis(&self, start: DateTime<Utc>) -> EphemerisResult<Option<LunarApsis>>;

    /// Next principal lunar phase after `start`.
    fn search_moon_quarter(&self, start: DateTime<Utc>) -> EphemerisResult<Option<QuarterEvent>>;

    fn seasons(&self, year: i32) -> EphemerisResult<Seasons>;

    /// Next instant the body's longitude minus the Sun's equals `angle_deg`.
    fn search_relative_longitude(
        &self,
        body: Body,
        angle_deg: f64,
        start: DateTime<Utc>,
        limit_days: f64,
    ) -> EphemerisResult<Option<DateTime<Utc>>>;

    /// Geocentric angular distance between two bodies.
    fn separation(&self, a: Body, b: Body, at: DateTime<Utc>) -> EphemerisResult<f64>;

    /// Angular distance from the Sun.
    fn elongation(&self, body: Body, at: DateTime<Utc>) -> EphemerisResult<f64>;

    /// Geocentric ecliptic longitude in [0, 360).
    fn ecliptic_longitude(&self, body: Body, at: DateTime<Utc>) -> EphemerisResult<f64>;

    /// Next local maximum of the body's elongation within `limit_days`.
    fn search_max_elongation(
        &self,
        body: Body,
        start: DateTime<Utc>,
        limit_days: f64,
    ) -> EphemerisResult<Option<MaxElongation>>;

    /// Altitude above the observer's horizon.
    fn altitude(&self, body: Body, observer: &Observer, at: DateTime<Utc>) -> EphemerisResult<f64>;

    /// Next instant the body crosses `altitude_deg` in the given direction.
    fn search_altitude(
        &self,
        body: Body,
        observer: &Observer,
        direction: Direction,
        start: DateTime<Utc>,
        limit_days: f64,
        altitude_deg: f64,
    ) -> EphemerisResult<Option<DateTime<Utc>>>;

    fn search_global_solar_eclipse(
        &self,
        start: DateTime<Utc>,
    ) -> EphemerisResult<Option<EclipseEvent>>;

    fn search_lunar_eclipse(&self, start: DateTime<Utc>) -> EphemerisResult<Option<EclipseEvent>>;
}
