//! Ephemeris backed by a table of sampled geocentric positions.
//!
//! The table is produced offline by a full ephemeris (for example a JPL
//! Horizons export) and loaded from JSON:
//!
//! ```json
//! {
//!   "start": "2024-01-01T00:00:00Z",
//!   "step_minutes": 60,
//!   "bodies": {
//!     "Sun":  [[ra_deg, dec_deg, distance_km], ...],
//!     "Moon": [[ra_deg, dec_deg, distance_km], ...]
//!   },
//!   "eclipses": [
//!     { "body": "solar", "kind": "total", "peak": "2024-04-08T18:17:00Z" }
//!   ]
//! }
//! ```
//!
//! Positions between samples are interpolated linearly on the unit sphere.
//! Searches are coarse scan + bisection over the interpolated signal, so the
//! table step bounds their accuracy. Eclipses are taken from the recorded list
//! as-is.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::Deserialize;

use super::search::{find_crossing, normalize_to_pm180, Crossing};
use super::{
    Direction, EclipseEvent, EphemerisError, EphemerisProvider, EphemerisResult, LunarApsis,
    MaxElongation, QuarterEvent, Seasons,
};
use crate::models::time::modified_julian_date;
use crate::models::{ApsisKind, Body, EclipseBody, MoonQuarter, Observer, SeasonKind};

/// Mean obliquity of the ecliptic at J2000.
const OBLIQUITY_DEG: f64 = 23.439_291_1;

/// Altitude of the upper limb at rise/set including refraction.
const SUN_HORIZON_DEG: f64 = -0.8333;
const MOON_HORIZON_DEG: f64 = 0.125;
const STAR_HORIZON_DEG: f64 = -0.5667;

const HORIZON_STEP_MINUTES: i64 = 10;
const PHASE_STEP_HOURS: i64 = 6;
const QUARTER_LIMIT_DAYS: f64 = 10.0;
const APSIS_LIMIT_DAYS: f64 = 32.0;
const APSIS_HALF_SPAN_MINUTES: i64 = 30;
const SEASON_LIMIT_DAYS: f64 = 45.0;
const RELATIVE_LONGITUDE_STEP_HOURS: i64 = 12;
const ELONGATION_STEP_HOURS: i64 = 6;
const ELONGATION_HALF_SPAN_MINUTES: i64 = 30;

#[derive(Debug, Deserialize)]
struct TableInput {
    start: DateTime<Utc>,
    step_minutes: i64,
    bodies: BTreeMap<String, Vec<[f64; 3]>>,
    #[serde(default)]
    eclipses: Vec<EclipseEvent>,
}

#[derive(Debug, Clone, Copy)]
struct Sample {
    /// Unit vector, equatorial frame
    dir: [f64; 3],
    distance_km: f64,
}

impl Sample {
    fn from_row([ra_deg, dec_deg, distance_km]: [f64; 3]) -> Self {
        let (ra, dec) = (ra_deg.to_radians(), dec_deg.to_radians());
        Self {
            dir: [dec.cos() * ra.cos(), dec.cos() * ra.sin(), dec.sin()],
            distance_km,
        }
    }

    fn position_km(&self) -> [f64; 3] {
        scale(self.dir, self.distance_km)
    }

    fn right_ascension_deg(&self) -> f64 {
        self.dir[1].atan2(self.dir[0]).to_degrees().rem_euclid(360.0)
    }

    fn declination_deg(&self) -> f64 {
        self.dir[2].clamp(-1.0, 1.0).asin().to_degrees()
    }

    fn ecliptic_longitude_deg(&self) -> f64 {
        let eps = OBLIQUITY_DEG.to_radians();
        let [x, y, z] = self.dir;
        let y_ecl = y * eps.cos() + z * eps.sin();
        y_ecl.atan2(x).to_degrees().rem_euclid(360.0)
    }
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn norm(a: [f64; 3]) -> f64 {
    dot(a, a).sqrt()
}

fn scale(a: [f64; 3], k: f64) -> [f64; 3] {
    [a[0] * k, a[1] * k, a[2] * k]
}

fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

/// Angle between two vectors in degrees, stable near 0 and 180.
fn angle_between(a: [f64; 3], b: [f64; 3]) -> f64 {
    let cross = [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ];
    norm(cross).atan2(dot(a, b)).to_degrees()
}

/// Sampled-position ephemeris. See the module docs for the input format.
#[derive(Debug, Clone)]
pub struct TabulatedEphemeris {
    start: DateTime<Utc>,
    step: Duration,
    series: BTreeMap<Body, Vec<Sample>>,
    eclipses: Vec<EclipseEvent>,
}

impl TabulatedEphemeris {
    /// Build from `[ra_deg, dec_deg, distance_km]` rows sampled every `step`.
    pub fn new(
        start: DateTime<Utc>,
        step: Duration,
        rows: BTreeMap<Body, Vec<[f64; 3]>>,
        mut eclipses: Vec<EclipseEvent>,
    ) -> Result<Self> {
        if step <= Duration::zero() {
            bail!("Sample step must be positive");
        }
        if !rows.contains_key(&Body::Sun) {
            bail!("Ephemeris table must contain the Sun");
        }
        let mut series = BTreeMap::new();
        for (body, body_rows) in rows {
            if body_rows.len() < 2 {
                bail!("Body {:?} needs at least two samples", body);
            }
            if body_rows.iter().flatten().any(|v| !v.is_finite()) {
                bail!("Body {:?} has non-finite samples", body);
            }
            series.insert(body, body_rows.into_iter().map(Sample::from_row).collect());
        }
        eclipses.sort_by_key(|e| e.peak);

        Ok(Self {
            start,
            step,
            series,
            eclipses,
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let input: TableInput = serde_json::from_str(json).context("Invalid ephemeris JSON")?;
        let mut rows = BTreeMap::new();
        for (name, body_rows) in input.bodies {
            let body: Body = name
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))
                .with_context(|| format!("Invalid body key '{}'", name))?;
            rows.insert(body, body_rows);
        }
        Self::new(
            input.start,
            Duration::minutes(input.step_minutes),
            rows,
            input.eclipses,
        )
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read ephemeris table {}", path.display()))?;
        Self::from_json_str(&json)
            .with_context(|| format!("Failed to load ephemeris table {}", path.display()))
    }

    /// Time span over which every tabulated body can be evaluated.
    pub fn coverage(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let samples = self.series.values().map(Vec::len).min().unwrap_or(1);
        let last = i32::try_from(samples.saturating_sub(1)).unwrap_or(i32::MAX);
        (self.start, self.start + self.step * last)
    }

    pub fn bodies(&self) -> impl Iterator<Item = Body> + '_ {
        self.series.keys().copied()
    }

    fn sample(&self, body: Body, at: DateTime<Utc>) -> EphemerisResult<Sample> {
        let series = self
            .series
            .get(&body)
            .ok_or(EphemerisError::UnsupportedBody(body))?;
        let offset_ms = (at - self.start).num_milliseconds();
        let step_ms = self.step.num_milliseconds();
        if offset_ms < 0 {
            return Err(EphemerisError::OutOfRange(at));
        }
        let idx = usize::try_from(offset_ms / step_ms).map_err(|_| EphemerisError::OutOfRange(at))?;
        let frac = (offset_ms % step_ms) as f64 / step_ms as f64;

        let a = series.get(idx).ok_or(EphemerisError::OutOfRange(at))?;
        if frac == 0.0 {
            return Ok(*a);
        }
        let b = series.get(idx + 1).ok_or(EphemerisError::OutOfRange(at))?;

        let mixed = [
            a.dir[0] * (1.0 - frac) + b.dir[0] * frac,
            a.dir[1] * (1.0 - frac) + b.dir[1] * frac,
            a.dir[2] * (1.0 - frac) + b.dir[2] * frac,
        ];
        let len = norm(mixed);
        if len < 1e-12 {
            return Err(EphemerisError::Computation(format!(
                "degenerate interpolation for {:?} at {}",
                body, at
            )));
        }
        Ok(Sample {
            dir: scale(mixed, 1.0 / len),
            distance_km: a.distance_km * (1.0 - frac) + b.distance_km * frac,
        })
    }

    fn horizon_for(body: Body) -> f64 {
        match body {
            Body::Sun => SUN_HORIZON_DEG,
            Body::Moon => MOON_HORIZON_DEG,
            _ => STAR_HORIZON_DEG,
        }
    }

    fn moon_distance_rate(&self, at: DateTime<Utc>) -> EphemerisResult<f64> {
        let (behind, ahead) = around(at, Duration::minutes(APSIS_HALF_SPAN_MINUTES))?;
        Ok(self.sample(Body::Moon, ahead)?.distance_km - self.sample(Body::Moon, behind)?.distance_km)
    }

    fn elongation_rate(&self, body: Body, at: DateTime<Utc>) -> EphemerisResult<f64> {
        let (behind, ahead) = around(at, Duration::minutes(ELONGATION_HALF_SPAN_MINUTES))?;
        Ok(self.elongation(body, ahead)? - self.elongation(body, behind)?)
    }

    fn next_eclipse(
        &self,
        body: EclipseBody,
        start: DateTime<Utc>,
    ) -> EphemerisResult<Option<EclipseEvent>> {
        Ok(self
            .eclipses
            .iter()
            .find(|e| e.body == body && e.peak >= start)
            .copied())
    }
}

impl EphemerisProvider for TabulatedEphemeris {
    fn moon_phase(&self, at: DateTime<Utc>) -> EphemerisResult<f64> {
        let moon = self.sample(Body::Moon, at)?.ecliptic_longitude_deg();
        let sun = self.sample(Body::Sun, at)?.ecliptic_longitude_deg();
        Ok((moon - sun).rem_euclid(360.0))
    }

    fn illumination(&self, body: Body, at: DateTime<Utc>) -> EphemerisResult<f64> {
        if body == Body::Sun {
            return Ok(1.0);
        }
        let sun = self.sample(Body::Sun, at)?.position_km();
        let target = self.sample(body, at)?.position_km();
        // Phase angle at the body, between the directions to the Earth and the Sun.
        let to_earth = scale(target, -1.0);
        let to_sun = sub(sun, target);
        let phase_angle = angle_between(to_earth, to_sun).to_radians();
        Ok((1.0 + phase_angle.cos()) / 2.0)
    }

    fn search_rise_set(
        &self,
        body: Body,
        observer: &Observer,
        direction: Direction,
        start: DateTime<Utc>,
        limit_days: f64,
    ) -> EphemerisResult<Option<DateTime<Utc>>> {
        self.search_altitude(
            body,
            observer,
            direction,
            start,
            limit_days,
            Self::horizon_for(body),
        )
    }

    fn search_lunar_apsis(&self, start: DateTime<Utc>) -> EphemerisResult<Option<LunarApsis>> {
        let found = find_crossing(
            |t| self.moon_distance_rate(t),
            start,
            APSIS_LIMIT_DAYS,
            Duration::hours(PHASE_STEP_HOURS),
            Crossing::Either,
        )?;
        let Some(time) = found else {
            return Ok(None);
        };
        // Distance was shrinking just before a perigee.
        let (before, _) = around(time, Duration::hours(1))?;
        let kind = if self.moon_distance_rate(before)? < 0.0 {
            ApsisKind::Perigee
        } else {
            ApsisKind::Apogee
        };
        Ok(Some(LunarApsis {
            time,
            kind,
            distance_km: self.sample(Body::Moon, time)?.distance_km,
        }))
    }

    fn search_moon_quarter(&self, start: DateTime<Utc>) -> EphemerisResult<Option<QuarterEvent>> {
        let phase = self.moon_phase(start)?;
        let next_index = ((phase / 90.0).floor() as u8 + 1) % 4;
        let quarter = MoonQuarter::from_index(next_index).ok_or_else(|| {
            EphemerisError::Computation(format!("no quarter after phase {}", phase))
        })?;
        let target = f64::from(next_index) * 90.0;
        let found = find_crossing(
            |t| Ok(normalize_to_pm180(self.moon_phase(t)? - target)),
            start,
            QUARTER_LIMIT_DAYS,
            Duration::hours(PHASE_STEP_HOURS),
            Crossing::Rising,
        )?;
        Ok(found.map(|time| QuarterEvent { time, quarter }))
    }

    fn seasons(&self, year: i32) -> EphemerisResult<Seasons> {
        let mut instants = Vec::with_capacity(4);
        for (season, month) in SeasonKind::ALL.into_iter().zip([3u32, 6, 9, 12]) {
            let search_start = Utc
                .with_ymd_and_hms(year, month, 1, 0, 0, 0)
                .single()
                .ok_or_else(|| EphemerisError::Computation(format!("invalid year {}", year)))?;
            let target = season.solar_longitude_deg();
            let found = find_crossing(
                |t| Ok(normalize_to_pm180(self.ecliptic_longitude(Body::Sun, t)? - target)),
                search_start,
                SEASON_LIMIT_DAYS,
                Duration::days(1),
                Crossing::Rising,
            )?;
            let instant = found.ok_or_else(|| {
                EphemerisError::Computation(format!("{:?} {} not found", season, year))
            })?;
            instants.push(instant);
        }
        Ok(Seasons {
            march_equinox: instants[0],
            june_solstice: instants[1],
            september_equinox: instants[2],
            december_solstice: instants[3],
        })
    }

    fn search_relative_longitude(
        &self,
        body: Body,
        angle_deg: f64,
        start: DateTime<Utc>,
        limit_days: f64,
    ) -> EphemerisResult<Option<DateTime<Utc>>> {
        find_crossing(
            |t| {
                let lon = self.ecliptic_longitude(body, t)?;
                let sun = self.ecliptic_longitude(Body::Sun, t)?;
                Ok(normalize_to_pm180(lon - sun - angle_deg))
            },
            start,
            limit_days,
            Duration::hours(RELATIVE_LONGITUDE_STEP_HOURS),
            Crossing::Either,
        )
    }

    fn separation(&self, a: Body, b: Body, at: DateTime<Utc>) -> EphemerisResult<f64> {
        let sa = self.sample(a, at)?;
        let sb = self.sample(b, at)?;
        Ok(angle_between(sa.dir, sb.dir))
    }

    fn elongation(&self, body: Body, at: DateTime<Utc>) -> EphemerisResult<f64> {
        self.separation(body, Body::Sun, at)
    }

    fn search_max_elongation(
        &self,
        body: Body,
        start: DateTime<Utc>,
        limit_days: f64,
    ) -> EphemerisResult<Option<MaxElongation>> {
        // Growing elongation turning into shrinking elongation.
        let found = find_crossing(
            |t| self.elongation_rate(body, t),
            start,
            limit_days,
            Duration::hours(ELONGATION_STEP_HOURS),
            Crossing::Falling,
        )?;
        let Some(time) = found else {
            return Ok(None);
        };
        Ok(Some(MaxElongation {
            time,
            elongation_deg: self.elongation(body, time)?,
        }))
    }

    fn ecliptic_longitude(&self, body: Body, at: DateTime<Utc>) -> EphemerisResult<f64> {
        Ok(self.sample(body, at)?.ecliptic_longitude_deg())
    }

    fn altitude(&self, body: Body, observer: &Observer, at: DateTime<Utc>) -> EphemerisResult<f64> {
        let s = self.sample(body, at)?;
        let jd_ut = modified_julian_date(at) + 2_400_000.5;
        let gmst = (280.460_618_37 + 360.985_647_366_29 * (jd_ut - 2_451_545.0)).rem_euclid(360.0);
        let hour_angle = (gmst + observer.longitude - s.right_ascension_deg()).to_radians();
        let (lat, dec) = (observer.latitude.to_radians(), s.declination_deg().to_radians());
        let sin_alt = lat.sin() * dec.sin() + lat.cos() * dec.cos() * hour_angle.cos();
        Ok(sin_alt.clamp(-1.0, 1.0).asin().to_degrees())
    }

    fn search_altitude(
        &self,
        body: Body,
        observer: &Observer,
        direction: Direction,
        start: DateTime<Utc>,
        limit_days: f64,
        altitude_deg: f64,
    ) -> EphemerisResult<Option<DateTime<Utc>>> {
        let crossing = match direction {
            Direction::Rise => Crossing::Rising,
            Direction::Set => Crossing::Falling,
        };
        find_crossing(
            |t| Ok(self.altitude(body, observer, t)? - altitude_deg),
            start,
            limit_days,
            Duration::minutes(HORIZON_STEP_MINUTES),
            crossing,
        )
    }

    fn search_global_solar_eclipse(
        &self,
        start: DateTime<Utc>,
    ) -> EphemerisResult<Option<EclipseEvent>> {
        self.next_eclipse(EclipseBody::Solar, start)
    }

    fn search_lunar_eclipse(&self, start: DateTime<Utc>) -> EphemerisResult<Option<EclipseEvent>> {
        self.next_eclipse(EclipseBody::Lunar, start)
    }
}

/// `at - half` and `at + half`, or out of range near the calendar limits.
fn around(at: DateTime<Utc>, half: Duration) -> EphemerisResult<(DateTime<Utc>, DateTime<Utc>)> {
    match (at.checked_sub_signed(half), at.checked_add_signed(half)) {
        (Some(behind), Some(ahead)) => Ok((behind, ahead)),
        _ => Err(EphemerisError::OutOfRange(at)),
    }
}
