#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use astrocal::ephemeris::{
    Direction, EclipseEvent, EphemerisError, EphemerisProvider, EphemerisResult, LunarApsis,
    MaxElongation, QuarterEvent, Seasons,
};
use astrocal::models::{Body, CivilClock, Observer};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// Restores the previous values on drop, including on panic, and serializes
/// callers so parallel tests do not see each other's variables.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

// =============================================================================
// Scripted ephemeris
// =============================================================================

type Signal = Box<dyn Fn(DateTime<Utc>) -> f64 + Send + Sync>;

/// Provider answering from scripted instants and signal functions.
///
/// Searches return the first scripted instant in `[start, start + limit]`
/// (or after `start` for searches without a limit). Separations and
/// elongations default to 90°, far from every threshold.
#[derive(Default)]
pub struct ScriptedEphemeris {
    rise_set: HashMap<(Body, Direction), Vec<DateTime<Utc>>>,
    altitude_crossings: HashMap<(Direction, i32), Vec<DateTime<Utc>>>,
    quarters: Vec<QuarterEvent>,
    apsides: Vec<LunarApsis>,
    seasons: HashMap<i32, Seasons>,
    separations: HashMap<(Body, Body), Signal>,
    elongations: HashMap<Body, Signal>,
    solar_conjunctions: HashMap<Body, Vec<DateTime<Utc>>>,
    max_elongations: HashMap<Body, Vec<MaxElongation>>,
    eclipses: Vec<EclipseEvent>,
    altitudes: HashMap<Body, f64>,
    sun_longitude: Option<f64>,
    failing: HashSet<&'static str>,
    separation_calls: AtomicUsize,
}

fn window_end(start: DateTime<Utc>, limit_days: f64) -> DateTime<Utc> {
    start
        .checked_add_signed(Duration::seconds((limit_days * 86_400.0) as i64))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

fn first_in_window(
    instants: Option<&Vec<DateTime<Utc>>>,
    start: DateTime<Utc>,
    limit_days: f64,
) -> Option<DateTime<Utc>> {
    let end = window_end(start, limit_days);
    instants?
        .iter()
        .copied()
        .filter(|t| *t >= start && *t <= end)
        .min()
}

impl ScriptedEphemeris {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rise_set(mut self, body: Body, direction: Direction, at: DateTime<Utc>) -> Self {
        self.rise_set.entry((body, direction)).or_default().push(at);
        self
    }

    pub fn with_altitude_crossing(
        mut self,
        direction: Direction,
        altitude_deg: i32,
        at: DateTime<Utc>,
    ) -> Self {
        self.altitude_crossings
            .entry((direction, altitude_deg))
            .or_default()
            .push(at);
        self
    }

    pub fn with_quarter(mut self, quarter: astrocal::models::MoonQuarter, time: DateTime<Utc>) -> Self {
        self.quarters.push(QuarterEvent { time, quarter });
        self.quarters.sort_by_key(|q| q.time);
        self
    }

    pub fn with_apsis(
        mut self,
        kind: astrocal::models::ApsisKind,
        time: DateTime<Utc>,
        distance_km: f64,
    ) -> Self {
        self.apsides.push(LunarApsis {
            time,
            kind,
            distance_km,
        });
        self.apsides.sort_by_key(|a| a.time);
        self
    }

    pub fn with_seasons(mut self, year: i32, seasons: Seasons) -> Self {
        self.seasons.insert(year, seasons);
        self
    }

    pub fn with_separation<F>(mut self, a: Body, b: Body, f: F) -> Self
    where
        F: Fn(DateTime<Utc>) -> f64 + Send + Sync + 'static,
    {
        self.separations.insert((a, b), Box::new(f));
        self
    }

    pub fn with_elongation<F>(mut self, body: Body, f: F) -> Self
    where
        F: Fn(DateTime<Utc>) -> f64 + Send + Sync + 'static,
    {
        self.elongations.insert(body, Box::new(f));
        self
    }

    pub fn with_solar_conjunction(mut self, body: Body, at: DateTime<Utc>) -> Self {
        self.solar_conjunctions.entry(body).or_default().push(at);
        self
    }

    pub fn with_max_elongation(mut self, body: Body, at: DateTime<Utc>, elongation_deg: f64) -> Self {
        self.max_elongations.entry(body).or_default().push(MaxElongation {
            time: at,
            elongation_deg,
        });
        self
    }

    pub fn with_eclipse(mut self, eclipse: EclipseEvent) -> Self {
        self.eclipses.push(eclipse);
        self.eclipses.sort_by_key(|e| e.peak);
        self
    }

    pub fn with_altitude(mut self, body: Body, altitude_deg: f64) -> Self {
        self.altitudes.insert(body, altitude_deg);
        self
    }

    pub fn with_sun_longitude(mut self, longitude_deg: f64) -> Self {
        self.sun_longitude = Some(longitude_deg);
        self
    }

    /// Make the named trait method return an error.
    pub fn failing(mut self, method: &'static str) -> Self {
        self.failing.insert(method);
        self
    }

    pub fn separation_calls(&self) -> usize {
        self.separation_calls.load(Ordering::SeqCst)
    }

    fn check(&self, method: &'static str) -> EphemerisResult<()> {
        if self.failing.contains(method) {
            Err(EphemerisError::Computation(format!("{} unavailable", method)))
        } else {
            Ok(())
        }
    }
}

impl EphemerisProvider for ScriptedEphemeris {
    fn moon_phase(&self, at: DateTime<Utc>) -> EphemerisResult<f64> {
        self.check("moon_phase")?;
        // 29.53-day synodic month with new moon at 2024-01-11 11:57 UTC.
        let epoch = Utc.with_ymd_and_hms(2024, 1, 11, 11, 57, 0).unwrap();
        let days = (at - epoch).num_seconds() as f64 / 86_400.0;
        Ok((days / 29.530_588 * 360.0).rem_euclid(360.0))
    }

    fn illumination(&self, body: Body, at: DateTime<Utc>) -> EphemerisResult<f64> {
        self.check("illumination")?;
        if body != Body::Moon {
            return Ok(1.0);
        }
        let phase = self.moon_phase(at)?.to_radians();
        Ok((1.0 - phase.cos()) / 2.0)
    }

    fn search_rise_set(
        &self,
        body: Body,
        _observer: &Observer,
        direction: Direction,
        start: DateTime<Utc>,
        limit_days: f64,
    ) -> EphemerisResult<Option<DateTime<Utc>>> {
        self.check("search_rise_set")?;
        Ok(first_in_window(
            self.rise_set.get(&(body, direction)),
            start,
            limit_days,
        ))
    }

    fn search_lunar_apsis(&self, start: DateTime<Utc>) -> EphemerisResult<Option<LunarApsis>> {
        self.check("search_lunar_apsis")?;
        Ok(self.apsides.iter().find(|a| a.time >= start).copied())
    }

    fn search_moon_quarter(&self, start: DateTime<Utc>) -> EphemerisResult<Option<QuarterEvent>> {
        self.check("search_moon_quarter")?;
        Ok(self.quarters.iter().find(|q| q.time >= start).copied())
    }

    fn seasons(&self, year: i32) -> EphemerisResult<Seasons> {
        self.check("seasons")?;
        self.seasons
            .get(&year)
            .copied()
            .ok_or_else(|| EphemerisError::Computation(format!("no seasons for {}", year)))
    }

    fn search_relative_longitude(
        &self,
        body: Body,
        _angle_deg: f64,
        start: DateTime<Utc>,
        limit_days: f64,
    ) -> EphemerisResult<Option<DateTime<Utc>>> {
        self.check("search_relative_longitude")?;
        Ok(first_in_window(
            self.solar_conjunctions.get(&body),
            start,
            limit_days,
        ))
    }

    fn separation(&self, a: Body, b: Body, at: DateTime<Utc>) -> EphemerisResult<f64> {
        self.check("separation")?;
        self.separation_calls.fetch_add(1, Ordering::SeqCst);
        let signal = self
            .separations
            .get(&(a, b))
            .or_else(|| self.separations.get(&(b, a)));
        Ok(signal.map_or(90.0, |f| f(at)))
    }

    fn elongation(&self, body: Body, at: DateTime<Utc>) -> EphemerisResult<f64> {
        self.check("elongation")?;
        Ok(self.elongations.get(&body).map_or(90.0, |f| f(at)))
    }

    fn search_max_elongation(
        &self,
        body: Body,
        start: DateTime<Utc>,
        limit_days: f64,
    ) -> EphemerisResult<Option<MaxElongation>> {
        self.check("search_max_elongation")?;
        let end = window_end(start, limit_days);
        Ok(self
            .max_elongations
            .get(&body)
            .and_then(|all| {
                all.iter()
                    .filter(|m| m.time >= start && m.time <= end)
                    .min_by_key(|m| m.time)
            })
            .copied())
    }

    fn ecliptic_longitude(&self, body: Body, _at: DateTime<Utc>) -> EphemerisResult<f64> {
        self.check("ecliptic_longitude")?;
        match (body, self.sun_longitude) {
            (Body::Sun, Some(lon)) => Ok(lon),
            _ => Err(EphemerisError::UnsupportedBody(body)),
        }
    }

    fn altitude(&self, body: Body, _observer: &Observer, _at: DateTime<Utc>) -> EphemerisResult<f64> {
        self.check("altitude")?;
        Ok(self.altitudes.get(&body).copied().unwrap_or(-10.0))
    }

    fn search_altitude(
        &self,
        _body: Body,
        _observer: &Observer,
        direction: Direction,
        start: DateTime<Utc>,
        limit_days: f64,
        altitude_deg: f64,
    ) -> EphemerisResult<Option<DateTime<Utc>>> {
        self.check("search_altitude")?;
        Ok(first_in_window(
            self.altitude_crossings
                .get(&(direction, altitude_deg.round() as i32)),
            start,
            limit_days,
        ))
    }

    fn search_global_solar_eclipse(
        &self,
        start: DateTime<Utc>,
    ) -> EphemerisResult<Option<EclipseEvent>> {
        self.check("search_global_solar_eclipse")?;
        Ok(self
            .eclipses
            .iter()
            .find(|e| e.body == astrocal::models::EclipseBody::Solar && e.peak >= start)
            .copied())
    }

    fn search_lunar_eclipse(&self, start: DateTime<Utc>) -> EphemerisResult<Option<EclipseEvent>> {
        self.check("search_lunar_eclipse")?;
        Ok(self
            .eclipses
            .iter()
            .find(|e| e.body == astrocal::models::EclipseBody::Lunar && e.peak >= start)
            .copied())
    }
}

// =============================================================================
// Fixtures
// =============================================================================

pub fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Central European Summer Time.
pub fn cest() -> CivilClock {
    CivilClock::from_offset_minutes(120).unwrap()
}

/// Central European Time.
pub fn cet() -> CivilClock {
    CivilClock::from_offset_minutes(60).unwrap()
}

/// Equinoxes and solstices of 2024.
pub fn seasons_2024() -> Seasons {
    Seasons {
        march_equinox: utc(2024, 3, 20, 3, 6),
        june_solstice: utc(2024, 6, 20, 20, 51),
        september_equinox: utc(2024, 9, 22, 12, 44),
        december_solstice: utc(2024, 12, 21, 9, 20),
    }
}

/// Days-from-instant helper for signal closures.
pub fn days_between(a: DateTime<Utc>, b: DateTime<Utc>) -> f64 {
    (a - b).num_seconds() as f64 / 86_400.0
}
