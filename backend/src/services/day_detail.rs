//! Observer-dependent detail of a selected day.
//!
//! These values are computed only for the day a user is looking at and are
//! never part of a month index.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use log::debug;
use serde::Serialize;

use crate::config::MAX_VISIBILITY_OFFSET_MINUTES;
use crate::ephemeris::{Direction, EphemerisProvider, EphemerisResult};
use crate::models::{sort_events, Body, CivilClock, Event, Observer};

use super::scanner::{percent, EventScanner};

/// Eight-way bucketing of the Moon's phase angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MoonPhaseName {
    NewMoon,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    FullMoon,
    WaningGibbous,
    LastQuarter,
    WaningCrescent,
}

impl MoonPhaseName {
    /// Bucket for a phase angle in [0, 360). Buckets are 45° wide, centred on
    /// multiples of 45°.
    pub fn from_phase(phase_deg: f64) -> Self {
        let phase = phase_deg.rem_euclid(360.0);
        if phase < 22.5 || phase > 337.5 {
            MoonPhaseName::NewMoon
        } else if phase < 67.5 {
            MoonPhaseName::WaxingCrescent
        } else if phase < 112.5 {
            MoonPhaseName::FirstQuarter
        } else if phase < 157.5 {
            MoonPhaseName::WaxingGibbous
        } else if phase < 202.5 {
            MoonPhaseName::FullMoon
        } else if phase < 247.5 {
            MoonPhaseName::WaningGibbous
        } else if phase < 292.5 {
            MoonPhaseName::LastQuarter
        } else {
            MoonPhaseName::WaningCrescent
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MoonPhaseName::NewMoon => "Nouvelle Lune",
            MoonPhaseName::WaxingCrescent => "Premier Croissant",
            MoonPhaseName::FirstQuarter => "Premier Quartier",
            MoonPhaseName::WaxingGibbous | MoonPhaseName::WaningGibbous => "Lune Gibbeuse",
            MoonPhaseName::FullMoon => "Pleine Lune",
            MoonPhaseName::LastQuarter => "Dernier Quartier",
            MoonPhaseName::WaningCrescent => "Dernier Croissant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoonPhaseStatus {
    pub phase_deg: f64,
    pub name: MoonPhaseName,
    pub illumination_pct: u8,
    /// e.g. `Lune Gibbeuse (78%)`
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ZodiacSign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

impl ZodiacSign {
    pub const ALL: [ZodiacSign; 12] = [
        ZodiacSign::Aries,
        ZodiacSign::Taurus,
        ZodiacSign::Gemini,
        ZodiacSign::Cancer,
        ZodiacSign::Leo,
        ZodiacSign::Virgo,
        ZodiacSign::Libra,
        ZodiacSign::Scorpio,
        ZodiacSign::Sagittarius,
        ZodiacSign::Capricorn,
        ZodiacSign::Aquarius,
        ZodiacSign::Pisces,
    ];

    /// 30° sector of the ecliptic holding the Sun.
    pub fn from_solar_longitude(longitude_deg: f64) -> Self {
        let sector = (longitude_deg.rem_euclid(360.0) / 30.0).floor() as usize;
        Self::ALL[sector % 12]
    }

    pub fn label(self) -> &'static str {
        match self {
            ZodiacSign::Aries => "Bélier",
            ZodiacSign::Taurus => "Taureau",
            ZodiacSign::Gemini => "Gémeaux",
            ZodiacSign::Cancer => "Cancer",
            ZodiacSign::Leo => "Lion",
            ZodiacSign::Virgo => "Vierge",
            ZodiacSign::Libra => "Balance",
            ZodiacSign::Scorpio => "Scorpion",
            ZodiacSign::Sagittarius => "Sagittaire",
            ZodiacSign::Capricorn => "Capricorne",
            ZodiacSign::Aquarius => "Verseau",
            ZodiacSign::Pisces => "Poissons",
        }
    }
}

/// Interval between two solar-altitude crossings. Either end may be missing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    /// `HH:MM - HH:MM` in civil time, `--:--` for a missing end.
    pub display: String,
}

impl TimeWindow {
    pub fn new(
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        clock: &CivilClock,
    ) -> Self {
        let fmt = |t: Option<DateTime<Utc>>| t.map_or_else(|| "--:--".to_string(), |t| clock.hhmm(t));
        Self {
            display: format!("{} - {}", fmt(start), fmt(end)),
            start,
            end,
        }
    }
}

/// Blue hour: Sun between -6° and -4°. Golden hour: between -4° and +6°.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhotoHours {
    pub morning_blue: TimeWindow,
    pub morning_golden: TimeWindow,
    pub evening_golden: TimeWindow,
    pub evening_blue: TimeWindow,
    /// Whole morning session, blue then golden.
    pub morning: TimeWindow,
    /// Whole evening session, golden then blue.
    pub evening: TimeWindow,
}

const BLUE_HOUR_LOW_DEG: f64 = -6.0;
const BLUE_GOLDEN_BOUNDARY_DEG: f64 = -4.0;
const GOLDEN_HOUR_HIGH_DEG: f64 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityWindow {
    Evening,
    Morning,
}

impl VisibilityWindow {
    pub fn label(self) -> &'static str {
        match self {
            VisibilityWindow::Evening => "Soir",
            VisibilityWindow::Morning => "Matin",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisiblePlanet {
    pub planet: Body,
    pub name: &'static str,
    pub window: VisibilityWindow,
    pub window_label: &'static str,
    pub altitude_deg: f64,
}

/// Everything shown for a selected day and observer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayDetail {
    pub date: NaiveDate,
    pub observer: Observer,
    /// Full scan including rise/set, sorted by time.
    pub events: Vec<Event>,
    pub moon: Option<MoonPhaseStatus>,
    pub zodiac: Option<ZodiacSign>,
    pub photo_hours: PhotoHours,
    pub visible_planets: Vec<VisiblePlanet>,
}

/// Scan `date` for `observer` and compute the observer-dependent extras.
pub fn build_day_detail(scanner: &EventScanner, date: NaiveDate, observer: &Observer) -> DayDetail {
    let mut events = scanner.scan_day(date, Some(observer));
    sort_events(&mut events);

    let sample = scanner.clock().at(date, scanner.config().sample_hour, 0);
    let provider = scanner.provider();

    DayDetail {
        date,
        observer: *observer,
        events,
        moon: logged("moon_phase", date, moon_status(provider, sample)),
        zodiac: logged(
            "zodiac",
            date,
            provider
                .ecliptic_longitude(Body::Sun, sample)
                .map(ZodiacSign::from_solar_longitude),
        ),
        photo_hours: photo_hours(scanner, date, observer),
        visible_planets: visible_planets(scanner, date, observer),
    }
}

fn logged<T>(what: &str, date: NaiveDate, result: EphemerisResult<T>) -> Option<T> {
    result
        .map_err(|err| debug!("{} unavailable for {}: {}", what, date, err))
        .ok()
}

fn moon_status(provider: &dyn EphemerisProvider, at: DateTime<Utc>) -> EphemerisResult<MoonPhaseStatus> {
    let phase_deg = provider.moon_phase(at)?;
    let illumination_pct = percent(provider.illumination(Body::Moon, at)?);
    let name = MoonPhaseName::from_phase(phase_deg);
    Ok(MoonPhaseStatus {
        phase_deg,
        name,
        illumination_pct,
        text: format!("{} ({}%)", name.label(), illumination_pct),
    })
}

fn photo_hours(scanner: &EventScanner, date: NaiveDate, observer: &Observer) -> PhotoHours {
    let clock = scanner.clock();
    let start = clock.midnight(date);
    let limit = scanner.config().search_limit_days;
    let crossing = |direction: Direction, altitude: f64| -> Option<DateTime<Utc>> {
        let found = scanner.provider().search_altitude(
            Body::Sun,
            observer,
            direction,
            start,
            limit,
            altitude,
        );
        logged("solar_altitude", date, found)
            .flatten()
            .filter(|t| clock.is_on(*t, date))
    };

    let blue_start = crossing(Direction::Rise, BLUE_HOUR_LOW_DEG);
    let morning_boundary = crossing(Direction::Rise, BLUE_GOLDEN_BOUNDARY_DEG);
    let golden_end = crossing(Direction::Rise, GOLDEN_HOUR_HIGH_DEG);
    let golden_start = crossing(Direction::Set, GOLDEN_HOUR_HIGH_DEG);
    let evening_boundary = crossing(Direction::Set, BLUE_GOLDEN_BOUNDARY_DEG);
    let blue_end = crossing(Direction::Set, BLUE_HOUR_LOW_DEG);

    PhotoHours {
        morning_blue: TimeWindow::new(blue_start, morning_boundary, &clock),
        morning_golden: TimeWindow::new(morning_boundary, golden_end, &clock),
        evening_golden: TimeWindow::new(golden_start, evening_boundary, &clock),
        evening_blue: TimeWindow::new(evening_boundary, blue_end, &clock),
        morning: TimeWindow::new(blue_start, golden_end, &clock),
        evening: TimeWindow::new(golden_start, blue_end, &clock),
    }
}

/// Bright planets above the configured altitude shortly after sunset, or
/// failing that shortly before sunrise.
fn visible_planets(scanner: &EventScanner, date: NaiveDate, observer: &Observer) -> Vec<VisiblePlanet> {
    let provider = scanner.provider();
    let config = scanner.config();
    let start = scanner.clock().midnight(date);
    let limit = config.search_limit_days;

    let sunset = logged(
        "sunset",
        date,
        provider.search_rise_set(Body::Sun, observer, Direction::Set, start, limit),
    )
    .flatten();
    let sunrise = logged(
        "sunrise",
        date,
        provider.search_rise_set(Body::Sun, observer, Direction::Rise, start, limit),
    )
    .flatten();
    let (Some(sunset), Some(sunrise)) = (sunset, sunrise) else {
        return Vec::new();
    };

    let offset = Duration::minutes(
        config
            .visibility_offset_minutes
            .clamp(0, MAX_VISIBILITY_OFFSET_MINUTES),
    );
    let (Some(evening), Some(morning)) = (
        sunset.checked_add_signed(offset),
        sunrise.checked_sub_signed(offset),
    ) else {
        return Vec::new();
    };
    let min_altitude = config.visibility_min_altitude_deg;

    Body::BRIGHT_PLANETS
        .into_iter()
        .filter_map(|planet| {
            let check = || -> EphemerisResult<Option<(VisibilityWindow, f64)>> {
                let alt = provider.altitude(planet, observer, evening)?;
                if alt > min_altitude {
                    return Ok(Some((VisibilityWindow::Evening, alt)));
                }
                let alt = provider.altitude(planet, observer, morning)?;
                Ok((alt > min_altitude).then_some((VisibilityWindow::Morning, alt)))
            };
            let (window, altitude_deg) = logged("planet_visibility", date, check()).flatten()?;
            Some(VisiblePlanet {
                planet,
                name: planet.label(),
                window,
                window_label: window.label(),
                altitude_deg,
            })
        })
        .collect()
}
