//! Single-day event scan.
//!
//! Every category is an independent check against the ephemeris. A check that
//! fails or finds nothing contributes no event; the day's result is whatever
//! the other checks produced.

use std::fmt::Display;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use log::debug;

use crate::config::ScanConfig;
use crate::ephemeris::{Direction, EphemerisProvider, EphemerisResult};
use crate::models::{Body, CivilClock, Event, EventKind, Observer};

use super::extremum::ExtremumDetector;
use super::rules::{meteor_shower_on, signal_rules, SignalRule};

/// How far past yesterday's midnight a solar-conjunction search looks.
const SOLAR_CONJUNCTION_LIMIT_DAYS: f64 = 3.0;

/// How far past yesterday's midnight a greatest-elongation search looks.
const MAX_ELONGATION_LIMIT_DAYS: f64 = 3.0;

/// Produces the events of one civil day.
pub struct EventScanner {
    provider: Arc<dyn EphemerisProvider>,
    config: ScanConfig,
    clock: CivilClock,
    detector: ExtremumDetector,
    rules: Vec<SignalRule>,
}

impl EventScanner {
    pub fn new(provider: Arc<dyn EphemerisProvider>, config: ScanConfig) -> Self {
        let clock = config.clock();
        Self {
            detector: ExtremumDetector::new(clock, config.sample_hour),
            rules: signal_rules(&config),
            provider,
            config,
            clock,
        }
    }

    pub fn provider(&self) -> &dyn EphemerisProvider {
        self.provider.as_ref()
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn clock(&self) -> CivilClock {
        self.clock
    }

    /// All events of `date`, in emission order.
    ///
    /// Rise/set events are only produced when an observer is given.
    pub fn scan_day(&self, date: NaiveDate, observer: Option<&Observer>) -> Vec<Event> {
        let mut events = Vec::new();

        if let Some(observer) = observer {
            for body in [Body::Sun, Body::Moon] {
                events.extend(soft("rise_set", date, self.rise_set(date, body, observer)));
            }
        }
        events.extend(soft("moon_quarter", date, self.moon_quarter(date)));
        events.extend(soft("lunar_apsis", date, self.lunar_apsis(date)));
        for rule in &self.rules {
            events.extend(soft("signal_rule", date, self.apply_rule(date, rule)));
        }
        for planet in Body::PLANETS.into_iter().filter(|p| p.is_superior_planet()) {
            events.extend(soft(
                "solar_conjunction",
                date,
                self.solar_conjunction(date, planet),
            ));
        }
        for planet in Body::PLANETS.into_iter().filter(|p| p.is_inferior_planet()) {
            events.extend(soft("max_elongation", date, self.max_elongation(date, planet)));
        }
        events.extend(soft("seasons", date, self.seasons(date)).into_iter().flatten());
        events.extend(meteor_shower_event(date));
        events.extend(soft("solar_eclipse", date, self.solar_eclipse(date)));
        events.extend(soft("lunar_eclipse", date, self.lunar_eclipse(date)));

        events
    }

    fn yesterday_midnight(&self, date: NaiveDate) -> DateTime<Utc> {
        let yesterday = date.checked_sub_days(Days::new(1)).unwrap_or(date);
        self.clock.midnight(yesterday)
    }

    /// Keep `instant` only if it falls on `date`.
    fn on_day(&self, instant: Option<DateTime<Utc>>, date: NaiveDate) -> Option<DateTime<Utc>> {
        instant.filter(|t| self.clock.is_on(*t, date))
    }

    fn rise_set(
        &self,
        date: NaiveDate,
        body: Body,
        observer: &Observer,
    ) -> EphemerisResult<Option<Event>> {
        let start = self.clock.midnight(date);
        let limit = self.config.search_limit_days;
        let rise = self.provider.search_rise_set(body, observer, Direction::Rise, start, limit)?;
        let set = self.provider.search_rise_set(body, observer, Direction::Set, start, limit)?;
        let (rise, set) = (self.on_day(rise, date), self.on_day(set, date));
        if rise.is_none() && set.is_none() {
            return Ok(None);
        }

        let text = format!(
            "{} : lever {}, coucher {}",
            body.label(),
            self.hhmm_or_blank(rise),
            self.hhmm_or_blank(set)
        );
        let time = rise.into_iter().chain(set).min();
        Ok(Some(Event::new(EventKind::RiseSet { body, rise, set }, text, time)))
    }

    fn hhmm_or_blank(&self, instant: Option<DateTime<Utc>>) -> String {
        instant
            .map(|t| self.clock.hhmm(t))
            .unwrap_or_else(|| "--:--".to_string())
    }

    fn moon_quarter(&self, date: NaiveDate) -> EphemerisResult<Option<Event>> {
        let Some(found) = self.provider.search_moon_quarter(self.yesterday_midnight(date))? else {
            return Ok(None);
        };
        if !self.clock.is_on(found.time, date) {
            return Ok(None);
        }
        let illumination_pct = percent(self.provider.illumination(Body::Moon, found.time)?);
        let text = format!(
            "{} ({}%) à {}",
            found.quarter.label(),
            illumination_pct,
            self.clock.hhmm(found.time)
        );
        let kind = EventKind::MoonQuarter {
            quarter: found.quarter,
            illumination_pct,
        };
        Ok(Some(Event::new(kind, text, Some(found.time))))
    }

    fn lunar_apsis(&self, date: NaiveDate) -> EphemerisResult<Option<Event>> {
        let Some(apsis) = self.provider.search_lunar_apsis(self.yesterday_midnight(date))? else {
            return Ok(None);
        };
        if !self.clock.is_on(apsis.time, date) {
            return Ok(None);
        }
        let text = format!(
            "{} ({} km)",
            apsis.kind.label(),
            group_thousands(apsis.distance_km.round().max(0.0) as u64)
        );
        let kind = EventKind::LunarApsis {
            apsis: apsis.kind,
            distance_km: apsis.distance_km,
        };
        Ok(Some(Event::new(kind, text, Some(apsis.time))))
    }

    fn apply_rule(&self, date: NaiveDate, rule: &SignalRule) -> EphemerisResult<Option<Event>> {
        let provider = self.provider.as_ref();
        let value = rule.signal.sample(provider, self.detector.sample_time(date))?;
        if !rule.threshold.admits(value) {
            return Ok(None);
        }
        let is_extremum =
            self.detector
                .is_extremum(date, |t| rule.signal.sample(provider, t), rule.extremum)?;
        Ok(is_extremum.then(|| rule.event(value)))
    }

    fn solar_conjunction(&self, date: NaiveDate, planet: Body) -> EphemerisResult<Option<Event>> {
        let found = self.provider.search_relative_longitude(
            planet,
            0.0,
            self.yesterday_midnight(date),
            SOLAR_CONJUNCTION_LIMIT_DAYS,
        )?;
        Ok(self.on_day(found, date).map(|time| {
            Event::new(
                EventKind::SolarConjunction { planet },
                format!("Conjonction solaire de {}", planet.label()),
                Some(time),
            )
        }))
    }

    fn max_elongation(&self, date: NaiveDate, planet: Body) -> EphemerisResult<Option<Event>> {
        let found = self.provider.search_max_elongation(
            planet,
            self.yesterday_midnight(date),
            MAX_ELONGATION_LIMIT_DAYS,
        )?;
        Ok(found
            .filter(|max| self.clock.is_on(max.time, date))
            .map(|max| {
                let text = format!(
                    "Élongation maximale de {} ({:.1}°)",
                    planet.label(),
                    max.elongation_deg
                );
                let kind = EventKind::MaxElongation {
                    planet,
                    elongation_deg: max.elongation_deg,
                };
                Event::new(kind, text, Some(max.time))
            }))
    }

    fn seasons(&self, date: NaiveDate) -> EphemerisResult<Option<Vec<Event>>> {
        let seasons = self.provider.seasons(date.year())?;
        let events: Vec<Event> = seasons
            .instants()
            .into_iter()
            .filter(|(_, instant)| self.clock.is_on(*instant, date))
            .map(|(season, instant)| {
                let text = format!("{} ({})", season.label(), self.clock.hhmm(instant));
                Event::new(EventKind::Season { season }, text, Some(instant))
            })
            .collect();
        Ok(Some(events))
    }

    fn solar_eclipse(&self, date: NaiveDate) -> EphemerisResult<Option<Event>> {
        let found = self
            .provider
            .search_global_solar_eclipse(self.yesterday_midnight(date))?;
        Ok(found
            .filter(|e| self.clock.is_on(e.peak, date))
            .map(eclipse_event))
    }

    fn lunar_eclipse(&self, date: NaiveDate) -> EphemerisResult<Option<Event>> {
        let found = self
            .provider
            .search_lunar_eclipse(self.yesterday_midnight(date))?;
        Ok(found
            .filter(|e| self.clock.is_on(e.peak, date))
            .map(eclipse_event))
    }
}

fn eclipse_event(eclipse: crate::ephemeris::EclipseEvent) -> Event {
    let text = format!("{} ({})", eclipse.body.label(), eclipse.kind.label());
    let kind = EventKind::Eclipse {
        body: eclipse.body,
        eclipse: eclipse.kind,
    };
    Event::new(kind, text, Some(eclipse.peak))
}

fn meteor_shower_event(date: NaiveDate) -> Option<Event> {
    meteor_shower_on(date).map(|shower| {
        Event::new(
            EventKind::MeteorShower {
                name: shower.name.to_string(),
            },
            format!("Pluie d'étoiles filantes : {}", shower.name),
            None,
        )
    })
}

/// Unwrap a check result, logging failures.
fn soft<T, E: Display>(check: &str, date: NaiveDate, result: Result<Option<T>, E>) -> Option<T> {
    match result {
        Ok(found) => found,
        Err(err) => {
            debug!("{} check skipped for {}: {}", check, date, err);
            None
        }
    }
}

/// Illuminated fraction as a whole percentage.
pub(crate) fn percent(fraction: f64) -> u8 {
    (fraction * 100.0).round().clamp(0.0, 100.0) as u8
}

/// `357123` as `357 123`.
pub(crate) fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1 000");
        assert_eq!(group_thousands(357_123), "357 123");
        assert_eq!(group_thousands(1_234_567), "1 234 567");
    }

    #[test]
    fn test_percent_clamps() {
        assert_eq!(percent(0.994), 99);
        assert_eq!(percent(0.996), 100);
        assert_eq!(percent(1.2), 100);
        assert_eq!(percent(-0.1), 0);
    }

    #[test]
    fn test_meteor_shower_event_text() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 14).unwrap();
        let evt = meteor_shower_event(date).unwrap();
        assert_eq!(evt.text, "Pluie d'étoiles filantes : Géminides");
        assert!(evt.time.is_none());
        assert!(meteor_shower_event(date.succ_opt().unwrap()).is_none());
    }

    #[test]
    fn test_soft_swallows_errors() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let failed: Result<Option<u8>, String> = Err("boom".to_string());
        assert_eq!(soft("test", date, failed), None);
        assert_eq!(soft::<u8, String>("test", date, Ok(Some(3))), Some(3));
    }
}
