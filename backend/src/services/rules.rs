//! Detection tables: threshold + extremum rules and the meteor-shower calendar.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::config::ScanConfig;
use crate::ephemeris::{EphemerisProvider, EphemerisResult};
use crate::models::{Body, Category, Event, EventKind};

use super::extremum::Extremum;

/// Annual meteor-shower peak. Months are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeteorShower {
    pub name: &'static str,
    pub month: u32,
    pub day: u32,
}

impl MeteorShower {
    const fn new(name: &'static str, month: u32, day: u32) -> Self {
        Self { name, month, day }
    }

    pub fn peaks_on(&self, date: NaiveDate) -> bool {
        date.month() == self.month && date.day() == self.day
    }
}

/// Fixed peak dates, with no year-to-year drift.
pub const METEOR_SHOWERS: [MeteorShower; 9] = [
    MeteorShower::new("Quadrantides", 1, 4),
    MeteorShower::new("Lyrides", 4, 22),
    MeteorShower::new("Êta Aquarides", 5, 6),
    MeteorShower::new("Delta Aquarides", 7, 30),
    MeteorShower::new("Perséides", 8, 12),
    MeteorShower::new("Orionides", 10, 21),
    MeteorShower::new("Léonides", 11, 17),
    MeteorShower::new("Géminides", 12, 14),
    MeteorShower::new("Ursides", 12, 22),
];

pub fn meteor_shower_on(date: NaiveDate) -> Option<&'static MeteorShower> {
    METEOR_SHOWERS.iter().find(|s| s.peaks_on(date))
}

/// Scalar quantity sampled once per day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Signal {
    /// Angular separation between two bodies.
    Separation(Body, Body),
    /// Angular distance from the Sun.
    Elongation(Body),
}

impl Signal {
    pub fn sample(&self, provider: &dyn EphemerisProvider, at: DateTime<Utc>) -> EphemerisResult<f64> {
        match *self {
            Signal::Separation(a, b) => provider.separation(a, b, at),
            Signal::Elongation(body) => provider.elongation(body, at),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Threshold {
    Below(f64),
    Above(f64),
}

impl Threshold {
    pub fn admits(&self, value: f64) -> bool {
        match *self {
            Threshold::Below(limit) => value < limit,
            Threshold::Above(limit) => value > limit,
        }
    }
}

/// A day qualifies when the signal passes the threshold at the sample time
/// and is a local extremum of the requested kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalRule {
    pub category: Category,
    pub signal: Signal,
    pub threshold: Threshold,
    pub extremum: Extremum,
}

impl SignalRule {
    /// Event for a qualifying day with the signal value sampled that day.
    pub fn event(&self, value: f64) -> Event {
        let kind = match self.signal {
            Signal::Separation(Body::Moon, planet) | Signal::Separation(planet, Body::Moon) => {
                EventKind::MoonConjunction {
                    planet,
                    separation_deg: value,
                }
            }
            Signal::Separation(first, second) => EventKind::PlanetConjunction {
                first,
                second,
                separation_deg: value,
            },
            Signal::Elongation(planet) => EventKind::Opposition {
                planet,
                elongation_deg: value,
            },
        };
        let text = match &kind {
            EventKind::MoonConjunction { planet, .. } => {
                format!("Lune - {} : {:.1}°", planet.label(), value)
            }
            EventKind::PlanetConjunction { first, second, .. } => {
                format!("{} - {} : {:.1}°", first.label(), second.label(), value)
            }
            EventKind::Opposition { planet, .. } => format!("{} à l'opposition", planet.label()),
            _ => kind.short_label(),
        };
        Event::new(kind, text, None)
    }
}

/// Moon-planet and planet-planet conjunctions plus oppositions, in emission order.
pub fn signal_rules(config: &ScanConfig) -> Vec<SignalRule> {
    let mut rules = Vec::new();

    for planet in Body::PLANETS {
        rules.push(SignalRule {
            category: Category::Conjunction,
            signal: Signal::Separation(Body::Moon, planet),
            threshold: Threshold::Below(config.moon_conjunction_deg),
            extremum: Extremum::Minimum,
        });
    }

    for (i, first) in Body::PLANETS.iter().enumerate() {
        for second in &Body::PLANETS[i + 1..] {
            rules.push(SignalRule {
                category: Category::Conjunction,
                signal: Signal::Separation(*first, *second),
                threshold: Threshold::Below(config.planet_conjunction_deg),
                extremum: Extremum::Minimum,
            });
        }
    }

    for planet in Body::PLANETS.into_iter().filter(|p| p.is_superior_planet()) {
        rules.push(SignalRule {
            category: Category::Opposition,
            signal: Signal::Elongation(planet),
            threshold: Threshold::Above(config.opposition_deg),
            extremum: Extremum::Maximum,
        });
    }

    rules
}
