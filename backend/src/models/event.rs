//! Calendar events produced by a day scan.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::body::Body;
use super::phenomena::{ApsisKind, EclipseBody, EclipseKind, MoonQuarter, SeasonKind};

/// Coarse event class used for filtering and grid display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Ephemeris,
    PhaseEvent,
    Apsis,
    Conjunction,
    Opposition,
    Season,
    MeteorShower,
    Eclipse,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Ephemeris,
        Category::PhaseEvent,
        Category::Apsis,
        Category::Conjunction,
        Category::Opposition,
        Category::Season,
        Category::MeteorShower,
        Category::Eclipse,
    ];

    /// Categories that need an observer and are never part of the month index.
    pub fn is_observer_dependent(self) -> bool {
        matches!(self, Category::Ephemeris)
    }

    pub fn tone(self) -> Tone {
        match self {
            Category::Ephemeris => Tone::Orange,
            Category::PhaseEvent => Tone::Purple,
            Category::Apsis => Tone::Blue,
            Category::Conjunction => Tone::Yellow,
            Category::Opposition => Tone::Red,
            Category::Season => Tone::Green,
            Category::MeteorShower => Tone::Teal,
            Category::Eclipse => Tone::DeepPurple,
        }
    }
}

/// Color tag a client uses to render the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Orange,
    Purple,
    Blue,
    Yellow,
    Red,
    Green,
    Teal,
    DeepPurple,
}

/// What happened, with the data specific to that kind of event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// Rise and/or set of the Sun or Moon on the day.
    RiseSet {
        body: Body,
        rise: Option<DateTime<Utc>>,
        set: Option<DateTime<Utc>>,
    },
    MoonQuarter {
        quarter: MoonQuarter,
        illumination_pct: u8,
    },
    LunarApsis {
        apsis: ApsisKind,
        distance_km: f64,
    },
    MoonConjunction {
        planet: Body,
        separation_deg: f64,
    },
    PlanetConjunction {
        first: Body,
        second: Body,
        separation_deg: f64,
    },
    /// Planet passing behind the Sun.
    SolarConjunction { planet: Body },
    Opposition { planet: Body, elongation_deg: f64 },
    /// Greatest angular distance of Mercury or Venus from the Sun.
    MaxElongation { planet: Body, elongation_deg: f64 },
    Season { season: SeasonKind },
    MeteorShower { name: String },
    Eclipse { body: EclipseBody, eclipse: EclipseKind },
}

impl EventKind {
    pub fn category(&self) -> Category {
        match self {
            EventKind::RiseSet { .. } => Category::Ephemeris,
            EventKind::MoonQuarter { .. } => Category::PhaseEvent,
            EventKind::LunarApsis { .. } => Category::Apsis,
            EventKind::MoonConjunction { .. }
            | EventKind::PlanetConjunction { .. }
            | EventKind::SolarConjunction { .. } => Category::Conjunction,
            EventKind::Opposition { .. } | EventKind::MaxElongation { .. } => {
                Category::Opposition
            }
            EventKind::Season { .. } => Category::Season,
            EventKind::MeteorShower { .. } => Category::MeteorShower,
            EventKind::Eclipse { .. } => Category::Eclipse,
        }
    }

    /// Compact label for a month grid cell.
    pub fn short_label(&self) -> String {
        match self {
            EventKind::RiseSet { body, .. } => body.label().to_string(),
            EventKind::MoonQuarter { quarter, .. } => match quarter {
                MoonQuarter::FirstQuarter => "1er Quartier".to_string(),
                other => other.label().to_string(),
            },
            EventKind::LunarApsis { apsis, .. } => match apsis {
                ApsisKind::Perigee => "Périgée".to_string(),
                ApsisKind::Apogee => "Apogée".to_string(),
            },
            EventKind::MoonConjunction { planet, .. } => format!("Lune-{}", planet.label()),
            EventKind::PlanetConjunction { first, second, .. } => {
                format!("{}-{}", first.label(), second.label())
            }
            EventKind::SolarConjunction { planet } => format!("Conj. {}", planet.label()),
            EventKind::Opposition { planet, .. } => format!("Opp. {}", planet.label()),
            EventKind::MaxElongation { planet, .. } => format!("Elong. Max {}", planet.label()),
            EventKind::Season { season } => match season {
                SeasonKind::MarchEquinox => "Printemps",
                SeasonKind::JuneSolstice => "Été",
                SeasonKind::SeptemberEquinox => "Automne",
                SeasonKind::DecemberSolstice => "Hiver",
            }
            .to_string(),
            EventKind::MeteorShower { name } => name.clone(),
            EventKind::Eclipse { body, .. } => body.label().to_string(),
        }
    }

    /// Bodies other than the Earth involved in the event.
    pub fn bodies(&self) -> Vec<Body> {
        match self {
            EventKind::RiseSet { body, .. } => vec![*body],
            EventKind::MoonQuarter { .. } | EventKind::LunarApsis { .. } => vec![Body::Moon],
            EventKind::MoonConjunction { planet, .. } => vec![Body::Moon, *planet],
            EventKind::PlanetConjunction { first, second, .. } => vec![*first, *second],
            EventKind::SolarConjunction { planet } => vec![*planet, Body::Sun],
            EventKind::Opposition { planet, .. } => vec![*planet],
            EventKind::MaxElongation { planet, .. } => vec![*planet, Body::Sun],
            EventKind::Season { .. } => vec![Body::Sun],
            EventKind::MeteorShower { .. } => Vec::new(),
            EventKind::Eclipse { body, .. } => match body {
                EclipseBody::Solar => vec![Body::Sun, Body::Moon],
                EclipseBody::Lunar => vec![Body::Moon],
            },
        }
    }
}

/// A named, calendar-addressable event.
///
/// When `time` is present its civil date equals the day the event is listed
/// under. Events are built once per scan and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub category: Category,
    /// Full display text.
    pub text: String,
    /// Compact grid label.
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bodies: Vec<Body>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone: Option<Tone>,
    pub kind: EventKind,
}

impl Event {
    pub fn new(kind: EventKind, text: impl Into<String>, time: Option<DateTime<Utc>>) -> Self {
        let category = kind.category();
        Self {
            category,
            text: text.into(),
            label: kind.short_label(),
            time,
            bodies: kind.bodies(),
            tone: Some(category.tone()),
            kind,
        }
    }
}

/// Order events by exact time, putting untimed events last.
///
/// The sort is stable, so untimed events keep their emission order.
pub fn sort_events(events: &mut [Event]) {
    events.sort_by(|a, b| match (a.time, b.time) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}
