//! Discrete phenomena reported by the ephemeris and carried by events.

use serde::{Deserialize, Serialize};

/// One of the four principal lunar phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoonQuarter {
    New,
    FirstQuarter,
    Full,
    LastQuarter,
}

impl MoonQuarter {
    /// Quarter from its index 0..=3 (new, first, full, last).
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(MoonQuarter::New),
            1 => Some(MoonQuarter::FirstQuarter),
            2 => Some(MoonQuarter::Full),
            3 => Some(MoonQuarter::LastQuarter),
            _ => None,
        }
    }

    pub fn index(self) -> u8 {
        match self {
            MoonQuarter::New => 0,
            MoonQuarter::FirstQuarter => 1,
            MoonQuarter::Full => 2,
            MoonQuarter::LastQuarter => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MoonQuarter::New => "Nouvelle Lune",
            MoonQuarter::FirstQuarter => "Premier Quartier",
            MoonQuarter::Full => "Pleine Lune",
            MoonQuarter::LastQuarter => "Dernier Quartier",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApsisKind {
    Perigee,
    Apogee,
}

impl ApsisKind {
    pub fn label(self) -> &'static str {
        match self {
            ApsisKind::Perigee => "Périgée Lunaire",
            ApsisKind::Apogee => "Apogée Lunaire",
        }
    }
}

/// Equinoxes and solstices, in calendar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonKind {
    MarchEquinox,
    JuneSolstice,
    SeptemberEquinox,
    DecemberSolstice,
}

impl SeasonKind {
    pub const ALL: [SeasonKind; 4] = [
        SeasonKind::MarchEquinox,
        SeasonKind::JuneSolstice,
        SeasonKind::SeptemberEquinox,
        SeasonKind::DecemberSolstice,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SeasonKind::MarchEquinox => "Équinoxe de Printemps",
            SeasonKind::JuneSolstice => "Solstice d'Été",
            SeasonKind::SeptemberEquinox => "Équinoxe d'Automne",
            SeasonKind::DecemberSolstice => "Solstice d'Hiver",
        }
    }

    /// Apparent solar ecliptic longitude at the instant, in degrees.
    pub fn solar_longitude_deg(self) -> f64 {
        match self {
            SeasonKind::MarchEquinox => 0.0,
            SeasonKind::JuneSolstice => 90.0,
            SeasonKind::SeptemberEquinox => 180.0,
            SeasonKind::DecemberSolstice => 270.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EclipseBody {
    Solar,
    Lunar,
}

impl EclipseBody {
    pub fn label(self) -> &'static str {
        match self {
            EclipseBody::Solar => "Éclipse Solaire",
            EclipseBody::Lunar => "Éclipse Lunaire",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EclipseKind {
    Penumbral,
    Partial,
    Annular,
    Total,
    Hybrid,
}

impl EclipseKind {
    pub fn label(self) -> &'static str {
        match self {
            EclipseKind::Penumbral => "pénombrale",
            EclipseKind::Partial => "partielle",
            EclipseKind::Annular => "annulaire",
            EclipseKind::Total => "totale",
            EclipseKind::Hybrid => "hybride",
        }
    }
}
