use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Solar-system bodies the calendar knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Body {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
}

impl Body {
    /// Planets scanned for conjunctions and oppositions, innermost first.
    pub const PLANETS: [Body; 7] = [
        Body::Mercury,
        Body::Venus,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
        Body::Uranus,
        Body::Neptune,
    ];

    /// Naked-eye planets checked by the twilight visibility list.
    pub const BRIGHT_PLANETS: [Body; 5] = [
        Body::Mercury,
        Body::Venus,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
    ];

    /// Display name used in event labels.
    pub fn label(self) -> &'static str {
        match self {
            Body::Sun => "Soleil",
            Body::Moon => "Lune",
            Body::Mercury => "Mercure",
            Body::Venus => "Vénus",
            Body::Mars => "Mars",
            Body::Jupiter => "Jupiter",
            Body::Saturn => "Saturne",
            Body::Uranus => "Uranus",
            Body::Neptune => "Neptune",
        }
    }

    pub fn is_planet(self) -> bool {
        !matches!(self, Body::Sun | Body::Moon)
    }

    /// Planets orbiting inside the Earth. Only these have a greatest elongation.
    pub fn is_inferior_planet(self) -> bool {
        matches!(self, Body::Mercury | Body::Venus)
    }

    /// Planets orbiting outside the Earth. Only these can reach opposition.
    pub fn is_superior_planet(self) -> bool {
        matches!(
            self,
            Body::Mars | Body::Jupiter | Body::Saturn | Body::Uranus | Body::Neptune
        )
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Body {
    type Err = String;

    /// Parses the English body name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sun" => Ok(Body::Sun),
            "moon" => Ok(Body::Moon),
            "mercury" => Ok(Body::Mercury),
            "venus" => Ok(Body::Venus),
            "mars" => Ok(Body::Mars),
            "jupiter" => Ok(Body::Jupiter),
            "saturn" => Ok(Body::Saturn),
            "uranus" => Ok(Body::Uranus),
            "neptune" => Ok(Body::Neptune),
            other => Err(format!("unknown body '{}'", other)),
        }
    }
}
