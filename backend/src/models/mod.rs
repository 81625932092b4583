//! Core data model: bodies, observers, civil days and calendar events.

pub mod body;
pub mod event;
pub mod observer;
pub mod phenomena;
pub mod time;

pub use body::Body;
pub use event::{sort_events, Category, Event, EventKind, Tone};
pub use observer::Observer;
pub use phenomena::{ApsisKind, EclipseBody, EclipseKind, MoonQuarter, SeasonKind};
pub use time::{CivilClock, DayKey};
