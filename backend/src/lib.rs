//! # Astrocal
//!
//! Astronomical event detection and calendar aggregation engine.
//!
//! The crate turns continuous astronomical quantities (separations,
//! elongations, phase angles, rise/set and seasonal instants) into discrete,
//! calendar-addressable events: "full moon on this day", "closest Moon-Jupiter
//! approach on this day", "Perseids peak on this day".
//!
//! ## Architecture
//!
//! - [`ephemeris`]: the [`ephemeris::EphemerisProvider`] contract every
//!   numerical query goes through, plus a tabulated implementation
//! - [`models`]: bodies, observers, civil days and events
//! - [`services`]: extremum detection, day scans, month index memo, ICS export
//!   and the [`services::EventCalendar`] query surface
//! - [`state`]: client view state driven by a single reducer
//! - [`config`]: TOML + environment configuration
//! - [`http`]: Axum-based query API (feature `http-server`)
//!
//! ## Time zones
//!
//! Providers work in UTC. Days are civil days of a fixed UTC offset
//! ([`models::CivilClock`]); an event's timestamp always falls on the day it is
//! listed under in that offset.

pub mod config;
pub mod ephemeris;
pub mod error;
pub mod models;
pub mod services;
pub mod state;

#[cfg(feature = "http-server")]
pub mod http;

pub use error::{CalendarError, CalendarResult, ConfigError};
