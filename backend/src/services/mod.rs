//! Detection engine and calendar query services.
//!
//! - [`extremum`]: three-sample local extremum test
//! - [`rules`]: conjunction/opposition rule table and meteor-shower dates
//! - [`scanner`]: fail-soft single-day scan
//! - [`month_cache`]: month index builder and LRU memo
//! - [`day_detail`]: observer-dependent extras of a selected day
//! - [`filter`]: category filters for summaries
//! - [`ics`]: iCalendar export
//! - [`calendar`]: the query surface tying these together

pub mod calendar;
pub mod day_detail;
pub mod extremum;
pub mod filter;
pub mod ics;
pub mod month_cache;
pub mod rules;
pub mod scanner;

pub use calendar::EventCalendar;
pub use day_detail::{DayDetail, MoonPhaseStatus, PhotoHours, VisiblePlanet, ZodiacSign};
pub use extremum::{Extremum, ExtremumDetector};
pub use filter::{EventFilter, FilterGroup};
pub use ics::IcsDocument;
pub use month_cache::{EventIndex, MonthCache};
pub use rules::{SignalRule, METEOR_SHOWERS};
pub use scanner::EventScanner;
