//! Local-extremum classification of daily-sampled signals.

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::CivilClock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Extremum {
    Minimum,
    Maximum,
}

/// Whether `cur` is a local extremum between its neighbours.
///
/// Ties with the following day count, ties with the preceding day do not, so
/// a flat bottom spanning two days is reported on the earlier one.
pub fn classify(prev: f64, cur: f64, next: f64, kind: Extremum) -> bool {
    match kind {
        Extremum::Minimum => cur < prev && cur <= next,
        Extremum::Maximum => cur > prev && cur >= next,
    }
}

/// Samples a signal on three consecutive days at a fixed local hour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtremumDetector {
    clock: CivilClock,
    sample_hour: u32,
}

impl ExtremumDetector {
    pub fn new(clock: CivilClock, sample_hour: u32) -> Self {
        Self { clock, sample_hour }
    }

    /// Sampling instant for `date`.
    pub fn sample_time(&self, date: NaiveDate) -> DateTime<Utc> {
        self.clock.at(date, self.sample_hour, 0)
    }

    /// Whether `value_of` has a local `kind` extremum on `date`.
    ///
    /// The first failing sample is returned as the error.
    pub fn is_extremum<F, E>(&self, date: NaiveDate, value_of: F, kind: Extremum) -> Result<bool, E>
    where
        F: Fn(DateTime<Utc>) -> Result<f64, E>,
    {
        let (Some(yesterday), Some(tomorrow)) = (
            date.checked_sub_days(Days::new(1)),
            date.checked_add_days(Days::new(1)),
        ) else {
            return Ok(false);
        };
        let prev = value_of(self.sample_time(yesterday))?;
        let cur = value_of(self.sample_time(date))?;
        let next = value_of(self.sample_time(tomorrow))?;
        Ok(classify(prev, cur, next, kind))
    }
}
