//! Civil-calendar helpers.
//!
//! The provider works in UTC instants; the calendar works in civil days of a
//! fixed UTC offset. Everything that turns one into the other goes through
//! [`CivilClock`] so that the "same calendar day" test is applied uniformly.

use std::fmt;

use chrono::{DateTime, Datelike, Duration, FixedOffset, Months, NaiveDate, NaiveTime, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CalendarError;

/// Index key of the per-month event map.
///
/// `month` is 1-based. Serialized as `YYYY-MM-DD` so it can key JSON maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct DayKey {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl DayKey {
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }

    pub fn to_date(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }
}

impl From<NaiveDate> for DayKey {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
        }
    }
}

impl From<DayKey> for String {
    fn from(key: DayKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for DayKey {
    type Error = CalendarError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse_date(&value).map(DayKey::from)
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// Fixed-offset civil time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CivilClock {
    offset: FixedOffset,
}

impl CivilClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn utc() -> Self {
        Self::new(Utc.fix())
    }

    /// Build a clock from an offset east of UTC, in minutes.
    pub fn from_offset_minutes(minutes: i32) -> Option<Self> {
        FixedOffset::east_opt(minutes.checked_mul(60)?).map(Self::new)
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// UTC instant of `hour:minute` local time on `date`.
    ///
    /// Saturates at the first or last representable instant.
    pub fn at(&self, date: NaiveDate, hour: u32, minute: u32) -> DateTime<Utc> {
        let time = NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default();
        let offset = i64::from(self.offset.local_minus_utc());
        match date.and_time(time).checked_sub_signed(Duration::seconds(offset)) {
            Some(utc) => utc.and_utc(),
            None if offset > 0 => DateTime::<Utc>::MIN_UTC,
            None => DateTime::<Utc>::MAX_UTC,
        }
    }

    /// UTC instant of local midnight starting `date`.
    pub fn midnight(&self, date: NaiveDate) -> DateTime<Utc> {
        self.at(date, 0, 0)
    }

    /// Civil date an instant falls on.
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }

    pub fn is_on(&self, instant: DateTime<Utc>, date: NaiveDate) -> bool {
        self.local_date(instant) == date
    }

    /// Local wall-clock time as `HH:MM`.
    pub fn hhmm(&self, instant: DateTime<Utc>) -> String {
        instant.with_timezone(&self.offset).format("%H:%M").to_string()
    }
}

impl Default for CivilClock {
    fn default() -> Self {
        Self::utc()
    }
}

/// First day of a month, validating the month number.
pub fn first_of_month(year: i32, month: u32) -> Result<NaiveDate, CalendarError> {
    NaiveDate::from_ymd_opt(year, month, 1).ok_or(CalendarError::InvalidMonth { year, month })
}

/// First day of the month `delta` months away from the month containing `date`.
pub fn shift_month(date: NaiveDate, delta: i32) -> Option<NaiveDate> {
    let first = date.with_day(1)?;
    let months = Months::new(delta.unsigned_abs());
    if delta >= 0 {
        first.checked_add_months(months)
    } else {
        first.checked_sub_months(months)
    }
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<NaiveDate, CalendarError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| CalendarError::InvalidDate(format!("'{}': {}", value, e)))
}

/// Modified Julian Date of a UTC instant.
/// MJD 0 = 1858-11-17 00:00:00 UTC
pub fn modified_julian_date(instant: DateTime<Utc>) -> f64 {
    let secs = instant.timestamp() as f64 + f64::from(instant.timestamp_subsec_nanos()) / 1e9;
    secs / 86400.0 + 40587.0
}
