//! Single-event iCalendar export.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::models::{CivilClock, Event};

const ICS_TIME_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Length of every exported entry.
pub const EVENT_DURATION_SECS: i64 = 3600;

/// A finished calendar file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcsDocument {
    pub filename: String,
    pub content: Vec<u8>,
}

impl IcsDocument {
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.content).unwrap_or_default()
    }
}

/// Serialize `event` as a one-hour VEVENT.
///
/// Untimed events start at `default_hour` local time on `fallback_date`.
pub fn export(
    event: &Event,
    fallback_date: NaiveDate,
    clock: &CivilClock,
    default_hour: u32,
) -> IcsDocument {
    let start = event
        .time
        .unwrap_or_else(|| clock.at(fallback_date, default_hour, 0));
    let end = start
        .checked_add_signed(Duration::seconds(EVENT_DURATION_SECS))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);

    let content = [
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        "BEGIN:VEVENT".to_string(),
        format!("DTSTART:{}", ics_time(start)),
        format!("DTEND:{}", ics_time(end)),
        format!("SUMMARY:{}", event.text),
        format!("DESCRIPTION:Événement astronomique : {}", event.text),
        "END:VEVENT".to_string(),
        "END:VCALENDAR".to_string(),
    ]
    .join("\r\n");

    IcsDocument {
        filename: ics_filename(&event.text),
        content: content.into_bytes(),
    }
}

fn ics_time(instant: DateTime<Utc>) -> String {
    instant.format(ICS_TIME_FORMAT).to_string()
}

/// Text with every character outside `[A-Za-z0-9]` replaced by `_`, plus `.ics`.
pub fn ics_filename(text: &str) -> String {
    let stem: String = text
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}.ics", stem)
}
