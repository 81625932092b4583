//! Data Transfer Objects for the HTTP API.
//!
//! Engine types (`Event`, `DayDetail`, `EventFilter`) already derive serde and
//! are used as-is; this module only adds request and envelope types.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CalendarError;
use crate::models::{DayKey, Event, Observer};
use crate::services::{EventFilter, EventIndex};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Month indices currently memoized
    pub cached_months: usize,
}

/// Observer coordinates from a query string. Latitude and longitude come as a pair.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ObserverQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub elevation: Option<f64>,
}

impl ObserverQuery {
    /// Observer for the request, `fallback` when no coordinates were sent.
    pub fn resolve(&self, fallback: Observer) -> Result<Observer, CalendarError> {
        let observer = match (self.lat, self.lon) {
            (Some(latitude), Some(longitude)) => {
                Observer::new(latitude, longitude, self.elevation.unwrap_or(0.0))
            }
            (None, None) => Observer {
                elevation_m: self.elevation.unwrap_or(fallback.elevation_m),
                ..fallback
            },
            _ => {
                return Err(CalendarError::InvalidObserver(
                    "lat and lon must be given together".to_string(),
                ))
            }
        };
        observer.validate()?;
        Ok(observer)
    }
}

/// Month grid: filtered events of every scanned day.
#[derive(Debug, Clone, Serialize)]
pub struct MonthResponse {
    pub year: i32,
    pub month: u32,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub event_count: usize,
    pub days: BTreeMap<DayKey, Vec<Event>>,
}

impl MonthResponse {
    pub fn from_index(index: &EventIndex, filter: &EventFilter) -> Self {
        let days: BTreeMap<DayKey, Vec<Event>> = index
            .days()
            .map(|(key, events)| (*key, filter.apply(events)))
            .collect();
        Self {
            year: index.year,
            month: index.month,
            start: index.start,
            end: index.end,
            event_count: days.values().map(Vec::len).sum(),
            days,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DaySummaryResponse {
    pub date: NaiveDate,
    pub events: Vec<Event>,
}
