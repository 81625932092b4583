//! Query surface of the calendar engine.
//!
//! [`EventCalendar`] owns the scanner and the month memo and answers the four
//! queries a client makes: the month grid, a filtered day summary, a full day
//! scan and the detail panel of a selected day. It is `Send + Sync`; the memo
//! lock is only held for lookups and inserts, never while scanning.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use parking_lot::Mutex;

use crate::config::ScanConfig;
use crate::ephemeris::EphemerisProvider;
use crate::error::{CalendarError, CalendarResult};
use crate::models::{sort_events, Event, Observer};

use super::day_detail::{build_day_detail, DayDetail};
use super::filter::EventFilter;
use super::ics::{export, IcsDocument};
use super::month_cache::{build_month_index, EventIndex, MonthCache};
use super::scanner::EventScanner;

pub struct EventCalendar {
    scanner: EventScanner,
    memo: Mutex<MonthCache>,
}

impl EventCalendar {
    pub fn new(provider: Arc<dyn EphemerisProvider>, config: ScanConfig) -> Self {
        let memo = Mutex::new(MonthCache::new(config.cache_capacity));
        Self {
            scanner: EventScanner::new(provider, config),
            memo,
        }
    }

    pub fn scanner(&self) -> &EventScanner {
        &self.scanner
    }

    pub fn config(&self) -> &ScanConfig {
        self.scanner.config()
    }

    /// Unsorted events of one day, rise/set included when `observer` is given.
    pub fn scan_day(&self, date: NaiveDate, observer: Option<&Observer>) -> Vec<Event> {
        self.scanner.scan_day(date, observer)
    }

    /// Build a fresh month index, bypassing the memo.
    pub fn build(&self, year: i32, month: u32) -> CalendarResult<EventIndex> {
        build_month_index(&self.scanner, year, month)
    }

    /// Month index for (year, month), from the memo when present.
    pub fn month_index(&self, year: i32, month: u32) -> CalendarResult<Arc<EventIndex>> {
        if let Some(hit) = self.memo.lock().get(year, month) {
            return Ok(hit);
        }
        let built = Arc::new(self.build(year, month)?);
        Ok(self.memo.lock().insert(built))
    }

    /// Filtered observer-independent events of `date`, in index order.
    pub fn day_events_summary(
        &self,
        date: NaiveDate,
        filter: &EventFilter,
    ) -> CalendarResult<Vec<Event>> {
        let cached = self.memo.lock().find_covering(date);
        let index = match cached {
            Some(index) => index,
            None => self.month_index(date.year(), date.month())?,
        };
        Ok(index
            .get(date)
            .map(|events| filter.apply(events))
            .unwrap_or_default())
    }

    /// Full scan of `date` for `observer`, sorted by time.
    pub fn day_events_detailed(
        &self,
        date: NaiveDate,
        observer: &Observer,
    ) -> CalendarResult<Vec<Event>> {
        observer.validate()?;
        let mut events = self.scanner.scan_day(date, Some(observer));
        sort_events(&mut events);
        Ok(events)
    }

    pub fn day_detail(&self, date: NaiveDate, observer: &Observer) -> CalendarResult<DayDetail> {
        observer.validate()?;
        Ok(build_day_detail(&self.scanner, date, observer))
    }

    /// Calendar file for the `index`-th event of the detailed day list.
    pub fn export_ics(
        &self,
        date: NaiveDate,
        observer: &Observer,
        index: usize,
    ) -> CalendarResult<IcsDocument> {
        let events = self.day_events_detailed(date, observer)?;
        let event = events.get(index).ok_or_else(|| CalendarError::EventNotFound {
            date: date.to_string(),
            index,
            count: events.len(),
        })?;
        let config = self.scanner.config();
        Ok(export(
            event,
            date,
            &self.scanner.clock(),
            config.ics_default_hour,
        ))
    }

    /// (year, month) keys currently memoized, most recent first.
    pub fn cached_months(&self) -> Vec<(i32, u32)> {
        self.memo.lock().keys()
    }

    pub fn clear_cache(&self) {
        self.memo.lock().clear();
    }
}
