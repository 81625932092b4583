//! Month event index and its exact-key LRU memo.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use log::info;
use serde::Serialize;

use crate::error::{CalendarError, CalendarResult};
use crate::models::time::{first_of_month, shift_month};
use crate::models::{DayKey, Event};

use super::scanner::EventScanner;

/// Observer-independent events of every day in a scanned window.
///
/// Every scanned day has an entry, possibly empty. A missing day means it was
/// not scanned, not that it has no events.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventIndex {
    pub year: i32,
    pub month: u32,
    /// First scanned day.
    pub start: NaiveDate,
    /// First day past the window.
    pub end: NaiveDate,
    pub days: BTreeMap<DayKey, Vec<Event>>,
}

impl EventIndex {
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }

    /// Events of `date`, or `None` when it was not scanned.
    pub fn get(&self, date: NaiveDate) -> Option<&[Event]> {
        self.days.get(&DayKey::from(date)).map(Vec::as_slice)
    }

    pub fn days(&self) -> impl Iterator<Item = (&DayKey, &Vec<Event>)> {
        self.days.iter()
    }

    pub fn event_count(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }
}

/// Scan `window_months` months starting at `year`-`month`.
pub fn build_month_index(
    scanner: &EventScanner,
    year: i32,
    month: u32,
) -> CalendarResult<EventIndex> {
    let start = first_of_month(year, month)?;
    let window = i32::try_from(scanner.config().window_months.max(1)).unwrap_or(i32::MAX);
    let end = shift_month(start, window).ok_or(CalendarError::InvalidMonth { year, month })?;

    let mut days = BTreeMap::new();
    for date in start.iter_days().take_while(|d| *d < end) {
        days.insert(DayKey::from(date), scanner.scan_day(date, None));
    }

    let index = EventIndex {
        year,
        month,
        start,
        end,
        days,
    };
    info!(
        "Built month index {}-{:02}: {} days, {} events",
        year,
        month,
        index.days.len(),
        index.event_count()
    );
    Ok(index)
}

/// Keeps the most recently used month indices, keyed by exact (year, month).
#[derive(Debug, Default)]
pub struct MonthCache {
    capacity: usize,
    entries: VecDeque<Arc<EventIndex>>,
}

impl MonthCache {
    /// A capacity of 0 stores nothing.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Cached index for (year, month), marking it most recently used.
    pub fn get(&mut self, year: i32, month: u32) -> Option<Arc<EventIndex>> {
        let pos = self
            .entries
            .iter()
            .position(|e| e.year == year && e.month == month)?;
        let entry = self.entries.remove(pos)?;
        self.entries.push_front(Arc::clone(&entry));
        Some(entry)
    }

    /// Store a finished index and return the one callers should use.
    ///
    /// If another index for the same key was inserted in the meantime, that
    /// one wins and `index` is dropped.
    pub fn insert(&mut self, index: Arc<EventIndex>) -> Arc<EventIndex> {
        if let Some(existing) = self.get(index.year, index.month) {
            return existing;
        }
        if self.capacity == 0 {
            return index;
        }
        self.entries.push_front(Arc::clone(&index));
        self.entries.truncate(self.capacity);
        index
    }

    /// Most recent cached index whose window contains `date`, marking it most
    /// recently used. The exact month of `date` is preferred.
    pub fn find_covering(&mut self, date: NaiveDate) -> Option<Arc<EventIndex>> {
        if let Some(exact) = self.get(date.year(), date.month()) {
            return Some(exact);
        }
        let pos = self.entries.iter().position(|e| e.covers(date))?;
        let entry = self.entries.remove(pos)?;
        self.entries.push_front(Arc::clone(&entry));
        Some(entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached (year, month) keys, most recent first.
    pub fn keys(&self) -> Vec<(i32, u32)> {
        self.entries.iter().map(|e| (e.year, e.month)).collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
