//! Calendar view state and its reducer.
//!
//! A client keeps one [`CalendarState`] and feeds every user or platform
//! action through [`CalendarState::apply`]. The displayed month index is an
//! `Arc<EventIndex>` value replaced as a whole; nothing in the state is
//! mutated from outside the reducer.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use log::debug;

use crate::models::time::shift_month;
use crate::models::{Event, Observer};
use crate::services::{DayDetail, EventCalendar, EventFilter, EventIndex, FilterGroup};

/// Something that happened in the client.
#[derive(Debug, Clone, PartialEq)]
pub enum CalendarAction {
    /// Move the displayed month by this many months.
    ChangeMonth(i32),
    /// Show and select today.
    GoToToday(NaiveDate),
    SelectDate(NaiveDate),
    ToggleFilter(FilterGroup),
    /// Geolocation succeeded.
    LocationResolved(Observer),
    /// Geolocation failed or is not supported.
    LocationUnavailable(String),
}

#[derive(Debug, Clone)]
pub struct CalendarState {
    pub view_year: i32,
    pub view_month: u32,
    pub selected: NaiveDate,
    pub observer: Observer,
    pub filter: EventFilter,
    /// Message to show the user, e.g. after a failed geolocation.
    pub notice: Option<String>,
    /// Index backing the month grid, `None` when it could not be built.
    pub month: Option<Arc<EventIndex>>,
    /// Detail panel of `selected`.
    pub detail: Option<DayDetail>,
}

impl CalendarState {
    pub fn new(today: NaiveDate, observer: Observer, calendar: &EventCalendar) -> Self {
        let state = Self {
            view_year: today.year(),
            view_month: today.month(),
            selected: today,
            observer,
            filter: EventFilter::default(),
            notice: None,
            month: None,
            detail: None,
        };
        state.refresh_month(calendar).refresh_detail(calendar)
    }

    pub fn apply(self, action: CalendarAction, calendar: &EventCalendar) -> Self {
        match action {
            CalendarAction::ChangeMonth(delta) => {
                let current = NaiveDate::from_ymd_opt(self.view_year, self.view_month, 1);
                match current.and_then(|d| shift_month(d, delta)) {
                    Some(first) => Self {
                        view_year: first.year(),
                        view_month: first.month(),
                        ..self
                    }
                    .refresh_month(calendar),
                    None => self,
                }
            }
            CalendarAction::GoToToday(today) => Self {
                view_year: today.year(),
                view_month: today.month(),
                selected: today,
                ..self
            }
            .refresh_month(calendar)
            .refresh_detail(calendar),
            CalendarAction::SelectDate(date) => Self {
                selected: date,
                ..self
            }
            .refresh_detail(calendar),
            CalendarAction::ToggleFilter(group) => Self {
                filter: self.filter.toggled(group),
                ..self
            },
            CalendarAction::LocationResolved(observer) => match observer.validate() {
                Ok(()) => Self {
                    observer,
                    notice: None,
                    ..self
                }
                .refresh_detail(calendar),
                Err(err) => Self {
                    notice: Some(err.to_string()),
                    ..self
                },
            },
            CalendarAction::LocationUnavailable(reason) => Self {
                notice: Some(format!("Impossible de récupérer votre position : {}", reason)),
                ..self
            },
        }
    }

    /// Filtered grid events of a displayed day, `None` if it was not scanned.
    pub fn grid_events(&self, date: NaiveDate) -> Option<Vec<Event>> {
        let index = self.month.as_ref()?;
        index.get(date).map(|events| self.filter.apply(events))
    }

    fn refresh_month(self, calendar: &EventCalendar) -> Self {
        let month = calendar
            .month_index(self.view_year, self.view_month)
            .map_err(|err| debug!("Month index unavailable: {}", err))
            .ok();
        Self { month, ..self }
    }

    fn refresh_detail(self, calendar: &EventCalendar) -> Self {
        let detail = calendar
            .day_detail(self.selected, &self.observer)
            .map_err(|err| debug!("Day detail unavailable: {}", err))
            .ok();
        Self { detail, ..self }
    }
}
