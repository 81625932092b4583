//! Application state for the HTTP server.

use std::sync::Arc;

use crate::models::Observer;
use crate::services::EventCalendar;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub calendar: Arc<EventCalendar>,
    /// Observer used when a request carries no coordinates.
    pub default_observer: Observer,
}

impl AppState {
    pub fn new(calendar: Arc<EventCalendar>, default_observer: Observer) -> Self {
        Self {
            calendar,
            default_observer,
        }
    }
}
