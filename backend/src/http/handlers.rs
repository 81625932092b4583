//! HTTP handlers for the REST API.
//!
//! Scans are CPU-bound and synchronous, so every handler that may scan runs
//! the calendar call inside `spawn_blocking`.

use axum::{
    extract::{Path, Query, State},
    http::{header, Uri},
    response::IntoResponse,
    Json,
};

use super::dto::{DaySummaryResponse, HealthResponse, MonthResponse, ObserverQuery};
use super::error::AppError;
use super::state::AppState;
use crate::models::time::parse_date;
use crate::services::{DayDetail, EventFilter};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        cached_months: state.calendar.cached_months().len(),
    }))
}

/// Fallback for unknown routes.
pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}

// =============================================================================
// Month grid
// =============================================================================

/// GET /v1/months/{year}/{month}
///
/// Month index for the grid, filtered by the category flags in the query.
pub async fn get_month(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
    Query(filter): Query<EventFilter>,
) -> HandlerResult<MonthResponse> {
    let calendar = state.calendar.clone();
    let index = tokio::task::spawn_blocking(move || calendar.month_index(year, month)).await??;

    Ok(Json(MonthResponse::from_index(&index, &filter)))
}

// =============================================================================
// Day queries
// =============================================================================

/// GET /v1/days/{date}/summary
///
/// Cached observer-independent events of a day.
pub async fn get_day_summary(
    State(state): State<AppState>,
    Path(date): Path<String>,
    Query(filter): Query<EventFilter>,
) -> HandlerResult<DaySummaryResponse> {
    let date = parse_date(&date)?;
    let calendar = state.calendar.clone();
    let events =
        tokio::task::spawn_blocking(move || calendar.day_events_summary(date, &filter)).await??;

    Ok(Json(DaySummaryResponse { date, events }))
}

/// GET /v1/days/{date}
///
/// Full scan and detail panel for an observer (`lat`, `lon`, `elevation`).
pub async fn get_day_detail(
    State(state): State<AppState>,
    Path(date): Path<String>,
    Query(query): Query<ObserverQuery>,
) -> HandlerResult<DayDetail> {
    let date = parse_date(&date)?;
    let observer = query.resolve(state.default_observer)?;
    let calendar = state.calendar.clone();
    let detail = tokio::task::spawn_blocking(move || calendar.day_detail(date, &observer)).await??;

    Ok(Json(detail))
}

/// GET /v1/days/{date}/events/{index}/ics
///
/// Calendar file for one event of the detailed day list.
pub async fn get_event_ics(
    State(state): State<AppState>,
    Path((date, index)): Path<(String, usize)>,
    Query(query): Query<ObserverQuery>,
) -> Result<impl IntoResponse, AppError> {
    let date = parse_date(&date)?;
    let observer = query.resolve(state.default_observer)?;
    let calendar = state.calendar.clone();
    let doc =
        tokio::task::spawn_blocking(move || calendar.export_ics(date, &observer, index)).await??;

    let disposition = format!("attachment; filename=\"{}\"", doc.filename);
    Ok((
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        doc.content,
    ))
}
