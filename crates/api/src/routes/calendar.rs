//! Preventive maintenance calendar endpoints.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use domain::models::{MaintenanceRequest, RequestFilter, RequestType};
use domain::repository::load_directory;
use domain::services::{requests_on_date, upcoming, CalendarError, MonthCursor, MonthGrid};
use serde::{Deserialize, Serialize};
use shared::dates::normalize_date;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::routes::requests::{today, RequestResponse};

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub owner_id: Uuid,
    /// Defaults to the current month when both are absent.
    pub year: Option<i32>,
    pub month: Option<u32>,
    /// Viewer's local date; drives the highlight and the default month.
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct MonthResponse {
    #[serde(flatten)]
    pub grid: MonthGrid,
    pub previous: MonthCursor,
    pub next: MonthCursor,
}

#[derive(Debug, Deserialize)]
pub struct DayQuery {
    pub owner_id: Uuid,
    /// Date or timestamp; only the calendar date is compared.
    pub date: String,
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct DayResponse {
    pub date: NaiveDate,
    pub requests: Vec<RequestResponse>,
}

#[derive(Debug, Deserialize)]
pub struct UpcomingQuery {
    pub owner_id: Uuid,
    pub limit: Option<usize>,
    /// Viewer's local date; jobs before it are skipped.
    pub today: Option<NaiveDate>,
}

async fn preventive_requests(
    state: &AppState,
    owner_id: Uuid,
) -> Result<Vec<MaintenanceRequest>, ApiError> {
    let filter = RequestFilter::for_owner(owner_id).with_type(RequestType::Preventive);
    Ok(state.repository.list_requests(&filter).await?)
}

/// GET /api/v1/calendar?owner_id=&year=&month=&today=
pub async fn get_month(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<MonthResponse>, ApiError> {
    let today = today(query.today);
    let cursor = match (query.year, query.month) {
        (Some(year), Some(month)) => MonthCursor::new(year, month)?,
        (None, None) => MonthCursor::containing(today),
        _ => {
            return Err(ApiError::BadRequest(
                "year and month must be given together".to_string(),
            ))
        }
    };

    let requests = preventive_requests(&state, query.owner_id).await?;

    Ok(Json(MonthResponse {
        grid: MonthGrid::build(cursor, &requests, today),
        previous: cursor.previous_month(),
        next: cursor.next_month(),
    }))
}

/// GET /api/v1/calendar/day?owner_id=&date=&today=
pub async fn get_day(
    State(state): State<AppState>,
    Query(query): Query<DayQuery>,
) -> Result<Json<DayResponse>, ApiError> {
    let date = normalize_date(&query.date).map_err(CalendarError::from)?;
    let requests = preventive_requests(&state, query.owner_id).await?;
    let directory = load_directory(state.repository.as_ref(), query.owner_id).await?;

    let on_day = requests_on_date(&requests, date).into_iter().cloned();
    Ok(Json(DayResponse {
        date,
        requests: RequestResponse::from_list(on_day, &directory, today(query.today)),
    }))
}

/// Next preventive jobs from today on, soonest first.
///
/// GET /api/v1/calendar/upcoming?owner_id=&limit=&today=
pub async fn get_upcoming(
    State(state): State<AppState>,
    Query(query): Query<UpcomingQuery>,
) -> Result<Json<Vec<RequestResponse>>, ApiError> {
    let limit = query
        .limit
        .unwrap_or(state.config.calendar.upcoming_limit);
    let requests = preventive_requests(&state, query.owner_id).await?;
    let directory = load_directory(state.repository.as_ref(), query.owner_id).await?;
    let today = today(query.today);

    let due = upcoming(&requests, today, limit).into_iter().cloned();
    Ok(Json(RequestResponse::from_list(due, &directory, today)))
}
