//! Calendar projection of preventive requests.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use shared::dates::{normalize_date, DateParseError};

use crate::models::{MaintenanceRequest, RequestType};

/// Number of upcoming requests shown next to the calendar.
pub const DEFAULT_UPCOMING_LIMIT: usize = 5;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CalendarError {
    #[error("Invalid month: {0}. Must be between 1 and 12")]
    InvalidMonth(u32),
    #[error("Year out of range: {0}")]
    InvalidYear(i32),
    #[error(transparent)]
    Date(#[from] DateParseError),
}

// ============================================================================
// Date arithmetic
// ============================================================================

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Gregorian day count. Returns 0 for a month outside 1..=12.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Weekday of the first of the month, 0 = Sunday.
pub fn first_weekday_of_month(year: i32, month: u32) -> Option<u32> {
    NaiveDate::from_ymd_opt(year, month, 1).map(|date| date.weekday().num_days_from_sunday())
}

// ============================================================================
// Lookups
// ============================================================================

/// Requests scheduled exactly on `date`, in input order.
pub fn requests_on_date(requests: &[MaintenanceRequest], date: NaiveDate) -> Vec<&MaintenanceRequest> {
    requests
        .iter()
        .filter(|request| request.scheduled_date == Some(date))
        .collect()
}

/// Like [`requests_on_date`], normalizing a date or timestamp string first.
pub fn requests_on_date_str<'a>(
    requests: &'a [MaintenanceRequest],
    date: &str,
) -> Result<Vec<&'a MaintenanceRequest>, CalendarError> {
    let date = normalize_date(date)?;
    Ok(requests_on_date(requests, date))
}

/// Preventive requests grouped by scheduled day.
pub fn index_by_date(requests: &[MaintenanceRequest]) -> BTreeMap<NaiveDate, Vec<&MaintenanceRequest>> {
    let mut index: BTreeMap<NaiveDate, Vec<&MaintenanceRequest>> = BTreeMap::new();
    for request in requests {
        if request.request_type != RequestType::Preventive {
            continue;
        }
        if let Some(date) = request.scheduled_date {
            index.entry(date).or_default().push(request);
        }
    }
    index
}

/// Preventive requests due on or after `from`, soonest first.
pub fn upcoming(
    requests: &[MaintenanceRequest],
    from: NaiveDate,
    limit: usize,
) -> Vec<&MaintenanceRequest> {
    let mut due: Vec<&MaintenanceRequest> = requests
        .iter()
        .filter(|request| request.request_type == RequestType::Preventive)
        .filter(|request| request.scheduled_date.is_some_and(|date| date >= from))
        .collect();
    due.sort_by_key(|request| request.scheduled_date);
    due.truncate(limit);
    due
}

// ============================================================================
// Month navigation
// ============================================================================

/// The month currently displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MonthCursor {
    year: i32,
    month: u32,
}

impl MonthCursor {
    pub fn new(year: i32, month: u32) -> Result<Self, CalendarError> {
        if !(1..=12).contains(&month) {
            return Err(CalendarError::InvalidMonth(month));
        }
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(CalendarError::InvalidYear(year));
        }
        Ok(Self { year, month })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn next_month(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                month: self.month + 1,
                ..self
            }
        }
    }

    pub fn previous_month(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                month: self.month - 1,
                ..self
            }
        }
    }

    pub fn days(&self) -> u32 {
        days_in_month(self.year, self.month)
    }

    /// Blank cells before day 1 in a Sunday-first grid.
    pub fn leading_blanks(&self) -> u32 {
        first_weekday_of_month(self.year, self.month).unwrap_or(0)
    }

    pub fn date(&self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for MonthCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", MONTH_NAMES[(self.month - 1) as usize], self.year)
    }
}

// ============================================================================
// Month grid
// ============================================================================

/// One day of the month grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DayCell {
    pub date: NaiveDate,
    pub day: u32,
    pub is_today: bool,
    /// Every request on this day; display truncation is up to the renderer.
    pub requests: Vec<MaintenanceRequest>,
}

/// A month of day cells, preceded by blank cells to align the first weekday.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub label: String,
    pub leading_blanks: u32,
    pub days: Vec<DayCell>,
}

impl MonthGrid {
    /// Build the grid for `cursor`. `today` only drives the highlight.
    pub fn build(cursor: MonthCursor, requests: &[MaintenanceRequest], today: NaiveDate) -> Self {
        let index = index_by_date(requests);
        let days = (1..=cursor.days())
            .filter_map(|day| cursor.date(day))
            .map(|date| DayCell {
                date,
                day: date.day(),
                is_today: date == today,
                requests: index
                    .get(&date)
                    .map(|on_day| on_day.iter().map(|r| (*r).clone()).collect())
                    .unwrap_or_default(),
            })
            .collect();

        Self {
            year: cursor.year(),
            month: cursor.month(),
            label: cursor.to_string(),
            leading_blanks: cursor.leading_blanks(),
            days,
        }
    }

    pub fn day(&self, day: u32) -> Option<&DayCell> {
        self.days.get(day.checked_sub(1)? as usize)
    }

    pub fn today(&self) -> Option<&DayCell> {
        self.days.iter().find(|cell| cell.is_today)
    }
}
