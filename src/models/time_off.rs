//! Time-off request models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::enums::{HalfDayType, TimeOffStatus, TimeOffType};
use crate::scheduling::slots::DayPortion;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TimeOffRequest {
    pub id: Uuid,
    pub staff_id: Uuid,
    /// First day off
    pub start_date: NaiveDate,
    /// Last day off, inclusive
    pub end_date: NaiveDate,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub time_off_type: TimeOffType,
    pub reason: String,
    pub status: TimeOffStatus,
    pub is_half_day: bool,
    pub half_day_type: Option<HalfDayType>,
    pub requested_by: String,
    pub approved_by: Option<String>,
    pub comments: Option<String>,
    pub requested_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl TimeOffRequest {
    /// Portion of `date` this request makes unavailable, if any.
    /// Only approved requests count.
    pub fn blocked_portion(&self, date: NaiveDate) -> Option<DayPortion> {
        if self.status != TimeOffStatus::Approved || date < self.start_date || date > self.end_date {
            return None;
        }
        if !self.is_half_day {
            return Some(DayPortion::WholeDay);
        }
        match self.half_day_type {
            Some(HalfDayType::Morning) => Some(DayPortion::Morning),
            Some(HalfDayType::Afternoon) => Some(DayPortion::Afternoon),
            None => Some(DayPortion::WholeDay),
        }
    }

    /// Number of days inside `[from, to]` covered by this request (half days count 0.5)
    pub fn days_within(&self, from: NaiveDate, to: NaiveDate) -> f64 {
        let start = self.start_date.max(from);
        let end = self.end_date.min(to);
        if end < start {
            return 0.0;
        }
        let days = (end - start).num_days() + 1;
        if self.is_half_day {
            days as f64 * 0.5
        } else {
            days as f64
        }
    }
}

/// Create time-off request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTimeOff {
    pub staff_id: Uuid,
    pub start_date: String,
    pub end_date: String,
    #[serde(rename = "type")]
    pub time_off_type: TimeOffType,
    #[validate(length(min = 1, max = 500, message = "reason must be 1-500 characters"))]
    pub reason: String,
    #[serde(default)]
    pub is_half_day: bool,
    pub half_day_type: Option<HalfDayType>,
    #[validate(length(min = 1, message = "requested_by is required"))]
    pub requested_by: String,
}

/// Process a time-off request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateTimeOff {
    pub status: Option<TimeOffStatus>,
    #[validate(length(min = 1))]
    pub approved_by: Option<String>,
    #[validate(length(max = 500))]
    pub comments: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct TimeOffQuery {
    pub status: Option<TimeOffStatus>,
    /// Requests ending on or after this date (YYYY-MM-DD)
    pub start_date: Option<String>,
    /// Requests starting on or before this date (YYYY-MM-DD)
    pub end_date: Option<String>,
}
