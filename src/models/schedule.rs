//! Schedule models (weekly templates, staff shifts, bulk operations, views)

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::enums::ShiftType;
use crate::{
    error::AppResult,
    scheduling::{
        interval::{hhmm, hhmm_option, TimeRange},
        validation::{validate_shift_times, ShiftWindow},
    },
};

/// `HH:MM`, 24-hour clock
pub static HHMM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]$").unwrap());

// ---------------------------------------------------------------------------
// ScheduleTemplate
// ---------------------------------------------------------------------------

/// One shift inside a template day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ShiftTemplate {
    pub start_time: String,
    pub end_time: String,
    pub break_start: Option<String>,
    pub break_end: Option<String>,
    #[serde(default)]
    pub shift_type: ShiftType,
}

/// Template for a single weekday
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DayTemplate {
    pub is_working_day: bool,
    /// Day start (HH:MM), used when `shifts` is empty
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub break_start: Option<String>,
    pub break_end: Option<String>,
    /// Explicit shift windows; when present they replace the day times
    #[serde(default)]
    pub shifts: Vec<ShiftTemplate>,
}

/// Seven day templates indexed by weekday, 0 = Sunday
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeeklyTemplate(pub [DayTemplate; 7]);

impl WeeklyTemplate {
    pub fn day(&self, weekday: usize) -> &DayTemplate {
        &self.0[weekday % 7]
    }
}

/// A named weekly pattern for one staff member
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ScheduleTemplate {
    pub id: Uuid,
    pub staff_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// At most one default template per staff member
    pub is_default: bool,
    #[sqlx(json)]
    #[schema(value_type = Vec<DayTemplate>)]
    pub schedule: WeeklyTemplate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create template request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTemplate {
    pub staff_id: Uuid,
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[serde(default)]
    pub is_default: bool,
    #[schema(value_type = Vec<DayTemplate>)]
    pub schedule: WeeklyTemplate,
}

/// Update template request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateTemplate {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub is_default: Option<bool>,
    #[schema(value_type = Option<Vec<DayTemplate>>)]
    pub schedule: Option<WeeklyTemplate>,
}

// ---------------------------------------------------------------------------
// StaffShift
// ---------------------------------------------------------------------------

/// A concrete working shift of one staff member on one date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct StaffShift {
    pub id: Uuid,
    pub staff_id: Uuid,
    pub shift_date: NaiveDate,
    #[serde(with = "hhmm")]
    #[schema(value_type = String, example = "09:00")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    #[schema(value_type = String, example = "18:00")]
    pub end_time: NaiveTime,
    #[serde(with = "hhmm_option", default)]
    #[schema(value_type = Option<String>, example = "12:00")]
    pub break_start: Option<NaiveTime>,
    #[serde(with = "hhmm_option", default)]
    #[schema(value_type = Option<String>, example = "13:00")]
    pub break_end: Option<NaiveTime>,
    pub is_available: bool,
    pub is_manually_disabled: bool,
    pub manual_disable_reason: Option<String>,
    pub shift_type: ShiftType,
    pub notes: Option<String>,
    pub created_by: String,
    pub updated_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StaffShift {
    pub fn time_range(&self) -> AppResult<TimeRange<NaiveTime>> {
        TimeRange::new(self.start_time, self.end_time)
    }

    pub fn window(&self) -> AppResult<ShiftWindow> {
        validate_shift_times(self.start_time, self.end_time, self.break_start, self.break_end)
    }
}

/// Create shift request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateShift {
    pub staff_id: Uuid,
    /// YYYY-MM-DD
    pub shift_date: String,
    #[validate(regex(path = *HHMM_RE, message = "start_time must be HH:MM"))]
    pub start_time: String,
    #[validate(regex(path = *HHMM_RE, message = "end_time must be HH:MM"))]
    pub end_time: String,
    #[validate(regex(path = *HHMM_RE, message = "break_start must be HH:MM"))]
    pub break_start: Option<String>,
    #[validate(regex(path = *HHMM_RE, message = "break_end must be HH:MM"))]
    pub break_end: Option<String>,
    #[serde(default)]
    pub shift_type: ShiftType,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
    #[validate(length(min = 1, message = "created_by is required"))]
    pub created_by: String,
}

/// Partial shift update. An empty `break_start`/`break_end` pair removes the break.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateShift {
    #[validate(regex(path = *HHMM_RE, message = "start_time must be HH:MM"))]
    pub start_time: Option<String>,
    #[validate(regex(path = *HHMM_RE, message = "end_time must be HH:MM"))]
    pub end_time: Option<String>,
    pub break_start: Option<String>,
    pub break_end: Option<String>,
    pub shift_type: Option<ShiftType>,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
    pub is_available: Option<bool>,
    #[validate(length(min = 1, message = "updated_by is required"))]
    pub updated_by: String,
}

/// Enable or disable a shift
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateShiftAvailability {
    pub is_available: bool,
    #[validate(length(max = 500))]
    pub reason: Option<String>,
    #[validate(length(min = 1, message = "action_by is required"))]
    pub action_by: String,
}

/// Query parameters for listing shifts
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ShiftQuery {
    /// YYYY-MM-DD, defaults to today
    pub start_date: Option<String>,
    /// YYYY-MM-DD, defaults to start_date + 6 days
    pub end_date: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct DeleteShiftQuery {
    /// Recorded in the availability log, defaults to "system"
    pub action_by: Option<String>,
}

// ---- Bulk operations ----

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BulkCreateShifts {
    #[validate(length(min = 1, message = "at least one shift is required"))]
    #[validate(nested)]
    pub shifts: Vec<CreateShift>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct BulkShiftUpdate {
    pub shift_id: Uuid,
    #[validate(nested)]
    pub update: UpdateShift,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BulkUpdateShifts {
    #[validate(length(min = 1, message = "at least one update is required"))]
    #[validate(nested)]
    pub updates: Vec<BulkShiftUpdate>,
}

/// Outcome of one item of a bulk update
#[derive(Debug, Serialize, ToSchema)]
pub struct BulkUpdateResult {
    pub shift_id: Uuid,
    pub success: bool,
    pub shift: Option<StaffShift>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BulkDeleteShifts {
    #[validate(length(min = 1, message = "at least one shift id is required"))]
    pub shift_ids: Vec<Uuid>,
    #[validate(length(min = 1, message = "action_by is required"))]
    pub action_by: String,
}

/// Expand templates into shifts over a date range
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GenerateSchedule {
    #[validate(length(min = 1, message = "at least one staff id is required"))]
    pub staff_ids: Vec<Uuid>,
    pub start_date: String,
    pub end_date: String,
    /// Applied to every listed staff; each staff's default template otherwise
    pub template_id: Option<Uuid>,
    #[serde(default)]
    pub overwrite_existing: bool,
    #[validate(length(min = 1, message = "generated_by is required"))]
    pub generated_by: String,
}

/// Copy a date range of shifts to another start date
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CopySchedule {
    #[validate(length(min = 1, message = "at least one staff id is required"))]
    pub staff_ids: Vec<Uuid>,
    pub source_start_date: String,
    pub source_end_date: String,
    pub target_start_date: String,
    #[serde(default)]
    pub overwrite_existing: bool,
    #[validate(length(min = 1, message = "action_by is required"))]
    pub action_by: String,
}

/// Enable or disable every shift of a staff member on one date
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct QuickStaffAction {
    pub date: String,
    #[validate(length(max = 500))]
    pub reason: Option<String>,
    #[validate(length(min = 1, message = "action_by is required"))]
    pub action_by: String,
}

/// Number of shifts created, copied, changed or deleted
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ShiftCountResponse {
    pub count: usize,
}

// ---------------------------------------------------------------------------
// Availability
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct CheckAvailabilityQuery {
    pub date: String,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct AvailableStaffQuery {
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    /// Comma separated staff ids to leave out
    pub exclude: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StaffAvailability {
    pub staff_id: Uuid,
    pub staff_name: String,
    pub position: Option<String>,
    pub is_available: bool,
    pub reason: Option<String>,
}

// ---------------------------------------------------------------------------
// Views and statistics
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct DayViewQuery {
    pub date: String,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct WeekViewQuery {
    /// First day of the week (YYYY-MM-DD)
    pub week_start: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DaySchedule {
    pub date: NaiveDate,
    pub day_of_week: String,
    pub is_working_day: bool,
    pub shifts: Vec<StaffShift>,
    pub total_hours: f64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StaffWeeklySchedule {
    pub staff_id: Uuid,
    pub staff_name: String,
    pub position: Option<String>,
    /// Keyed by date, ascending
    #[schema(value_type = Object)]
    pub days: IndexMap<NaiveDate, DaySchedule>,
    pub total_hours: f64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WeeklyScheduleView {
    pub week_start_date: NaiveDate,
    pub week_end_date: NaiveDate,
    pub staff_schedules: Vec<StaffWeeklySchedule>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct StatsQuery {
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub include_staff_breakdown: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StaffScheduleStats {
    pub staff_id: Uuid,
    pub staff_name: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub total_shifts: usize,
    pub total_working_hours: f64,
    pub total_overtime_hours: f64,
    pub average_hours_per_shift: f64,
    /// Approved time-off days inside the period, by type
    #[schema(value_type = Object)]
    pub time_off_days: IndexMap<String, f64>,
    /// Working hours against 8-hour days, in percent
    pub utilization_rate: f64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BusinessScheduleStats {
    pub business_id: Uuid,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub total_staff: usize,
    pub total_shifts: usize,
    pub total_working_hours: f64,
    pub total_overtime_hours: f64,
    pub average_hours_per_staff: f64,
    pub total_time_off_requests: usize,
    pub staff_breakdown: Option<Vec<StaffScheduleStats>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shift(start: &str) -> CreateShift {
        CreateShift {
            staff_id: Uuid::new_v4(),
            shift_date: "2025-01-13".to_string(),
            start_time: start.to_string(),
            end_time: "17:00".to_string(),
            break_start: None,
            break_end: None,
            shift_type: ShiftType::Regular,
            notes: None,
            created_by: "manager".to_string(),
        }
    }

    #[test]
    fn test_bulk_create_requires_valid_items() {
        assert!(BulkCreateShifts { shifts: vec![] }.validate().is_err());
        assert!(BulkCreateShifts { shifts: vec![shift("9am")] }.validate().is_err());
        assert!(BulkCreateShifts { shifts: vec![shift("09:00")] }.validate().is_ok());
    }

    #[test]
    fn test_bulk_update_requires_actor() {
        assert!(BulkUpdateShifts { updates: vec![] }.validate().is_err());

        let mut update = BulkShiftUpdate {
            shift_id: Uuid::new_v4(),
            update: UpdateShift {
                notes: Some("covering".to_string()),
                ..Default::default()
            },
        };
        assert!(BulkUpdateShifts { updates: vec![update] }.validate().is_err());

        update = BulkShiftUpdate {
            shift_id: Uuid::new_v4(),
            update: UpdateShift {
                updated_by: "manager".to_string(),
                ..Default::default()
            },
        };
        assert!(BulkUpdateShifts { updates: vec![update] }.validate().is_ok());
    }
}
