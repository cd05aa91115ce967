//! Weekly template expansion and schedule copy planning

use chrono::{DateTime, Duration, NaiveDate, Utc};
use uuid::Uuid;

use super::{
    interval::{dates_inclusive, weekday_index},
    validation::{parse_shift_times, ShiftWindow},
};
use crate::{
    error::{AppError, AppResult},
    models::{DayTemplate, ShiftType, StaffShift, WeeklyTemplate},
};

/// A shift to be created, before it gets an id and an actor
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftDraft {
    pub staff_id: Uuid,
    pub shift_date: NaiveDate,
    pub window: ShiftWindow,
    pub shift_type: ShiftType,
    pub is_available: bool,
    pub notes: Option<String>,
}

impl ShiftDraft {
    pub fn into_shift(self, actor: &str, now: DateTime<Utc>) -> StaffShift {
        StaffShift {
            id: Uuid::new_v4(),
            staff_id: self.staff_id,
            shift_date: self.shift_date,
            start_time: self.window.range.start(),
            end_time: self.window.range.end(),
            break_start: self.window.break_range.map(|b| b.start()),
            break_end: self.window.break_range.map(|b| b.end()),
            is_available: self.is_available,
            is_manually_disabled: !self.is_available,
            manual_disable_reason: None,
            shift_type: self.shift_type,
            notes: self.notes,
            created_by: actor.to_string(),
            updated_by: actor.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Shift windows described by one template day.
///
/// Non-working days give nothing. Explicit sub-shifts win over the day
/// times; otherwise the day times make a single regular shift.
pub fn day_windows(day: &DayTemplate) -> AppResult<Vec<(ShiftWindow, ShiftType)>> {
    if !day.is_working_day {
        return Ok(Vec::new());
    }

    let windows: Vec<(ShiftWindow, ShiftType)> = if !day.shifts.is_empty() {
        day.shifts
            .iter()
            .map(|s| {
                parse_shift_times(
                    &s.start_time,
                    &s.end_time,
                    s.break_start.as_deref(),
                    s.break_end.as_deref(),
                )
                .map(|w| (w, s.shift_type))
            })
            .collect::<AppResult<_>>()?
    } else {
        let (Some(start), Some(end)) = (day.start_time.as_deref(), day.end_time.as_deref()) else {
            return Err(AppError::Validation(
                "working day requires start_time and end_time".to_string(),
            ));
        };
        let window = parse_shift_times(start, end, day.break_start.as_deref(), day.break_end.as_deref())?;
        vec![(window, ShiftType::Regular)]
    };

    for (i, (a, _)) in windows.iter().enumerate() {
        if windows.iter().skip(i + 1).any(|(b, _)| a.range.overlaps(&b.range)) {
            return Err(AppError::Validation(
                "template shifts of one day must not overlap".to_string(),
            ));
        }
    }

    Ok(windows)
}

/// Check every day of a weekly template
pub fn validate_weekly_template(template: &WeeklyTemplate) -> AppResult<()> {
    for day in template.0.iter() {
        day_windows(day)?;
    }
    Ok(())
}

/// Drafts for every date of `[start, end]` following the weekday templates
pub fn expand_template(
    staff_id: Uuid,
    template: &WeeklyTemplate,
    start: NaiveDate,
    end: NaiveDate,
) -> AppResult<Vec<ShiftDraft>> {
    let mut drafts = Vec::new();
    for date in dates_inclusive(start, end) {
        for (window, shift_type) in day_windows(template.day(weekday_index(date)))? {
            drafts.push(ShiftDraft {
                staff_id,
                shift_date: date,
                window,
                shift_type,
                is_available: true,
                notes: None,
            });
        }
    }
    Ok(drafts)
}

/// Drafts copying `source` shifts `day_offset` days later, ordered by date
pub fn plan_copy(source: &[StaffShift], day_offset: i64) -> AppResult<Vec<ShiftDraft>> {
    let mut ordered: Vec<&StaffShift> = source.iter().collect();
    ordered.sort_by_key(|s| (s.staff_id, s.shift_date, s.start_time));

    ordered
        .into_iter()
        .map(|shift| {
            Ok(ShiftDraft {
                staff_id: shift.staff_id,
                shift_date: shift.shift_date + Duration::days(day_offset),
                window: shift.window()?,
                shift_type: shift.shift_type,
                is_available: shift.is_available,
                notes: shift.notes.clone(),
            })
        })
        .collect()
}
