//! Bookable slot generation

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::interval::TimeRange;
use crate::{
    error::AppResult,
    models::{Booking, BusinessWorkingHours, Slot, StaffShift},
};

/// Where a staff member's working windows for a day come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowSource {
    /// Available shifts, falling back to business hours then the default window
    Shifts,
    /// Always the configured default window
    Fixed,
}

/// Slot stepping parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotSettings {
    pub step: Duration,
    pub duration: Duration,
    pub window_source: WindowSource,
    pub default_window: TimeRange<NaiveTime>,
}

impl SlotSettings {
    pub fn new(
        step_minutes: u32,
        duration_minutes: u32,
        window_source: WindowSource,
        open: NaiveTime,
        close: NaiveTime,
    ) -> Result<Self, String> {
        if step_minutes == 0 || duration_minutes == 0 {
            return Err("slot step and duration must be positive".to_string());
        }
        let default_window = TimeRange::new(open, close)
            .map_err(|_| "default_close must be after default_open".to_string())?;
        Ok(Self {
            step: Duration::minutes(step_minutes as i64),
            duration: Duration::minutes(duration_minutes as i64),
            window_source,
            default_window,
        })
    }

    /// Same settings with another slot length
    pub fn with_duration_minutes(self, minutes: i64) -> Self {
        Self {
            duration: Duration::minutes(minutes),
            ..self
        }
    }
}

/// Part of a day removed by approved time off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayPortion {
    WholeDay,
    /// Everything before noon
    Morning,
    /// Everything from noon on
    Afternoon,
}

impl DayPortion {
    fn noon() -> NaiveTime {
        NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default()
    }

    /// Remove this portion from `windows`
    pub fn clip(&self, windows: &[TimeRange<NaiveTime>]) -> Vec<TimeRange<NaiveTime>> {
        let noon = Self::noon();
        windows
            .iter()
            .filter_map(|w| match self {
                DayPortion::WholeDay => None,
                DayPortion::Morning => TimeRange::new(w.start().max(noon), w.end()).ok(),
                DayPortion::Afternoon => TimeRange::new(w.start(), w.end().min(noon)).ok(),
            })
            .collect()
    }
}

/// Working windows of one staff member on one day, before time off.
///
/// `shifts` are the staff member's shifts on that day, `hours` the business
/// hours for the weekday when configured.
pub fn working_windows(
    settings: &SlotSettings,
    shifts: &[StaffShift],
    hours: Option<&BusinessWorkingHours>,
) -> AppResult<Vec<TimeRange<NaiveTime>>> {
    if settings.window_source == WindowSource::Fixed {
        return Ok(vec![settings.default_window]);
    }

    if !shifts.is_empty() {
        let mut windows = Vec::new();
        for shift in shifts.iter().filter(|s| s.is_available) {
            windows.extend(shift.window()?.working_windows());
        }
        windows.sort_by_key(|w| w.start());
        return Ok(windows);
    }

    match hours {
        Some(h) if !h.is_enabled => Ok(Vec::new()),
        Some(h) => Ok(TimeRange::new(h.start_time, h.end_time).into_iter().collect()),
        None => Ok(vec![settings.default_window]),
    }
}

fn at(day: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_time(time))
}

/// Step through each window and keep candidates that no booking overlaps.
///
/// Candidates start at `open, open + step, ...` while `start + duration <= close`.
/// Output is sorted by start.
pub fn generate_slots(
    staff_id: Uuid,
    day: NaiveDate,
    windows: &[TimeRange<NaiveTime>],
    bookings: &[Booking],
    settings: &SlotSettings,
) -> Vec<Slot> {
    let mut slots = Vec::new();
    for window in windows {
        let close = at(day, window.end());
        let mut start = at(day, window.start());
        while start + settings.duration <= close {
            let end = start + settings.duration;
            let taken = bookings.iter().any(|b| {
                b.staff_id == staff_id && super::interval::overlaps(start, end, b.start_at, b.end_at)
            });
            if !taken {
                slots.push(Slot { staff_id, start, end });
            }
            start += settings.step;
        }
    }
    slots.sort();
    slots.dedup();
    slots
}
