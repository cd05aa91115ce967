//! Stateless validation of shift times and breaks

use chrono::NaiveTime;

use super::interval::{parse_optional_time, parse_time_of_day, TimeRange};
use crate::error::{AppError, AppResult};

/// A validated shift: working range plus an optional break fully inside it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftWindow {
    pub range: TimeRange<NaiveTime>,
    pub break_range: Option<TimeRange<NaiveTime>>,
}

impl ShiftWindow {
    /// Hours worked, excluding the break
    pub fn working_hours(&self) -> f64 {
        let mut minutes = self.range.duration().num_minutes();
        if let Some(b) = self.break_range {
            minutes -= b.duration().num_minutes();
        }
        minutes as f64 / 60.0
    }

    /// The shift split around its break
    pub fn working_windows(&self) -> Vec<TimeRange<NaiveTime>> {
        match self.break_range {
            None => vec![self.range],
            Some(b) => [(self.range.start(), b.start()), (b.end(), self.range.end())]
                .into_iter()
                .filter_map(|(s, e)| TimeRange::new(s, e).ok())
                .collect(),
        }
    }
}

/// Check `start < end` and the break rules on already parsed times
pub fn validate_shift_times(
    start: NaiveTime,
    end: NaiveTime,
    break_start: Option<NaiveTime>,
    break_end: Option<NaiveTime>,
) -> AppResult<ShiftWindow> {
    let range = TimeRange::new(start, end)?;

    let break_range = match (break_start, break_end) {
        (None, None) => None,
        (Some(bs), Some(be)) => {
            let b = TimeRange::new(bs, be).map_err(|_| {
                AppError::Validation("break end time must be after break start time".to_string())
            })?;
            if !range.contains(&b) {
                return Err(AppError::Validation(
                    "break time must be within shift hours".to_string(),
                ));
            }
            Some(b)
        }
        _ => {
            return Err(AppError::Validation(
                "break start and break end must be given together".to_string(),
            ))
        }
    };

    Ok(ShiftWindow { range, break_range })
}

/// Parse `HH:MM` inputs then run [`validate_shift_times`]
pub fn parse_shift_times(
    start: &str,
    end: &str,
    break_start: Option<&str>,
    break_end: Option<&str>,
) -> AppResult<ShiftWindow> {
    let start = parse_time_of_day(start, "start time")?;
    let end = parse_time_of_day(end, "end time")?;
    let break_start = parse_optional_time(break_start, "break start time")?;
    let break_end = parse_optional_time(break_end, "break end time")?;
    validate_shift_times(start, end, break_start, break_end)
}
