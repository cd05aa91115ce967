//! Half-open time ranges and the wire formats for dates and times of day

use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use serde::Serialize;

use crate::error::{AppError, AppResult};

/// `HH:MM`
pub const TIME_FORMAT: &str = "%H:%M";
/// `YYYY-MM-DD`
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A half-open range `[start, end)` with `start < end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TimeRange<T> {
    start: T,
    end: T,
}

impl<T: Ord + Copy> TimeRange<T> {
    pub fn new(start: T, end: T) -> AppResult<Self> {
        if end <= start {
            return Err(AppError::Validation(
                "end time must be after start time".to_string(),
            ));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> T {
        self.start
    }

    pub fn end(&self) -> T {
        self.end
    }

    /// True when the two ranges share at least one instant.
    /// Ranges that merely touch (`a.end == b.start`) do not overlap.
    pub fn overlaps(&self, other: &TimeRange<T>) -> bool {
        overlaps(self.start, self.end, other.start, other.end)
    }

    /// True when `other` lies entirely within this range
    pub fn contains(&self, other: &TimeRange<T>) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl TimeRange<NaiveTime> {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Half-open overlap test on raw bounds
pub fn overlaps<T: Ord>(a_start: T, a_end: T, b_start: T, b_end: T) -> bool {
    a_start < b_end && b_start < a_end
}

/// Parse a `HH:MM` time of day; `field` names the offending input in the error
pub fn parse_time_of_day(value: &str, field: &str) -> AppResult<NaiveTime> {
    NaiveTime::parse_from_str(value, TIME_FORMAT)
        .map_err(|_| AppError::Validation(format!("invalid {} format (use HH:MM)", field)))
}

/// Parse an optional `HH:MM`; empty strings count as absent
pub fn parse_optional_time(value: Option<&str>, field: &str) -> AppResult<Option<NaiveTime>> {
    match value {
        Some(v) if !v.is_empty() => parse_time_of_day(v, field).map(Some),
        _ => Ok(None),
    }
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(value: &str, field: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| AppError::Validation(format!("invalid {} format (use YYYY-MM-DD)", field)))
}

/// Validate `start <= end` for an inclusive date range
pub fn check_date_range(start: NaiveDate, end: NaiveDate) -> AppResult<()> {
    if end < start {
        return Err(AppError::Validation(
            "end date cannot be before start date".to_string(),
        ));
    }
    Ok(())
}

pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// Weekday index with 0 = Sunday … 6 = Saturday
pub fn weekday_index(date: NaiveDate) -> usize {
    date.weekday().num_days_from_sunday() as usize
}

/// Every date from `start` to `end`, both inclusive, ascending
pub fn dates_inclusive(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}

/// Serde adapter rendering a `NaiveTime` as `HH:MM`
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_time(*time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, super::TIME_FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
            .map_err(serde::de::Error::custom)
    }
}

/// Same as [`hhmm`] for optional fields
pub mod hhmm_option {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        time: &Option<NaiveTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match time {
            Some(t) => serializer.serialize_some(&super::format_time(*t)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(s) if s.is_empty() => Ok(None),
            Some(s) => NaiveTime::parse_from_str(&s, super::TIME_FORMAT)
                .or_else(|_| NaiveTime::parse_from_str(&s, "%H:%M:%S"))
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}
