//! Business logic services

pub mod availability;
pub mod bookings;
pub mod conflicts;
pub mod schedules;
pub mod time_off;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::{
    config::SchedulingConfig,
    error::{AppError, AppResult},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub bookings: bookings::BookingsService,
    pub schedules: schedules::SchedulesService,
    pub availability: availability::AvailabilityService,
    pub conflicts: conflicts::ConflictsService,
    pub time_off: time_off::TimeOffService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, scheduling: &SchedulingConfig) -> AppResult<Self> {
        let slot_settings = scheduling
            .slot_settings()
            .map_err(|e| AppError::Internal(format!("Invalid scheduling configuration: {}", e)))?;
        let limits = RangeLimit(scheduling.max_range_days);

        Ok(Self {
            bookings: bookings::BookingsService::new(repository.clone(), slot_settings),
            schedules: schedules::SchedulesService::new(repository.clone(), limits),
            availability: availability::AvailabilityService::new(repository.clone(), limits),
            conflicts: conflicts::ConflictsService::new(repository.clone(), limits),
            time_off: time_off::TimeOffService::new(repository),
        })
    }
}

/// Longest date span, in days, a single range operation may cover
#[derive(Debug, Clone, Copy)]
pub struct RangeLimit(pub u32);

impl RangeLimit {
    pub fn check(&self, start: NaiveDate, end: NaiveDate) -> AppResult<()> {
        crate::scheduling::interval::check_date_range(start, end)?;
        let days = (end - start).num_days() + 1;
        if days > self.0 as i64 {
            return Err(AppError::Validation(format!(
                "date range spans {} days, the limit is {}",
                days, self.0
            )));
        }
        Ok(())
    }
}

/// Midnight UTC at the start of `date`
pub(crate) fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

/// Midnight UTC at the start of the day after `date`
pub(crate) fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    start_of_day(date) + Duration::days(1)
}
