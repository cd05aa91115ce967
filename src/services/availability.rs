//! Staff availability checks, audit trail, schedule views and statistics

use std::collections::HashSet;

use chrono::{Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use indexmap::IndexMap;
use uuid::Uuid;

use super::{end_of_day, start_of_day, RangeLimit};
use crate::{
    error::{AppError, AppResult},
    models::{
        availability_log::AvailabilityLogQuery,
        schedule::{
            AvailableStaffQuery, BusinessScheduleStats, CheckAvailabilityQuery, DaySchedule,
            StaffAvailability, StaffScheduleStats, StaffWeeklySchedule, StatsQuery,
            WeeklyScheduleView,
        },
        Booking, ShiftType, Staff, StaffAvailabilityLog, StaffShift, TimeOffRequest, TimeOffStatus,
    },
    repository::Repository,
    scheduling::{
        interval::{dates_inclusive, parse_date, parse_time_of_day},
        TimeRange,
    },
};

/// Working hours of a set of shifts; malformed rows count as zero
fn hours_of<'a>(shifts: impl IntoIterator<Item = &'a StaffShift>) -> f64 {
    shifts
        .into_iter()
        .filter_map(|s| s.window().ok())
        .map(|w| w.working_hours())
        .sum()
}

/// Why a staff member cannot take `range` on `date`, if anything prevents it
fn unavailability_reason(
    staff: &Staff,
    date: NaiveDate,
    range: &TimeRange<NaiveTime>,
    shifts: &[StaffShift],
    time_off: &[TimeOffRequest],
    bookings: &[Booking],
) -> Option<&'static str> {
    if !staff.is_active {
        return Some("staff member is inactive");
    }

    let blocked = time_off
        .iter()
        .filter(|r| r.staff_id == staff.id)
        .filter_map(|r| r.blocked_portion(date))
        .any(|portion| portion.clip(&[*range]) != vec![*range]);
    if blocked {
        return Some("staff member has approved time off");
    }

    let own: Vec<&StaffShift> = shifts
        .iter()
        .filter(|s| s.staff_id == staff.id && s.shift_date == date)
        .collect();
    if own.is_empty() {
        return Some("no shift scheduled");
    }

    let covering: Vec<&StaffShift> = own
        .iter()
        .copied()
        .filter(|s| s.time_range().map_or(false, |r| r.contains(range)))
        .collect();
    if covering.is_empty() {
        return Some("requested time is outside scheduled shifts");
    }
    if covering.iter().all(|s| !s.is_available) {
        return Some("shift is disabled");
    }
    let fits = covering.iter().filter(|s| s.is_available).any(|s| {
        s.window()
            .map_or(false, |w| w.working_windows().iter().any(|ww| ww.contains(range)))
    });
    if !fits {
        return Some("requested time overlaps a break");
    }

    let start = Utc.from_utc_datetime(&date.and_time(range.start()));
    let end = Utc.from_utc_datetime(&date.and_time(range.end()));
    let booked = bookings.iter().any(|b| {
        b.staff_id == staff.id && crate::scheduling::interval::overlaps(start, end, b.start_at, b.end_at)
    });
    if booked {
        return Some("staff member has a booking at this time");
    }

    None
}

fn day_schedule(date: NaiveDate, shifts: Vec<StaffShift>) -> DaySchedule {
    let total_hours = hours_of(&shifts);
    DaySchedule {
        date,
        day_of_week: date.format("%A").to_string(),
        is_working_day: !shifts.is_empty(),
        shifts,
        total_hours,
    }
}

fn weekly_schedule(staff: &Staff, week_start: NaiveDate, shifts: &[StaffShift]) -> StaffWeeklySchedule {
    let mut days = IndexMap::new();
    let mut total_hours = 0.0;
    for date in dates_inclusive(week_start, week_start + Duration::days(6)) {
        let of_day: Vec<StaffShift> = shifts
            .iter()
            .filter(|s| s.staff_id == staff.id && s.shift_date == date)
            .cloned()
            .collect();
        let day = day_schedule(date, of_day);
        total_hours += day.total_hours;
        days.insert(date, day);
    }
    StaffWeeklySchedule {
        staff_id: staff.id,
        staff_name: staff.full_name(),
        position: staff.position.clone(),
        days,
        total_hours,
    }
}

/// Period statistics of one staff member from already-loaded rows
fn staff_stats(
    staff: &Staff,
    start: NaiveDate,
    end: NaiveDate,
    shifts: &[StaffShift],
    time_off: &[TimeOffRequest],
) -> StaffScheduleStats {
    let own: Vec<&StaffShift> = shifts.iter().filter(|s| s.staff_id == staff.id).collect();
    let total_working_hours = hours_of(own.iter().copied());
    let total_overtime_hours = hours_of(own.iter().copied().filter(|s| s.shift_type == ShiftType::Overtime));
    let total_shifts = own.len();
    let average_hours_per_shift = if total_shifts > 0 {
        total_working_hours / total_shifts as f64
    } else {
        0.0
    };

    let mut time_off_days: IndexMap<String, f64> = IndexMap::new();
    for request in time_off
        .iter()
        .filter(|r| r.staff_id == staff.id && r.status == TimeOffStatus::Approved)
    {
        let days = request.days_within(start, end);
        if days > 0.0 {
            *time_off_days.entry(request.time_off_type.to_string()).or_insert(0.0) += days;
        }
    }

    let period_days = (end - start).num_days() + 1;
    let utilization_rate = total_working_hours / (period_days as f64 * 8.0) * 100.0;

    StaffScheduleStats {
        staff_id: staff.id,
        staff_name: staff.full_name(),
        period_start: start,
        period_end: end,
        total_shifts,
        total_working_hours,
        total_overtime_hours,
        average_hours_per_shift,
        time_off_days,
        utilization_rate,
    }
}

#[derive(Clone)]
pub struct AvailabilityService {
    repository: Repository,
    limits: RangeLimit,
}

impl AvailabilityService {
    pub fn new(repository: Repository, limits: RangeLimit) -> Self {
        Self { repository, limits }
    }

    async fn evaluate(
        &self,
        staff: &[Staff],
        date: NaiveDate,
        range: &TimeRange<NaiveTime>,
    ) -> AppResult<Vec<StaffAvailability>> {
        let ids: Vec<Uuid> = staff.iter().map(|s| s.id).collect();
        let shifts = self.repository.shifts.list_for_staff(&ids, date, date).await?;
        let time_off = self
            .repository
            .time_off
            .list_for_staff(&ids, Some(date), Some(date), Some(TimeOffStatus::Approved))
            .await?;
        let bookings = self
            .repository
            .bookings
            .list_for_staff(&ids, start_of_day(date), end_of_day(date))
            .await?;

        Ok(staff
            .iter()
            .map(|member| {
                let reason = unavailability_reason(member, date, range, &shifts, &time_off, &bookings);
                StaffAvailability {
                    staff_id: member.id,
                    staff_name: member.full_name(),
                    position: member.position.clone(),
                    is_available: reason.is_none(),
                    reason: reason.map(str::to_string),
                }
            })
            .collect())
    }

    fn parse_request(date: &str, start: &str, end: &str) -> AppResult<(NaiveDate, TimeRange<NaiveTime>)> {
        let date = parse_date(date, "date")?;
        let range = TimeRange::new(
            parse_time_of_day(start, "start time")?,
            parse_time_of_day(end, "end time")?,
        )?;
        Ok((date, range))
    }

    /// Whether one staff member can take `[start_time, end_time)` on `date`
    pub async fn check_staff_availability(
        &self,
        staff_id: Uuid,
        query: &CheckAvailabilityQuery,
    ) -> AppResult<StaffAvailability> {
        let (date, range) = Self::parse_request(&query.date, &query.start_time, &query.end_time)?;
        let staff = self.repository.directory.get_staff(staff_id).await?;
        self.evaluate(std::slice::from_ref(&staff), date, &range)
            .await?
            .pop()
            .ok_or_else(|| AppError::Internal("Availability evaluation returned nothing".to_string()))
    }

    /// Staff of a business free for the requested window
    pub async fn available_staff(
        &self,
        business_id: Uuid,
        query: &AvailableStaffQuery,
    ) -> AppResult<Vec<StaffAvailability>> {
        let (date, range) = Self::parse_request(&query.date, &query.start_time, &query.end_time)?;

        let excluded: HashSet<Uuid> = match query.exclude.as_deref() {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| {
                    Uuid::parse_str(s)
                        .map_err(|_| AppError::Validation(format!("invalid staff id in exclude: {}", s)))
                })
                .collect::<AppResult<_>>()?,
            None => HashSet::new(),
        };

        let staff: Vec<Staff> = self
            .repository
            .directory
            .list_staff(business_id)
            .await?
            .into_iter()
            .filter(|s| s.is_active && !excluded.contains(&s.id))
            .collect();
        if staff.is_empty() {
            return Ok(Vec::new());
        }

        Ok(self
            .evaluate(&staff, date, &range)
            .await?
            .into_iter()
            .filter(|a| a.is_available)
            .collect())
    }

    /// Audit trail of a staff member, newest first; defaults to the last 30 days
    pub async fn availability_logs(
        &self,
        staff_id: Uuid,
        query: &AvailabilityLogQuery,
    ) -> AppResult<Vec<StaffAvailabilityLog>> {
        self.repository.directory.get_staff(staff_id).await?;

        let to = match query.end_date.as_deref() {
            Some(d) => end_of_day(parse_date(d, "end date")?),
            None => Utc::now(),
        };
        let from = match query.start_date.as_deref() {
            Some(d) => start_of_day(parse_date(d, "start date")?),
            None => to - Duration::days(30),
        };
        if to < from {
            return Err(AppError::Validation("end date cannot be before start date".to_string()));
        }

        self.repository
            .availability_logs
            .list(staff_id, from, to, query.limit)
            .await
    }

    // ---- Views ----

    pub async fn staff_day_schedule(&self, staff_id: Uuid, date: &str) -> AppResult<DaySchedule> {
        let date = parse_date(date, "date")?;
        self.repository.directory.get_staff(staff_id).await?;
        let shifts = self.repository.shifts.list_for_staff(&[staff_id], date, date).await?;
        Ok(day_schedule(date, shifts))
    }

    pub async fn staff_weekly_schedule(
        &self,
        staff_id: Uuid,
        week_start: &str,
    ) -> AppResult<StaffWeeklySchedule> {
        let week_start = parse_date(week_start, "week start")?;
        let staff = self.repository.directory.get_staff(staff_id).await?;
        let shifts = self
            .repository
            .shifts
            .list_for_staff(&[staff_id], week_start, week_start + Duration::days(6))
            .await?;
        Ok(weekly_schedule(&staff, week_start, &shifts))
    }

    /// Seven-day view of every active staff member of a business
    pub async fn business_weekly_view(
        &self,
        business_id: Uuid,
        week_start: &str,
    ) -> AppResult<WeeklyScheduleView> {
        let week_start = parse_date(week_start, "week start")?;
        let week_end = week_start + Duration::days(6);

        let staff: Vec<Staff> = self
            .repository
            .directory
            .list_staff(business_id)
            .await?
            .into_iter()
            .filter(|s| s.is_active)
            .collect();
        let ids: Vec<Uuid> = staff.iter().map(|s| s.id).collect();
        let shifts = if ids.is_empty() {
            Vec::new()
        } else {
            self.repository.shifts.list_for_staff(&ids, week_start, week_end).await?
        };

        Ok(WeeklyScheduleView {
            week_start_date: week_start,
            week_end_date: week_end,
            staff_schedules: staff
                .iter()
                .map(|member| weekly_schedule(member, week_start, &shifts))
                .collect(),
        })
    }

    // ---- Statistics ----

    fn stats_period(&self, query: &StatsQuery) -> AppResult<(NaiveDate, NaiveDate)> {
        let start = parse_date(&query.start_date, "start date")?;
        let end = parse_date(&query.end_date, "end date")?;
        self.limits.check(start, end)?;
        Ok((start, end))
    }

    pub async fn staff_stats(&self, staff_id: Uuid, query: &StatsQuery) -> AppResult<StaffScheduleStats> {
        let (start, end) = self.stats_period(query)?;
        let staff = self.repository.directory.get_staff(staff_id).await?;
        let shifts = self.repository.shifts.list_for_staff(&[staff_id], start, end).await?;
        let time_off = self
            .repository
            .time_off
            .list_for_staff(&[staff_id], Some(start), Some(end), Some(TimeOffStatus::Approved))
            .await?;
        Ok(staff_stats(&staff, start, end, &shifts, &time_off))
    }

    pub async fn business_stats(
        &self,
        business_id: Uuid,
        query: &StatsQuery,
    ) -> AppResult<BusinessScheduleStats> {
        let (start, end) = self.stats_period(query)?;
        let staff = self.repository.directory.list_staff(business_id).await?;
        let ids: Vec<Uuid> = staff.iter().map(|s| s.id).collect();

        let (shifts, time_off) = if ids.is_empty() {
            (Vec::new(), Vec::new())
        } else {
            (
                self.repository.shifts.list_for_staff(&ids, start, end).await?,
                self.repository
                    .time_off
                    .list_for_staff(&ids, Some(start), Some(end), None)
                    .await?,
            )
        };

        let breakdown: Vec<StaffScheduleStats> = staff
            .iter()
            .map(|member| staff_stats(member, start, end, &shifts, &time_off))
            .collect();

        let total_working_hours: f64 = breakdown.iter().map(|s| s.total_working_hours).sum();
        let total_overtime_hours: f64 = breakdown.iter().map(|s| s.total_overtime_hours).sum();
        let average_hours_per_staff = if staff.is_empty() {
            0.0
        } else {
            total_working_hours / staff.len() as f64
        };

        Ok(BusinessScheduleStats {
            business_id,
            period_start: start,
            period_end: end,
            total_staff: staff.len(),
            total_shifts: shifts.len(),
            total_working_hours,
            total_overtime_hours,
            average_hours_per_staff,
            total_time_off_requests: time_off.len(),
            staff_breakdown: query.include_staff_breakdown.then_some(breakdown),
        })
    }
}
