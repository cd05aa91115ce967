//! Overlap checks for bookings and shifts, and the conflict detection pass

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::interval::{format_time, TimeRange};
use crate::{
    error::{AppError, AppResult},
    models::{Booking, ConflictSeverity, ConflictType, StaffShift, TimeOffRequest},
};

/// Fail with Conflict when `candidate` overlaps any of `existing`
pub fn ensure_booking_free(
    candidate: &TimeRange<DateTime<Utc>>,
    existing: &[Booking],
) -> AppResult<()> {
    if existing.iter().any(|b| b.overlaps(candidate)) {
        return Err(AppError::Conflict("time slot is not available".to_string()));
    }
    Ok(())
}

/// Fail with Conflict when `candidate` overlaps a shift of the same staff on
/// the same date. `exclude` skips the shift being updated.
pub fn ensure_shift_free<'a>(
    candidate: &StaffShift,
    existing: impl IntoIterator<Item = &'a StaffShift>,
    exclude: Option<Uuid>,
) -> AppResult<()> {
    let range = candidate.time_range()?;
    for shift in existing {
        if Some(shift.id) == exclude
            || shift.id == candidate.id
            || shift.staff_id != candidate.staff_id
            || shift.shift_date != candidate.shift_date
        {
            continue;
        }
        if range.overlaps(&shift.time_range()?) {
            return Err(AppError::Conflict(format!(
                "shift conflicts with existing shift from {} to {}",
                format_time(shift.start_time),
                format_time(shift.end_time)
            )));
        }
    }
    Ok(())
}

/// What to do with a candidate whose date already had shifts before the batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OccupiedDatePolicy {
    /// Leave dates that already have shifts alone
    Skip,
    /// Insert anyway; overlaps still fail
    Keep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Insert,
    Skip,
}

/// Decide whether a batch candidate is inserted.
///
/// `pre_existing` is the stored state before the batch started, `accepted` the
/// candidates of the same batch already admitted. Occupancy is judged on
/// `pre_existing` only, overlap on both.
pub fn admit_shift(
    candidate: &StaffShift,
    pre_existing: &[StaffShift],
    accepted: &[StaffShift],
    policy: OccupiedDatePolicy,
) -> AppResult<Admission> {
    candidate.window()?;

    if policy == OccupiedDatePolicy::Skip
        && pre_existing
            .iter()
            .any(|s| s.staff_id == candidate.staff_id && s.shift_date == candidate.shift_date)
    {
        return Ok(Admission::Skip);
    }

    ensure_shift_free(candidate, pre_existing.iter().chain(accepted.iter()), None)?;
    Ok(Admission::Insert)
}

/// Run [`admit_shift`] over a whole batch, returning the shifts to insert in order
pub fn plan_batch(
    candidates: Vec<StaffShift>,
    pre_existing: &[StaffShift],
    policy: OccupiedDatePolicy,
) -> AppResult<Vec<StaffShift>> {
    let mut accepted: Vec<StaffShift> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if admit_shift(&candidate, pre_existing, &accepted, policy)? == Admission::Insert {
            accepted.push(candidate);
        }
    }
    Ok(accepted)
}

// ---------------------------------------------------------------------------
// Detection pass
// ---------------------------------------------------------------------------

/// A conflict found by [`detect_conflicts`], before it is persisted
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedConflict {
    pub conflict_type: ConflictType,
    pub severity: ConflictSeverity,
    pub staff_id: Uuid,
    pub conflict_date: NaiveDate,
    pub related_ids: Vec<Uuid>,
    pub description: String,
}

impl DetectedConflict {
    fn new(
        conflict_type: ConflictType,
        staff_id: Uuid,
        conflict_date: NaiveDate,
        mut related_ids: Vec<Uuid>,
        description: String,
    ) -> Self {
        related_ids.sort();
        let severity = match conflict_type {
            ConflictType::DoubleBooking => ConflictSeverity::Critical,
            ConflictType::TimeOverlap => ConflictSeverity::High,
            ConflictType::TimeOffConflict => ConflictSeverity::Medium,
        };
        Self {
            conflict_type,
            severity,
            staff_id,
            conflict_date,
            related_ids,
            description,
        }
    }

    pub fn fingerprint(&self) -> (ConflictType, Uuid, NaiveDate, Vec<Uuid>) {
        (
            self.conflict_type,
            self.staff_id,
            self.conflict_date,
            self.related_ids.clone(),
        )
    }
}

/// Scan shifts, bookings and approved time off for inconsistencies.
///
/// Finds overlapping shifts of one staff on one date, overlapping bookings of
/// one staff, and available shifts falling inside approved time off.
pub fn detect_conflicts(
    shifts: &[StaffShift],
    bookings: &[Booking],
    time_off: &[TimeOffRequest],
) -> Vec<DetectedConflict> {
    let mut found = Vec::new();

    let mut sorted_shifts: Vec<&StaffShift> = shifts.iter().collect();
    sorted_shifts.sort_by_key(|s| (s.staff_id, s.shift_date, s.start_time));
    for (i, a) in sorted_shifts.iter().enumerate() {
        for b in sorted_shifts.iter().skip(i + 1) {
            if b.staff_id != a.staff_id || b.shift_date != a.shift_date {
                break;
            }
            if super::interval::overlaps(a.start_time, a.end_time, b.start_time, b.end_time) {
                found.push(DetectedConflict::new(
                    ConflictType::TimeOverlap,
                    a.staff_id,
                    a.shift_date,
                    vec![a.id, b.id],
                    format!(
                        "shifts {}-{} and {}-{} overlap",
                        format_time(a.start_time),
                        format_time(a.end_time),
                        format_time(b.start_time),
                        format_time(b.end_time)
                    ),
                ));
            }
        }
    }

    let mut sorted_bookings: Vec<&Booking> = bookings.iter().collect();
    sorted_bookings.sort_by_key(|b| (b.staff_id, b.start_at));
    for (i, a) in sorted_bookings.iter().enumerate() {
        for b in sorted_bookings.iter().skip(i + 1) {
            if b.staff_id != a.staff_id || b.start_at >= a.end_at {
                break;
            }
            found.push(DetectedConflict::new(
                ConflictType::DoubleBooking,
                a.staff_id,
                a.start_at.date_naive(),
                vec![a.id, b.id],
                format!(
                    "bookings at {} and {} overlap",
                    a.start_at.format("%H:%M"),
                    b.start_at.format("%H:%M")
                ),
            ));
        }
    }

    let mut seen: HashSet<(Uuid, Uuid)> = HashSet::new();
    for request in time_off {
        for shift in shifts.iter().filter(|s| s.staff_id == request.staff_id && s.is_available) {
            let Some(portion) = request.blocked_portion(shift.shift_date) else {
                continue;
            };
            let Ok(range) = shift.time_range() else {
                continue;
            };
            // Untouched by the blocked part of the day
            if portion.clip(&[range]) == vec![range] {
                continue;
            }
            if seen.insert((request.id, shift.id)) {
                found.push(DetectedConflict::new(
                    ConflictType::TimeOffConflict,
                    shift.staff_id,
                    shift.shift_date,
                    vec![request.id, shift.id],
                    format!(
                        "available shift {}-{} falls inside approved {} time off",
                        format_time(shift.start_time),
                        format_time(shift.end_time),
                        request.time_off_type
                    ),
                ));
            }
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HalfDayType, ShiftType, TimeOffStatus, TimeOffType};
    use crate::scheduling::interval::parse_time_of_day;
    use chrono::TimeZone;

    fn shift(staff_id: Uuid, date: NaiveDate, start: &str, end: &str) -> StaffShift {
        StaffShift {
            id: Uuid::new_v4(),
            staff_id,
            shift_date: date,
            start_time: parse_time_of_day(start, "start").unwrap(),
            end_time: parse_time_of_day(end, "end").unwrap(),
            break_start: None,
            break_end: None,
            is_available: true,
            is_manually_disabled: false,
            manual_disable_reason: None,
            shift_type: ShiftType::Regular,
            notes: None,
            created_by: "test".to_string(),
            updated_by: "test".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn booking(staff_id: Uuid, hour: u32, minute: u32, minutes: i64) -> Booking {
        let start = Utc.with_ymd_and_hms(2025, 1, 13, hour, minute, 0).unwrap();
        Booking {
            id: Uuid::new_v4(),
            business_id: Uuid::nil(),
            service_id: Uuid::nil(),
            staff_id,
            client_id: Uuid::nil(),
            location_id: None,
            start_at: start,
            end_at: start + chrono::Duration::minutes(minutes),
            created_at: Utc::now(),
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 13).unwrap()
    }

    #[test]
    fn test_back_to_back_bookings_are_accepted() {
        let staff = Uuid::new_v4();
        let existing = vec![booking(staff, 10, 0, 30)];
        let next = TimeRange::new(
            Utc.with_ymd_and_hms(2025, 1, 13, 10, 30, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 1, 13, 11, 0, 0).unwrap(),
        )
        .unwrap();
        assert!(ensure_booking_free(&next, &existing).is_ok());

        let clash = TimeRange::new(
            Utc.with_ymd_and_hms(2025, 1, 13, 10, 15, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 1, 13, 10, 45, 0).unwrap(),
        )
        .unwrap();
        let err = ensure_booking_free(&clash, &existing).unwrap_err();
        assert!(matches!(err, AppError::Conflict(ref m) if m == "time slot is not available"));
    }

    #[test]
    fn test_shift_conflicts() {
        let staff = Uuid::new_v4();
        let morning = shift(staff, day(), "09:00", "13:00");
        let existing = vec![morning.clone()];

        assert!(ensure_shift_free(&shift(staff, day(), "13:00", "17:00"), &existing, None).is_ok());

        let err = ensure_shift_free(&shift(staff, day(), "12:00", "14:00"), &existing, None).unwrap_err();
        assert!(
            matches!(err, AppError::Conflict(ref m) if m == "shift conflicts with existing shift from 09:00 to 13:00")
        );

        // Other staff and other dates never conflict
        assert!(ensure_shift_free(&shift(Uuid::new_v4(), day(), "12:00", "14:00"), &existing, None).is_ok());
        let next_day = day().succ_opt().unwrap();
        assert!(ensure_shift_free(&shift(staff, next_day, "12:00", "14:00"), &existing, None).is_ok());
    }

    #[test]
    fn test_update_excludes_itself() {
        let staff = Uuid::new_v4();
        let current = shift(staff, day(), "09:00", "13:00");
        let mut moved = current.clone();
        moved.end_time = parse_time_of_day("14:00", "end").unwrap();
        assert!(ensure_shift_free(&moved, &[current.clone()], Some(current.id)).is_ok());
    }

    #[test]
    fn test_admit_skips_dates_occupied_before_the_batch() {
        let staff = Uuid::new_v4();
        let pre = vec![shift(staff, day(), "09:00", "12:00")];
        let candidate = shift(staff, day(), "13:00", "17:00");
        assert_eq!(
            admit_shift(&candidate, &pre, &[], OccupiedDatePolicy::Skip).unwrap(),
            Admission::Skip
        );
        assert_eq!(
            admit_shift(&candidate, &pre, &[], OccupiedDatePolicy::Keep).unwrap(),
            Admission::Insert
        );
    }

    #[test]
    fn test_batch_keeps_two_shifts_of_one_new_date() {
        let staff = Uuid::new_v4();
        let batch = vec![
            shift(staff, day(), "08:00", "12:00"),
            shift(staff, day(), "13:00", "17:00"),
        ];
        let planned = plan_batch(batch, &[], OccupiedDatePolicy::Skip).unwrap();
        assert_eq!(planned.len(), 2);
    }

    #[test]
    fn test_batch_fails_on_internal_overlap() {
        let staff = Uuid::new_v4();
        let batch = vec![
            shift(staff, day(), "08:00", "12:00"),
            shift(staff, day(), "11:00", "15:00"),
        ];
        assert!(matches!(
            plan_batch(batch, &[], OccupiedDatePolicy::Keep),
            Err(AppError::Conflict(_))
        ));
    }

    #[test]
    fn test_detects_each_conflict_kind() {
        let staff = Uuid::new_v4();
        let a = shift(staff, day(), "09:00", "13:00");
        let b = shift(staff, day(), "12:00", "15:00");
        let c = shift(staff, day().succ_opt().unwrap(), "09:00", "17:00");
        let bookings = vec![booking(staff, 10, 0, 60), booking(staff, 10, 30, 30)];
        let time_off = vec![TimeOffRequest {
            id: Uuid::new_v4(),
            staff_id: staff,
            start_date: day().succ_opt().unwrap(),
            end_date: day().succ_opt().unwrap(),
            time_off_type: TimeOffType::SickLeave,
            reason: "flu".to_string(),
            status: TimeOffStatus::Approved,
            is_half_day: true,
            half_day_type: Some(HalfDayType::Afternoon),
            requested_by: "staff".to_string(),
            approved_by: Some("manager".to_string()),
            comments: None,
            requested_at: Utc::now(),
            processed_at: None,
        }];

        let found = detect_conflicts(&[a, b, c], &bookings, &time_off);
        let kinds: Vec<ConflictType> = found.iter().map(|c| c.conflict_type).collect();
        assert_eq!(
            kinds,
            vec![
                ConflictType::TimeOverlap,
                ConflictType::DoubleBooking,
                ConflictType::TimeOffConflict
            ]
        );
        assert_eq!(found[1].severity, ConflictSeverity::Critical);
        assert!(found.iter().all(|c| c.related_ids.windows(2).all(|w| w[0] <= w[1])));
    }

    #[test]
    fn test_shift_outside_half_day_is_not_a_conflict() {
        let staff = Uuid::new_v4();
        let morning_shift = shift(staff, day(), "08:00", "12:00");
        let time_off = vec![TimeOffRequest {
            id: Uuid::new_v4(),
            staff_id: staff,
            start_date: day(),
            end_date: day(),
            time_off_type: TimeOffType::PersonalDay,
            reason: "appointment".to_string(),
            status: TimeOffStatus::Approved,
            is_half_day: true,
            half_day_type: Some(HalfDayType::Afternoon),
            requested_by: "staff".to_string(),
            approved_by: None,
            comments: None,
            requested_at: Utc::now(),
            processed_at: None,
        }];
        assert!(detect_conflicts(&[morning_shift], &[], &time_off).is_empty());
    }
}
