//! Schedule conflict detection and resolution

use std::collections::HashSet;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use super::{end_of_day, start_of_day, RangeLimit};
use crate::{
    error::{AppError, AppResult},
    models::{
        conflict::{ConflictQuery, DetectConflicts, ResolveConflict},
        ConflictStatus, ScheduleConflict, TimeOffStatus,
    },
    repository::Repository,
    scheduling::{conflicts::detect_conflicts, interval::parse_date},
};

#[derive(Clone)]
pub struct ConflictsService {
    repository: Repository,
    limits: RangeLimit,
}

impl ConflictsService {
    pub fn new(repository: Repository, limits: RangeLimit) -> Self {
        Self { repository, limits }
    }

    /// Scan a business over a date range and record new conflicts.
    ///
    /// A conflict already open with the same type, staff, date and related
    /// records is not recorded again. Returns the newly recorded conflicts.
    pub async fn detect(&self, business_id: Uuid, data: &DetectConflicts) -> AppResult<Vec<ScheduleConflict>> {
        let start = parse_date(&data.start_date, "start date")?;
        let end = parse_date(&data.end_date, "end date")?;
        self.limits.check(start, end)?;

        let staff = self.repository.directory.list_staff(business_id).await?;
        let ids: Vec<Uuid> = staff.iter().map(|s| s.id).collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let shifts = self.repository.shifts.list_for_staff(&ids, start, end).await?;
        let bookings = self
            .repository
            .bookings
            .list_for_staff(&ids, start_of_day(start), end_of_day(end))
            .await?;
        let time_off = self
            .repository
            .time_off
            .list_for_staff(&ids, Some(start), Some(end), Some(TimeOffStatus::Approved))
            .await?;

        let open: HashSet<_> = self
            .repository
            .conflicts
            .list(business_id, Some(ConflictStatus::Open))
            .await?
            .iter()
            .map(ScheduleConflict::fingerprint)
            .collect();

        let now = Utc::now();
        let fresh: Vec<ScheduleConflict> = detect_conflicts(&shifts, &bookings, &time_off)
            .into_iter()
            .filter(|c| !open.contains(&c.fingerprint()))
            .map(|c| ScheduleConflict {
                id: Uuid::new_v4(),
                business_id,
                conflict_type: c.conflict_type,
                severity: c.severity,
                description: c.description,
                staff_id: c.staff_id,
                conflict_date: c.conflict_date,
                related_ids: c.related_ids,
                status: ConflictStatus::Open,
                resolved_by: None,
                resolved_at: None,
                created_at: now,
            })
            .collect();

        if fresh.is_empty() {
            return Ok(Vec::new());
        }
        let recorded = self.repository.conflicts.insert_many(fresh).await?;
        tracing::info!(%business_id, count = recorded.len(), "Recorded schedule conflicts");
        Ok(recorded)
    }

    pub async fn list(&self, business_id: Uuid, query: &ConflictQuery) -> AppResult<Vec<ScheduleConflict>> {
        self.repository.conflicts.list(business_id, query.status).await
    }

    /// Close an open conflict as resolved or ignored
    pub async fn resolve(&self, id: Uuid, data: &ResolveConflict) -> AppResult<ScheduleConflict> {
        data.validate()?;
        if data.status == ConflictStatus::Open {
            return Err(AppError::Validation(
                "status must be resolved or ignored".to_string(),
            ));
        }

        let conflict = self.repository.conflicts.get(id).await?;
        if conflict.status != ConflictStatus::Open {
            return Err(AppError::BadRequest(format!(
                "Conflict {} is already {}",
                id, conflict.status
            )));
        }

        self.repository
            .conflicts
            .set_status(id, data.status, Some(data.resolved_by.clone()), Some(Utc::now()))
            .await
    }
}
