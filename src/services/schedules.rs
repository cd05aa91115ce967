//! Schedules service (templates, shifts, bulk edits, generation, copy)

use std::collections::BTreeSet;

use chrono::{Duration, NaiveTime, Utc};
use uuid::Uuid;
use validator::Validate;

use super::RangeLimit;
use crate::{
    error::{AppError, AppResult},
    models::{
        schedule::{
            BulkCreateShifts, BulkDeleteShifts, BulkUpdateResult, BulkUpdateShifts, CopySchedule,
            CreateShift, CreateTemplate, GenerateSchedule, QuickStaffAction, ShiftQuery,
            UpdateShift, UpdateShiftAvailability, UpdateTemplate,
        },
        AvailabilityAction, ScheduleTemplate, StaffAvailabilityLog, StaffShift,
    },
    repository::Repository,
    scheduling::{
        expansion::{expand_template, plan_copy, validate_weekly_template},
        interval::{parse_date, parse_optional_time, parse_time_of_day},
        validation::{parse_shift_times, validate_shift_times},
        OccupiedDatePolicy,
    },
};

#[derive(Clone)]
pub struct SchedulesService {
    repository: Repository,
    limits: RangeLimit,
}

/// Ids in first-seen order without repeats
fn distinct(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = BTreeSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

/// Build a shift record from a create request
fn shift_from_request(data: &CreateShift) -> AppResult<StaffShift> {
    let shift_date = parse_date(&data.shift_date, "shift date")?;
    let window = parse_shift_times(
        &data.start_time,
        &data.end_time,
        data.break_start.as_deref(),
        data.break_end.as_deref(),
    )?;
    let now = Utc::now();
    Ok(StaffShift {
        id: Uuid::new_v4(),
        staff_id: data.staff_id,
        shift_date,
        start_time: window.range.start(),
        end_time: window.range.end(),
        break_start: window.break_range.map(|b| b.start()),
        break_end: window.break_range.map(|b| b.end()),
        is_available: true,
        is_manually_disabled: false,
        manual_disable_reason: None,
        shift_type: data.shift_type,
        notes: data.notes.clone(),
        created_by: data.created_by.clone(),
        updated_by: data.created_by.clone(),
        created_at: now,
        updated_at: now,
    })
}

/// New break bound: keep the current one when absent, clear it when empty
fn break_bound(
    requested: Option<&str>,
    current: Option<NaiveTime>,
    field: &str,
) -> AppResult<Option<NaiveTime>> {
    match requested {
        None => Ok(current),
        Some(value) => parse_optional_time(Some(value), field),
    }
}

/// Apply a partial update to a shift, re-validating its times
fn apply_update(current: &StaffShift, data: &UpdateShift) -> AppResult<StaffShift> {
    let start_time = match data.start_time.as_deref() {
        Some(v) => parse_time_of_day(v, "start time")?,
        None => current.start_time,
    };
    let end_time = match data.end_time.as_deref() {
        Some(v) => parse_time_of_day(v, "end time")?,
        None => current.end_time,
    };
    let break_start = break_bound(data.break_start.as_deref(), current.break_start, "break start time")?;
    let break_end = break_bound(data.break_end.as_deref(), current.break_end, "break end time")?;
    validate_shift_times(start_time, end_time, break_start, break_end)?;

    let mut shift = current.clone();
    shift.start_time = start_time;
    shift.end_time = end_time;
    shift.break_start = break_start;
    shift.break_end = break_end;
    if let Some(shift_type) = data.shift_type {
        shift.shift_type = shift_type;
    }
    if data.notes.is_some() {
        shift.notes = data.notes.clone();
    }
    if let Some(available) = data.is_available {
        shift.is_available = available;
        shift.is_manually_disabled = !available;
        if available {
            shift.manual_disable_reason = None;
        }
    }
    shift.updated_by = data.updated_by.clone();
    shift.updated_at = Utc::now();
    Ok(shift)
}

impl SchedulesService {
    pub fn new(repository: Repository, limits: RangeLimit) -> Self {
        Self { repository, limits }
    }

    /// Record an availability change. Failures are logged and swallowed:
    /// the shift change has already been committed.
    async fn audit(
        &self,
        shift: &StaffShift,
        action: AvailabilityAction,
        previous_status: bool,
        new_status: bool,
        reason: Option<String>,
        changed_by: &str,
    ) {
        let entry = StaffAvailabilityLog {
            id: Uuid::new_v4(),
            staff_id: shift.staff_id,
            shift_id: Some(shift.id),
            action,
            previous_status,
            new_status,
            reason,
            changed_by: changed_by.to_string(),
            changed_at: Utc::now(),
        };
        if let Err(e) = self.repository.availability_logs.append(entry).await {
            tracing::warn!(shift_id = %shift.id, action = %action, "Failed to write availability log: {}", e);
        }
    }

    // ---- Templates ----

    pub async fn create_template(&self, data: &CreateTemplate) -> AppResult<ScheduleTemplate> {
        data.validate()?;
        validate_weekly_template(&data.schedule)?;
        self.repository.directory.get_staff(data.staff_id).await?;

        let now = Utc::now();
        let template = self
            .repository
            .templates
            .insert(ScheduleTemplate {
                id: Uuid::new_v4(),
                staff_id: data.staff_id,
                name: data.name.clone(),
                description: data.description.clone(),
                is_default: data.is_default,
                schedule: data.schedule.clone(),
                created_at: now,
                updated_at: now,
            })
            .await?;

        tracing::info!(template_id = %template.id, staff_id = %template.staff_id, "Schedule template created");
        Ok(template)
    }

    pub async fn get_template(&self, id: Uuid) -> AppResult<ScheduleTemplate> {
        self.repository.templates.get(id).await
    }

    pub async fn list_templates(&self, staff_id: Uuid) -> AppResult<Vec<ScheduleTemplate>> {
        self.repository.directory.get_staff(staff_id).await?;
        self.repository.templates.list_for_staff(staff_id).await
    }

    pub async fn update_template(&self, id: Uuid, data: &UpdateTemplate) -> AppResult<ScheduleTemplate> {
        data.validate()?;
        if let Some(schedule) = &data.schedule {
            validate_weekly_template(schedule)?;
        }

        let mut template = self.repository.templates.get(id).await?;
        if let Some(name) = &data.name {
            template.name = name.clone();
        }
        if data.description.is_some() {
            template.description = data.description.clone();
        }
        if let Some(is_default) = data.is_default {
            template.is_default = is_default;
        }
        if let Some(schedule) = &data.schedule {
            template.schedule = schedule.clone();
        }
        template.updated_at = Utc::now();

        self.repository.templates.update(template).await
    }

    pub async fn delete_template(&self, id: Uuid) -> AppResult<()> {
        self.repository.templates.delete(id).await
    }

    /// Make a template its staff member's default, clearing the previous one
    pub async fn set_default_template(&self, id: Uuid) -> AppResult<ScheduleTemplate> {
        self.repository.templates.set_default(id).await
    }

    // ---- Shifts ----

    pub async fn create_shift(&self, data: &CreateShift) -> AppResult<StaffShift> {
        data.validate()?;
        let shift = shift_from_request(data)?;
        self.repository.directory.get_staff(shift.staff_id).await?;

        let shift = self
            .repository
            .shifts
            .insert_batch(vec![shift], OccupiedDatePolicy::Keep)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Internal("Shift insert returned no row".to_string()))?;

        self.audit(&shift, AvailabilityAction::ShiftCreated, false, true, None, &data.created_by)
            .await;
        tracing::info!(shift_id = %shift.id, staff_id = %shift.staff_id, date = %shift.shift_date, "Shift created");
        Ok(shift)
    }

    pub async fn get_shift(&self, id: Uuid) -> AppResult<StaffShift> {
        self.repository.shifts.get(id).await
    }

    /// Shifts of one staff member; the range defaults to the 7 days from today
    pub async fn list_shifts(&self, staff_id: Uuid, query: &ShiftQuery) -> AppResult<Vec<StaffShift>> {
        self.repository.directory.get_staff(staff_id).await?;

        let start = match query.start_date.as_deref() {
            Some(d) => parse_date(d, "start date")?,
            None => Utc::now().date_naive(),
        };
        let end = match query.end_date.as_deref() {
            Some(d) => parse_date(d, "end date")?,
            None => start + Duration::days(6),
        };
        self.limits.check(start, end)?;

        self.repository.shifts.list_for_staff(&[staff_id], start, end).await
    }

    pub async fn update_shift(&self, id: Uuid, data: &UpdateShift) -> AppResult<StaffShift> {
        data.validate()?;
        let current = self.repository.shifts.get(id).await?;
        let candidate = apply_update(&current, data)?;
        let shift = self.repository.shifts.update_checked(candidate).await?;

        if shift.is_available != current.is_available {
            let action = if shift.is_available {
                AvailabilityAction::Enabled
            } else {
                AvailabilityAction::Disabled
            };
            self.audit(&shift, action, current.is_available, shift.is_available, None, &data.updated_by)
                .await;
        }
        self.audit(
            &shift,
            AvailabilityAction::ShiftModified,
            current.is_available,
            shift.is_available,
            None,
            &data.updated_by,
        )
        .await;

        tracing::info!(shift_id = %id, "Shift updated");
        Ok(shift)
    }

    /// Enable or disable a shift and record the change
    pub async fn update_shift_availability(
        &self,
        id: Uuid,
        data: &UpdateShiftAvailability,
    ) -> AppResult<StaffShift> {
        data.validate()?;
        self.set_availability(id, data.is_available, data.reason.clone(), &data.action_by)
            .await
    }

    async fn set_availability(
        &self,
        id: Uuid,
        is_available: bool,
        reason: Option<String>,
        actor: &str,
    ) -> AppResult<StaffShift> {
        let current = self.repository.shifts.get(id).await?;

        let mut candidate = current.clone();
        candidate.is_available = is_available;
        candidate.is_manually_disabled = !is_available;
        candidate.manual_disable_reason = if is_available { None } else { reason.clone() };
        candidate.updated_by = actor.to_string();
        candidate.updated_at = Utc::now();

        let shift = self.repository.shifts.update_checked(candidate).await?;

        let action = if is_available {
            AvailabilityAction::Enabled
        } else {
            AvailabilityAction::Disabled
        };
        self.audit(&shift, action, current.is_available, is_available, reason, actor)
            .await;

        tracing::info!(shift_id = %id, is_available, "Shift availability changed");
        Ok(shift)
    }

    pub async fn delete_shift(&self, id: Uuid, actor: &str) -> AppResult<()> {
        let shift = self.repository.shifts.delete(id).await?;
        self.audit(&shift, AvailabilityAction::ShiftDeleted, shift.is_available, false, None, actor)
            .await;
        tracing::info!(shift_id = %id, "Shift deleted");
        Ok(())
    }

    // ---- Bulk operations ----

    /// Create every shift or none
    pub async fn bulk_create_shifts(&self, data: &BulkCreateShifts) -> AppResult<Vec<StaffShift>> {
        data.validate()?;

        let shifts = data
            .shifts
            .iter()
            .map(shift_from_request)
            .collect::<AppResult<Vec<_>>>()?;
        let staff_ids: Vec<Uuid> = shifts.iter().map(|s| s.staff_id).collect();
        for staff_id in distinct(&staff_ids) {
            self.repository.directory.get_staff(staff_id).await?;
        }

        let created = self
            .repository
            .shifts
            .insert_batch(shifts, OccupiedDatePolicy::Keep)
            .await?;

        for shift in &created {
            self.audit(shift, AvailabilityAction::ShiftCreated, false, true, None, &shift.created_by)
                .await;
        }
        tracing::info!(count = created.len(), "Bulk created shifts");
        Ok(created)
    }

    /// Apply each update independently and report per item
    pub async fn bulk_update_shifts(&self, data: &BulkUpdateShifts) -> AppResult<Vec<BulkUpdateResult>> {
        data.validate()?;

        let mut results = Vec::with_capacity(data.updates.len());
        for item in &data.updates {
            let result = match self.update_shift(item.shift_id, &item.update).await {
                Ok(shift) => BulkUpdateResult {
                    shift_id: item.shift_id,
                    success: true,
                    shift: Some(shift),
                    error: None,
                },
                Err(e) => BulkUpdateResult {
                    shift_id: item.shift_id,
                    success: false,
                    shift: None,
                    error: Some(e.to_string()),
                },
            };
            results.push(result);
        }
        Ok(results)
    }

    /// Delete every listed shift or none
    pub async fn bulk_delete_shifts(&self, data: &BulkDeleteShifts) -> AppResult<usize> {
        data.validate()?;
        let ids = distinct(&data.shift_ids);
        let deleted = self.repository.shifts.delete_many(&ids).await?;

        for shift in &deleted {
            self.audit(shift, AvailabilityAction::ShiftDeleted, shift.is_available, false, None, &data.action_by)
                .await;
        }
        tracing::info!(count = deleted.len(), "Bulk deleted shifts");
        Ok(deleted.len())
    }

    // ---- Generation and copy ----

    /// Expand weekly templates into shifts over `[start_date, end_date]`.
    ///
    /// Without `overwrite_existing`, dates where a staff member already has
    /// shifts are skipped, which makes repeated calls idempotent. Returns the
    /// number of shifts created.
    pub async fn generate_schedule(&self, data: &GenerateSchedule) -> AppResult<usize> {
        data.validate()?;
        let start = parse_date(&data.start_date, "start date")?;
        let end = parse_date(&data.end_date, "end date")?;
        self.limits.check(start, end)?;

        let explicit = match data.template_id {
            Some(id) => {
                let template = self.repository.templates.get(id).await?;
                validate_weekly_template(&template.schedule)?;
                Some(template)
            }
            None => None,
        };

        let now = Utc::now();
        let mut shifts = Vec::new();
        for staff_id in distinct(&data.staff_ids) {
            self.repository.directory.get_staff(staff_id).await?;
            let schedule = match &explicit {
                Some(template) => template.schedule.clone(),
                None => {
                    self.repository
                        .templates
                        .default_for_staff(staff_id)
                        .await?
                        .ok_or_else(|| {
                            AppError::NotFound(format!(
                                "No default schedule template for staff {}",
                                staff_id
                            ))
                        })?
                        .schedule
                }
            };
            shifts.extend(
                expand_template(staff_id, &schedule, start, end)?
                    .into_iter()
                    .map(|draft| draft.into_shift(&data.generated_by, now)),
            );
        }

        let policy = if data.overwrite_existing {
            OccupiedDatePolicy::Keep
        } else {
            OccupiedDatePolicy::Skip
        };
        let created = self.repository.shifts.insert_batch(shifts, policy).await?;

        tracing::info!(count = created.len(), %start, %end, "Generated schedule");
        Ok(created.len())
    }

    /// Copy the shifts of `[source_start_date, source_end_date]` so the range
    /// starts on `target_start_date`. Returns the number of shifts copied.
    pub async fn copy_schedule(&self, data: &CopySchedule) -> AppResult<usize> {
        data.validate()?;
        let source_start = parse_date(&data.source_start_date, "source start date")?;
        let source_end = parse_date(&data.source_end_date, "source end date")?;
        let target_start = parse_date(&data.target_start_date, "target start date")?;
        self.limits.check(source_start, source_end)?;

        let staff_ids = distinct(&data.staff_ids);
        for staff_id in &staff_ids {
            self.repository.directory.get_staff(*staff_id).await?;
        }

        let day_offset = (target_start - source_start).num_days();
        let source = self
            .repository
            .shifts
            .list_for_staff(&staff_ids, source_start, source_end)
            .await?;

        let now = Utc::now();
        let copies: Vec<StaffShift> = plan_copy(&source, day_offset)?
            .into_iter()
            .map(|draft| draft.into_shift(&data.action_by, now))
            .collect();

        let policy = if data.overwrite_existing {
            OccupiedDatePolicy::Keep
        } else {
            OccupiedDatePolicy::Skip
        };
        let created = self.repository.shifts.insert_batch(copies, policy).await?;

        tracing::info!(count = created.len(), day_offset, "Copied schedule");
        Ok(created.len())
    }

    // ---- Quick actions ----

    /// Set every shift of a staff member on one date to `is_available`.
    /// Returns the number of shifts that changed.
    pub async fn quick_set_availability(
        &self,
        staff_id: Uuid,
        data: &QuickStaffAction,
        is_available: bool,
    ) -> AppResult<usize> {
        data.validate()?;
        let date = parse_date(&data.date, "date")?;
        self.repository.directory.get_staff(staff_id).await?;

        let changed = self
            .repository
            .shifts
            .set_availability_for_day(staff_id, date, is_available, data.reason.clone(), &data.action_by)
            .await?;

        let action = if is_available {
            AvailabilityAction::Enabled
        } else {
            AvailabilityAction::Disabled
        };
        for shift in &changed {
            self.audit(shift, action, !is_available, is_available, data.reason.clone(), &data.action_by)
                .await;
        }

        tracing::info!(%staff_id, %date, is_available, count = changed.len(), "Quick availability change");
        Ok(changed.len())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::NaiveDate;

    use super::*;
    use crate::{
        models::{ShiftType, Staff},
        repository::{memory::MemoryStore, MockAvailabilityLogStore, ShiftStore},
    };

    /// Memory-backed shifts whose per-shift updates always fail, and whose
    /// whole-day availability write fails when `fail_day_write` is set
    struct FailingShifts {
        inner: MemoryStore,
        fail_day_write: bool,
    }

    #[async_trait]
    impl ShiftStore for FailingShifts {
        async fn get(&self, id: Uuid) -> AppResult<StaffShift> {
            self.inner.get(id).await
        }

        async fn list_for_staff(
            &self,
            staff_ids: &[Uuid],
            from: NaiveDate,
            to: NaiveDate,
        ) -> AppResult<Vec<StaffShift>> {
            ShiftStore::list_for_staff(&self.inner, staff_ids, from, to).await
        }

        async fn insert_batch(
            &self,
            shifts: Vec<StaffShift>,
            policy: OccupiedDatePolicy,
        ) -> AppResult<Vec<StaffShift>> {
            self.inner.insert_batch(shifts, policy).await
        }

        async fn update_checked(&self, _shift: StaffShift) -> AppResult<StaffShift> {
            Err(AppError::Conflict("serialization failure".to_string()))
        }

        async fn set_availability_for_day(
            &self,
            staff_id: Uuid,
            date: NaiveDate,
            is_available: bool,
            reason: Option<String>,
            actor: &str,
        ) -> AppResult<Vec<StaffShift>> {
            if self.fail_day_write {
                return Err(AppError::Conflict("serialization failure".to_string()));
            }
            self.inner
                .set_availability_for_day(staff_id, date, is_available, reason, actor)
                .await
        }

        async fn delete(&self, id: Uuid) -> AppResult<StaffShift> {
            ShiftStore::delete(&self.inner, id).await
        }

        async fn delete_many(&self, ids: &[Uuid]) -> AppResult<Vec<StaffShift>> {
            self.inner.delete_many(ids).await
        }
    }

    async fn service_with_failing_shifts(fail_day_write: bool) -> (SchedulesService, Uuid) {
        let store = MemoryStore::new();
        let staff_id = Uuid::new_v4();
        store
            .insert_staff(Staff {
                id: staff_id,
                business_id: Uuid::new_v4(),
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                position: None,
                is_active: true,
            })
            .await;
        let mut repository = Repository::in_memory(store.clone());
        repository.shifts = Arc::new(FailingShifts {
            inner: store,
            fail_day_write,
        });
        (SchedulesService::new(repository, RangeLimit(366)), staff_id)
    }

    async fn service_with(store: MemoryStore) -> (SchedulesService, Uuid) {
        let staff_id = Uuid::new_v4();
        store
            .insert_staff(Staff {
                id: staff_id,
                business_id: Uuid::new_v4(),
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                position: None,
                is_active: true,
            })
            .await;
        (SchedulesService::new(Repository::in_memory(store), RangeLimit(366)), staff_id)
    }

    fn create(staff_id: Uuid, start: &str, end: &str) -> CreateShift {
        CreateShift {
            staff_id,
            shift_date: "2025-01-13".to_string(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            break_start: None,
            break_end: None,
            shift_type: ShiftType::Regular,
            notes: None,
            created_by: "manager".to_string(),
        }
    }

    #[tokio::test]
    async fn test_update_clears_break_with_empty_strings() {
        let (service, staff_id) = service_with(MemoryStore::new()).await;
        let mut data = create(staff_id, "09:00", "18:00");
        data.break_start = Some("12:00".to_string());
        data.break_end = Some("13:00".to_string());
        let shift = service.create_shift(&data).await.unwrap();

        let updated = service
            .update_shift(
                shift.id,
                &UpdateShift {
                    break_start: Some(String::new()),
                    break_end: Some(String::new()),
                    updated_by: "manager".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.break_start, None);
        assert_eq!(updated.break_end, None);
    }

    #[tokio::test]
    async fn test_update_rejects_overlap_with_sibling() {
        let (service, staff_id) = service_with(MemoryStore::new()).await;
        service.create_shift(&create(staff_id, "09:00", "13:00")).await.unwrap();
        let afternoon = service.create_shift(&create(staff_id, "13:00", "17:00")).await.unwrap();

        let err = service
            .update_shift(
                afternoon.id,
                &UpdateShift {
                    start_time: Some("12:00".to_string()),
                    updated_by: "manager".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_availability_change_survives_audit_failure() {
        let mut logs = MockAvailabilityLogStore::new();
        logs.expect_append()
            .returning(|_| Err(AppError::Internal("log store down".to_string())));

        let store = MemoryStore::new();
        let staff_id = Uuid::new_v4();
        store
            .insert_staff(Staff {
                id: staff_id,
                business_id: Uuid::new_v4(),
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                position: None,
                is_active: true,
            })
            .await;
        let repository = Repository::in_memory(store).with_availability_logs(Arc::new(logs));
        let service = SchedulesService::new(repository, RangeLimit(366));

        let shift = service.create_shift(&create(staff_id, "09:00", "17:00")).await.unwrap();
        let disabled = service
            .update_shift_availability(
                shift.id,
                &UpdateShiftAvailability {
                    is_available: false,
                    reason: Some("sick".to_string()),
                    action_by: "manager".to_string(),
                },
            )
            .await
            .unwrap();

        assert!(!disabled.is_available);
        assert!(disabled.is_manually_disabled);
        assert_eq!(disabled.manual_disable_reason.as_deref(), Some("sick"));
        assert!(!service.get_shift(shift.id).await.unwrap().is_available);
    }

    #[tokio::test]
    async fn test_quick_disable_counts_changed_shifts() {
        let (service, staff_id) = service_with(MemoryStore::new()).await;
        service.create_shift(&create(staff_id, "09:00", "12:00")).await.unwrap();
        service.create_shift(&create(staff_id, "13:00", "17:00")).await.unwrap();

        let action = QuickStaffAction {
            date: "2025-01-13".to_string(),
            reason: None,
            action_by: "manager".to_string(),
        };
        assert_eq!(service.quick_set_availability(staff_id, &action, false).await.unwrap(), 2);
        assert_eq!(service.quick_set_availability(staff_id, &action, false).await.unwrap(), 0);
        assert_eq!(service.quick_set_availability(staff_id, &action, true).await.unwrap(), 2);
    }

    fn quick_action() -> QuickStaffAction {
        QuickStaffAction {
            date: "2025-01-13".to_string(),
            reason: Some("training".to_string()),
            action_by: "manager".to_string(),
        }
    }

    #[tokio::test]
    async fn test_quick_disable_writes_the_day_at_once() {
        let (service, staff_id) = service_with_failing_shifts(false).await;
        service.create_shift(&create(staff_id, "09:00", "12:00")).await.unwrap();
        service.create_shift(&create(staff_id, "13:00", "17:00")).await.unwrap();

        let changed = service
            .quick_set_availability(staff_id, &quick_action(), false)
            .await
            .unwrap();
        assert_eq!(changed, 2);

        let day = service
            .list_shifts(
                staff_id,
                &ShiftQuery {
                    start_date: Some("2025-01-13".to_string()),
                    end_date: Some("2025-01-13".to_string()),
                },
            )
            .await
            .unwrap();
        assert!(day.iter().all(|s| !s.is_available && s.is_manually_disabled));
        assert!(day.iter().all(|s| s.manual_disable_reason.as_deref() == Some("training")));
    }

    #[tokio::test]
    async fn test_failed_quick_disable_leaves_day_untouched() {
        let (service, staff_id) = service_with_failing_shifts(true).await;
        service.create_shift(&create(staff_id, "09:00", "12:00")).await.unwrap();
        service.create_shift(&create(staff_id, "13:00", "17:00")).await.unwrap();

        let err = service
            .quick_set_availability(staff_id, &quick_action(), false)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let day = service
            .list_shifts(
                staff_id,
                &ShiftQuery {
                    start_date: Some("2025-01-13".to_string()),
                    end_date: Some("2025-01-13".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(day.len(), 2);
        assert!(day.iter().all(|s| s.is_available && !s.is_manually_disabled));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_overlapping_shifts_have_one_winner() {
        let (service, staff_id) = service_with(MemoryStore::new()).await;
        let service = Arc::new(service);

        let mut handles = Vec::new();
        for i in 0..16 {
            let service = service.clone();
            let data = create(staff_id, &format!("09:{:02}", i * 3), "12:00");
            handles.push(tokio::spawn(async move { service.create_shift(&data).await }));
        }

        let mut successes = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(err) => assert!(matches!(err, AppError::Conflict(_)), "unexpected error {:?}", err),
            }
        }
        assert_eq!(successes, 1);
    }

    #[tokio::test]
    async fn test_bulk_create_is_all_or_nothing() {
        let (service, staff_id) = service_with(MemoryStore::new()).await;
        let err = service
            .bulk_create_shifts(&BulkCreateShifts {
                shifts: vec![
                    create(staff_id, "09:00", "13:00"),
                    create(staff_id, "12:00", "15:00"),
                ],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let listed = service
            .list_shifts(
                staff_id,
                &ShiftQuery {
                    start_date: Some("2025-01-13".to_string()),
                    end_date: Some("2025-01-13".to_string()),
                },
            )
            .await
            .unwrap();
        assert!(listed.is_empty());
    }
}
