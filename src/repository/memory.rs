//! In-process storage adapter.
//!
//! Every read-then-write runs under one write lock, which gives the same
//! atomicity the Postgres adapter gets from serializable transactions.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    AvailabilityLogStore, BookingStore, ConflictStore, DirectoryStore, ShiftStore, TemplateStore,
    TimeOffStore,
};
use crate::{
    error::{AppError, AppResult},
    models::{
        Booking, BusinessWorkingHours, Client, ConflictStatus, ScheduleConflict, ScheduleTemplate,
        Service, Staff, StaffAvailabilityLog, StaffShift, TimeOffRequest, TimeOffStatus,
    },
    scheduling::{
        conflicts::{ensure_booking_free, ensure_shift_free, plan_batch},
        interval::overlaps,
        OccupiedDatePolicy, TimeRange,
    },
};

#[derive(Default)]
struct State {
    staff: HashMap<Uuid, Staff>,
    services: HashMap<Uuid, Service>,
    clients: HashMap<Uuid, Client>,
    hours: HashMap<(Uuid, i16), BusinessWorkingHours>,
    bookings: HashMap<Uuid, Booking>,
    templates: HashMap<Uuid, ScheduleTemplate>,
    shifts: HashMap<Uuid, StaffShift>,
    time_off: HashMap<Uuid, TimeOffRequest>,
    conflicts: HashMap<Uuid, ScheduleConflict>,
    logs: Vec<StaffAvailabilityLog>,
}

impl State {
    fn shifts_of(&self, staff_id: Uuid, date: NaiveDate) -> Vec<StaffShift> {
        self.shifts
            .values()
            .filter(|s| s.staff_id == staff_id && s.shift_date == date)
            .cloned()
            .collect()
    }

    fn clear_default(&mut self, staff_id: Uuid, keep: Uuid) {
        for t in self.templates.values_mut() {
            if t.staff_id == staff_id && t.id != keep {
                t.is_default = false;
            }
        }
    }
}

/// Shared, cloneable in-memory store
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_staff(&self, staff: Staff) {
        self.state.write().await.staff.insert(staff.id, staff);
    }

    pub async fn insert_service(&self, service: Service) {
        self.state.write().await.services.insert(service.id, service);
    }

    pub async fn set_working_hours(&self, hours: BusinessWorkingHours) {
        self.state
            .write()
            .await
            .hours
            .insert((hours.business_id, hours.day_of_week), hours);
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn find_overlapping(
        &self,
        staff_id: Uuid,
        range: TimeRange<DateTime<Utc>>,
    ) -> AppResult<Vec<Booking>> {
        let state = self.state.read().await;
        let mut rows: Vec<Booking> = state
            .bookings
            .values()
            .filter(|b| b.staff_id == staff_id && b.overlaps(&range))
            .cloned()
            .collect();
        rows.sort_by_key(|b| b.start_at);
        Ok(rows)
    }

    async fn insert_checked(&self, booking: Booking) -> AppResult<Booking> {
        let mut state = self.state.write().await;
        let range = TimeRange::new(booking.start_at, booking.end_at)?;
        let same_staff: Vec<Booking> = state
            .bookings
            .values()
            .filter(|b| b.staff_id == booking.staff_id)
            .cloned()
            .collect();
        ensure_booking_free(&range, &same_staff)?;
        state.bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn get(&self, id: Uuid) -> AppResult<Booking> {
        self.state
            .read()
            .await
            .bookings
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", id)))
    }

    async fn list_for_business(
        &self,
        business_id: Uuid,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> AppResult<Vec<Booking>> {
        let state = self.state.read().await;
        let mut rows: Vec<Booking> = state
            .bookings
            .values()
            .filter(|b| b.business_id == business_id)
            .filter(|b| from.map_or(true, |f| b.start_at >= f))
            .filter(|b| to.map_or(true, |t| b.start_at < t))
            .cloned()
            .collect();
        rows.sort_by_key(|b| (b.start_at, b.staff_id));
        Ok(rows)
    }

    async fn list_for_staff(
        &self,
        staff_ids: &[Uuid],
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<Booking>> {
        let state = self.state.read().await;
        let mut rows: Vec<Booking> = state
            .bookings
            .values()
            .filter(|b| staff_ids.contains(&b.staff_id) && overlaps(b.start_at, b.end_at, from, to))
            .cloned()
            .collect();
        rows.sort_by_key(|b| (b.staff_id, b.start_at));
        Ok(rows)
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.state
            .write()
            .await
            .bookings
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", id)))
    }
}

#[async_trait]
impl DirectoryStore for MemoryStore {
    async fn get_staff(&self, id: Uuid) -> AppResult<Staff> {
        self.state
            .read()
            .await
            .staff
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Staff {} not found", id)))
    }

    async fn list_staff(&self, business_id: Uuid) -> AppResult<Vec<Staff>> {
        let state = self.state.read().await;
        let mut rows: Vec<Staff> = state
            .staff
            .values()
            .filter(|s| s.business_id == business_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| (&a.last_name, &a.first_name, a.id).cmp(&(&b.last_name, &b.first_name, b.id)));
        Ok(rows)
    }

    async fn get_service(&self, id: Uuid) -> AppResult<Service> {
        self.state
            .read()
            .await
            .services
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Service {} not found", id)))
    }

    async fn find_client_by_phone(&self, business_id: Uuid, phone: &str) -> AppResult<Option<Client>> {
        let state = self.state.read().await;
        Ok(state
            .clients
            .values()
            .find(|c| c.business_id == business_id && c.phone == phone)
            .cloned())
    }

    async fn insert_client(&self, client: Client) -> AppResult<Client> {
        let mut state = self.state.write().await;
        if let Some(existing) = state
            .clients
            .values()
            .find(|c| c.business_id == client.business_id && c.phone == client.phone)
        {
            return Ok(existing.clone());
        }
        state.clients.insert(client.id, client.clone());
        Ok(client)
    }

    async fn working_hours(
        &self,
        business_id: Uuid,
        day_of_week: i16,
    ) -> AppResult<Option<BusinessWorkingHours>> {
        Ok(self
            .state
            .read()
            .await
            .hours
            .get(&(business_id, day_of_week))
            .cloned())
    }
}

#[async_trait]
impl TemplateStore for MemoryStore {
    async fn insert(&self, template: ScheduleTemplate) -> AppResult<ScheduleTemplate> {
        let mut state = self.state.write().await;
        if template.is_default {
            state.clear_default(template.staff_id, template.id);
        }
        state.templates.insert(template.id, template.clone());
        Ok(template)
    }

    async fn get(&self, id: Uuid) -> AppResult<ScheduleTemplate> {
        self.state
            .read()
            .await
            .templates
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Schedule template {} not found", id)))
    }

    async fn list_for_staff(&self, staff_id: Uuid) -> AppResult<Vec<ScheduleTemplate>> {
        let state = self.state.read().await;
        let mut rows: Vec<ScheduleTemplate> = state
            .templates
            .values()
            .filter(|t| t.staff_id == staff_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.is_default.cmp(&a.is_default).then(a.created_at.cmp(&b.created_at)));
        Ok(rows)
    }

    async fn default_for_staff(&self, staff_id: Uuid) -> AppResult<Option<ScheduleTemplate>> {
        let state = self.state.read().await;
        Ok(state
            .templates
            .values()
            .find(|t| t.staff_id == staff_id && t.is_default)
            .cloned())
    }

    async fn update(&self, template: ScheduleTemplate) -> AppResult<ScheduleTemplate> {
        let mut state = self.state.write().await;
        if !state.templates.contains_key(&template.id) {
            return Err(AppError::NotFound(format!("Schedule template {} not found", template.id)));
        }
        if template.is_default {
            state.clear_default(template.staff_id, template.id);
        }
        state.templates.insert(template.id, template.clone());
        Ok(template)
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.state
            .write()
            .await
            .templates
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Schedule template {} not found", id)))
    }

    async fn set_default(&self, id: Uuid) -> AppResult<ScheduleTemplate> {
        let mut state = self.state.write().await;
        let staff_id = state
            .templates
            .get(&id)
            .map(|t| t.staff_id)
            .ok_or_else(|| AppError::NotFound(format!("Schedule template {} not found", id)))?;
        state.clear_default(staff_id, id);
        let template = state
            .templates
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Schedule template {} not found", id)))?;
        template.is_default = true;
        template.updated_at = Utc::now();
        Ok(template.clone())
    }
}

#[async_trait]
impl ShiftStore for MemoryStore {
    async fn get(&self, id: Uuid) -> AppResult<StaffShift> {
        self.state
            .read()
            .await
            .shifts
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Shift {} not found", id)))
    }

    async fn list_for_staff(
        &self,
        staff_ids: &[Uuid],
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<StaffShift>> {
        let state = self.state.read().await;
        let mut rows: Vec<StaffShift> = state
            .shifts
            .values()
            .filter(|s| staff_ids.contains(&s.staff_id) && s.shift_date >= from && s.shift_date <= to)
            .cloned()
            .collect();
        rows.sort_by_key(|s| (s.staff_id, s.shift_date, s.start_time));
        Ok(rows)
    }

    async fn insert_batch(
        &self,
        shifts: Vec<StaffShift>,
        policy: OccupiedDatePolicy,
    ) -> AppResult<Vec<StaffShift>> {
        let mut state = self.state.write().await;

        let mut pre_existing = Vec::new();
        let mut keys: Vec<(Uuid, NaiveDate)> = shifts.iter().map(|s| (s.staff_id, s.shift_date)).collect();
        keys.sort();
        keys.dedup();
        for (staff_id, date) in keys {
            pre_existing.extend(state.shifts_of(staff_id, date));
        }

        let admitted = plan_batch(shifts, &pre_existing, policy)?;
        for shift in &admitted {
            state.shifts.insert(shift.id, shift.clone());
        }
        Ok(admitted)
    }

    async fn update_checked(&self, shift: StaffShift) -> AppResult<StaffShift> {
        let mut state = self.state.write().await;
        if !state.shifts.contains_key(&shift.id) {
            return Err(AppError::NotFound(format!("Shift {} not found", shift.id)));
        }
        shift.window()?;
        let same_day = state.shifts_of(shift.staff_id, shift.shift_date);
        ensure_shift_free(&shift, &same_day, Some(shift.id))?;
        state.shifts.insert(shift.id, shift.clone());
        Ok(shift)
    }

    async fn set_availability_for_day(
        &self,
        staff_id: Uuid,
        date: NaiveDate,
        is_available: bool,
        reason: Option<String>,
        actor: &str,
    ) -> AppResult<Vec<StaffShift>> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let mut changed: Vec<StaffShift> = state
            .shifts
            .values_mut()
            .filter(|s| s.staff_id == staff_id && s.shift_date == date && s.is_available != is_available)
            .map(|shift| {
                shift.is_available = is_available;
                shift.is_manually_disabled = !is_available;
                shift.manual_disable_reason = if is_available { None } else { reason.clone() };
                shift.updated_by = actor.to_string();
                shift.updated_at = now;
                shift.clone()
            })
            .collect();
        changed.sort_by_key(|s| s.start_time);
        Ok(changed)
    }

    async fn delete(&self, id: Uuid) -> AppResult<StaffShift> {
        self.state
            .write()
            .await
            .shifts
            .remove(&id)
            .ok_or_else(|| AppError::NotFound(format!("Shift {} not found", id)))
    }

    async fn delete_many(&self, ids: &[Uuid]) -> AppResult<Vec<StaffShift>> {
        let mut state = self.state.write().await;
        if let Some(missing) = ids.iter().find(|id| !state.shifts.contains_key(id)) {
            return Err(AppError::NotFound(format!("Shift {} not found", missing)));
        }
        Ok(ids.iter().filter_map(|id| state.shifts.remove(id)).collect())
    }
}

#[async_trait]
impl TimeOffStore for MemoryStore {
    async fn insert(&self, request: TimeOffRequest) -> AppResult<TimeOffRequest> {
        self.state
            .write()
            .await
            .time_off
            .insert(request.id, request.clone());
        Ok(request)
    }

    async fn get(&self, id: Uuid) -> AppResult<TimeOffRequest> {
        self.state
            .read()
            .await
            .time_off
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Time off request {} not found", id)))
    }

    async fn update(&self, request: TimeOffRequest) -> AppResult<TimeOffRequest> {
        let mut state = self.state.write().await;
        match state.time_off.get_mut(&request.id) {
            Some(existing) => {
                *existing = request.clone();
                Ok(request)
            }
            None => Err(AppError::NotFound(format!(
                "Time off request {} not found",
                request.id
            ))),
        }
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.state
            .write()
            .await
            .time_off
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Time off request {} not found", id)))
    }

    async fn list_for_staff(
        &self,
        staff_ids: &[Uuid],
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        status: Option<TimeOffStatus>,
    ) -> AppResult<Vec<TimeOffRequest>> {
        let state = self.state.read().await;
        let mut rows: Vec<TimeOffRequest> = state
            .time_off
            .values()
            .filter(|r| staff_ids.contains(&r.staff_id))
            .filter(|r| from.map_or(true, |f| r.end_date >= f))
            .filter(|r| to.map_or(true, |t| r.start_date <= t))
            .filter(|r| status.map_or(true, |s| r.status == s))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.start_date.cmp(&a.start_date).then(a.requested_at.cmp(&b.requested_at)));
        Ok(rows)
    }
}

#[async_trait]
impl ConflictStore for MemoryStore {
    async fn insert_many(&self, conflicts: Vec<ScheduleConflict>) -> AppResult<Vec<ScheduleConflict>> {
        let mut state = self.state.write().await;
        for conflict in &conflicts {
            state.conflicts.insert(conflict.id, conflict.clone());
        }
        Ok(conflicts)
    }

    async fn get(&self, id: Uuid) -> AppResult<ScheduleConflict> {
        self.state
            .read()
            .await
            .conflicts
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Schedule conflict {} not found", id)))
    }

    async fn list(
        &self,
        business_id: Uuid,
        status: Option<ConflictStatus>,
    ) -> AppResult<Vec<ScheduleConflict>> {
        let state = self.state.read().await;
        let mut rows: Vec<ScheduleConflict> = state
            .conflicts
            .values()
            .filter(|c| c.business_id == business_id && status.map_or(true, |s| c.status == s))
            .cloned()
            .collect();
        rows.sort_by_key(|c| (c.conflict_date, c.created_at, c.id));
        Ok(rows)
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: ConflictStatus,
        resolved_by: Option<String>,
        resolved_at: Option<DateTime<Utc>>,
    ) -> AppResult<ScheduleConflict> {
        let mut state = self.state.write().await;
        let conflict = state
            .conflicts
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Schedule conflict {} not found", id)))?;
        conflict.status = status;
        conflict.resolved_by = resolved_by;
        conflict.resolved_at = resolved_at;
        Ok(conflict.clone())
    }
}

#[async_trait]
impl AvailabilityLogStore for MemoryStore {
    async fn append(&self, entry: StaffAvailabilityLog) -> AppResult<()> {
        self.state.write().await.logs.push(entry);
        Ok(())
    }

    async fn list(
        &self,
        staff_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: Option<i64>,
    ) -> AppResult<Vec<StaffAvailabilityLog>> {
        let state = self.state.read().await;
        let mut rows: Vec<StaffAvailabilityLog> = state
            .logs
            .iter()
            .filter(|l| l.staff_id == staff_id && l.changed_at >= from && l.changed_at <= to)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.changed_at.cmp(&a.changed_at));
        if let Some(limit) = limit.filter(|l| *l > 0) {
            rows.truncate(limit as usize);
        }
        Ok(rows)
    }
}
