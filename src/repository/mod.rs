//! Repository layer: storage ports and their Postgres / in-memory adapters

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        Booking, BusinessWorkingHours, Client, ConflictStatus, ScheduleConflict, ScheduleTemplate,
        Service, Staff, StaffAvailabilityLog, StaffShift, TimeOffRequest, TimeOffStatus,
    },
    scheduling::{OccupiedDatePolicy, TimeRange},
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Bookings, with an atomic overlap check on insert
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Bookings of `staff_id` intersecting `range`
    async fn find_overlapping(
        &self,
        staff_id: Uuid,
        range: TimeRange<DateTime<Utc>>,
    ) -> AppResult<Vec<Booking>>;

    /// Insert, re-running the overlap check atomically with the write.
    /// Returns Conflict when the staff member is already booked.
    async fn insert_checked(&self, booking: Booking) -> AppResult<Booking>;

    async fn get(&self, id: Uuid) -> AppResult<Booking>;

    async fn list_for_business(
        &self,
        business_id: Uuid,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> AppResult<Vec<Booking>>;

    /// Bookings of any of `staff_ids` intersecting `[from, to)`
    async fn list_for_staff(
        &self,
        staff_ids: &[Uuid],
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<Booking>>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

/// Staff, services, clients and business hours
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    async fn get_staff(&self, id: Uuid) -> AppResult<Staff>;
    async fn list_staff(&self, business_id: Uuid) -> AppResult<Vec<Staff>>;
    async fn get_service(&self, id: Uuid) -> AppResult<Service>;
    async fn find_client_by_phone(&self, business_id: Uuid, phone: &str) -> AppResult<Option<Client>>;
    async fn insert_client(&self, client: Client) -> AppResult<Client>;
    async fn working_hours(
        &self,
        business_id: Uuid,
        day_of_week: i16,
    ) -> AppResult<Option<BusinessWorkingHours>>;
}

/// Weekly schedule templates. Saving a default clears the staff's previous
/// default in the same operation.
#[async_trait]
pub trait TemplateStore: Send + Sync {
    async fn insert(&self, template: ScheduleTemplate) -> AppResult<ScheduleTemplate>;
    async fn get(&self, id: Uuid) -> AppResult<ScheduleTemplate>;
    async fn list_for_staff(&self, staff_id: Uuid) -> AppResult<Vec<ScheduleTemplate>>;
    async fn default_for_staff(&self, staff_id: Uuid) -> AppResult<Option<ScheduleTemplate>>;
    async fn update(&self, template: ScheduleTemplate) -> AppResult<ScheduleTemplate>;
    async fn delete(&self, id: Uuid) -> AppResult<()>;
    async fn set_default(&self, id: Uuid) -> AppResult<ScheduleTemplate>;
}

/// Staff shifts. Writes re-check overlaps atomically.
#[async_trait]
pub trait ShiftStore: Send + Sync {
    async fn get(&self, id: Uuid) -> AppResult<StaffShift>;

    /// Shifts of `staff_ids` with `from <= shift_date <= to`, ordered by
    /// staff, date and start time
    async fn list_for_staff(
        &self,
        staff_ids: &[Uuid],
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<StaffShift>>;

    /// Insert a batch all-or-nothing; returns the shifts actually inserted.
    /// Occupancy under `policy` is judged on the state before the batch.
    async fn insert_batch(
        &self,
        shifts: Vec<StaffShift>,
        policy: OccupiedDatePolicy,
    ) -> AppResult<Vec<StaffShift>>;

    /// Replace a shift, checking it against the staff's other shifts
    async fn update_checked(&self, shift: StaffShift) -> AppResult<StaffShift>;

    /// Set `is_available` on every shift of `staff_id` on `date` that differs
    /// from it, in a single write. Disabling records `reason`, enabling
    /// clears it. Returns the changed shifts ordered by start time.
    async fn set_availability_for_day(
        &self,
        staff_id: Uuid,
        date: NaiveDate,
        is_available: bool,
        reason: Option<String>,
        actor: &str,
    ) -> AppResult<Vec<StaffShift>>;

    /// Returns the deleted shift
    async fn delete(&self, id: Uuid) -> AppResult<StaffShift>;

    /// Delete all or none; NotFound when any id is unknown
    async fn delete_many(&self, ids: &[Uuid]) -> AppResult<Vec<StaffShift>>;
}

#[async_trait]
pub trait TimeOffStore: Send + Sync {
    async fn insert(&self, request: TimeOffRequest) -> AppResult<TimeOffRequest>;
    async fn get(&self, id: Uuid) -> AppResult<TimeOffRequest>;
    async fn update(&self, request: TimeOffRequest) -> AppResult<TimeOffRequest>;
    async fn delete(&self, id: Uuid) -> AppResult<()>;

    /// Requests of `staff_ids` intersecting `[from, to]`, newest start first
    async fn list_for_staff(
        &self,
        staff_ids: &[Uuid],
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        status: Option<TimeOffStatus>,
    ) -> AppResult<Vec<TimeOffRequest>>;
}

#[async_trait]
pub trait ConflictStore: Send + Sync {
    async fn insert_many(&self, conflicts: Vec<ScheduleConflict>) -> AppResult<Vec<ScheduleConflict>>;
    async fn get(&self, id: Uuid) -> AppResult<ScheduleConflict>;
    async fn list(
        &self,
        business_id: Uuid,
        status: Option<ConflictStatus>,
    ) -> AppResult<Vec<ScheduleConflict>>;
    async fn set_status(
        &self,
        id: Uuid,
        status: ConflictStatus,
        resolved_by: Option<String>,
        resolved_at: Option<DateTime<Utc>>,
    ) -> AppResult<ScheduleConflict>;
}

/// Append-only availability audit trail
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AvailabilityLogStore: Send + Sync {
    async fn append(&self, entry: StaffAvailabilityLog) -> AppResult<()>;

    /// Entries with `from <= changed_at <= to`, newest first
    async fn list(
        &self,
        staff_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: Option<i64>,
    ) -> AppResult<Vec<StaffAvailabilityLog>>;
}

/// Main repository struct holding one handle per storage port
#[derive(Clone)]
pub struct Repository {
    pub bookings: Arc<dyn BookingStore>,
    pub directory: Arc<dyn DirectoryStore>,
    pub templates: Arc<dyn TemplateStore>,
    pub shifts: Arc<dyn ShiftStore>,
    pub time_off: Arc<dyn TimeOffStore>,
    pub conflicts: Arc<dyn ConflictStore>,
    pub availability_logs: Arc<dyn AvailabilityLogStore>,
}

impl Repository {
    /// Create a repository backed by Postgres
    pub fn postgres(pool: Pool<Postgres>) -> Self {
        let store = Arc::new(PgStore::new(pool));
        Self {
            bookings: store.clone(),
            directory: store.clone(),
            templates: store.clone(),
            shifts: store.clone(),
            time_off: store.clone(),
            conflicts: store.clone(),
            availability_logs: store,
        }
    }

    /// Create a repository backed by process memory
    pub fn in_memory(store: MemoryStore) -> Self {
        let store = Arc::new(store);
        Self {
            bookings: store.clone(),
            directory: store.clone(),
            templates: store.clone(),
            shifts: store.clone(),
            time_off: store.clone(),
            conflicts: store.clone(),
            availability_logs: store,
        }
    }

    /// Swap the audit log port
    pub fn with_availability_logs(mut self, logs: Arc<dyn AvailabilityLogStore>) -> Self {
        self.availability_logs = logs;
        self
    }
}
