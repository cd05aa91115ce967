//! Booking creation and slot availability

use chrono::{Duration, Utc};
use uuid::Uuid;
use validator::Validate;

use super::{end_of_day, start_of_day};
use crate::{
    error::{AppError, AppResult},
    models::{
        booking::{AvailabilityQuery, BookingQuery, CreateBooking},
        Booking, Client, Service, Slot, Staff, TimeOffStatus,
    },
    repository::Repository,
    scheduling::{
        ensure_booking_free,
        interval::{parse_date, weekday_index},
        slots::{generate_slots, working_windows},
        SlotSettings, TimeRange,
    },
};

#[derive(Clone)]
pub struct BookingsService {
    repository: Repository,
    slots: SlotSettings,
}

impl BookingsService {
    pub fn new(repository: Repository, slots: SlotSettings) -> Self {
        Self { repository, slots }
    }

    async fn business_service(&self, business_id: Uuid, service_id: Uuid) -> AppResult<Service> {
        let service = self.repository.directory.get_service(service_id).await?;
        if service.business_id != business_id {
            return Err(AppError::Ownership(format!(
                "Service {} does not belong to business {}",
                service_id, business_id
            )));
        }
        if service.duration_minutes <= 0 {
            return Err(AppError::Validation(format!(
                "Service {} has no positive duration",
                service_id
            )));
        }
        Ok(service)
    }

    async fn business_staff(&self, business_id: Uuid, staff_id: Uuid) -> AppResult<Staff> {
        let staff = self.repository.directory.get_staff(staff_id).await?;
        if staff.business_id != business_id {
            return Err(AppError::Ownership(format!(
                "Staff {} does not belong to business {}",
                staff_id, business_id
            )));
        }
        Ok(staff)
    }

    /// Book a service with a staff member.
    ///
    /// The appointment lasts the service duration. The client is looked up
    /// by phone and created on first booking. The overlap check is repeated
    /// by the store atomically with the insert, so two concurrent requests
    /// for the same slot cannot both succeed.
    pub async fn create_booking(&self, business_id: Uuid, data: &CreateBooking) -> AppResult<Booking> {
        data.validate()?;

        let service = self.business_service(business_id, data.service_id).await?;
        let staff = self.business_staff(business_id, data.staff_id).await?;

        let end_at = data.start_at + Duration::minutes(service.duration_minutes as i64);
        let range = TimeRange::new(data.start_at, end_at)?;

        let existing = self.repository.bookings.find_overlapping(staff.id, range).await?;
        ensure_booking_free(&range, &existing)?;

        let client = match self
            .repository
            .directory
            .find_client_by_phone(business_id, &data.customer_phone)
            .await?
        {
            Some(client) => client,
            None => {
                self.repository
                    .directory
                    .insert_client(Client {
                        id: Uuid::new_v4(),
                        business_id,
                        phone: data.customer_phone.clone(),
                        first_name: data.customer_name.clone(),
                        email: data.customer_email.clone(),
                        created_at: Utc::now(),
                    })
                    .await?
            }
        };

        let booking = self
            .repository
            .bookings
            .insert_checked(Booking {
                id: Uuid::new_v4(),
                business_id,
                service_id: service.id,
                staff_id: staff.id,
                client_id: client.id,
                location_id: data.location_id.or(service.location_id),
                start_at: range.start(),
                end_at: range.end(),
                created_at: Utc::now(),
            })
            .await?;

        tracing::info!(
            booking_id = %booking.id,
            staff_id = %booking.staff_id,
            start_at = %booking.start_at,
            "Booking created"
        );
        Ok(booking)
    }

    /// Free slots of a day, for one staff member or every active one.
    ///
    /// Sorted by staff then start time.
    pub async fn available_slots(
        &self,
        business_id: Uuid,
        query: &AvailabilityQuery,
    ) -> AppResult<Vec<Slot>> {
        let day = parse_date(&query.day, "day")?;

        let mut settings = self.slots;
        if let Some(service_id) = query.service_id {
            let service = self.business_service(business_id, service_id).await?;
            settings = settings.with_duration_minutes(service.duration_minutes as i64);
        }

        let staff: Vec<Staff> = match query.staff_id {
            Some(staff_id) => vec![self.business_staff(business_id, staff_id).await?],
            None => self
                .repository
                .directory
                .list_staff(business_id)
                .await?
                .into_iter()
                .filter(|s| s.is_active)
                .collect(),
        };
        if staff.is_empty() {
            return Ok(Vec::new());
        }
        let staff_ids: Vec<Uuid> = staff.iter().map(|s| s.id).collect();

        let shifts = self.repository.shifts.list_for_staff(&staff_ids, day, day).await?;
        let hours = self
            .repository
            .directory
            .working_hours(business_id, weekday_index(day) as i16)
            .await?;
        let time_off = self
            .repository
            .time_off
            .list_for_staff(&staff_ids, Some(day), Some(day), Some(TimeOffStatus::Approved))
            .await?;
        let bookings = self
            .repository
            .bookings
            .list_for_staff(&staff_ids, start_of_day(day), end_of_day(day))
            .await?;

        let mut slots = Vec::new();
        for member in &staff {
            let own_shifts: Vec<_> = shifts.iter().filter(|s| s.staff_id == member.id).cloned().collect();
            let mut windows = working_windows(&settings, &own_shifts, hours.as_ref())?;
            for request in time_off.iter().filter(|r| r.staff_id == member.id) {
                if let Some(portion) = request.blocked_portion(day) {
                    windows = portion.clip(&windows);
                }
            }
            slots.extend(generate_slots(member.id, day, &windows, &bookings, &settings));
        }
        slots.sort();

        tracing::debug!(%business_id, %day, count = slots.len(), "Computed available slots");
        Ok(slots)
    }

    pub async fn list_bookings(&self, business_id: Uuid, query: &BookingQuery) -> AppResult<Vec<Booking>> {
        let from = query
            .start_date
            .as_deref()
            .map(|d| parse_date(d, "start date"))
            .transpose()?;
        let to = query
            .end_date
            .as_deref()
            .map(|d| parse_date(d, "end date"))
            .transpose()?;
        if let (Some(from), Some(to)) = (from, to) {
            crate::scheduling::interval::check_date_range(from, to)?;
        }

        self.repository
            .bookings
            .list_for_business(business_id, from.map(start_of_day), to.map(end_of_day))
            .await
    }

    pub async fn get_booking(&self, business_id: Uuid, id: Uuid) -> AppResult<Booking> {
        let booking = self.repository.bookings.get(id).await?;
        if booking.business_id != business_id {
            return Err(AppError::Ownership(format!(
                "Booking {} does not belong to business {}",
                id, business_id
            )));
        }
        Ok(booking)
    }

    /// Cancel a booking, freeing its slot
    pub async fn cancel_booking(&self, business_id: Uuid, id: Uuid) -> AppResult<()> {
        self.get_booking(business_id, id).await?;
        self.repository.bookings.delete(id).await?;
        tracing::info!(booking_id = %id, "Booking cancelled");
        Ok(())
    }
}
