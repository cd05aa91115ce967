//! Booking and availability slot models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::scheduling::interval::TimeRange;

// ---------------------------------------------------------------------------
// Booking
// ---------------------------------------------------------------------------

/// A client appointment with a staff member
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Booking {
    pub id: Uuid,
    pub business_id: Uuid,
    pub service_id: Uuid,
    pub staff_id: Uuid,
    pub client_id: Uuid,
    pub location_id: Option<Uuid>,
    /// Appointment start (UTC)
    pub start_at: DateTime<Utc>,
    /// start_at + service duration
    pub end_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn overlaps(&self, range: &TimeRange<DateTime<Utc>>) -> bool {
        crate::scheduling::interval::overlaps(self.start_at, self.end_at, range.start(), range.end())
    }
}

/// Create booking request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBooking {
    pub service_id: Uuid,
    pub staff_id: Uuid,
    /// Appointment start (RFC 3339)
    pub start_at: DateTime<Utc>,
    #[validate(length(min = 3, max = 32, message = "customer_phone must be 3-32 characters"))]
    pub customer_phone: String,
    #[validate(length(min = 1, max = 100, message = "customer_name is required"))]
    pub customer_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub customer_email: Option<String>,
    /// Defaults to the service's location
    pub location_id: Option<Uuid>,
}

/// Query parameters for listing bookings
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct BookingQuery {
    /// Bookings starting on or after this date (YYYY-MM-DD)
    pub start_date: Option<String>,
    /// Bookings starting on or before this date (YYYY-MM-DD)
    pub end_date: Option<String>,
}

// ---------------------------------------------------------------------------
// Slot
// ---------------------------------------------------------------------------

/// A bookable slot, computed on demand and never stored
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
pub struct Slot {
    pub staff_id: Uuid,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Query parameters for slot availability
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct AvailabilityQuery {
    /// Day to compute slots for (YYYY-MM-DD)
    pub day: String,
    /// Restrict to one staff member
    pub staff_id: Option<Uuid>,
    /// Use this service's duration as the slot length
    pub service_id: Option<Uuid>,
}
