//! Append-only audit trail of shift availability changes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::enums::AvailabilityAction;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct StaffAvailabilityLog {
    pub id: Uuid,
    pub staff_id: Uuid,
    pub shift_id: Option<Uuid>,
    pub action: AvailabilityAction,
    pub previous_status: bool,
    pub new_status: bool,
    pub reason: Option<String>,
    pub changed_by: String,
    pub changed_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct AvailabilityLogQuery {
    /// YYYY-MM-DD, defaults to 30 days ago
    pub start_date: Option<String>,
    /// YYYY-MM-DD, defaults to today
    pub end_date: Option<String>,
    pub limit: Option<i64>,
}
