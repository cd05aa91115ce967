//! Detected schedule conflicts

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::enums::{ConflictSeverity, ConflictStatus, ConflictType};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ScheduleConflict {
    pub id: Uuid,
    pub business_id: Uuid,
    pub conflict_type: ConflictType,
    pub severity: ConflictSeverity,
    pub description: String,
    pub staff_id: Uuid,
    pub conflict_date: NaiveDate,
    /// Shifts, bookings or time-off requests involved, sorted
    pub related_ids: Vec<Uuid>,
    pub status: ConflictStatus,
    pub resolved_by: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ScheduleConflict {
    /// Identity used to avoid recording the same open conflict twice
    pub fn fingerprint(&self) -> (ConflictType, Uuid, NaiveDate, Vec<Uuid>) {
        (
            self.conflict_type,
            self.staff_id,
            self.conflict_date,
            self.related_ids.clone(),
        )
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DetectConflicts {
    pub start_date: String,
    pub end_date: String,
}

/// Close a conflict as resolved or ignored
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResolveConflict {
    pub status: ConflictStatus,
    #[validate(length(min = 1, message = "resolved_by is required"))]
    pub resolved_by: String,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ConflictQuery {
    pub status: Option<ConflictStatus>,
}
