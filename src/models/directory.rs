//! Read-side records owned by the business directory (staff, services, clients, hours)

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::scheduling::interval::hhmm;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Staff {
    pub id: Uuid,
    pub business_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub position: Option<String>,
    pub is_active: bool,
}

impl Staff {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Service {
    pub id: Uuid,
    pub business_id: Uuid,
    pub location_id: Option<Uuid>,
    pub name: String,
    pub duration_minutes: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Client {
    pub id: Uuid,
    pub business_id: Uuid,
    pub phone: String,
    pub first_name: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Opening hours of a business for one weekday
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BusinessWorkingHours {
    pub business_id: Uuid,
    /// 0 = Sunday … 6 = Saturday
    pub day_of_week: i16,
    #[serde(with = "hhmm")]
    #[schema(value_type = String, example = "09:00")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    #[schema(value_type = String, example = "18:00")]
    pub end_time: NaiveTime,
    pub is_enabled: bool,
}
