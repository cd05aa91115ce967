use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::PgStore;
use crate::{error::AppResult, models::StaffAvailabilityLog, repository::AvailabilityLogStore};

#[async_trait]
impl AvailabilityLogStore for PgStore {
    async fn append(&self, entry: StaffAvailabilityLog) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO staff_availability_logs (id, staff_id, shift_id, action, previous_status,
                                                 new_status, reason, changed_by, changed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(entry.id)
        .bind(entry.staff_id)
        .bind(entry.shift_id)
        .bind(entry.action)
        .bind(entry.previous_status)
        .bind(entry.new_status)
        .bind(&entry.reason)
        .bind(&entry.changed_by)
        .bind(entry.changed_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list(
        &self,
        staff_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: Option<i64>,
    ) -> AppResult<Vec<StaffAvailabilityLog>> {
        // LIMIT NULL means no limit
        let rows = sqlx::query_as::<_, StaffAvailabilityLog>(
            r#"
            SELECT * FROM staff_availability_logs
            WHERE staff_id = $1 AND changed_at BETWEEN $2 AND $3
            ORDER BY changed_at DESC
            LIMIT $4
            "#,
        )
        .bind(staff_id)
        .bind(from)
        .bind(to)
        .bind(limit.filter(|l| *l > 0))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
