use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::PgStore;
use crate::{
    error::{AppError, AppResult},
    models::{ConflictStatus, ScheduleConflict},
    repository::ConflictStore,
};

#[async_trait]
impl ConflictStore for PgStore {
    async fn insert_many(&self, conflicts: Vec<ScheduleConflict>) -> AppResult<Vec<ScheduleConflict>> {
        let mut tx = self.pool.begin().await?;
        let mut rows = Vec::with_capacity(conflicts.len());

        for conflict in &conflicts {
            let row = sqlx::query_as::<_, ScheduleConflict>(
                r#"
                INSERT INTO schedule_conflicts (id, business_id, conflict_type, severity, description,
                                                staff_id, conflict_date, related_ids, status,
                                                resolved_by, resolved_at, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                RETURNING *
                "#,
            )
            .bind(conflict.id)
            .bind(conflict.business_id)
            .bind(conflict.conflict_type)
            .bind(conflict.severity)
            .bind(&conflict.description)
            .bind(conflict.staff_id)
            .bind(conflict.conflict_date)
            .bind(&conflict.related_ids)
            .bind(conflict.status)
            .bind(&conflict.resolved_by)
            .bind(conflict.resolved_at)
            .bind(conflict.created_at)
            .fetch_one(&mut *tx)
            .await?;
            rows.push(row);
        }

        tx.commit().await?;
        Ok(rows)
    }

    async fn get(&self, id: Uuid) -> AppResult<ScheduleConflict> {
        sqlx::query_as::<_, ScheduleConflict>("SELECT * FROM schedule_conflicts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Schedule conflict {} not found", id)))
    }

    async fn list(
        &self,
        business_id: Uuid,
        status: Option<ConflictStatus>,
    ) -> AppResult<Vec<ScheduleConflict>> {
        let rows = match status {
            Some(status) => {
                sqlx::query_as::<_, ScheduleConflict>(
                    r#"
                    SELECT * FROM schedule_conflicts
                    WHERE business_id = $1 AND status = $2
                    ORDER BY conflict_date, created_at, id
                    "#,
                )
                .bind(business_id)
                .bind(status)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, ScheduleConflict>(
                    "SELECT * FROM schedule_conflicts WHERE business_id = $1 ORDER BY conflict_date, created_at, id",
                )
                .bind(business_id)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(rows)
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: ConflictStatus,
        resolved_by: Option<String>,
        resolved_at: Option<DateTime<Utc>>,
    ) -> AppResult<ScheduleConflict> {
        sqlx::query_as::<_, ScheduleConflict>(
            r#"
            UPDATE schedule_conflicts
            SET status = $2, resolved_by = $3, resolved_at = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(resolved_by)
        .bind(resolved_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Schedule conflict {} not found", id)))
    }
}
