use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use super::PgStore;
use crate::{
    error::{AppError, AppResult},
    models::{TimeOffRequest, TimeOffStatus},
    repository::TimeOffStore,
};

#[async_trait]
impl TimeOffStore for PgStore {
    async fn insert(&self, request: TimeOffRequest) -> AppResult<TimeOffRequest> {
        let row = sqlx::query_as::<_, TimeOffRequest>(
            r#"
            INSERT INTO time_off_requests (id, staff_id, start_date, end_date, type, reason, status,
                                           is_half_day, half_day_type, requested_by, approved_by,
                                           comments, requested_at, processed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING *
            "#,
        )
        .bind(request.id)
        .bind(request.staff_id)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(request.time_off_type)
        .bind(&request.reason)
        .bind(request.status)
        .bind(request.is_half_day)
        .bind(request.half_day_type)
        .bind(&request.requested_by)
        .bind(&request.approved_by)
        .bind(&request.comments)
        .bind(request.requested_at)
        .bind(request.processed_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn get(&self, id: Uuid) -> AppResult<TimeOffRequest> {
        sqlx::query_as::<_, TimeOffRequest>("SELECT * FROM time_off_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Time off request {} not found", id)))
    }

    async fn update(&self, request: TimeOffRequest) -> AppResult<TimeOffRequest> {
        sqlx::query_as::<_, TimeOffRequest>(
            r#"
            UPDATE time_off_requests
            SET status = $2, approved_by = $3, comments = $4, processed_at = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(request.id)
        .bind(request.status)
        .bind(&request.approved_by)
        .bind(&request.comments)
        .bind(request.processed_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Time off request {} not found", request.id)))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM time_off_requests WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Time off request {} not found", id)));
        }
        Ok(())
    }

    async fn list_for_staff(
        &self,
        staff_ids: &[Uuid],
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        status: Option<TimeOffStatus>,
    ) -> AppResult<Vec<TimeOffRequest>> {
        let mut conditions = vec!["staff_id = ANY($1)".to_string()];
        let mut idx = 2;

        if from.is_some() {
            conditions.push(format!("end_date >= ${}", idx));
            idx += 1;
        }
        if to.is_some() {
            conditions.push(format!("start_date <= ${}", idx));
            idx += 1;
        }
        if status.is_some() {
            conditions.push(format!("status = ${}", idx));
        }

        let query = format!(
            "SELECT * FROM time_off_requests WHERE {} ORDER BY start_date DESC, requested_at",
            conditions.join(" AND ")
        );

        let mut builder = sqlx::query_as::<_, TimeOffRequest>(&query).bind(staff_ids);
        if let Some(f) = from { builder = builder.bind(f); }
        if let Some(t) = to { builder = builder.bind(t); }
        if let Some(s) = status { builder = builder.bind(s); }

        let rows = builder.fetch_all(&self.pool).await?;
        Ok(rows)
    }
}
