use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::{PgConnection, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{map_write_error, PgStore};
use crate::{
    error::{AppError, AppResult},
    models::StaffShift,
    repository::ShiftStore,
    scheduling::{conflicts::plan_batch, ensure_shift_free, OccupiedDatePolicy},
};

const OVERLAP: &str = "shift conflicts with an existing shift";

async fn insert_one(conn: &mut PgConnection, shift: &StaffShift) -> Result<StaffShift, sqlx::Error> {
    sqlx::query_as::<_, StaffShift>(
        r#"
        INSERT INTO staff_shifts (id, staff_id, shift_date, start_time, end_time, break_start,
                                  break_end, is_available, is_manually_disabled,
                                  manual_disable_reason, shift_type, notes, created_by,
                                  updated_by, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
        RETURNING *
        "#,
    )
    .bind(shift.id)
    .bind(shift.staff_id)
    .bind(shift.shift_date)
    .bind(shift.start_time)
    .bind(shift.end_time)
    .bind(shift.break_start)
    .bind(shift.break_end)
    .bind(shift.is_available)
    .bind(shift.is_manually_disabled)
    .bind(&shift.manual_disable_reason)
    .bind(shift.shift_type)
    .bind(&shift.notes)
    .bind(&shift.created_by)
    .bind(&shift.updated_by)
    .bind(shift.created_at)
    .bind(shift.updated_at)
    .fetch_one(conn)
    .await
}

#[async_trait]
impl ShiftStore for PgStore {
    async fn get(&self, id: Uuid) -> AppResult<StaffShift> {
        sqlx::query_as::<_, StaffShift>("SELECT * FROM staff_shifts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Shift {} not found", id)))
    }

    async fn list_for_staff(
        &self,
        staff_ids: &[Uuid],
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<StaffShift>> {
        let rows = sqlx::query_as::<_, StaffShift>(
            r#"
            SELECT * FROM staff_shifts
            WHERE staff_id = ANY($1) AND shift_date BETWEEN $2 AND $3
            ORDER BY staff_id, shift_date, start_time
            "#,
        )
        .bind(staff_ids)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn insert_batch(
        &self,
        shifts: Vec<StaffShift>,
        policy: OccupiedDatePolicy,
    ) -> AppResult<Vec<StaffShift>> {
        if shifts.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self.begin_serializable().await?;

        // Snapshot of every (staff, date) the batch touches
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT * FROM staff_shifts WHERE (staff_id, shift_date) IN ");
        builder.push_tuples(shifts.iter(), |mut b, s| {
            b.push_bind(s.staff_id).push_bind(s.shift_date);
        });
        let pre_existing = builder
            .build_query_as::<StaffShift>()
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| map_write_error(e, OVERLAP))?;

        let admitted = plan_batch(shifts, &pre_existing, policy)?;

        let mut inserted = Vec::with_capacity(admitted.len());
        for shift in &admitted {
            let row = insert_one(&mut *tx, shift)
                .await
                .map_err(|e| map_write_error(e, OVERLAP))?;
            inserted.push(row);
        }

        tx.commit().await.map_err(|e| map_write_error(e, OVERLAP))?;
        Ok(inserted)
    }

    async fn update_checked(&self, shift: StaffShift) -> AppResult<StaffShift> {
        shift.window()?;
        let mut tx = self.begin_serializable().await?;

        let same_day = sqlx::query_as::<_, StaffShift>(
            "SELECT * FROM staff_shifts WHERE staff_id = $1 AND shift_date = $2",
        )
        .bind(shift.staff_id)
        .bind(shift.shift_date)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, OVERLAP))?;
        ensure_shift_free(&shift, &same_day, Some(shift.id))?;

        let row = sqlx::query_as::<_, StaffShift>(
            r#"
            UPDATE staff_shifts
            SET start_time = $2, end_time = $3, break_start = $4, break_end = $5,
                is_available = $6, is_manually_disabled = $7, manual_disable_reason = $8,
                shift_type = $9, notes = $10, updated_by = $11, updated_at = $12
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(shift.id)
        .bind(shift.start_time)
        .bind(shift.end_time)
        .bind(shift.break_start)
        .bind(shift.break_end)
        .bind(shift.is_available)
        .bind(shift.is_manually_disabled)
        .bind(&shift.manual_disable_reason)
        .bind(shift.shift_type)
        .bind(&shift.notes)
        .bind(&shift.updated_by)
        .bind(shift.updated_at)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, OVERLAP))?
        .ok_or_else(|| AppError::NotFound(format!("Shift {} not found", shift.id)))?;

        tx.commit().await.map_err(|e| map_write_error(e, OVERLAP))?;
        Ok(row)
    }

    async fn set_availability_for_day(
        &self,
        staff_id: Uuid,
        date: NaiveDate,
        is_available: bool,
        reason: Option<String>,
        actor: &str,
    ) -> AppResult<Vec<StaffShift>> {
        // One statement, so the day flips as a whole or not at all
        let mut rows = sqlx::query_as::<_, StaffShift>(
            r#"
            UPDATE staff_shifts
            SET is_available = $3,
                is_manually_disabled = NOT $3,
                manual_disable_reason = CASE WHEN $3 THEN NULL ELSE $4::text END,
                updated_by = $5,
                updated_at = $6
            WHERE staff_id = $1 AND shift_date = $2 AND is_available <> $3
            RETURNING *
            "#,
        )
        .bind(staff_id)
        .bind(date)
        .bind(is_available)
        .bind(reason)
        .bind(actor)
        .bind(Utc::now())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_write_error(e, OVERLAP))?;
        rows.sort_by_key(|s| s.start_time);
        Ok(rows)
    }

    async fn delete(&self, id: Uuid) -> AppResult<StaffShift> {
        sqlx::query_as::<_, StaffShift>("DELETE FROM staff_shifts WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Shift {} not found", id)))
    }

    async fn delete_many(&self, ids: &[Uuid]) -> AppResult<Vec<StaffShift>> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query_as::<_, StaffShift>(
            "DELETE FROM staff_shifts WHERE id = ANY($1) RETURNING *",
        )
        .bind(ids)
        .fetch_all(&mut *tx)
        .await?;

        if let Some(missing) = ids.iter().find(|id| !deleted.iter().any(|s| s.id == **id)) {
            tx.rollback().await?;
            return Err(AppError::NotFound(format!("Shift {} not found", missing)));
        }

        tx.commit().await?;
        Ok(deleted)
    }
}
