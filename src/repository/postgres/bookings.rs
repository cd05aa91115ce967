use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{map_write_error, PgStore};
use crate::{
    error::{AppError, AppResult},
    models::Booking,
    repository::BookingStore,
    scheduling::{ensure_booking_free, TimeRange},
};

const TAKEN: &str = "time slot is not available";

#[async_trait]
impl BookingStore for PgStore {
    async fn find_overlapping(
        &self,
        staff_id: Uuid,
        range: TimeRange<DateTime<Utc>>,
    ) -> AppResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, Booking>(
            r#"
            SELECT * FROM bookings
            WHERE staff_id = $1 AND start_at < $3 AND end_at > $2
            ORDER BY start_at
            "#,
        )
        .bind(staff_id)
        .bind(range.start())
        .bind(range.end())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn insert_checked(&self, booking: Booking) -> AppResult<Booking> {
        let range = TimeRange::new(booking.start_at, booking.end_at)?;
        let mut tx = self.begin_serializable().await?;

        let existing = sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE staff_id = $1 AND start_at < $3 AND end_at > $2",
        )
        .bind(booking.staff_id)
        .bind(range.start())
        .bind(range.end())
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, TAKEN))?;
        ensure_booking_free(&range, &existing)?;

        let row = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (id, business_id, service_id, staff_id, client_id, location_id,
                                  start_at, end_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(booking.id)
        .bind(booking.business_id)
        .bind(booking.service_id)
        .bind(booking.staff_id)
        .bind(booking.client_id)
        .bind(booking.location_id)
        .bind(booking.start_at)
        .bind(booking.end_at)
        .bind(booking.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, TAKEN))?;

        tx.commit().await.map_err(|e| map_write_error(e, TAKEN))?;
        Ok(row)
    }

    async fn get(&self, id: Uuid) -> AppResult<Booking> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", id)))
    }

    async fn list_for_business(
        &self,
        business_id: Uuid,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> AppResult<Vec<Booking>> {
        let mut conditions = vec!["business_id = $1".to_string()];
        let mut idx = 2;

        if from.is_some() {
            conditions.push(format!("start_at >= ${}", idx));
            idx += 1;
        }
        if to.is_some() {
            conditions.push(format!("start_at < ${}", idx));
        }

        let query = format!(
            "SELECT * FROM bookings WHERE {} ORDER BY start_at, staff_id",
            conditions.join(" AND ")
        );

        let mut builder = sqlx::query_as::<_, Booking>(&query).bind(business_id);
        if let Some(f) = from { builder = builder.bind(f); }
        if let Some(t) = to { builder = builder.bind(t); }

        let rows = builder.fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn list_for_staff(
        &self,
        staff_ids: &[Uuid],
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, Booking>(
            r#"
            SELECT * FROM bookings
            WHERE staff_id = ANY($1) AND start_at < $3 AND end_at > $2
            ORDER BY staff_id, start_at
            "#,
        )
        .bind(staff_ids)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Booking {} not found", id)));
        }
        Ok(())
    }
}
