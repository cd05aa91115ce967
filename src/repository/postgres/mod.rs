//! Postgres storage adapter.
//!
//! Read-then-write operations run in SERIALIZABLE transactions; the schema
//! also carries exclusion constraints on bookings and shifts. Serialization
//! failures (40001) and exclusion violations (23P01) surface as Conflict.

mod availability_logs;
mod bookings;
mod conflicts;
mod directory;
mod shifts;
mod templates;
mod time_off;

use sqlx::{Pool, Postgres, Transaction};

use crate::error::{AppError, AppResult};

const SERIALIZATION_FAILURE: &str = "40001";
const EXCLUSION_VIOLATION: &str = "23P01";

#[derive(Clone)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn begin_serializable(&self) -> AppResult<Transaction<'static, Postgres>> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await?;
        Ok(tx)
    }
}

/// Map concurrent-write failures to Conflict, anything else to Database
fn map_write_error(err: sqlx::Error, conflict_message: &str) -> AppError {
    if let sqlx::Error::Database(db) = &err {
        if let Some(code) = db.code() {
            if code == SERIALIZATION_FAILURE || code == EXCLUSION_VIOLATION {
                return AppError::Conflict(conflict_message.to_string());
            }
        }
    }
    AppError::Database(err)
}
