use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use uuid::Uuid;

use super::PgStore;
use crate::{
    error::{AppError, AppResult},
    models::ScheduleTemplate,
    repository::TemplateStore,
};

#[async_trait]
impl TemplateStore for PgStore {
    async fn insert(&self, template: ScheduleTemplate) -> AppResult<ScheduleTemplate> {
        let mut tx = self.pool.begin().await?;

        if template.is_default {
            sqlx::query("UPDATE schedule_templates SET is_default = FALSE WHERE staff_id = $1")
                .bind(template.staff_id)
                .execute(&mut *tx)
                .await?;
        }

        let row = sqlx::query_as::<_, ScheduleTemplate>(
            r#"
            INSERT INTO schedule_templates (id, staff_id, name, description, is_default, schedule,
                                            created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(template.id)
        .bind(template.staff_id)
        .bind(&template.name)
        .bind(&template.description)
        .bind(template.is_default)
        .bind(Json(&template.schedule))
        .bind(template.created_at)
        .bind(template.updated_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }

    async fn get(&self, id: Uuid) -> AppResult<ScheduleTemplate> {
        sqlx::query_as::<_, ScheduleTemplate>("SELECT * FROM schedule_templates WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Schedule template {} not found", id)))
    }

    async fn list_for_staff(&self, staff_id: Uuid) -> AppResult<Vec<ScheduleTemplate>> {
        let rows = sqlx::query_as::<_, ScheduleTemplate>(
            "SELECT * FROM schedule_templates WHERE staff_id = $1 ORDER BY is_default DESC, created_at",
        )
        .bind(staff_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn default_for_staff(&self, staff_id: Uuid) -> AppResult<Option<ScheduleTemplate>> {
        let row = sqlx::query_as::<_, ScheduleTemplate>(
            "SELECT * FROM schedule_templates WHERE staff_id = $1 AND is_default",
        )
        .bind(staff_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(&self, template: ScheduleTemplate) -> AppResult<ScheduleTemplate> {
        let mut tx = self.pool.begin().await?;

        if template.is_default {
            sqlx::query(
                "UPDATE schedule_templates SET is_default = FALSE WHERE staff_id = $1 AND id <> $2",
            )
            .bind(template.staff_id)
            .bind(template.id)
            .execute(&mut *tx)
            .await?;
        }

        let row = sqlx::query_as::<_, ScheduleTemplate>(
            r#"
            UPDATE schedule_templates
            SET name = $2, description = $3, is_default = $4, schedule = $5, updated_at = $6
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(template.id)
        .bind(&template.name)
        .bind(&template.description)
        .bind(template.is_default)
        .bind(Json(&template.schedule))
        .bind(template.updated_at)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Schedule template {} not found", template.id)))?;

        tx.commit().await?;
        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM schedule_templates WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Schedule template {} not found", id)));
        }
        Ok(())
    }

    async fn set_default(&self, id: Uuid) -> AppResult<ScheduleTemplate> {
        let mut tx = self.pool.begin().await?;

        let staff_id: Uuid = sqlx::query_scalar("SELECT staff_id FROM schedule_templates WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Schedule template {} not found", id)))?;

        sqlx::query("UPDATE schedule_templates SET is_default = FALSE WHERE staff_id = $1 AND id <> $2")
            .bind(staff_id)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let row = sqlx::query_as::<_, ScheduleTemplate>(
            "UPDATE schedule_templates SET is_default = TRUE, updated_at = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }
}
