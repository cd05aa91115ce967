use async_trait::async_trait;
use uuid::Uuid;

use super::PgStore;
use crate::{
    error::{AppError, AppResult},
    models::{BusinessWorkingHours, Client, Service, Staff},
    repository::DirectoryStore,
};

#[async_trait]
impl DirectoryStore for PgStore {
    async fn get_staff(&self, id: Uuid) -> AppResult<Staff> {
        sqlx::query_as::<_, Staff>("SELECT * FROM staff WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Staff {} not found", id)))
    }

    async fn list_staff(&self, business_id: Uuid) -> AppResult<Vec<Staff>> {
        let rows = sqlx::query_as::<_, Staff>(
            "SELECT * FROM staff WHERE business_id = $1 ORDER BY last_name, first_name, id",
        )
        .bind(business_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_service(&self, id: Uuid) -> AppResult<Service> {
        sqlx::query_as::<_, Service>("SELECT * FROM services WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Service {} not found", id)))
    }

    async fn find_client_by_phone(&self, business_id: Uuid, phone: &str) -> AppResult<Option<Client>> {
        let row = sqlx::query_as::<_, Client>(
            "SELECT * FROM clients WHERE business_id = $1 AND phone = $2",
        )
        .bind(business_id)
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert_client(&self, client: Client) -> AppResult<Client> {
        // (business_id, phone) is unique; a concurrent insert returns the existing row
        let row = sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (id, business_id, phone, first_name, email, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (business_id, phone) DO UPDATE SET phone = EXCLUDED.phone
            RETURNING *
            "#,
        )
        .bind(client.id)
        .bind(client.business_id)
        .bind(&client.phone)
        .bind(&client.first_name)
        .bind(&client.email)
        .bind(client.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn working_hours(
        &self,
        business_id: Uuid,
        day_of_week: i16,
    ) -> AppResult<Option<BusinessWorkingHours>> {
        let row = sqlx::query_as::<_, BusinessWorkingHours>(
            "SELECT * FROM business_working_hours WHERE business_id = $1 AND day_of_week = $2",
        )
        .bind(business_id)
        .bind(day_of_week)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
