//! Time-off requests

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        time_off::{CreateTimeOff, TimeOffQuery, UpdateTimeOff},
        TimeOffRequest, TimeOffStatus,
    },
    repository::Repository,
    scheduling::interval::{check_date_range, parse_date},
};

#[derive(Clone)]
pub struct TimeOffService {
    repository: Repository,
}

impl TimeOffService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// File a new request; it starts pending
    pub async fn create(&self, data: &CreateTimeOff) -> AppResult<TimeOffRequest> {
        data.validate()?;
        let start_date = parse_date(&data.start_date, "start date")?;
        let end_date = parse_date(&data.end_date, "end date")?;
        check_date_range(start_date, end_date)?;

        if data.is_half_day {
            if data.half_day_type.is_none() {
                return Err(AppError::Validation(
                    "half_day_type is required for half-day time off".to_string(),
                ));
            }
            if start_date != end_date {
                return Err(AppError::Validation(
                    "half-day time off must cover a single day".to_string(),
                ));
            }
        }

        self.repository.directory.get_staff(data.staff_id).await?;

        let request = self
            .repository
            .time_off
            .insert(TimeOffRequest {
                id: Uuid::new_v4(),
                staff_id: data.staff_id,
                start_date,
                end_date,
                time_off_type: data.time_off_type,
                reason: data.reason.clone(),
                status: TimeOffStatus::Pending,
                is_half_day: data.is_half_day,
                half_day_type: if data.is_half_day { data.half_day_type } else { None },
                requested_by: data.requested_by.clone(),
                approved_by: None,
                comments: None,
                requested_at: Utc::now(),
                processed_at: None,
            })
            .await?;

        tracing::info!(request_id = %request.id, staff_id = %request.staff_id, "Time off requested");
        Ok(request)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<TimeOffRequest> {
        self.repository.time_off.get(id).await
    }

    /// Approve, reject or cancel a request; a status change stamps `processed_at`
    pub async fn update(&self, id: Uuid, data: &UpdateTimeOff) -> AppResult<TimeOffRequest> {
        data.validate()?;
        let mut request = self.repository.time_off.get(id).await?;

        if let Some(status) = data.status {
            if status != request.status {
                request.status = status;
                request.processed_at = Some(Utc::now());
            }
        }
        if data.approved_by.is_some() {
            request.approved_by = data.approved_by.clone();
        }
        if data.comments.is_some() {
            request.comments = data.comments.clone();
        }

        let request = self.repository.time_off.update(request).await?;
        tracing::info!(request_id = %id, status = %request.status, "Time off updated");
        Ok(request)
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.repository.time_off.delete(id).await
    }

    pub async fn list_for_staff(&self, staff_id: Uuid, query: &TimeOffQuery) -> AppResult<Vec<TimeOffRequest>> {
        self.repository.directory.get_staff(staff_id).await?;
        self.list(vec![staff_id], query).await
    }

    pub async fn list_for_business(
        &self,
        business_id: Uuid,
        query: &TimeOffQuery,
    ) -> AppResult<Vec<TimeOffRequest>> {
        let staff_ids = self
            .repository
            .directory
            .list_staff(business_id)
            .await?
            .into_iter()
            .map(|s| s.id)
            .collect::<Vec<_>>();
        if staff_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.list(staff_ids, query).await
    }

    async fn list(&self, staff_ids: Vec<Uuid>, query: &TimeOffQuery) -> AppResult<Vec<TimeOffRequest>> {
        let from = query
            .start_date
            .as_deref()
            .map(|d| parse_date(d, "start date"))
            .transpose()?;
        let to = query
            .end_date
            .as_deref()
            .map(|d| parse_date(d, "end date"))
            .transpose()?;
        if let (Some(from), Some(to)) = (from, to) {
            check_date_range(from, to)?;
        }

        self.repository
            .time_off
            .list_for_staff(&staff_ids, from, to, query.status)
            .await
    }
}
