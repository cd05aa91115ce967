//! Time-off request endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::time_off::{CreateTimeOff, TimeOffQuery, TimeOffRequest, UpdateTimeOff},
};

/// Request time off
#[utoipa::path(
    post,
    path = "/time-off",
    tag = "time-off",
    request_body = CreateTimeOff,
    responses(
        (status = 201, description = "Request filed as pending", body = TimeOffRequest)
    )
)]
pub async fn create_time_off(
    State(state): State<crate::AppState>,
    Json(data): Json<CreateTimeOff>,
) -> AppResult<(StatusCode, Json<TimeOffRequest>)> {
    let request = state.services.time_off.create(&data).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// Get a time-off request
#[utoipa::path(
    get,
    path = "/time-off/{id}",
    tag = "time-off",
    params(("id" = Uuid, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Time-off request", body = TimeOffRequest),
        (status = 404, description = "Request not found")
    )
)]
pub async fn get_time_off(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<TimeOffRequest>> {
    let request = state.services.time_off.get(id).await?;
    Ok(Json(request))
}

/// Approve, reject or comment a request
#[utoipa::path(
    put,
    path = "/time-off/{id}",
    tag = "time-off",
    params(("id" = Uuid, Path, description = "Request ID")),
    request_body = UpdateTimeOff,
    responses(
        (status = 200, description = "Request updated", body = TimeOffRequest)
    )
)]
pub async fn update_time_off(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
    Json(data): Json<UpdateTimeOff>,
) -> AppResult<Json<TimeOffRequest>> {
    let request = state.services.time_off.update(id, &data).await?;
    Ok(Json(request))
}

/// Delete a request
#[utoipa::path(
    delete,
    path = "/time-off/{id}",
    tag = "time-off",
    params(("id" = Uuid, Path, description = "Request ID")),
    responses(
        (status = 204, description = "Request deleted")
    )
)]
pub async fn delete_time_off(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.time_off.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Requests of a staff member
#[utoipa::path(
    get,
    path = "/staff/{staff_id}/time-off",
    tag = "time-off",
    params(("staff_id" = Uuid, Path, description = "Staff ID"), TimeOffQuery),
    responses(
        (status = 200, description = "Requests, newest first", body = Vec<TimeOffRequest>)
    )
)]
pub async fn list_staff_time_off(
    State(state): State<crate::AppState>,
    Path(staff_id): Path<Uuid>,
    Query(query): Query<TimeOffQuery>,
) -> AppResult<Json<Vec<TimeOffRequest>>> {
    let requests = state.services.time_off.list_for_staff(staff_id, &query).await?;
    Ok(Json(requests))
}

/// Requests of every staff member of a business
#[utoipa::path(
    get,
    path = "/businesses/{business_id}/time-off",
    tag = "time-off",
    params(("business_id" = Uuid, Path, description = "Business ID"), TimeOffQuery),
    responses(
        (status = 200, description = "Requests, newest first", body = Vec<TimeOffRequest>)
    )
)]
pub async fn list_business_time_off(
    State(state): State<crate::AppState>,
    Path(business_id): Path<Uuid>,
    Query(query): Query<TimeOffQuery>,
) -> AppResult<Json<Vec<TimeOffRequest>>> {
    let requests = state.services.time_off.list_for_business(business_id, &query).await?;
    Ok(Json(requests))
}
