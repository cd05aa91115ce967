//! Schedule API endpoints (templates, shifts, bulk edits, generation)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::schedule::{
        BulkCreateShifts, BulkDeleteShifts, BulkUpdateResult, BulkUpdateShifts, CopySchedule,
        CreateShift, CreateTemplate, DeleteShiftQuery, GenerateSchedule, QuickStaffAction,
        ScheduleTemplate, ShiftCountResponse, ShiftQuery, StaffShift, UpdateShift,
        UpdateShiftAvailability, UpdateTemplate,
    },
};

// ---- Templates ----

/// Create a weekly schedule template
#[utoipa::path(
    post,
    path = "/schedules/templates",
    tag = "schedules",
    request_body = CreateTemplate,
    responses(
        (status = 201, description = "Template created", body = ScheduleTemplate),
        (status = 400, description = "Invalid template"),
        (status = 404, description = "Staff not found")
    )
)]
pub async fn create_template(
    State(state): State<crate::AppState>,
    Json(data): Json<CreateTemplate>,
) -> AppResult<(StatusCode, Json<ScheduleTemplate>)> {
    let template = state.services.schedules.create_template(&data).await?;
    Ok((StatusCode::CREATED, Json(template)))
}

/// Get a template
#[utoipa::path(
    get,
    path = "/schedules/templates/{id}",
    tag = "schedules",
    params(("id" = Uuid, Path, description = "Template ID")),
    responses(
        (status = 200, description = "Template", body = ScheduleTemplate),
        (status = 404, description = "Template not found")
    )
)]
pub async fn get_template(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ScheduleTemplate>> {
    let template = state.services.schedules.get_template(id).await?;
    Ok(Json(template))
}

/// List templates of a staff member
#[utoipa::path(
    get,
    path = "/staff/{staff_id}/templates",
    tag = "schedules",
    params(("staff_id" = Uuid, Path, description = "Staff ID")),
    responses(
        (status = 200, description = "Templates", body = Vec<ScheduleTemplate>)
    )
)]
pub async fn list_templates(
    State(state): State<crate::AppState>,
    Path(staff_id): Path<Uuid>,
) -> AppResult<Json<Vec<ScheduleTemplate>>> {
    let templates = state.services.schedules.list_templates(staff_id).await?;
    Ok(Json(templates))
}

/// Update a template
#[utoipa::path(
    put,
    path = "/schedules/templates/{id}",
    tag = "schedules",
    params(("id" = Uuid, Path, description = "Template ID")),
    request_body = UpdateTemplate,
    responses(
        (status = 200, description = "Template updated", body = ScheduleTemplate)
    )
)]
pub async fn update_template(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
    Json(data): Json<UpdateTemplate>,
) -> AppResult<Json<ScheduleTemplate>> {
    let template = state.services.schedules.update_template(id, &data).await?;
    Ok(Json(template))
}

/// Delete a template
#[utoipa::path(
    delete,
    path = "/schedules/templates/{id}",
    tag = "schedules",
    params(("id" = Uuid, Path, description = "Template ID")),
    responses(
        (status = 204, description = "Template deleted")
    )
)]
pub async fn delete_template(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.schedules.delete_template(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Make a template the staff member's default
#[utoipa::path(
    post,
    path = "/schedules/templates/{id}/default",
    tag = "schedules",
    params(("id" = Uuid, Path, description = "Template ID")),
    responses(
        (status = 200, description = "Template is now the default", body = ScheduleTemplate)
    )
)]
pub async fn set_default_template(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ScheduleTemplate>> {
    let template = state.services.schedules.set_default_template(id).await?;
    Ok(Json(template))
}

// ---- Shifts ----

/// Create a shift
#[utoipa::path(
    post,
    path = "/schedules/shifts",
    tag = "schedules",
    request_body = CreateShift,
    responses(
        (status = 201, description = "Shift created", body = StaffShift),
        (status = 400, description = "Invalid shift times"),
        (status = 409, description = "Shift overlaps an existing shift")
    )
)]
pub async fn create_shift(
    State(state): State<crate::AppState>,
    Json(data): Json<CreateShift>,
) -> AppResult<(StatusCode, Json<StaffShift>)> {
    let shift = state.services.schedules.create_shift(&data).await?;
    Ok((StatusCode::CREATED, Json(shift)))
}

/// Get a shift
#[utoipa::path(
    get,
    path = "/schedules/shifts/{id}",
    tag = "schedules",
    params(("id" = Uuid, Path, description = "Shift ID")),
    responses(
        (status = 200, description = "Shift", body = StaffShift),
        (status = 404, description = "Shift not found")
    )
)]
pub async fn get_shift(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<StaffShift>> {
    let shift = state.services.schedules.get_shift(id).await?;
    Ok(Json(shift))
}

/// List shifts of a staff member
#[utoipa::path(
    get,
    path = "/staff/{staff_id}/shifts",
    tag = "schedules",
    params(("staff_id" = Uuid, Path, description = "Staff ID"), ShiftQuery),
    responses(
        (status = 200, description = "Shifts ordered by date and start", body = Vec<StaffShift>)
    )
)]
pub async fn list_shifts(
    State(state): State<crate::AppState>,
    Path(staff_id): Path<Uuid>,
    Query(query): Query<ShiftQuery>,
) -> AppResult<Json<Vec<StaffShift>>> {
    let shifts = state.services.schedules.list_shifts(staff_id, &query).await?;
    Ok(Json(shifts))
}

/// Update a shift
#[utoipa::path(
    put,
    path = "/schedules/shifts/{id}",
    tag = "schedules",
    params(("id" = Uuid, Path, description = "Shift ID")),
    request_body = UpdateShift,
    responses(
        (status = 200, description = "Shift updated", body = StaffShift),
        (status = 409, description = "Shift overlaps an existing shift")
    )
)]
pub async fn update_shift(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
    Json(data): Json<UpdateShift>,
) -> AppResult<Json<StaffShift>> {
    let shift = state.services.schedules.update_shift(id, &data).await?;
    Ok(Json(shift))
}

/// Enable or disable a shift
#[utoipa::path(
    put,
    path = "/schedules/shifts/{id}/availability",
    tag = "schedules",
    params(("id" = Uuid, Path, description = "Shift ID")),
    request_body = UpdateShiftAvailability,
    responses(
        (status = 200, description = "Shift availability changed", body = StaffShift)
    )
)]
pub async fn update_shift_availability(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
    Json(data): Json<UpdateShiftAvailability>,
) -> AppResult<Json<StaffShift>> {
    let shift = state.services.schedules.update_shift_availability(id, &data).await?;
    Ok(Json(shift))
}

/// Delete a shift
#[utoipa::path(
    delete,
    path = "/schedules/shifts/{id}",
    tag = "schedules",
    params(("id" = Uuid, Path, description = "Shift ID"), DeleteShiftQuery),
    responses(
        (status = 204, description = "Shift deleted")
    )
)]
pub async fn delete_shift(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<DeleteShiftQuery>,
) -> AppResult<StatusCode> {
    let actor = query.action_by.as_deref().unwrap_or("system");
    state.services.schedules.delete_shift(id, actor).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- Bulk operations ----

/// Create several shifts at once (all or nothing)
#[utoipa::path(
    post,
    path = "/schedules/shifts/bulk",
    tag = "schedules",
    request_body = BulkCreateShifts,
    responses(
        (status = 201, description = "Shifts created", body = Vec<StaffShift>),
        (status = 409, description = "A shift overlaps another")
    )
)]
pub async fn bulk_create_shifts(
    State(state): State<crate::AppState>,
    Json(data): Json<BulkCreateShifts>,
) -> AppResult<(StatusCode, Json<Vec<StaffShift>>)> {
    let shifts = state.services.schedules.bulk_create_shifts(&data).await?;
    Ok((StatusCode::CREATED, Json(shifts)))
}

/// Update several shifts, reporting each outcome
#[utoipa::path(
    put,
    path = "/schedules/shifts/bulk",
    tag = "schedules",
    request_body = BulkUpdateShifts,
    responses(
        (status = 200, description = "Per-shift results", body = Vec<BulkUpdateResult>)
    )
)]
pub async fn bulk_update_shifts(
    State(state): State<crate::AppState>,
    Json(data): Json<BulkUpdateShifts>,
) -> AppResult<Json<Vec<BulkUpdateResult>>> {
    let results = state.services.schedules.bulk_update_shifts(&data).await?;
    Ok(Json(results))
}

/// Delete several shifts (all or nothing)
#[utoipa::path(
    post,
    path = "/schedules/shifts/bulk-delete",
    tag = "schedules",
    request_body = BulkDeleteShifts,
    responses(
        (status = 200, description = "Number of shifts deleted", body = ShiftCountResponse),
        (status = 404, description = "A shift was not found")
    )
)]
pub async fn bulk_delete_shifts(
    State(state): State<crate::AppState>,
    Json(data): Json<BulkDeleteShifts>,
) -> AppResult<Json<ShiftCountResponse>> {
    let count = state.services.schedules.bulk_delete_shifts(&data).await?;
    Ok(Json(ShiftCountResponse { count }))
}

// ---- Generation ----

/// Generate shifts from weekly templates
#[utoipa::path(
    post,
    path = "/schedules/generate",
    tag = "schedules",
    request_body = GenerateSchedule,
    responses(
        (status = 201, description = "Number of shifts created", body = ShiftCountResponse),
        (status = 404, description = "Staff or template not found")
    )
)]
pub async fn generate_schedule(
    State(state): State<crate::AppState>,
    Json(data): Json<GenerateSchedule>,
) -> AppResult<(StatusCode, Json<ShiftCountResponse>)> {
    let count = state.services.schedules.generate_schedule(&data).await?;
    Ok((StatusCode::CREATED, Json(ShiftCountResponse { count })))
}

/// Copy a range of shifts to another start date
#[utoipa::path(
    post,
    path = "/schedules/copy",
    tag = "schedules",
    request_body = CopySchedule,
    responses(
        (status = 201, description = "Number of shifts copied", body = ShiftCountResponse)
    )
)]
pub async fn copy_schedule(
    State(state): State<crate::AppState>,
    Json(data): Json<CopySchedule>,
) -> AppResult<(StatusCode, Json<ShiftCountResponse>)> {
    let count = state.services.schedules.copy_schedule(&data).await?;
    Ok((StatusCode::CREATED, Json(ShiftCountResponse { count })))
}

// ---- Quick actions ----

/// Enable every shift of a staff member on a date
#[utoipa::path(
    post,
    path = "/staff/{staff_id}/enable",
    tag = "schedules",
    params(("staff_id" = Uuid, Path, description = "Staff ID")),
    request_body = QuickStaffAction,
    responses(
        (status = 200, description = "Number of shifts changed", body = ShiftCountResponse)
    )
)]
pub async fn quick_enable_staff(
    State(state): State<crate::AppState>,
    Path(staff_id): Path<Uuid>,
    Json(data): Json<QuickStaffAction>,
) -> AppResult<Json<ShiftCountResponse>> {
    let count = state
        .services
        .schedules
        .quick_set_availability(staff_id, &data, true)
        .await?;
    Ok(Json(ShiftCountResponse { count }))
}

/// Disable every shift of a staff member on a date
#[utoipa::path(
    post,
    path = "/staff/{staff_id}/disable",
    tag = "schedules",
    params(("staff_id" = Uuid, Path, description = "Staff ID")),
    request_body = QuickStaffAction,
    responses(
        (status = 200, description = "Number of shifts changed", body = ShiftCountResponse)
    )
)]
pub async fn quick_disable_staff(
    State(state): State<crate::AppState>,
    Path(staff_id): Path<Uuid>,
    Json(data): Json<QuickStaffAction>,
) -> AppResult<Json<ShiftCountResponse>> {
    let count = state
        .services
        .schedules
        .quick_set_availability(staff_id, &data, false)
        .await?;
    Ok(Json(ShiftCountResponse { count }))
}
