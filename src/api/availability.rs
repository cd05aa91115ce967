//! Staff availability, schedule views and statistics endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        availability_log::{AvailabilityLogQuery, StaffAvailabilityLog},
        schedule::{
            AvailableStaffQuery, BusinessScheduleStats, CheckAvailabilityQuery, DaySchedule,
            DayViewQuery, StaffAvailability, StaffScheduleStats, StaffWeeklySchedule, StatsQuery,
            WeekViewQuery, WeeklyScheduleView,
        },
    },
};

/// Check whether a staff member is free for a time window
#[utoipa::path(
    get,
    path = "/staff/{staff_id}/availability",
    tag = "availability",
    params(("staff_id" = Uuid, Path, description = "Staff ID"), CheckAvailabilityQuery),
    responses(
        (status = 200, description = "Availability with the blocking reason, if any", body = StaffAvailability)
    )
)]
pub async fn check_staff_availability(
    State(state): State<crate::AppState>,
    Path(staff_id): Path<Uuid>,
    Query(query): Query<CheckAvailabilityQuery>,
) -> AppResult<Json<StaffAvailability>> {
    let availability = state
        .services
        .availability
        .check_staff_availability(staff_id, &query)
        .await?;
    Ok(Json(availability))
}

/// Staff of a business free for a time window
#[utoipa::path(
    get,
    path = "/businesses/{business_id}/available-staff",
    tag = "availability",
    params(("business_id" = Uuid, Path, description = "Business ID"), AvailableStaffQuery),
    responses(
        (status = 200, description = "Available staff", body = Vec<StaffAvailability>)
    )
)]
pub async fn available_staff(
    State(state): State<crate::AppState>,
    Path(business_id): Path<Uuid>,
    Query(query): Query<AvailableStaffQuery>,
) -> AppResult<Json<Vec<StaffAvailability>>> {
    let staff = state.services.availability.available_staff(business_id, &query).await?;
    Ok(Json(staff))
}

/// Availability audit trail of a staff member
#[utoipa::path(
    get,
    path = "/staff/{staff_id}/availability-logs",
    tag = "availability",
    params(("staff_id" = Uuid, Path, description = "Staff ID"), AvailabilityLogQuery),
    responses(
        (status = 200, description = "Log entries, newest first", body = Vec<StaffAvailabilityLog>)
    )
)]
pub async fn availability_logs(
    State(state): State<crate::AppState>,
    Path(staff_id): Path<Uuid>,
    Query(query): Query<AvailabilityLogQuery>,
) -> AppResult<Json<Vec<StaffAvailabilityLog>>> {
    let logs = state.services.availability.availability_logs(staff_id, &query).await?;
    Ok(Json(logs))
}

/// One day of a staff member's schedule
#[utoipa::path(
    get,
    path = "/staff/{staff_id}/schedule/day",
    tag = "availability",
    params(("staff_id" = Uuid, Path, description = "Staff ID"), DayViewQuery),
    responses(
        (status = 200, description = "Day schedule", body = DaySchedule)
    )
)]
pub async fn staff_day_schedule(
    State(state): State<crate::AppState>,
    Path(staff_id): Path<Uuid>,
    Query(query): Query<DayViewQuery>,
) -> AppResult<Json<DaySchedule>> {
    let day = state
        .services
        .availability
        .staff_day_schedule(staff_id, &query.date)
        .await?;
    Ok(Json(day))
}

/// Seven days of a staff member's schedule
#[utoipa::path(
    get,
    path = "/staff/{staff_id}/schedule/week",
    tag = "availability",
    params(("staff_id" = Uuid, Path, description = "Staff ID"), WeekViewQuery),
    responses(
        (status = 200, description = "Weekly schedule", body = StaffWeeklySchedule)
    )
)]
pub async fn staff_weekly_schedule(
    State(state): State<crate::AppState>,
    Path(staff_id): Path<Uuid>,
    Query(query): Query<WeekViewQuery>,
) -> AppResult<Json<StaffWeeklySchedule>> {
    let week = state
        .services
        .availability
        .staff_weekly_schedule(staff_id, &query.week_start)
        .await?;
    Ok(Json(week))
}

/// Seven days of every active staff member of a business
#[utoipa::path(
    get,
    path = "/businesses/{business_id}/schedule/week",
    tag = "availability",
    params(("business_id" = Uuid, Path, description = "Business ID"), WeekViewQuery),
    responses(
        (status = 200, description = "Business weekly view", body = WeeklyScheduleView)
    )
)]
pub async fn business_weekly_view(
    State(state): State<crate::AppState>,
    Path(business_id): Path<Uuid>,
    Query(query): Query<WeekViewQuery>,
) -> AppResult<Json<WeeklyScheduleView>> {
    let view = state
        .services
        .availability
        .business_weekly_view(business_id, &query.week_start)
        .await?;
    Ok(Json(view))
}

/// Schedule statistics of a staff member
#[utoipa::path(
    get,
    path = "/staff/{staff_id}/stats",
    tag = "stats",
    params(("staff_id" = Uuid, Path, description = "Staff ID"), StatsQuery),
    responses(
        (status = 200, description = "Staff statistics", body = StaffScheduleStats)
    )
)]
pub async fn staff_stats(
    State(state): State<crate::AppState>,
    Path(staff_id): Path<Uuid>,
    Query(query): Query<StatsQuery>,
) -> AppResult<Json<StaffScheduleStats>> {
    let stats = state.services.availability.staff_stats(staff_id, &query).await?;
    Ok(Json(stats))
}

/// Schedule statistics of a business
#[utoipa::path(
    get,
    path = "/businesses/{business_id}/stats",
    tag = "stats",
    params(("business_id" = Uuid, Path, description = "Business ID"), StatsQuery),
    responses(
        (status = 200, description = "Business statistics", body = BusinessScheduleStats)
    )
)]
pub async fn business_stats(
    State(state): State<crate::AppState>,
    Path(business_id): Path<Uuid>,
    Query(query): Query<StatsQuery>,
) -> AppResult<Json<BusinessScheduleStats>> {
    let stats = state.services.availability.business_stats(business_id, &query).await?;
    Ok(Json(stats))
}
