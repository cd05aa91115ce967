//! Schedule conflict endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::conflict::{ConflictQuery, DetectConflicts, ResolveConflict, ScheduleConflict},
};

/// Scan a date range and record new conflicts
#[utoipa::path(
    post,
    path = "/businesses/{business_id}/conflicts/detect",
    tag = "conflicts",
    params(("business_id" = Uuid, Path, description = "Business ID")),
    request_body = DetectConflicts,
    responses(
        (status = 200, description = "Newly recorded conflicts", body = Vec<ScheduleConflict>)
    )
)]
pub async fn detect_conflicts(
    State(state): State<crate::AppState>,
    Path(business_id): Path<Uuid>,
    Json(data): Json<DetectConflicts>,
) -> AppResult<Json<Vec<ScheduleConflict>>> {
    let conflicts = state.services.conflicts.detect(business_id, &data).await?;
    Ok(Json(conflicts))
}

/// List conflicts of a business
#[utoipa::path(
    get,
    path = "/businesses/{business_id}/conflicts",
    tag = "conflicts",
    params(("business_id" = Uuid, Path, description = "Business ID"), ConflictQuery),
    responses(
        (status = 200, description = "Conflicts", body = Vec<ScheduleConflict>)
    )
)]
pub async fn list_conflicts(
    State(state): State<crate::AppState>,
    Path(business_id): Path<Uuid>,
    Query(query): Query<ConflictQuery>,
) -> AppResult<Json<Vec<ScheduleConflict>>> {
    let conflicts = state.services.conflicts.list(business_id, &query).await?;
    Ok(Json(conflicts))
}

/// Resolve or ignore an open conflict
#[utoipa::path(
    put,
    path = "/conflicts/{id}/resolve",
    tag = "conflicts",
    params(("id" = Uuid, Path, description = "Conflict ID")),
    request_body = ResolveConflict,
    responses(
        (status = 200, description = "Conflict closed", body = ScheduleConflict),
        (status = 400, description = "Conflict already closed")
    )
)]
pub async fn resolve_conflict(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
    Json(data): Json<ResolveConflict>,
) -> AppResult<Json<ScheduleConflict>> {
    let conflict = state.services.conflicts.resolve(id, &data).await?;
    Ok(Json(conflict))
}
