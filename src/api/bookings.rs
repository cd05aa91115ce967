//! Booking and slot availability endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::booking::{AvailabilityQuery, Booking, BookingQuery, CreateBooking, Slot},
};

/// Book an appointment
#[utoipa::path(
    post,
    path = "/businesses/{business_id}/bookings",
    tag = "bookings",
    params(("business_id" = Uuid, Path, description = "Business ID")),
    request_body = CreateBooking,
    responses(
        (status = 201, description = "Booking created", body = Booking),
        (status = 403, description = "Service or staff belongs to another business"),
        (status = 404, description = "Service or staff not found"),
        (status = 409, description = "Time slot is not available")
    )
)]
pub async fn create_booking(
    State(state): State<crate::AppState>,
    Path(business_id): Path<Uuid>,
    Json(data): Json<CreateBooking>,
) -> AppResult<(StatusCode, Json<Booking>)> {
    let booking = state.services.bookings.create_booking(business_id, &data).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// List bookings of a business
#[utoipa::path(
    get,
    path = "/businesses/{business_id}/bookings",
    tag = "bookings",
    params(("business_id" = Uuid, Path, description = "Business ID"), BookingQuery),
    responses(
        (status = 200, description = "Bookings ordered by start", body = Vec<Booking>)
    )
)]
pub async fn list_bookings(
    State(state): State<crate::AppState>,
    Path(business_id): Path<Uuid>,
    Query(query): Query<BookingQuery>,
) -> AppResult<Json<Vec<Booking>>> {
    let bookings = state.services.bookings.list_bookings(business_id, &query).await?;
    Ok(Json(bookings))
}

/// Get a booking
#[utoipa::path(
    get,
    path = "/businesses/{business_id}/bookings/{id}",
    tag = "bookings",
    params(
        ("business_id" = Uuid, Path, description = "Business ID"),
        ("id" = Uuid, Path, description = "Booking ID")
    ),
    responses(
        (status = 200, description = "Booking", body = Booking),
        (status = 404, description = "Booking not found")
    )
)]
pub async fn get_booking(
    State(state): State<crate::AppState>,
    Path((business_id, id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<Booking>> {
    let booking = state.services.bookings.get_booking(business_id, id).await?;
    Ok(Json(booking))
}

/// Cancel a booking
#[utoipa::path(
    delete,
    path = "/businesses/{business_id}/bookings/{id}",
    tag = "bookings",
    params(
        ("business_id" = Uuid, Path, description = "Business ID"),
        ("id" = Uuid, Path, description = "Booking ID")
    ),
    responses(
        (status = 204, description = "Booking cancelled"),
        (status = 404, description = "Booking not found")
    )
)]
pub async fn cancel_booking(
    State(state): State<crate::AppState>,
    Path((business_id, id)): Path<(Uuid, Uuid)>,
) -> AppResult<StatusCode> {
    state.services.bookings.cancel_booking(business_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Free appointment slots of a day
#[utoipa::path(
    get,
    path = "/businesses/{business_id}/slots",
    tag = "bookings",
    params(("business_id" = Uuid, Path, description = "Business ID"), AvailabilityQuery),
    responses(
        (status = 200, description = "Slots sorted by staff then start", body = Vec<Slot>)
    )
)]
pub async fn available_slots(
    State(state): State<crate::AppState>,
    Path(business_id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> AppResult<Json<Vec<Slot>>> {
    let slots = state.services.bookings.available_slots(business_id, &query).await?;
    Ok(Json(slots))
}
