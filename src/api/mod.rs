//! API handlers for Slotkeeper REST endpoints

pub mod availability;
pub mod bookings;
pub mod conflicts;
pub mod health;
pub mod openapi;
pub mod schedules;
pub mod time_off;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Bookings
        .route("/businesses/:business_id/bookings", post(bookings::create_booking))
        .route("/businesses/:business_id/bookings", get(bookings::list_bookings))
        .route("/businesses/:business_id/bookings/:id", get(bookings::get_booking))
        .route("/businesses/:business_id/bookings/:id", delete(bookings::cancel_booking))
        .route("/businesses/:business_id/slots", get(bookings::available_slots))
        // Business-wide views
        .route("/businesses/:business_id/available-staff", get(availability::available_staff))
        .route("/businesses/:business_id/schedule/week", get(availability::business_weekly_view))
        .route("/businesses/:business_id/stats", get(availability::business_stats))
        .route("/businesses/:business_id/time-off", get(time_off::list_business_time_off))
        .route("/businesses/:business_id/conflicts", get(conflicts::list_conflicts))
        .route("/businesses/:business_id/conflicts/detect", post(conflicts::detect_conflicts))
        // Templates
        .route("/schedules/templates", post(schedules::create_template))
        .route("/schedules/templates/:id", get(schedules::get_template))
        .route("/schedules/templates/:id", put(schedules::update_template))
        .route("/schedules/templates/:id", delete(schedules::delete_template))
        .route("/schedules/templates/:id/default", post(schedules::set_default_template))
        // Shifts
        .route("/schedules/shifts", post(schedules::create_shift))
        .route("/schedules/shifts/bulk", post(schedules::bulk_create_shifts))
        .route("/schedules/shifts/bulk", put(schedules::bulk_update_shifts))
        .route("/schedules/shifts/bulk-delete", post(schedules::bulk_delete_shifts))
        .route("/schedules/shifts/:id", get(schedules::get_shift))
        .route("/schedules/shifts/:id", put(schedules::update_shift))
        .route("/schedules/shifts/:id", delete(schedules::delete_shift))
        .route("/schedules/shifts/:id/availability", put(schedules::update_shift_availability))
        .route("/schedules/generate", post(schedules::generate_schedule))
        .route("/schedules/copy", post(schedules::copy_schedule))
        // Staff
        .route("/staff/:staff_id/templates", get(schedules::list_templates))
        .route("/staff/:staff_id/shifts", get(schedules::list_shifts))
        .route("/staff/:staff_id/enable", post(schedules::quick_enable_staff))
        .route("/staff/:staff_id/disable", post(schedules::quick_disable_staff))
        .route("/staff/:staff_id/availability", get(availability::check_staff_availability))
        .route("/staff/:staff_id/availability-logs", get(availability::availability_logs))
        .route("/staff/:staff_id/schedule/day", get(availability::staff_day_schedule))
        .route("/staff/:staff_id/schedule/week", get(availability::staff_weekly_schedule))
        .route("/staff/:staff_id/stats", get(availability::staff_stats))
        .route("/staff/:staff_id/time-off", get(time_off::list_staff_time_off))
        // Conflicts
        .route("/conflicts/:id/resolve", put(conflicts::resolve_conflict))
        // Time off
        .route("/time-off", post(time_off::create_time_off))
        .route("/time-off/:id", get(time_off::get_time_off))
        .route("/time-off/:id", put(time_off::update_time_off))
        .route("/time-off/:id", delete(time_off::delete_time_off))
        .with_state(state);

    // OpenAPI documentation
    let openapi = openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
