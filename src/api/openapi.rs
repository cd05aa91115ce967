//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    api::{availability, bookings, conflicts, health, schedules, time_off},
    error::ErrorResponse,
    models::{
        availability_log::StaffAvailabilityLog,
        booking::{Booking, CreateBooking, Slot},
        conflict::{DetectConflicts, ResolveConflict, ScheduleConflict},
        directory::{BusinessWorkingHours, Client, Service, Staff},
        enums::{
            AvailabilityAction, ConflictSeverity, ConflictStatus, ConflictType, HalfDayType,
            ShiftType, TimeOffStatus, TimeOffType,
        },
        schedule::{
            BulkCreateShifts, BulkDeleteShifts, BulkShiftUpdate, BulkUpdateResult,
            BulkUpdateShifts, BusinessScheduleStats, CopySchedule, CreateShift, CreateTemplate,
            DaySchedule, DayTemplate, GenerateSchedule, QuickStaffAction, ScheduleTemplate,
            ShiftCountResponse, ShiftTemplate, StaffAvailability, StaffScheduleStats, StaffShift,
            StaffWeeklySchedule, UpdateShift, UpdateShiftAvailability, UpdateTemplate,
            WeeklyScheduleView,
        },
        time_off::{CreateTimeOff, TimeOffRequest, UpdateTimeOff},
    },
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Slotkeeper API",
        version = "1.0.0",
        description = "Appointment booking and staff scheduling REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Bookings
        bookings::create_booking,
        bookings::list_bookings,
        bookings::get_booking,
        bookings::cancel_booking,
        bookings::available_slots,
        // Templates
        schedules::create_template,
        schedules::get_template,
        schedules::list_templates,
        schedules::update_template,
        schedules::delete_template,
        schedules::set_default_template,
        // Shifts
        schedules::create_shift,
        schedules::get_shift,
        schedules::list_shifts,
        schedules::update_shift,
        schedules::update_shift_availability,
        schedules::delete_shift,
        schedules::bulk_create_shifts,
        schedules::bulk_update_shifts,
        schedules::bulk_delete_shifts,
        schedules::generate_schedule,
        schedules::copy_schedule,
        schedules::quick_enable_staff,
        schedules::quick_disable_staff,
        // Availability & views
        availability::check_staff_availability,
        availability::available_staff,
        availability::availability_logs,
        availability::staff_day_schedule,
        availability::staff_weekly_schedule,
        availability::business_weekly_view,
        availability::staff_stats,
        availability::business_stats,
        // Conflicts
        conflicts::detect_conflicts,
        conflicts::list_conflicts,
        conflicts::resolve_conflict,
        // Time off
        time_off::create_time_off,
        time_off::get_time_off,
        time_off::update_time_off,
        time_off::delete_time_off,
        time_off::list_staff_time_off,
        time_off::list_business_time_off,
    ),
    components(
        schemas(
            health::HealthResponse,
            ErrorResponse,
            // Directory
            Staff,
            Service,
            Client,
            BusinessWorkingHours,
            // Bookings
            Booking,
            CreateBooking,
            Slot,
            // Templates
            ScheduleTemplate,
            CreateTemplate,
            UpdateTemplate,
            DayTemplate,
            ShiftTemplate,
            // Shifts
            StaffShift,
            CreateShift,
            UpdateShift,
            UpdateShiftAvailability,
            BulkCreateShifts,
            BulkShiftUpdate,
            BulkUpdateShifts,
            BulkUpdateResult,
            BulkDeleteShifts,
            GenerateSchedule,
            CopySchedule,
            QuickStaffAction,
            ShiftCountResponse,
            // Availability & views
            StaffAvailability,
            StaffAvailabilityLog,
            DaySchedule,
            StaffWeeklySchedule,
            WeeklyScheduleView,
            StaffScheduleStats,
            BusinessScheduleStats,
            // Conflicts
            ScheduleConflict,
            DetectConflicts,
            ResolveConflict,
            // Time off
            TimeOffRequest,
            CreateTimeOff,
            UpdateTimeOff,
            // Enums
            ShiftType,
            TimeOffType,
            TimeOffStatus,
            HalfDayType,
            ConflictType,
            ConflictSeverity,
            ConflictStatus,
            AvailabilityAction,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "bookings", description = "Appointments and free slots"),
        (name = "schedules", description = "Templates, shifts and schedule generation"),
        (name = "availability", description = "Staff availability and schedule views"),
        (name = "stats", description = "Schedule statistics"),
        (name = "conflicts", description = "Schedule conflict detection"),
        (name = "time-off", description = "Time-off requests")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
