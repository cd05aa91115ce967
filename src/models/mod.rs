//! Data models for Slotkeeper

pub mod availability_log;
pub mod booking;
pub mod conflict;
pub mod directory;
pub mod enums;
pub mod schedule;
pub mod time_off;

// Re-export commonly used types
pub use availability_log::StaffAvailabilityLog;
pub use booking::{Booking, Slot};
pub use conflict::ScheduleConflict;
pub use directory::{BusinessWorkingHours, Client, Service, Staff};
pub use enums::{
    AvailabilityAction, ConflictSeverity, ConflictStatus, ConflictType, HalfDayType, ShiftType,
    TimeOffStatus, TimeOffType,
};
pub use schedule::{DayTemplate, ScheduleTemplate, ShiftTemplate, StaffShift, WeeklyTemplate};
pub use time_off::TimeOffRequest;
