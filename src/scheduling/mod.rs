//! Scheduling core: intervals, shift validation, conflict checks,
//! slot generation and template expansion.
//!
//! Everything here is pure; storage and orchestration live in
//! `repository` and `services`.

pub mod conflicts;
pub mod expansion;
pub mod interval;
pub mod slots;
pub mod validation;

pub use conflicts::{ensure_booking_free, ensure_shift_free, OccupiedDatePolicy};
pub use interval::TimeRange;
pub use slots::{SlotSettings, WindowSource};
pub use validation::ShiftWindow;
