//! Shared domain enums, stored as lowercase text slugs

use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, Postgres};
use utoipa::ToSchema;

/// Declares a slug enum with `as_str`, `FromStr`, `Display` and a
/// Postgres TEXT mapping.
macro_rules! slug_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $slug:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $slug),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($slug => Ok($name::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($name), s)),
                }
            }
        }

        impl sqlx::Type<Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<Postgres>>::compatible(ty)
            }
        }

        impl<'r> Decode<'r, Postgres> for $name {
            fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
                let s: &str = Decode::<Postgres>::decode(value)?;
                s.parse().map_err(|e: String| e.into())
            }
        }

        impl Encode<'_, Postgres> for $name {
            fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
                <&str as Encode<Postgres>>::encode(self.as_str(), buf)
            }
        }
    };
}

slug_enum! {
    /// Kind of shift
    ShiftType {
        Regular => "regular",
        Overtime => "overtime",
        Holiday => "holiday",
        Emergency => "emergency",
    }
}

impl Default for ShiftType {
    fn default() -> Self {
        ShiftType::Regular
    }
}

slug_enum! {
    /// Reason for a time-off request
    TimeOffType {
        Vacation => "vacation",
        SickLeave => "sick_leave",
        PersonalDay => "personal_day",
        Emergency => "emergency",
    }
}

slug_enum! {
    /// Lifecycle of a time-off request
    TimeOffStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
        Cancelled => "cancelled",
    }
}

slug_enum! {
    /// Which half of the day a half-day time off covers
    HalfDayType {
        Morning => "morning",
        Afternoon => "afternoon",
    }
}

slug_enum! {
    ConflictType {
        TimeOverlap => "time_overlap",
        DoubleBooking => "double_booking",
        TimeOffConflict => "time_off_conflict",
    }
}

slug_enum! {
    ConflictSeverity {
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
}

slug_enum! {
    ConflictStatus {
        Open => "open",
        Resolved => "resolved",
        Ignored => "ignored",
    }
}

slug_enum! {
    /// Entry kind in the staff availability audit trail
    AvailabilityAction {
        Enabled => "enabled",
        Disabled => "disabled",
        ShiftCreated => "shift_created",
        ShiftModified => "shift_modified",
        ShiftDeleted => "shift_deleted",
    }
}
