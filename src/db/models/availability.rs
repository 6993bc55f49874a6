use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::{OffsetDateTime, Time, Weekday};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "day_of_week", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl From<Weekday> for DayOfWeek {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Monday => DayOfWeek::Monday,
            Weekday::Tuesday => DayOfWeek::Tuesday,
            Weekday::Wednesday => DayOfWeek::Wednesday,
            Weekday::Thursday => DayOfWeek::Thursday,
            Weekday::Friday => DayOfWeek::Friday,
            Weekday::Saturday => DayOfWeek::Saturday,
            Weekday::Sunday => DayOfWeek::Sunday,
        }
    }
}

/// Recurring weekly open window of a provider. Windows may overlap; "delete"
/// is a soft deactivation so advisories booked against a window keep their
/// audit trail.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub day_of_week: DayOfWeek,
    pub start_time: Time,
    pub end_time: Time,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewAvailabilityWindow {
    pub day_of_week: DayOfWeek,
    pub start_time: Time,
    pub end_time: Time,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAvailabilityWindow {
    pub day_of_week: DayOfWeek,
    pub start_time: Time,
    pub end_time: Time,
}
