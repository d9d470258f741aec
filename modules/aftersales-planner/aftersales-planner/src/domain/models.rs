//! Internal models that never leave the module.

use planner_auth::Role;
use time::OffsetDateTime;
use uuid::Uuid;

/// A login account; carries the password hash, so it is never serialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
    pub password_hash: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserAccount {
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
    pub password_hash: String,
}

/// Result of an atomic capacity-checked write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingOutcome<T> {
    Booked(T),
    /// Nothing was written.
    Rejected { remaining: i64, requested: i64 },
}

/// Booked AW of one (day, category) bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsedAw {
    pub work_day: time::Date,
    pub category: aftersales_planner_sdk::Category,
    pub used: i64,
}
