use aftersales_planner_sdk::{DayEntry, Employee, OpeningHours, Settings};
use sea_orm::DbErr;

use crate::domain::error::DomainError;
use crate::domain::models::UserAccount;

use super::entity::{day_entry, employee, settings, user};

/// Storage failures surface as `DomainError::Database`.
pub(crate) fn db_err(e: DbErr) -> DomainError {
    DomainError::database(e.to_string())
}

fn corrupt(table: &str, detail: impl std::fmt::Display) -> DomainError {
    DomainError::database(format!("invalid row in {table}: {detail}"))
}

impl TryFrom<employee::Model> for Employee {
    type Error = DomainError;

    fn try_from(m: employee::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: m.id,
            category: m.category.parse().map_err(|e| corrupt("employees", e))?,
            name: m.name,
            performance: m.performance,
        })
    }
}

impl TryFrom<day_entry::Model> for DayEntry {
    type Error = DomainError;

    fn try_from(m: day_entry::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: m.id,
            work_day: m.work_day,
            category: m.category.parse().map_err(|e| corrupt("day_entries", e))?,
            title: m.title,
            work_text: m.work_text,
            drop_off: m.drop_off,
            pick_up: m.pick_up,
            aw: m.aw,
            created_by: m.created_by,
            created_at: m.created_at,
        })
    }
}

impl TryFrom<settings::Model> for Settings {
    type Error = DomainError;

    fn try_from(m: settings::Model) -> Result<Self, Self::Error> {
        let opening: OpeningHours =
            serde_json::from_value(m.opening).map_err(|e| corrupt("settings", e))?;
        Ok(Self {
            timezone: m.timezone,
            opening,
        })
    }
}

impl TryFrom<user::Model> for UserAccount {
    type Error = DomainError;

    fn try_from(m: user::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: m.id,
            role: m.role.parse().map_err(|e| corrupt("users", e))?,
            email: m.email,
            name: m.name,
            password_hash: m.password_hash,
            created_at: m.created_at,
        })
    }
}
