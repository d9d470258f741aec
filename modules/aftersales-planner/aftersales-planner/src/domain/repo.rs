use async_trait::async_trait;
use time::Date;
use uuid::Uuid;

use aftersales_planner_sdk::{
    Category, DayEntry, DayEntryPatch, Employee, EmployeePatch, NewDayEntry, NewEmployee, Settings,
};

use super::error::DomainError;
use super::models::{BookingOutcome, NewUserAccount, UsedAw, UserAccount};

#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    /// All employees ordered by name.
    async fn list(&self) -> Result<Vec<Employee>, DomainError>;

    async fn insert(&self, new: NewEmployee) -> Result<Employee, DomainError>;

    /// `None` when no employee has this id.
    async fn update(&self, id: Uuid, patch: EmployeePatch) -> Result<Option<Employee>, DomainError>;

    /// Whether a row was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
}

#[async_trait]
pub trait DayEntryRepository: Send + Sync {
    /// Entries with `from <= work_day <= to`, by day then creation order.
    async fn list_between(&self, from: Date, to: Date) -> Result<Vec<DayEntry>, DomainError>;

    /// Sum of `aw` in one bucket.
    async fn used(&self, work_day: Date, category: Category) -> Result<i64, DomainError>;

    /// Non-empty buckets with `from <= work_day <= to`.
    async fn used_between(&self, from: Date, to: Date) -> Result<Vec<UsedAw>, DomainError>;

    /// Check remaining capacity and insert in one atomic step.
    async fn book(&self, new: NewDayEntry) -> Result<BookingOutcome<DayEntry>, DomainError>;

    /// Apply `patch` in one atomic step, re-checking capacity when the patch
    /// touches the bucket or the AW. `None` when the entry does not exist.
    async fn rebook(
        &self,
        id: Uuid,
        patch: DayEntryPatch,
    ) -> Result<Option<BookingOutcome<DayEntry>>, DomainError>;

    /// Whether a row was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
}

#[async_trait]
pub trait SettingsRepository: Send + Sync {
    async fn get(&self) -> Result<Option<Settings>, DomainError>;

    async fn upsert(&self, settings: Settings) -> Result<Settings, DomainError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn count(&self) -> Result<u64, DomainError>;

    /// Lookup by lowercase email.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, DomainError>;

    /// Insert; fails with `EmailTaken` on a duplicate email.
    async fn insert(&self, new: NewUserAccount) -> Result<UserAccount, DomainError>;

    /// Insert only while no account exists, atomically. `None` otherwise.
    async fn insert_first(&self, new: NewUserAccount) -> Result<Option<UserAccount>, DomainError>;
}
