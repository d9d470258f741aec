use async_trait::async_trait;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    SqlErr,
};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use aftersales_planner_sdk::{
    CapacityBucket, Category, DayEntry, DayEntryPatch, Employee, EmployeePatch, NewDayEntry,
    NewEmployee, Settings,
};

use crate::domain::capacity::{Shortfall, aw_for_performance, check_booking};
use crate::domain::error::DomainError;
use crate::domain::models::{BookingOutcome, NewUserAccount, UsedAw, UserAccount};
use crate::domain::repo::{
    DayEntryRepository, EmployeeRepository, SettingsRepository, UserRepository,
};

use super::entity::{day_entry, employee, settings, user};
use super::lock::{begin_write, lock_accounts, lock_bucket};
use super::mapper::db_err;

pub struct SeaOrmEmployeeRepository {
    db: DatabaseConnection,
}

impl SeaOrmEmployeeRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EmployeeRepository for SeaOrmEmployeeRepository {
    async fn list(&self) -> Result<Vec<Employee>, DomainError> {
        employee::Entity::find()
            .order_by_asc(employee::Column::Name)
            .order_by_asc(employee::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(Employee::try_from)
            .collect()
    }

    async fn insert(&self, new: NewEmployee) -> Result<Employee, DomainError> {
        let model = employee::ActiveModel {
            id: ActiveValue::Set(Uuid::now_v7()),
            name: ActiveValue::Set(new.name),
            category: ActiveValue::Set(new.category.as_str().to_owned()),
            performance: ActiveValue::Set(new.performance),
        }
        .insert(&self.db)
        .await
        .map_err(db_err)?;
        model.try_into()
    }

    async fn update(
        &self,
        id: Uuid,
        patch: EmployeePatch,
    ) -> Result<Option<Employee>, DomainError> {
        let Some(existing) = employee::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };
        if patch.is_empty() {
            return existing.try_into().map(Some);
        }

        let mut active: employee::ActiveModel = existing.into();
        if let Some(name) = patch.name {
            active.name = ActiveValue::Set(name);
        }
        if let Some(category) = patch.category {
            active.category = ActiveValue::Set(category.as_str().to_owned());
        }
        if let Some(performance) = patch.performance {
            active.performance = ActiveValue::Set(performance);
        }
        let model = active.update(&self.db).await.map_err(db_err)?;
        model.try_into().map(Some)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let res = employee::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(res.rows_affected > 0)
    }
}

pub struct SeaOrmDayEntryRepository {
    db: DatabaseConnection,
}

impl SeaOrmDayEntryRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Capacity and consumption of a bucket as seen by `conn`, optionally
/// leaving one entry out of the sum.
async fn bucket<C: ConnectionTrait>(
    conn: &C,
    work_day: Date,
    category: Category,
    excluding: Option<Uuid>,
) -> Result<CapacityBucket, DomainError> {
    let performances: Vec<i32> = employee::Entity::find()
        .select_only()
        .column(employee::Column::Performance)
        .filter(employee::Column::Category.eq(category.as_str()))
        .into_tuple()
        .all(conn)
        .await
        .map_err(db_err)?;
    let capacity = performances.into_iter().map(aw_for_performance).sum();

    let mut used = day_entry::Entity::find()
        .select_only()
        .column_as(Expr::col(day_entry::Column::Aw).sum(), "used")
        .filter(day_entry::Column::WorkDay.eq(work_day))
        .filter(day_entry::Column::Category.eq(category.as_str()));
    if let Some(id) = excluding {
        used = used.filter(day_entry::Column::Id.ne(id));
    }
    let used: Option<i64> = used
        .into_tuple::<Option<i64>>()
        .one(conn)
        .await
        .map_err(db_err)?
        .flatten();

    Ok(CapacityBucket::new(capacity, used.unwrap_or(0)))
}

async fn finish<T>(
    txn: DatabaseTransaction,
    outcome: Result<T, Shortfall>,
) -> Result<BookingOutcome<T>, DomainError> {
    match outcome {
        Ok(value) => {
            txn.commit().await.map_err(db_err)?;
            Ok(BookingOutcome::Booked(value))
        }
        Err(Shortfall {
            remaining,
            requested,
        }) => {
            txn.rollback().await.map_err(db_err)?;
            Ok(BookingOutcome::Rejected {
                remaining,
                requested,
            })
        }
    }
}

#[async_trait]
impl DayEntryRepository for SeaOrmDayEntryRepository {
    async fn list_between(&self, from: Date, to: Date) -> Result<Vec<DayEntry>, DomainError> {
        day_entry::Entity::find()
            .filter(day_entry::Column::WorkDay.between(from, to))
            .order_by_asc(day_entry::Column::WorkDay)
            .order_by_asc(day_entry::Column::CreatedAt)
            .order_by_asc(day_entry::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(DayEntry::try_from)
            .collect()
    }

    async fn used(&self, work_day: Date, category: Category) -> Result<i64, DomainError> {
        Ok(bucket(&self.db, work_day, category, None).await?.used)
    }

    async fn used_between(&self, from: Date, to: Date) -> Result<Vec<UsedAw>, DomainError> {
        let rows: Vec<(Date, String, Option<i64>)> = day_entry::Entity::find()
            .select_only()
            .column(day_entry::Column::WorkDay)
            .column(day_entry::Column::Category)
            .column_as(Expr::col(day_entry::Column::Aw).sum(), "used")
            .filter(day_entry::Column::WorkDay.between(from, to))
            .group_by(day_entry::Column::WorkDay)
            .group_by(day_entry::Column::Category)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_err)?;

        rows.into_iter()
            .map(|(work_day, category, used)| {
                Ok(UsedAw {
                    work_day,
                    category: category.parse().map_err(|e| {
                        DomainError::database(format!("invalid row in day_entries: {e}"))
                    })?,
                    used: used.unwrap_or(0),
                })
            })
            .collect()
    }

    async fn book(&self, new: NewDayEntry) -> Result<BookingOutcome<DayEntry>, DomainError> {
        let txn = begin_write(&self.db).await.map_err(db_err)?;
        lock_bucket(&txn, new.work_day, new.category)
            .await
            .map_err(db_err)?;

        let current = bucket(&txn, new.work_day, new.category, None).await?;
        if let Err(shortfall) = check_booking(current, i64::from(new.aw)) {
            return finish::<DayEntry>(txn, Err(shortfall)).await;
        }

        let model = day_entry::ActiveModel {
            id: ActiveValue::Set(Uuid::now_v7()),
            work_day: ActiveValue::Set(new.work_day),
            category: ActiveValue::Set(new.category.as_str().to_owned()),
            title: ActiveValue::Set(new.title),
            work_text: ActiveValue::Set(new.work_text),
            drop_off: ActiveValue::Set(new.drop_off),
            pick_up: ActiveValue::Set(new.pick_up),
            aw: ActiveValue::Set(new.aw),
            created_by: ActiveValue::Set(new.created_by),
            created_at: ActiveValue::Set(OffsetDateTime::now_utc()),
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        finish(txn, Ok(DayEntry::try_from(model)?)).await
    }

    async fn rebook(
        &self,
        id: Uuid,
        patch: DayEntryPatch,
    ) -> Result<Option<BookingOutcome<DayEntry>>, DomainError> {
        let txn = begin_write(&self.db).await.map_err(db_err)?;
        let Some(existing) = day_entry::Entity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(db_err)?
        else {
            txn.rollback().await.map_err(db_err)?;
            return Ok(None);
        };
        let before = DayEntry::try_from(existing)?;
        let touches_capacity = patch.touches_capacity();
        let after = patch.apply(before.clone());

        let moved = after.work_day != before.work_day || after.category != before.category;
        if touches_capacity && (moved || after.aw > before.aw) {
            lock_bucket(&txn, after.work_day, after.category)
                .await
                .map_err(db_err)?;
            let current = bucket(&txn, after.work_day, after.category, Some(id)).await?;
            if let Err(shortfall) = check_booking(current, i64::from(after.aw)) {
                return finish::<DayEntry>(txn, Err(shortfall)).await.map(Some);
            }
        }

        let model = day_entry::ActiveModel {
            id: ActiveValue::Unchanged(id),
            work_day: ActiveValue::Set(after.work_day),
            category: ActiveValue::Set(after.category.as_str().to_owned()),
            title: ActiveValue::Set(after.title),
            work_text: ActiveValue::Set(after.work_text),
            drop_off: ActiveValue::Set(after.drop_off),
            pick_up: ActiveValue::Set(after.pick_up),
            aw: ActiveValue::Set(after.aw),
            created_by: ActiveValue::Unchanged(after.created_by),
            created_at: ActiveValue::Unchanged(after.created_at),
        }
        .update(&txn)
        .await
        .map_err(db_err)?;

        finish(txn, Ok(DayEntry::try_from(model)?)).await.map(Some)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let res = day_entry::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(res.rows_affected > 0)
    }
}

pub struct SeaOrmSettingsRepository {
    db: DatabaseConnection,
}

impl SeaOrmSettingsRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SettingsRepository for SeaOrmSettingsRepository {
    async fn get(&self) -> Result<Option<Settings>, DomainError> {
        settings::Entity::find_by_id(settings::SINGLETON_ID)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(Settings::try_from)
            .transpose()
    }

    async fn upsert(&self, value: Settings) -> Result<Settings, DomainError> {
        let opening = serde_json::to_value(&value.opening)
            .map_err(|e| DomainError::internal(format!("failed to encode opening hours: {e}")))?;
        let active_model = settings::ActiveModel {
            id: ActiveValue::Set(settings::SINGLETON_ID),
            timezone: ActiveValue::Set(value.timezone),
            opening: ActiveValue::Set(opening),
            updated_at: ActiveValue::Set(OffsetDateTime::now_utc()),
        };

        settings::Entity::insert(active_model)
            .on_conflict(
                OnConflict::column(settings::Column::Id)
                    .update_columns([
                        settings::Column::Timezone,
                        settings::Column::Opening,
                        settings::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        self.get()
            .await?
            .ok_or_else(|| DomainError::database("settings row missing after upsert"))
    }
}

pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

async fn insert_user<C: ConnectionTrait>(
    conn: &C,
    new: NewUserAccount,
) -> Result<UserAccount, DomainError> {
    let email = new.email.clone();
    let model = user::ActiveModel {
        id: ActiveValue::Set(Uuid::now_v7()),
        email: ActiveValue::Set(new.email),
        name: ActiveValue::Set(new.name),
        password_hash: ActiveValue::Set(new.password_hash),
        role: ActiveValue::Set(new.role.as_str().to_owned()),
        created_at: ActiveValue::Set(OffsetDateTime::now_utc()),
    }
    .insert(conn)
    .await
    .map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => DomainError::EmailTaken { email },
        _ => db_err(e),
    })?;
    model.try_into()
}

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn count(&self) -> Result<u64, DomainError> {
        user::Entity::find().count(&self.db).await.map_err(db_err)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, DomainError> {
        user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(UserAccount::try_from)
            .transpose()
    }

    async fn insert(&self, new: NewUserAccount) -> Result<UserAccount, DomainError> {
        insert_user(&self.db, new).await
    }

    async fn insert_first(&self, new: NewUserAccount) -> Result<Option<UserAccount>, DomainError> {
        let txn = begin_write(&self.db).await.map_err(db_err)?;
        lock_accounts(&txn).await.map_err(db_err)?;

        if user::Entity::find().count(&txn).await.map_err(db_err)? > 0 {
            txn.rollback().await.map_err(db_err)?;
            return Ok(None);
        }
        let account = insert_user(&txn, new).await?;
        txn.commit().await.map_err(db_err)?;
        Ok(Some(account))
    }
}
