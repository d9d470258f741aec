//! Write serialization for capacity-checked transactions.
//!
//! PostgreSQL takes transaction-scoped advisory locks keyed by the bucket, so
//! bookings for different buckets proceed in parallel. SQLite has a single
//! writer anyway; the transaction claims it with its first statement so that
//! the capacity read already happens under the write lock.

use aftersales_planner_sdk::Category;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbBackend, DbErr, Statement,
    TransactionTrait,
};
use time::Date;

const LOCK_NAMESPACE: i32 = 0x4157;
const ACCOUNTS_KEY: i32 = -1;

/// Begin a transaction that may write after the capacity check.
pub(crate) async fn begin_write(db: &DatabaseConnection) -> Result<DatabaseTransaction, DbErr> {
    let txn = db.begin().await?;
    match txn.get_database_backend() {
        DbBackend::Sqlite => {
            txn.execute_unprepared("UPDATE day_entries SET aw = aw WHERE 0 = 1")
                .await?;
        }
        DbBackend::Postgres => {}
        DbBackend::MySql => {
            return Err(DbErr::Custom("MySQL is not supported".to_owned()));
        }
    }
    Ok(txn)
}

/// Serialize writers of one (day, category) bucket until the transaction ends.
pub(crate) async fn lock_bucket(
    txn: &DatabaseTransaction,
    work_day: Date,
    category: Category,
) -> Result<(), DbErr> {
    let key = work_day
        .to_julian_day()
        .saturating_mul(4)
        .saturating_add(category.index());
    advisory_lock(txn, key).await
}

/// Serialize account creation until the transaction ends.
pub(crate) async fn lock_accounts(txn: &DatabaseTransaction) -> Result<(), DbErr> {
    advisory_lock(txn, ACCOUNTS_KEY).await
}

async fn advisory_lock(txn: &DatabaseTransaction, key: i32) -> Result<(), DbErr> {
    if txn.get_database_backend() != DbBackend::Postgres {
        return Ok(());
    }
    txn.execute(Statement::from_sql_and_values(
        DbBackend::Postgres,
        "SELECT pg_advisory_xact_lock($1, $2)",
        [LOCK_NAMESPACE.into(), key.into()],
    ))
    .await?;
    Ok(())
}
