#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use aftersales_planner::domain::service::{
    AccountService, CapacityService, DayEntryService, EmployeeService, SettingsService,
};
use aftersales_planner::infra::storage::{
    SeaOrmDayEntryRepository, SeaOrmEmployeeRepository, SeaOrmSettingsRepository,
    SeaOrmUserRepository,
};
use aftersales_planner::{AftersalesPlanner, AuthSettings, PlannerConfig};
use planner_auth::{PasswordHasher, SessionCookie, SessionManager};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use secrecy::SecretString;

pub const SECRET: &str = "test-secret-for-the-planner-0123456789";

/// Fresh in-memory database with the schema applied.
///
/// One pooled connection: every connection to `sqlite::memory:` would get its
/// own empty database.
pub async fn memory_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opts).await.expect("connect sqlite");
    AftersalesPlanner::migrate(&db).await.expect("migrate");
    db
}

/// File-backed database with a real pool, for tests that need concurrent
/// connections. Keep `dir` alive for the duration of the test.
pub async fn file_db(dir: &tempfile::TempDir, max_connections: u32) -> DatabaseConnection {
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("planner.db").display());
    let mut opts = ConnectOptions::new(url);
    opts.max_connections(max_connections).sqlx_logging(false);
    let db = Database::connect(opts).await.expect("connect sqlite file");
    AftersalesPlanner::migrate(&db).await.expect("migrate");
    db
}

pub fn sessions() -> Arc<SessionManager> {
    Arc::new(
        SessionManager::new(&SecretString::from(SECRET), Duration::from_secs(3600)).unwrap(),
    )
}

/// Low iteration count keeps the tests fast.
pub fn hasher() -> PasswordHasher {
    PasswordHasher::new(1_000)
}

pub fn auth_settings() -> AuthSettings {
    AuthSettings {
        sessions: sessions(),
        cookie: SessionCookie::new(SessionCookie::DEFAULT_NAME, false, Duration::from_secs(3600)),
        hasher: hasher(),
        login_path: "/login".to_owned(),
    }
}

pub struct Services {
    pub employees: Arc<EmployeeService>,
    pub entries: Arc<DayEntryService>,
    pub capacity: CapacityService,
    pub settings: SettingsService,
    pub accounts: AccountService,
}

pub fn services(db: &DatabaseConnection, config: PlannerConfig) -> Services {
    let employees = Arc::new(SeaOrmEmployeeRepository::new(db.clone()));
    let entries = Arc::new(SeaOrmDayEntryRepository::new(db.clone()));
    Services {
        employees: Arc::new(EmployeeService::new(employees.clone())),
        entries: Arc::new(DayEntryService::new(
            entries,
            employees.clone(),
            config.clone(),
        )),
        capacity: CapacityService::new(employees, config),
        settings: SettingsService::new(Arc::new(SeaOrmSettingsRepository::new(db.clone()))),
        accounts: AccountService::new(
            Arc::new(SeaOrmUserRepository::new(db.clone())),
            hasher(),
            sessions(),
        ),
    }
}
