use std::sync::Arc;

use axum::Router;
use planner_auth::axum_ext::AccessGuardState;
use planner_auth::{PasswordHasher, SessionCookie, SessionManager};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::api::rest::policy::route_policy;
use crate::api::rest::routes::{self, RestServices};
use crate::config::PlannerConfig;
use crate::domain::service::{
    AccountService, CapacityService, DayEntryService, EmployeeService, SettingsService,
};
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::{
    SeaOrmDayEntryRepository, SeaOrmEmployeeRepository, SeaOrmSettingsRepository,
    SeaOrmUserRepository,
};

/// Session and credential plumbing handed to the module by the host.
#[derive(Clone)]
pub struct AuthSettings {
    pub sessions: Arc<SessionManager>,
    pub cookie: SessionCookie,
    pub hasher: PasswordHasher,
    /// Page that unauthenticated browser requests are redirected to.
    pub login_path: String,
}

/// The aftersales planner: services wired onto one database connection.
pub struct AftersalesPlanner {
    services: RestServices,
    sessions: Arc<SessionManager>,
    login_path: String,
}

impl AftersalesPlanner {
    pub fn init(
        db: &DatabaseConnection,
        config: PlannerConfig,
        auth: AuthSettings,
    ) -> anyhow::Result<Self> {
        info!("Initializing aftersales planner module");

        if config.default_capacity_days == 0
            || config.default_capacity_days > config.max_capacity_days
        {
            anyhow::bail!(
                "planner.default_capacity_days must be between 1 and max_capacity_days ({})",
                config.max_capacity_days
            );
        }
        if config.max_range_days == 0 {
            anyhow::bail!("planner.max_range_days must be at least 1");
        }

        let employees_repo = Arc::new(SeaOrmEmployeeRepository::new(db.clone()));
        let entries_repo = Arc::new(SeaOrmDayEntryRepository::new(db.clone()));
        let settings_repo = Arc::new(SeaOrmSettingsRepository::new(db.clone()));
        let users_repo = Arc::new(SeaOrmUserRepository::new(db.clone()));

        let services = RestServices {
            employees: Arc::new(EmployeeService::new(employees_repo.clone())),
            day_entries: Arc::new(DayEntryService::new(
                entries_repo,
                employees_repo.clone(),
                config.clone(),
            )),
            capacity: Arc::new(CapacityService::new(employees_repo, config)),
            settings: Arc::new(SettingsService::new(settings_repo)),
            accounts: Arc::new(AccountService::new(
                users_repo,
                auth.hasher,
                auth.sessions.clone(),
            )),
            cookie: Arc::new(auth.cookie),
        };

        info!("Aftersales planner module initialized");
        Ok(Self {
            services,
            sessions: auth.sessions,
            login_path: auth.login_path,
        })
    }

    pub async fn migrate(db: &DatabaseConnection) -> anyhow::Result<()> {
        info!("Running aftersales planner database migrations");
        Migrator::up(db, None).await?;
        info!("Aftersales planner database migrations completed successfully");
        Ok(())
    }

    /// Merge the planner routes, behind the access guard, into `router`.
    pub fn register_rest(&self, router: Router) -> Router {
        info!("Registering aftersales planner REST routes");
        let guard = AccessGuardState::new(
            self.sessions.clone(),
            self.services.cookie.clone(),
            Arc::new(route_policy()),
            self.login_path.as_str(),
        );
        router.merge(routes::register_routes(self.services.clone(), guard))
    }

    #[must_use]
    pub fn accounts(&self) -> Arc<AccountService> {
        self.services.accounts.clone()
    }
}
