use std::sync::Arc;

use axum::Router;
use axum::extract::Extension;
use axum::http::{HeaderValue, header};
use axum::middleware;
use axum::routing::{get, post};
use planner_auth::SessionCookie;
use planner_auth::axum_ext::{AccessGuardState, access_guard};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::rest::handlers::{
    auth, capacity, day_entries, employees, health, not_found, settings,
};
use crate::domain::service::{
    AccountService, CapacityService, DayEntryService, EmployeeService, SettingsService,
};

/// Everything the handlers pull out of request extensions.
#[derive(Clone)]
pub struct RestServices {
    pub employees: Arc<EmployeeService>,
    pub day_entries: Arc<DayEntryService>,
    pub capacity: Arc<CapacityService>,
    pub settings: Arc<SettingsService>,
    pub accounts: Arc<AccountService>,
    pub cookie: Arc<SessionCookie>,
}

/// `/api/*` and `/health`, guarded by the access guard.
pub fn register_routes(services: RestServices, guard: AccessGuardState) -> Router {
    let api = Router::new()
        .route(
            "/api/employees",
            get(employees::list_employees)
                .post(employees::create_employee)
                .patch(employees::update_employee)
                .delete(employees::delete_employee),
        )
        .route(
            "/api/day-entries",
            get(day_entries::list_entries)
                .post(day_entries::create_entry)
                .patch(day_entries::update_entry)
                .delete(day_entries::delete_entry),
        )
        .route("/api/day-entries/remaining", get(day_entries::remaining))
        .route("/api/availability", get(day_entries::availability))
        .route("/api/capacity", get(capacity::capacity_days))
        .route(
            "/api/settings",
            get(settings::get_settings).put(settings::put_settings),
        )
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/status", get(auth::status))
        .route("/api/auth/session", get(auth::session))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ));

    Router::new()
        .route("/health", get(health::health))
        .merge(api)
        .fallback(not_found)
        .layer(Extension(services.employees))
        .layer(Extension(services.day_entries))
        .layer(Extension(services.capacity))
        .layer(Extension(services.settings))
        .layer(Extension(services.accounts))
        .layer(Extension(services.cookie))
        .layer(middleware::from_fn_with_state(guard, access_guard))
}
