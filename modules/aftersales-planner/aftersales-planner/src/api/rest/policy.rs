//! Who may call what. The first matching rule wins.

use axum::http::Method;
use planner_auth::{AuthRequirement, Role, RouteRule, StaticRoutePolicy};

/// Paths reachable without a session.
pub const PUBLIC_PATHS: [&str; 6] = [
    "/health",
    "/login",
    "/api/auth/login",
    "/api/auth/logout",
    "/api/auth/register",
    "/api/auth/status",
];

#[must_use]
pub fn route_policy() -> StaticRoutePolicy {
    let master = AuthRequirement::Role(Role::Master);
    StaticRoutePolicy::new(
        vec![
            RouteRule::exact(PUBLIC_PATHS, AuthRequirement::Public),
            RouteRule::exact(["/api/settings"], AuthRequirement::Public).methods([Method::GET]),
            RouteRule::subtree(["/settings", "/api/settings"], master),
            RouteRule::subtree(["/api/employees", "/api/day-entries"], master).methods([
                Method::POST,
                Method::PATCH,
                Method::PUT,
                Method::DELETE,
            ]),
        ],
        AuthRequirement::Authenticated,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(method: Method, path: &str) -> AuthRequirement {
        route_policy().resolve_sync(&method, path)
    }

    #[test]
    fn auth_endpoints_and_health_are_public() {
        for path in PUBLIC_PATHS {
            assert_eq!(resolve(Method::POST, path), AuthRequirement::Public, "{path}");
        }
    }

    #[test]
    fn settings_read_is_public_but_write_needs_master() {
        assert_eq!(resolve(Method::GET, "/api/settings"), AuthRequirement::Public);
        assert_eq!(
            resolve(Method::PUT, "/api/settings"),
            AuthRequirement::Role(Role::Master)
        );
        assert_eq!(
            resolve(Method::GET, "/settings/opening"),
            AuthRequirement::Role(Role::Master)
        );
    }

    #[test]
    fn mutations_need_master_reads_need_a_session() {
        assert_eq!(
            resolve(Method::DELETE, "/api/day-entries"),
            AuthRequirement::Role(Role::Master)
        );
        assert_eq!(
            resolve(Method::PATCH, "/api/employees/"),
            AuthRequirement::Role(Role::Master)
        );
        assert_eq!(
            resolve(Method::GET, "/api/day-entries/remaining"),
            AuthRequirement::Authenticated
        );
        assert_eq!(resolve(Method::GET, "/api/capacity"), AuthRequirement::Authenticated);
        assert_eq!(resolve(Method::GET, "/"), AuthRequirement::Authenticated);
    }
}
