//! Route-level authentication requirements.

use http::Method;

use crate::session::{Role, Session};

/// What a route demands from the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRequirement {
    /// No session needed.
    Public,
    /// Any valid session.
    Authenticated,
    /// A valid session with this role.
    Role(Role),
}

/// Outcome of checking a requirement against the caller's session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Unauthenticated,
    Forbidden,
}

impl AuthRequirement {
    #[must_use]
    pub fn decide(self, session: Option<&Session>) -> Decision {
        match (self, session) {
            (AuthRequirement::Public, _) => Decision::Allow,
            (_, None) => Decision::Unauthenticated,
            (AuthRequirement::Authenticated, Some(_)) => Decision::Allow,
            (AuthRequirement::Role(role), Some(s)) if s.role == role => Decision::Allow,
            (AuthRequirement::Role(_), Some(_)) => Decision::Forbidden,
        }
    }
}

/// Route policy that determines authentication requirements for routes
#[async_trait::async_trait]
pub trait RoutePolicy: Send + Sync {
    /// Resolve the authentication requirement for a given method and path
    async fn resolve(&self, method: &Method, path: &str) -> AuthRequirement;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PathMatch {
    Exact(String),
    /// The path itself and everything below it.
    Subtree(String),
}

impl PathMatch {
    fn matches(&self, path: &str) -> bool {
        match self {
            PathMatch::Exact(p) => path == p,
            PathMatch::Subtree(p) => path
                .strip_prefix(p.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/')),
        }
    }
}

/// One row of a [`StaticRoutePolicy`].
#[derive(Debug, Clone)]
pub struct RouteRule {
    methods: Option<Vec<Method>>,
    paths: Vec<PathMatch>,
    requirement: AuthRequirement,
}

impl RouteRule {
    /// Rule for requests to exactly these paths.
    #[must_use]
    pub fn exact<I, P>(paths: I, requirement: AuthRequirement) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Self {
            methods: None,
            paths: paths.into_iter().map(|p| PathMatch::Exact(p.into())).collect(),
            requirement,
        }
    }

    /// Rule for requests to these paths and anything below them.
    #[must_use]
    pub fn subtree<I, P>(paths: I, requirement: AuthRequirement) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Self {
            methods: None,
            paths: paths
                .into_iter()
                .map(|p| PathMatch::Subtree(p.into()))
                .collect(),
            requirement,
        }
    }

    /// Restrict the rule to these methods.
    #[must_use]
    pub fn methods(mut self, methods: impl IntoIterator<Item = Method>) -> Self {
        self.methods = Some(methods.into_iter().collect());
        self
    }

    fn matches(&self, method: &Method, path: &str) -> bool {
        let method_ok = self
            .methods
            .as_ref()
            .is_none_or(|allowed| allowed.contains(method));
        method_ok && self.paths.iter().any(|p| p.matches(path))
    }
}

/// Ordered rule list; the first matching rule wins.
#[derive(Debug, Clone)]
pub struct StaticRoutePolicy {
    rules: Vec<RouteRule>,
    fallback: AuthRequirement,
}

impl StaticRoutePolicy {
    #[must_use]
    pub fn new(rules: Vec<RouteRule>, fallback: AuthRequirement) -> Self {
        Self { rules, fallback }
    }

    #[must_use]
    pub fn resolve_sync(&self, method: &Method, path: &str) -> AuthRequirement {
        let path = normalize(path);
        self.rules
            .iter()
            .find(|r| r.matches(method, path))
            .map_or(self.fallback, |r| r.requirement)
    }
}

#[async_trait::async_trait]
impl RoutePolicy for StaticRoutePolicy {
    async fn resolve(&self, method: &Method, path: &str) -> AuthRequirement {
        self.resolve_sync(method, path)
    }
}

// `/api/employees/` and `/api/employees` are the same route.
fn normalize(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}
