//! Axum extractors and middleware for auth

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, Method, Uri, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::{
    cookie::SessionCookie,
    errors::AuthError,
    policy::{Decision, RoutePolicy},
    session::{Session, SessionManager},
};

/// Where non-API callers without the required role are sent.
pub const FORBIDDEN_REDIRECT: &str = "/?error=forbidden";

const API_PREFIX: &str = "/api";

/// Extractor for the verified session - fails with 401 when there is none
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Session);

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .map(CurrentSession)
            .ok_or(AuthError::Unauthenticated)
    }
}

/// Extractor for an optional session, for public routes that behave
/// differently when signed in
#[derive(Debug, Clone)]
pub struct MaybeSession(pub Option<Session>);

impl<S> FromRequestParts<S> for MaybeSession
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeSession(parts.extensions.get::<Session>().cloned()))
    }
}

#[derive(Clone)]
pub struct AccessGuardState {
    sessions: Arc<SessionManager>,
    cookie: Arc<SessionCookie>,
    policy: Arc<dyn RoutePolicy>,
    login_path: Arc<str>,
}

impl AccessGuardState {
    pub fn new(
        sessions: Arc<SessionManager>,
        cookie: Arc<SessionCookie>,
        policy: Arc<dyn RoutePolicy>,
        login_path: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            sessions,
            cookie,
            policy,
            login_path: login_path.into(),
        }
    }
}

/// Access guard middleware
///
/// This middleware:
/// 1. Skips CORS preflight requests
/// 2. Resolves the route's requirement using the `RoutePolicy`
/// 3. Verifies the session cookie (or bearer token) if one is sent
/// 4. On success stores the `Session` in request extensions
/// 5. On failure answers API paths with 401/403 JSON and redirects page paths
pub async fn access_guard(
    State(AccessGuardState {
        sessions,
        cookie,
        policy,
        login_path,
    }): State<AccessGuardState>,
    mut request: Request,
    next: Next,
) -> Response {
    if is_preflight_request(request.method(), request.headers()) {
        return next.run(request).await;
    }

    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let requirement = policy.resolve(&method, &path).await;

    let session = cookie
        .token_from(request.headers())
        .and_then(|token| sessions.verify(token));

    match requirement.decide(session.as_ref()) {
        Decision::Allow => {
            if let Some(session) = session {
                request.extensions_mut().insert(session);
            }
            next.run(request).await
        }
        Decision::Unauthenticated => {
            tracing::debug!(%method, %path, "no valid session");
            if is_api_path(&path) {
                AuthError::Unauthenticated.into_response()
            } else {
                login_redirect(&login_path, request.uri()).into_response()
            }
        }
        Decision::Forbidden => {
            tracing::warn!(%method, %path, "role not sufficient for route");
            if is_api_path(&path) {
                AuthError::Forbidden.into_response()
            } else {
                Redirect::to(FORBIDDEN_REDIRECT).into_response()
            }
        }
    }
}

fn is_api_path(path: &str) -> bool {
    path.strip_prefix(API_PREFIX)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

fn login_redirect(login_path: &str, original: &Uri) -> Redirect {
    let callback = original
        .path_and_query()
        .map_or_else(|| original.path(), |pq| pq.as_str());
    match serde_urlencoded::to_string([("callbackUrl", callback)]) {
        Ok(query) => Redirect::to(&format!("{login_path}?{query}")),
        Err(_) => Redirect::to(login_path),
    }
}

/// Check if this is a CORS preflight request
///
/// Preflight requests are OPTIONS requests with:
/// - Origin header present
/// - Access-Control-Request-Method header present
fn is_preflight_request(method: &Method, headers: &HeaderMap) -> bool {
    method == Method::OPTIONS
        && headers.contains_key(axum::http::header::ORIGIN)
        && headers.contains_key(axum::http::header::ACCESS_CONTROL_REQUEST_METHOD)
}
