use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use aftersales_planner::{AftersalesPlanner, AuthSettings};
use anyhow::{Context, Result};
use axum::Router;
use axum::body::Body;
use axum::http::{HeaderName, HeaderValue, Request, Response, StatusCode};
use planner_auth::{PasswordHasher, SessionCookie, SessionManager};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::field::Empty;
use uuid::Uuid;

use crate::config::{AppConfig, AuthConfig, DatabaseConfig};
use crate::signals;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request ids are UUIDv7 so they sort by arrival.
#[derive(Clone, Copy, Default)]
struct MakeReqId;

impl MakeRequestId for MakeReqId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::now_v7().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Open the database pool.
///
/// # Errors
/// Returns an error when the database cannot be reached.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection> {
    let mut opts = ConnectOptions::new(config.url.clone());
    opts.connect_timeout(config.connect_timeout)
        .sqlx_logging(false);
    if config.is_memory() {
        opts.max_connections(1).min_connections(1);
    } else {
        opts.max_connections(config.max_connections);
    }
    let db = Database::connect(opts)
        .await
        .context("failed to connect to the database")?;
    tracing::info!("database connected");
    Ok(db)
}

/// Session and password settings for the planner module.
///
/// # Errors
/// Returns an error when the secret is missing or too short.
pub fn auth_settings(config: &AuthConfig) -> Result<AuthSettings> {
    let secret = config
        .secret
        .as_ref()
        .context("auth.secret is required (set PLANNER__AUTH__SECRET)")?;
    let sessions = SessionManager::new(secret, config.session_ttl)?;
    Ok(AuthSettings {
        sessions: Arc::new(sessions),
        cookie: SessionCookie::new(
            config.cookie_name.clone(),
            config.secure_cookie,
            config.session_ttl,
        ),
        hasher: PasswordHasher::new(config.pbkdf2_iterations),
        login_path: config.login_path.clone(),
    })
}

/// Connect, migrate when enabled, and initialize the planner module.
///
/// # Errors
/// Returns an error from any of those steps.
pub async fn bootstrap(config: &AppConfig) -> Result<(DatabaseConnection, AftersalesPlanner)> {
    let db = connect(&config.database).await?;
    if config.database.run_migrations {
        AftersalesPlanner::migrate(&db).await?;
    }
    let planner =
        AftersalesPlanner::init(&db, config.planner.clone(), auth_settings(&config.auth)?)?;
    Ok((db, planner))
}

/// Planner routes wrapped in the host middleware stack.
pub fn build_router(planner: &AftersalesPlanner, request_timeout: Duration) -> Router {
    let router = planner.register_rest(Router::new());
    let x_request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    // Registered innermost first; requests pass SetRequestId first.
    router
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &Request<Body>| {
                    let rid = req
                        .headers()
                        .get(REQUEST_ID_HEADER)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("n/a");
                    tracing::info_span!(
                        "http_request",
                        method = %req.method(),
                        uri = %req.uri().path(),
                        request_id = %rid,
                        status = Empty,
                        latency_ms = Empty,
                    )
                })
                .on_response(|res: &Response<Body>, latency: Duration, span: &tracing::Span| {
                    span.record("status", res.status().as_u16());
                    span.record("latency_ms", latency.as_millis());
                }),
        )
        .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
        .layer(SetRequestIdLayer::new(x_request_id, MakeReqId))
}

/// Serve until Ctrl+C or SIGTERM.
///
/// # Errors
/// Returns an error when startup fails or the listener breaks.
pub async fn run(config: AppConfig) -> Result<()> {
    let (_db, planner) = bootstrap(&config).await?;
    let app = build_router(&planner, config.server.request_timeout);

    let addr: SocketAddr = config
        .server
        .bind_addr
        .parse()
        .with_context(|| format!("invalid server.bind_addr '{}'", config.server.bind_addr))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "aftersales planner listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = signals::wait_for_shutdown().await {
                tracing::error!(error = %e, "signal handling failed");
            }
        })
        .await
        .context("http server failed")?;

    tracing::info!("server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use tower::ServiceExt;

    fn memory_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.database.url = "sqlite::memory:".to_owned();
        config.auth.secret = Some(SecretString::from("0123456789abcdef0123456789abcdef"));
        config.auth.pbkdf2_iterations = 1_000;
        config
    }

    #[tokio::test]
    async fn health_carries_a_request_id() {
        let config = memory_config();
        let (_db, planner) = bootstrap(&config).await.unwrap();
        let app = build_router(&planner, Duration::from_secs(5));

        let res = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let rid = res.headers()[REQUEST_ID_HEADER].to_str().unwrap();
        assert!(Uuid::parse_str(rid).is_ok());
    }

    #[tokio::test]
    async fn incoming_request_id_is_propagated() {
        let config = memory_config();
        let (_db, planner) = bootstrap(&config).await.unwrap();
        let app = build_router(&planner, Duration::from_secs(5));

        let res = app
            .oneshot(
                Request::get("/health")
                    .header(REQUEST_ID_HEADER, "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.headers()[REQUEST_ID_HEADER], "abc-123");
    }

    #[test]
    fn missing_secret_is_reported() {
        let err = auth_settings(&AuthConfig::default()).err().unwrap();
        assert!(err.to_string().contains("auth.secret"));
    }
}
