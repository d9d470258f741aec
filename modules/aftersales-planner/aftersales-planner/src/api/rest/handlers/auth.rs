use std::sync::Arc;

use axum::Json;
use axum::extract::Extension;
use axum::http::header::SET_COOKIE;
use axum::response::IntoResponse;
use planner_auth::{CurrentSession, SessionCookie};
use serde_json::json;

use crate::api::rest::dto::{AccountDto, LoginRequest, RegisterRequest, SessionDto};
use crate::api::rest::error::ApiResult;
use crate::api::rest::extract::JsonOrForm;
use crate::domain::service::AccountService;

use super::{ok, ok_with};

pub async fn login(
    Extension(svc): Extension<Arc<AccountService>>,
    Extension(cookie): Extension<Arc<SessionCookie>>,
    JsonOrForm(req): JsonOrForm<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let signed_in = svc
        .login(
            req.email.as_deref().unwrap_or_default(),
            req.password.as_deref().unwrap_or_default(),
        )
        .await?;
    let set_cookie = cookie.set(&signed_in.token)?;
    Ok(([(SET_COOKIE, set_cookie)], ok()))
}

pub async fn logout(
    Extension(cookie): Extension<Arc<SessionCookie>>,
) -> ApiResult<impl IntoResponse> {
    Ok(([(SET_COOKIE, cookie.clear()?)], ok()))
}

/// First-run registration of the initial MASTER account.
pub async fn register(
    Extension(svc): Extension<Arc<AccountService>>,
    Extension(cookie): Extension<Arc<SessionCookie>>,
    JsonOrForm(req): JsonOrForm<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let signed_in = svc
        .register(
            req.email.as_deref().unwrap_or_default(),
            req.password.as_deref().unwrap_or_default(),
            req.name,
        )
        .await?;
    let set_cookie = cookie.set(&signed_in.token)?;
    Ok((
        [(SET_COOKIE, set_cookie)],
        ok_with("user", AccountDto::from(signed_in.account))?,
    ))
}

pub async fn status(
    Extension(svc): Extension<Arc<AccountService>>,
) -> ApiResult<impl IntoResponse> {
    let initialized = svc.is_initialized().await?;
    Ok(Json(json!({ "ok": true, "initialized": initialized })))
}

pub async fn session(CurrentSession(session): CurrentSession) -> ApiResult<impl IntoResponse> {
    ok_with("session", SessionDto::from(session))
}
