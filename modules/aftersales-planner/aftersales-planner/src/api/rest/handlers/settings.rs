use std::sync::Arc;

use axum::extract::Extension;
use axum::response::IntoResponse;
use serde_json::Value;

use crate::api::rest::dto::{PutSettingsRequest, SettingsDto};
use crate::api::rest::error::ApiResult;
use crate::api::rest::extract::JsonOrForm;
use crate::domain::service::SettingsService;

use super::ok_with;

pub async fn get_settings(
    Extension(svc): Extension<Arc<SettingsService>>,
) -> ApiResult<impl IntoResponse> {
    let settings = svc.get().await?;
    ok_with("settings", SettingsDto::from(settings))
}

pub async fn put_settings(
    Extension(svc): Extension<Arc<SettingsService>>,
    JsonOrForm(req): JsonOrForm<PutSettingsRequest>,
) -> ApiResult<impl IntoResponse> {
    let timezone = req.timezone.unwrap_or_default();
    let opening = req.opening.unwrap_or(Value::Null);
    let settings = svc.put(&timezone, &opening).await?;
    ok_with("settings", SettingsDto::from(settings))
}
