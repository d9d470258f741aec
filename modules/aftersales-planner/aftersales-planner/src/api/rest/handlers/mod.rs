//! HTTP handlers. Every success body carries `"ok": true` next to its payload.

pub mod auth;
pub mod capacity;
pub mod day_entries;
pub mod employees;
pub mod health;
pub mod settings;

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::{Map, Value, json};

use super::error::ApiError;

use crate::domain::error::DomainError;

/// `{"ok": true, <key>: <value>}`
pub(crate) fn ok_with(key: &str, value: impl serde::Serialize) -> Result<Json<Value>, ApiError> {
    let value =
        serde_json::to_value(value).map_err(|e| DomainError::internal(e.to_string()))?;
    let mut body = Map::new();
    body.insert("ok".to_owned(), Value::Bool(true));
    body.insert(key.to_owned(), value);
    Ok(Json(Value::Object(body)))
}

pub(crate) fn ok() -> Json<Value> {
    Json(json!({ "ok": true }))
}

/// Fallback for unknown paths.
pub async fn not_found() -> impl IntoResponse {
    ApiError::new(StatusCode::NOT_FOUND, "NOT_FOUND", "No such route")
}
