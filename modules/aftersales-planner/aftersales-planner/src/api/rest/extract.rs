//! Request decoders producing the JSON error envelope on failure.
//!
//! Bodies are accepted as JSON or as `application/x-www-form-urlencoded`.
//! Form values are strings. Fields listed in [`STRUCTURED_FORM_FIELDS`] are
//! decoded as embedded JSON when they hold an object or array.

use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::header::CONTENT_TYPE;
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::error::ApiError;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Form fields that carry a JSON document (the settings form's `opening`).
pub const STRUCTURED_FORM_FIELDS: &[&str] = &["opening"];

/// Body extractor accepting JSON or an urlencoded form.
#[derive(Debug, Clone)]
pub struct JsonOrForm<T>(pub T);

impl<S, T> FromRequest<S> for JsonOrForm<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.to_ascii_lowercase().starts_with(FORM_CONTENT_TYPE));

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_input("body", e.body_text()))?;

        let value = if is_form {
            form_to_value(&bytes)?
        } else {
            json_to_value(&bytes)?
        };
        decode(value).map(JsonOrForm)
    }
}

/// Query-string extractor.
#[derive(Debug, Clone)]
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let query = parts.uri.query().unwrap_or_default();
        serde_urlencoded::from_str(query)
            .map(ApiQuery)
            .map_err(|e| ApiError::bad_input("query", e.to_string()))
    }
}

fn json_to_value(bytes: &[u8]) -> Result<Value, ApiError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(bytes).map_err(|e| ApiError::bad_input("body", e.to_string()))
}

fn form_to_value(bytes: &[u8]) -> Result<Value, ApiError> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(bytes)
        .map_err(|e| ApiError::bad_input("body", e.to_string()))?;

    let map = pairs
        .into_iter()
        .map(|(key, raw)| {
            let value = if STRUCTURED_FORM_FIELDS.contains(&key.as_str()) {
                embedded_json(raw)
            } else {
                Value::String(raw)
            };
            (key, value)
        })
        .collect();
    Ok(Value::Object(map))
}

fn embedded_json(raw: String) -> Value {
    match serde_json::from_str::<Value>(&raw) {
        Ok(v @ (Value::Object(_) | Value::Array(_))) => v,
        _ => Value::String(raw),
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::bad_input("body", e.to_string()))
}
