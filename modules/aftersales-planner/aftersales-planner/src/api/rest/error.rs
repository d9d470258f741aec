use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{Value, json};

use planner_auth::AuthError;

use crate::domain::error::{DomainError, FieldIssue};

/// JSON error envelope: `{ok: false, error, message, issues?, details?}`
#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    issues: Vec<FieldIssue>,
    details: Option<Value>,
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize)]
struct Envelope<'a> {
    ok: bool,
    error: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "<[FieldIssue]>::is_empty")]
    issues: &'a [FieldIssue],
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            issues: Vec::new(),
            details: None,
        }
    }

    /// A malformed body or query string.
    pub fn bad_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        DomainError::validation(field, message).into()
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn code(&self) -> &'static str {
        self.code
    }
}

/// Map domain error to the HTTP envelope
impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Validation { issues } => Self {
                issues,
                ..Self::new(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", "Validation failed")
            },
            DomainError::NotFound { .. } => Self::not_found(e.to_string()),
            DomainError::InsufficientCapacity {
                remaining,
                requested,
            } => Self {
                details: Some(json!({ "remaining": remaining, "requested": requested })),
                ..Self::new(StatusCode::BAD_REQUEST, "INSUFFICIENT_CAPACITY", e.to_string())
            },
            DomainError::MissingCredentials => {
                Self::new(StatusCode::BAD_REQUEST, "MISSING_CREDENTIALS", e.to_string())
            }
            DomainError::InvalidCredentials => {
                Self::new(StatusCode::UNAUTHORIZED, "INVALID_LOGIN", e.to_string())
            }
            DomainError::AlreadyInitialized => {
                Self::new(StatusCode::FORBIDDEN, "ALREADY_INITIALIZED", e.to_string())
            }
            DomainError::EmailTaken { .. } => {
                Self::new(StatusCode::CONFLICT, "EMAIL_TAKEN", e.to_string())
            }
            DomainError::Database { .. } | DomainError::Internal { .. } => {
                tracing::error!(error = %e, "request failed");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred",
                )
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Unauthenticated => {
                Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", e.to_string())
            }
            AuthError::Forbidden => Self::new(StatusCode::FORBIDDEN, "FORBIDDEN", e.to_string()),
            AuthError::InvalidConfig(_) | AuthError::Internal(_) => {
                DomainError::internal(e.to_string()).into()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Envelope {
            ok: false,
            error: self.code,
            message: &self.message,
            issues: &self.issues,
            details: self.details.as_ref(),
        };
        let body = Json(body).into_response();
        (self.status, [(header::CACHE_CONTROL, "no-store")], body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(res: Response) -> Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn validation_error_lists_issues() {
        let err: ApiError = DomainError::validation("aw", "must be between 0 and 10000").into();
        let res = err.into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let json = body_json(res).await;
        assert_eq!(json["ok"], false);
        assert_eq!(json["error"], "VALIDATION_FAILED");
        assert_eq!(json["issues"][0]["field"], "aw");
        assert!(json.get("details").is_none());
    }

    #[tokio::test]
    async fn capacity_error_carries_details() {
        let err: ApiError = DomainError::insufficient_capacity(46, 50).into();
        let res = err.into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let json = body_json(res).await;
        assert_eq!(json["error"], "INSUFFICIENT_CAPACITY");
        assert_eq!(json["details"], json!({"remaining": 46, "requested": 50}));
        assert!(json.get("issues").is_none());
    }

    #[tokio::test]
    async fn database_detail_is_not_leaked() {
        let err: ApiError = DomainError::database("connection refused on 10.0.0.5").into();
        let res = err.into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(res.headers()[header::CACHE_CONTROL], "no-store");
        let json = body_json(res).await;
        assert_eq!(json["error"], "INTERNAL_ERROR");
        assert!(!json["message"].as_str().unwrap().contains("10.0.0.5"));
    }

    #[test]
    fn status_codes_follow_taxonomy() {
        let cases = [
            (DomainError::not_found("employee", "x"), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (DomainError::InvalidCredentials, StatusCode::UNAUTHORIZED, "INVALID_LOGIN"),
            (DomainError::MissingCredentials, StatusCode::BAD_REQUEST, "MISSING_CREDENTIALS"),
            (DomainError::AlreadyInitialized, StatusCode::FORBIDDEN, "ALREADY_INITIALIZED"),
            (
                DomainError::EmailTaken { email: "a@b.c".to_owned() },
                StatusCode::CONFLICT,
                "EMAIL_TAKEN",
            ),
        ];
        for (err, status, code) in cases {
            let api: ApiError = err.into();
            assert_eq!(api.status(), status);
            assert_eq!(api.code(), code);
        }
    }
}
