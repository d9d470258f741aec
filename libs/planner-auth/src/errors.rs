use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication required: missing or invalid session")]
    Unauthenticated,

    #[error("Forbidden: insufficient permissions")]
    Forbidden,

    #[error("Invalid auth configuration: {0}")]
    InvalidConfig(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Stable machine-readable code used in JSON error bodies.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::Unauthenticated => "UNAUTHORIZED",
            AuthError::Forbidden => "FORBIDDEN",
            AuthError::InvalidConfig(_) | AuthError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

#[cfg(feature = "axum-ext")]
impl axum::response::IntoResponse for AuthError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::{StatusCode, header};
        use axum::response::Json;
        use serde_json::json;

        let (status, message) = match &self {
            AuthError::Unauthenticated => (StatusCode::UNAUTHORIZED, self.to_string()),
            AuthError::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
            AuthError::InvalidConfig(_) | AuthError::Internal(_) => {
                tracing::error!(error = %self, "auth failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_owned(),
                )
            }
        };

        let body = Json(json!({
            "ok": false,
            "error": self.code(),
            "message": message,
        }));

        (status, [(header::CACHE_CONTROL, "no-store")], body).into_response()
    }
}
