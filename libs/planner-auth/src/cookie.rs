//! Session cookie formatting and lookup.

use std::time::Duration;

use http::header::{AUTHORIZATION, COOKIE};
use http::{HeaderMap, HeaderValue};

use crate::errors::AuthError;

/// Shape of the `Set-Cookie` header carrying the session token.
#[derive(Debug, Clone)]
pub struct SessionCookie {
    name: String,
    secure: bool,
    max_age: Duration,
}

impl SessionCookie {
    pub const DEFAULT_NAME: &'static str = "ae.session";

    #[must_use]
    pub fn new(name: impl Into<String>, secure: bool, max_age: Duration) -> Self {
        Self {
            name: name.into(),
            secure,
            max_age,
        }
    }

    /// `Set-Cookie` value that stores `token`.
    ///
    /// # Errors
    /// Returns [`AuthError::Internal`] if the token is not a valid header value.
    pub fn set(&self, token: &str) -> Result<HeaderValue, AuthError> {
        self.render(token, self.max_age.as_secs())
    }

    /// `Set-Cookie` value that makes the browser drop the session.
    ///
    /// # Errors
    /// Returns [`AuthError::Internal`] if the cookie name is not a valid header value.
    pub fn clear(&self) -> Result<HeaderValue, AuthError> {
        self.render("", 0)
    }

    fn render(&self, value: &str, max_age: u64) -> Result<HeaderValue, AuthError> {
        let mut cookie = format!(
            "{}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}",
            self.name
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie)
            .map_err(|e| AuthError::Internal(format!("invalid cookie header: {e}")))
    }

    /// Token sent by the client: the session cookie, else a bearer token.
    #[must_use]
    pub fn token_from<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        find_cookie(headers, &self.name).or_else(|| extract_bearer_token(headers))
    }
}

/// Value of cookie `name` across all `Cookie` headers.
#[must_use]
pub fn find_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|line| line.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.trim_matches('"'))
        .filter(|v| !v.is_empty())
}

/// Extract Bearer token from Authorization header
fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer ").map(str::trim))
        .filter(|t| !t.is_empty())
}
