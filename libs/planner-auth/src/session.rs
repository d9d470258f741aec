//! Signed session tokens (HS256 JWT).
//!
//! Sessions are not stored server-side: the token itself carries the user id,
//! email, role and validity window, and is re-verified on every request.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::errors::AuthError;

/// Shortest accepted signing secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

const LEEWAY_SECS: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "MASTER")]
    Master,
    #[serde(rename = "USER")]
    User,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Master => "MASTER",
            Role::User => "USER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MASTER" => Ok(Role::Master),
            "USER" => Ok(Role::User),
            other => Err(AuthError::Internal(format!("unknown role '{other}'"))),
        }
    }
}

/// Who a session is issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

/// Verified token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
}

impl Session {
    #[must_use]
    pub fn is_master(&self) -> bool {
        self.role == Role::Master
    }
}

/// Issues and verifies session tokens with one shared secret.
#[derive(Clone)]
pub struct SessionManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// # Errors
    /// Returns [`AuthError::InvalidConfig`] when the secret is shorter than
    /// [`MIN_SECRET_LEN`] bytes or the TTL is zero.
    pub fn new(secret: &SecretString, ttl: Duration) -> Result<Self, AuthError> {
        let bytes = secret.expose_secret().as_bytes();
        if bytes.len() < MIN_SECRET_LEN {
            return Err(AuthError::InvalidConfig(format!(
                "session secret must be at least {MIN_SECRET_LEN} bytes"
            )));
        }
        if ttl.is_zero() {
            return Err(AuthError::InvalidConfig(
                "session ttl must be positive".to_owned(),
            ));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = LEEWAY_SECS;
        validation.set_required_spec_claims(&["exp", "iat"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            validation,
            ttl,
        })
    }

    /// Issue a token valid for the configured TTL from now.
    ///
    /// # Errors
    /// Returns [`AuthError::Internal`] if signing fails.
    pub fn issue(&self, identity: &Identity) -> Result<String, AuthError> {
        self.issue_at(identity, OffsetDateTime::now_utc())
    }

    /// Issue a token as if the current time were `now`.
    ///
    /// # Errors
    /// Returns [`AuthError::Internal`] if signing fails.
    pub fn issue_at(&self, identity: &Identity, now: OffsetDateTime) -> Result<String, AuthError> {
        let iat = now.unix_timestamp();
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = Session {
            user_id: identity.user_id,
            email: identity.email.clone(),
            role: identity.role,
            iat,
            exp: iat.saturating_add(ttl),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Internal(format!("failed to sign session: {e}")))
    }

    /// Verify signature and expiry. Every failure yields `None`.
    #[must_use]
    pub fn verify(&self, token: &str) -> Option<Session> {
        match decode::<Session>(token, &self.decoding, &self.validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                tracing::debug!(error = %e, "session token rejected");
                None
            }
        }
    }
}
