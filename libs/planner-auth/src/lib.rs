//! Authentication building blocks for the aftersales planner.
//!
//! - [`password`]: salted password hashes
//! - [`session`]: signed, time-limited session tokens
//! - [`cookie`]: session cookie formatting and lookup
//! - [`policy`]: per-route authentication requirements
//! - `axum_ext`: the access guard middleware and session extractors

pub mod cookie;
pub mod errors;
pub mod password;
pub mod policy;
pub mod session;

#[cfg(feature = "axum-ext")]
pub mod axum_ext;

pub use cookie::SessionCookie;
pub use errors::AuthError;
pub use password::PasswordHasher;
pub use policy::{AuthRequirement, Decision, RoutePolicy, RouteRule, StaticRoutePolicy};
pub use session::{Identity, Role, Session, SessionManager};

#[cfg(feature = "axum-ext")]
pub use axum_ext::{AccessGuardState, CurrentSession, MaybeSession, access_guard};
