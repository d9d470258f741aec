//! Layered configuration: defaults, then the YAML file, then `PLANNER__*`
//! environment variables, then CLI overrides.

use std::path::Path;
use std::time::Duration;

use aftersales_planner::PlannerConfig;
use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use planner_auth::{PasswordHasher, SessionCookie};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};

pub const ENV_PREFIX: &str = "PLANNER__";

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
    pub planner: PlannerConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind_addr: String,
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8087".to_owned(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
    pub run_migrations: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://aftersales-planner.db?mode=rwc".to_owned(),
            max_connections: 10,
            connect_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }
}

impl DatabaseConfig {
    /// Every connection to an in-memory SQLite URL opens a separate database.
    #[must_use]
    pub fn is_memory(&self) -> bool {
        self.url.starts_with("sqlite::memory:") || self.url.contains("mode=memory")
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// HMAC key for session tokens; required by `run`.
    #[serde(serialize_with = "redact", deserialize_with = "secret")]
    pub secret: Option<SecretString>,
    #[serde(with = "humantime_serde")]
    pub session_ttl: Duration,
    pub cookie_name: String,
    pub secure_cookie: bool,
    pub login_path: String,
    pub pbkdf2_iterations: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: None,
            session_ttl: Duration::from_secs(7 * 24 * 60 * 60),
            cookie_name: SessionCookie::DEFAULT_NAME.to_owned(),
            secure_cookie: false,
            login_path: "/login".to_owned(),
            pbkdf2_iterations: PasswordHasher::DEFAULT_ITERATIONS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence.
    pub filter: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_owned(),
            format: LogFormat::Text,
        }
    }
}

impl AppConfig {
    /// Merge defaults, the optional YAML file and the environment.
    ///
    /// # Errors
    /// Returns an error when the file is missing or a layer fails to parse.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            if !path.is_file() {
                anyhow::bail!("config file does not exist: {}", path.display());
            }
            figment = figment.merge(Yaml::file(path));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("invalid configuration (yaml or environment)")
    }

    pub fn apply_port_override(&mut self, port: u16) {
        let host = self
            .server
            .bind_addr
            .rsplit_once(':')
            .map_or(self.server.bind_addr.as_str(), |(host, _)| host);
        self.server.bind_addr = format!("{host}:{port}");
    }

    /// Checks that the merged configuration can start a server.
    ///
    /// # Errors
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<()> {
        let secret = self
            .auth
            .secret
            .as_ref()
            .context("auth.secret is required (set PLANNER__AUTH__SECRET)")?;
        if secret.expose_secret().len() < planner_auth::session::MIN_SECRET_LEN {
            anyhow::bail!(
                "auth.secret must be at least {} bytes",
                planner_auth::session::MIN_SECRET_LEN
            );
        }
        if self.auth.session_ttl.is_zero() {
            anyhow::bail!("auth.session_ttl must be positive");
        }
        if self.auth.pbkdf2_iterations == 0 {
            anyhow::bail!("auth.pbkdf2_iterations must be positive");
        }
        if !self.auth.login_path.starts_with('/') {
            anyhow::bail!("auth.login_path must start with '/'");
        }
        if self.database.max_connections == 0 {
            anyhow::bail!("database.max_connections must be positive");
        }
        if self.server.request_timeout.is_zero() {
            anyhow::bail!("server.request_timeout must be positive");
        }
        Ok(())
    }

    /// Pretty JSON with the secret redacted.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_redacted_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[allow(clippy::ref_option)]
fn redact<S: Serializer>(secret: &Option<SecretString>, s: S) -> Result<S::Ok, S::Error> {
    match secret {
        Some(_) => s.serialize_str("[REDACTED]"),
        None => s.serialize_none(),
    }
}

fn secret<'de, D: serde::Deserializer<'de>>(d: D) -> Result<Option<SecretString>, D::Error> {
    Ok(Option::<String>::deserialize(d)?.map(SecretString::from))
}

/// `std::time::Duration` as humantime strings such as `30s` or `7d`.
mod humantime_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&humantime::format_duration(*d).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(d)?;
        humantime::parse_duration(&raw)
            .map_err(|_| de::Error::invalid_value(de::Unexpected::Str(&raw), &"a duration"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn load_yaml(yaml: &str) -> Result<AppConfig> {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();
        AppConfig::load(Some(file.path()))
    }

    #[test]
    fn defaults_apply_without_a_file() {
        let cfg = AppConfig::load(None).unwrap();
        assert_eq!(cfg.server.bind_addr, "127.0.0.1:8087");
        assert_eq!(cfg.auth.session_ttl, Duration::from_secs(604_800));
        assert_eq!(cfg.planner, PlannerConfig::default());
        assert!(cfg.validate().is_err(), "secret is required");
    }

    #[test]
    fn yaml_overrides_defaults() {
        let cfg = load_yaml(
            r#"
server:
  request_timeout: "2m"
auth:
  secret: "0123456789abcdef0123456789abcdef"
  session_ttl: "12h"
planner:
  max_range_days: 31
"#,
        )
        .unwrap();
        assert_eq!(cfg.server.request_timeout, Duration::from_secs(120));
        assert_eq!(cfg.auth.session_ttl, Duration::from_secs(43_200));
        assert_eq!(cfg.planner.max_range_days, 31);
        assert_eq!(cfg.planner.max_capacity_days, 31);
        cfg.validate().unwrap();
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(load_yaml("server:\n  bind: \"0.0.0.0:1\"\n").is_err());
    }

    #[test]
    fn short_secret_fails_validation() {
        let cfg = load_yaml("auth:\n  secret: \"too-short\"\n").unwrap();
        let err = cfg.validate().unwrap_err().to_string();
        assert!(err.contains("at least 32 bytes"), "{err}");
    }

    #[test]
    fn dump_redacts_the_secret() {
        let cfg = load_yaml("auth:\n  secret: \"0123456789abcdef0123456789abcdef\"\n").unwrap();
        let dump = cfg.to_redacted_json().unwrap();
        assert!(dump.contains("[REDACTED]"));
        assert!(!dump.contains("0123456789abcdef"));
        assert!(dump.contains("\"session_ttl\": \"7days\""));
    }

    #[test]
    fn port_override_keeps_the_host() {
        let mut cfg = AppConfig::default();
        cfg.apply_port_override(9000);
        assert_eq!(cfg.server.bind_addr, "127.0.0.1:9000");
    }

    #[test]
    fn memory_urls_are_detected() {
        let mut db = DatabaseConfig::default();
        assert!(!db.is_memory());
        db.url = "sqlite::memory:".to_owned();
        assert!(db.is_memory());
    }
}
