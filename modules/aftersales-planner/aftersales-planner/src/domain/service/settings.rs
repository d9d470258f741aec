use std::sync::Arc;

use aftersales_planner_sdk::Settings;
use serde_json::Value;
use tracing::{debug, info};

use crate::domain::error::{DomainError, Issues};
use crate::domain::fields::{SettingsFields, char_len};
use crate::domain::opening::parse_opening;
use crate::domain::repo::SettingsRepository;

/// Single-row workshop settings
pub struct SettingsService {
    repo: Arc<dyn SettingsRepository>,
}

impl SettingsService {
    pub fn new(repo: Arc<dyn SettingsRepository>) -> Self {
        Self { repo }
    }

    /// The stored row, or the defaults when nothing was saved yet.
    pub async fn get(&self) -> Result<Settings, DomainError> {
        if let Some(settings) = self.repo.get().await? {
            Ok(settings)
        } else {
            debug!("no settings stored, using defaults");
            Ok(Settings::default())
        }
    }

    pub async fn put(&self, timezone: &str, opening: &Value) -> Result<Settings, DomainError> {
        let mut issues = Issues::new();
        let timezone = validate_timezone(timezone, &mut issues);
        let opening = parse_opening(opening, &mut issues);
        issues.finish()?;

        let (Some(timezone), Some(opening)) = (timezone, opening) else {
            return Err(DomainError::validation(
                SettingsFields::OPENING,
                "must be an object",
            ));
        };
        let saved = self.repo.upsert(Settings { timezone, opening }).await?;
        info!(timezone = %saved.timezone, "settings saved");
        Ok(saved)
    }
}

fn validate_timezone(value: &str, issues: &mut Issues) -> Option<String> {
    let tz = value.trim();
    if tz.is_empty() {
        issues.push(SettingsFields::TIMEZONE, "must not be empty");
        return None;
    }
    if char_len(tz) > SettingsFields::TIMEZONE_MAX_CHARS || tz.chars().any(char::is_whitespace) {
        issues.push(SettingsFields::TIMEZONE, "must be an IANA zone name such as Europe/Berlin");
        return None;
    }
    Some(tz.to_owned())
}
