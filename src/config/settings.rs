use super::ConfigError;
use crate::auth::AuthLevel;
use crate::notifications::DEFAULT_DASHBOARD_PATH;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const MAX_NOTIFICATION_LIST_LIMIT: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub database_path: PathBuf,
    #[serde(default)]
    pub event_log_path: Option<PathBuf>,
    #[serde(default)]
    pub requests: RequestsConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub jobs: JobsConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RequestsConfig {
    #[serde(default = "default_true")]
    pub require_verified_account: bool,
    #[serde(default = "default_team_request_min_level")]
    pub team_request_min_level: AuthLevel,
}

impl Default for RequestsConfig {
    fn default() -> Self {
        Self {
            require_verified_account: true,
            team_request_min_level: default_team_request_min_level(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NotificationsConfig {
    #[serde(default = "default_list_limit")]
    pub list_limit: usize,
    #[serde(default = "default_url_cache_ttl_seconds")]
    pub url_cache_ttl_seconds: u64,
    #[serde(default = "default_dashboard_path")]
    pub dashboard_path: String,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            list_limit: default_list_limit(),
            url_cache_ttl_seconds: default_url_cache_ttl_seconds(),
            dashboard_path: default_dashboard_path(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct JobsConfig {
    #[serde(default = "default_max_bulk_items")]
    pub max_bulk_items: usize,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            max_bulk_items: default_max_bulk_items(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_team_request_min_level() -> AuthLevel {
    AuthLevel::Creator
}

fn default_list_limit() -> usize {
    50
}

fn default_url_cache_ttl_seconds() -> u64 {
    30
}

fn default_dashboard_path() -> String {
    DEFAULT_DASHBOARD_PATH.to_string()
}

fn default_max_bulk_items() -> usize {
    500
}

impl Settings {
    pub fn with_database(database_path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: database_path.into(),
            event_log_path: None,
            requests: RequestsConfig::default(),
            notifications: NotificationsConfig::default(),
            jobs: JobsConfig::default(),
        }
    }

    /// Relative paths in the file are resolved against the file's directory.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let mut settings: Settings =
            serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        if let Some(base) = path.parent() {
            settings.resolve_relative_paths(base);
        }
        Ok(settings)
    }

    pub fn resolve_relative_paths(&mut self, base: &Path) {
        if is_joinable(&self.database_path) {
            self.database_path = base.join(&self.database_path);
        }
        if let Some(log_path) = &self.event_log_path {
            if is_joinable(log_path) {
                self.event_log_path = Some(base.join(log_path));
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_path.as_os_str().is_empty() {
            return Err(ConfigError::Settings(
                "`database_path` must be non-empty".to_string(),
            ));
        }
        if self
            .event_log_path
            .as_ref()
            .is_some_and(|path| path.as_os_str().is_empty())
        {
            return Err(ConfigError::Settings(
                "`event_log_path` must be non-empty when set".to_string(),
            ));
        }
        if self.notifications.list_limit == 0
            || self.notifications.list_limit > MAX_NOTIFICATION_LIST_LIMIT
        {
            return Err(ConfigError::Settings(format!(
                "`notifications.list_limit` must be between 1 and {MAX_NOTIFICATION_LIST_LIMIT}"
            )));
        }
        if !self.notifications.dashboard_path.starts_with('/') {
            return Err(ConfigError::Settings(
                "`notifications.dashboard_path` must start with `/`".to_string(),
            ));
        }
        if self.jobs.max_bulk_items == 0 {
            return Err(ConfigError::Settings(
                "`jobs.max_bulk_items` must be at least 1".to_string(),
            ));
        }
        if self.requests.team_request_min_level == AuthLevel::BaseUser {
            tracing::warn!("team membership requests are open to base users");
        }
        Ok(())
    }
}

/// Empty paths stay empty so validation still rejects them.
fn is_joinable(path: &Path) -> bool {
    path.is_relative() && !path.as_os_str().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_file_fills_in_defaults() {
        let settings: Settings =
            serde_yaml::from_str("database_path: /tmp/tagflow.db\n").expect("parse settings");
        assert_eq!(settings, Settings::with_database("/tmp/tagflow.db"));
        assert!(settings.requests.require_verified_account);
        assert_eq!(settings.requests.team_request_min_level, AuthLevel::Creator);
        assert_eq!(settings.notifications.url_cache_ttl_seconds, 30);
    }

    #[test]
    fn unknown_section_keys_are_rejected() {
        let err = serde_yaml::from_str::<Settings>(
            "database_path: /tmp/tagflow.db\nrequests:\n  auto_approve: true\n",
        )
        .expect_err("unknown key must fail");
        assert!(err.to_string().contains("auto_approve"));
    }
}
