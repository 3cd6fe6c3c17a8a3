use crate::config::ConfigError;
use std::path::PathBuf;

pub const CONFIG_PATH_ENV: &str = "TAGFLOW_CONFIG";
pub const GLOBAL_STATE_DIR: &str = ".tagflow";
pub const GLOBAL_SETTINGS_FILE_NAME: &str = "config.yaml";
pub const DEFAULT_DATABASE_FILE_NAME: &str = "tagflow.db";

/// `$TAGFLOW_CONFIG` when set, otherwise `~/.tagflow/config.yaml`.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    let home = std::env::var_os("HOME").ok_or(ConfigError::HomeDirectoryUnavailable)?;
    Ok(PathBuf::from(home)
        .join(GLOBAL_STATE_DIR)
        .join(GLOBAL_SETTINGS_FILE_NAME))
}
