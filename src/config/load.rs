use super::{default_config_path, ConfigError, Settings};
use std::path::Path;

pub fn load_settings_from(path: &Path) -> Result<Settings, ConfigError> {
    let settings = Settings::from_path(path)?;
    settings.validate()?;
    tracing::debug!(
        path = %path.display(),
        database = %settings.database_path.display(),
        "settings loaded"
    );
    Ok(settings)
}

pub fn load_settings() -> Result<Settings, ConfigError> {
    let path = default_config_path()?;
    load_settings_from(&path)
}
