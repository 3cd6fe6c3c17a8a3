use crate::app::command_support::{config_path, map_config_err, ParsedArgs};
use crate::config::{save_new_settings, Settings, DEFAULT_DATABASE_FILE_NAME};
use crate::engine::Engine;
use std::path::PathBuf;

/// Writes a new config file and creates every table in its database.
pub fn cmd_init(args: &ParsedArgs) -> Result<String, String> {
    args.expect_positional(0, "init [--config <path>] [--db <path>]")?;
    let path = config_path(args)?;
    let database_path = match args.value("--db") {
        Some(db) => PathBuf::from(db),
        None => path
            .parent()
            .map(|dir| dir.join(DEFAULT_DATABASE_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_FILE_NAME)),
    };
    let settings = Settings::with_database(database_path);
    save_new_settings(&path, &settings).map_err(map_config_err)?;

    let mut resolved = settings;
    if let Some(base) = path.parent() {
        resolved.resolve_relative_paths(base);
    }
    let database = resolved.database_path.display().to_string();
    Engine::open(resolved).map_err(|err| err.to_string())?;
    Ok(format!(
        "initialized\nconfig={}\ndatabase={database}",
        path.display()
    ))
}
