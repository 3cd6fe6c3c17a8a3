pub mod error;
pub mod load;
pub mod paths;
pub mod save;
pub mod settings;

pub use error::ConfigError;
pub use load::{load_settings, load_settings_from};
pub use paths::{
    default_config_path, CONFIG_PATH_ENV, DEFAULT_DATABASE_FILE_NAME, GLOBAL_SETTINGS_FILE_NAME,
    GLOBAL_STATE_DIR,
};
pub use save::save_new_settings;
pub use settings::{
    JobsConfig, NotificationsConfig, RequestsConfig, Settings, MAX_NOTIFICATION_LIST_LIMIT,
};
