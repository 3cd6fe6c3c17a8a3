use std::fs;
use tagflow::auth::AuthLevel;
use tagflow::config::{load_settings_from, save_new_settings, ConfigError, Settings};
use tempfile::tempdir;

#[test]
fn config_settings_module_resolves_relative_paths_against_the_file() {
    let temp = tempdir().expect("tempdir");
    let config_path = temp.path().join("conf").join("config.yaml");
    fs::create_dir_all(config_path.parent().expect("parent")).expect("mkdir");
    fs::write(
        &config_path,
        "database_path: data/tagflow.db\nevent_log_path: logs/events.jsonl\n",
    )
    .expect("write config");

    let settings = Settings::from_path(&config_path).expect("load");
    assert_eq!(
        settings.database_path,
        temp.path().join("conf").join("data/tagflow.db")
    );
    assert_eq!(
        settings.event_log_path,
        Some(temp.path().join("conf").join("logs/events.jsonl"))
    );
}

#[test]
fn config_settings_module_keeps_absolute_paths() {
    let temp = tempdir().expect("tempdir");
    let database = temp.path().join("elsewhere.db");
    let config_path = temp.path().join("config.yaml");
    fs::write(
        &config_path,
        format!("database_path: {}\n", database.display()),
    )
    .expect("write config");

    let settings = load_settings_from(&config_path).expect("load");
    assert_eq!(settings.database_path, database);
    assert!(settings.event_log_path.is_none());
}

#[test]
fn config_settings_module_reads_nested_sections() {
    let temp = tempdir().expect("tempdir");
    let config_path = temp.path().join("config.yaml");
    fs::write(
        &config_path,
        "\
database_path: tagflow.db
requests:
  require_verified_account: false
  team_request_min_level: moderator
notifications:
  list_limit: 20
  url_cache_ttl_seconds: 0
  dashboard_path: /inbox
jobs:
  max_bulk_items: 25
",
    )
    .expect("write config");

    let settings = load_settings_from(&config_path).expect("load");
    assert!(!settings.requests.require_verified_account);
    assert_eq!(settings.requests.team_request_min_level, AuthLevel::Moderator);
    assert_eq!(settings.notifications.list_limit, 20);
    assert_eq!(settings.notifications.url_cache_ttl_seconds, 0);
    assert_eq!(settings.notifications.dashboard_path, "/inbox");
    assert_eq!(settings.jobs.max_bulk_items, 25);
}

#[test]
fn config_settings_module_rejects_invalid_values() {
    let temp = tempdir().expect("tempdir");
    let cases = [
        "database_path: ''\n",
        "database_path: db\nnotifications:\n  list_limit: 0\n",
        "database_path: db\nnotifications:\n  list_limit: 501\n",
        "database_path: db\nnotifications:\n  dashboard_path: inbox\n",
        "database_path: db\njobs:\n  max_bulk_items: 0\n",
    ];
    for (index, body) in cases.iter().enumerate() {
        let path = temp.path().join(format!("config-{index}.yaml"));
        fs::write(&path, body).expect("write config");
        let err = load_settings_from(&path).expect_err("invalid settings");
        assert!(matches!(err, ConfigError::Settings(_)), "{body}: {err}");
    }

    let path = temp.path().join("bad.yaml");
    fs::write(&path, "database_path: db\nrequests:\n  team_request_min_level: emperor\n")
        .expect("write config");
    assert!(matches!(
        load_settings_from(&path),
        Err(ConfigError::Parse { .. })
    ));

    assert!(matches!(
        load_settings_from(&temp.path().join("missing.yaml")),
        Err(ConfigError::Read { .. })
    ));
}

#[test]
fn config_settings_module_never_overwrites_an_existing_file() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("nested").join("config.yaml");
    let settings = Settings::with_database(temp.path().join("tagflow.db"));

    save_new_settings(&path, &settings).expect("save");
    assert_eq!(load_settings_from(&path).expect("reload"), settings);

    let err = save_new_settings(&path, &Settings::with_database("/tmp/other.db"))
        .expect_err("file exists");
    assert!(matches!(err, ConfigError::AlreadyExists { .. }));
    assert_eq!(load_settings_from(&path).expect("reload"), settings);

    let mut invalid = settings.clone();
    invalid.jobs.max_bulk_items = 0;
    let fresh = temp.path().join("fresh.yaml");
    assert!(save_new_settings(&fresh, &invalid).is_err());
    assert!(!fresh.exists());
}
