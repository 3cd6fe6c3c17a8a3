use std::fs;
use std::path::Path;
use tagflow::app::command_handlers::run_cli;
use tempfile::tempdir;

fn cli(args: &[&str]) -> Result<String, String> {
    run_cli(args.iter().map(|arg| arg.to_string()).collect())
}

fn cli_db(db: &Path, args: &[&str]) -> Result<String, String> {
    let db = db.display().to_string();
    let mut full: Vec<&str> = args.to_vec();
    full.extend(["--db", db.as_str()]);
    cli(&full)
}

fn field<'a>(output: &'a str, key: &str) -> &'a str {
    output
        .lines()
        .find_map(|line| line.strip_prefix(&format!("{key}=")))
        .unwrap_or_else(|| panic!("missing `{key}` in:\n{output}"))
}

fn seed(db: &Path) {
    let created = cli_db(db, &["event", "create", "E1", "Summer Jam", "--actor", "carol"])
        .expect("create event");
    assert_eq!(created, "event created\nid=E1\ncreator=carol");
    cli_db(db, &["section", "create", "S1", "E1", "Top 16"]).expect("create section");
    cli_db(db, &["section", "bracket", "B1", "S1", "Quarter"]).expect("create bracket");
    let video = cli_db(db, &["video", "create", "V1", "S1", "Final", "--bracket", "B1"])
        .expect("create video");
    assert_eq!(field(&video, "bracket"), "B1");
}

#[test]
fn app_cli_module_prints_help_and_rejects_unknown_input() {
    let help = cli(&[]).expect("help");
    assert!(help.contains("Commands:"));
    assert_eq!(cli(&["--help"]).expect("help"), help);

    let err = cli(&["dance"]).expect_err("unknown command");
    assert!(err.contains("unknown command `dance`"));

    let err = cli(&["tag", "list", "E1", "--colour", "red"]).expect_err("unknown flag");
    assert!(err.contains("--colour"));
}

#[test]
fn app_cli_module_runs_a_self_tag_through_approval() {
    let temp = tempdir().expect("tempdir");
    let db = temp.path().join("tagflow.db");
    seed(&db);

    let pending = cli_db(
        &db,
        &["tag", "add", "E1", "dancer", "alice", "--video", "V1", "--actor", "alice"],
    )
    .expect("tag add");
    assert!(pending.starts_with("request pending"), "{pending}");
    assert_eq!(field(&pending, "status"), "PENDING");
    assert_eq!(field(&pending, "existing"), "false");
    let request_id = field(&pending, "request_id").to_string();

    let again = cli_db(
        &db,
        &["tag", "add", "E1", "DANCER", "alice", "--video", "V1", "--actor", "alice"],
    )
    .expect("tag add again");
    assert_eq!(field(&again, "request_id"), request_id);
    assert_eq!(field(&again, "existing"), "true");

    let incoming = cli_db(&db, &["request", "incoming", "--actor", "carol", "--level", "creator"])
        .expect("incoming");
    assert_eq!(field(&incoming, "request_id"), request_id);

    let err = cli_db(&db, &["request", "approve", &request_id, "--actor", "alice"])
        .expect_err("sender cannot approve");
    assert!(err.starts_with("unauthorized:"), "{err}");

    let approved = cli_db(
        &db,
        &["request", "approve", &request_id, "--actor", "carol", "--level", "creator"],
    )
    .expect("approve");
    assert_eq!(field(&approved, "status"), "APPROVED");

    let err = cli_db(&db, &["request", "cancel", &request_id, "--actor", "alice"])
        .expect_err("already approved");
    assert!(err.starts_with("invalid_state:"), "{err}");

    let tags = cli_db(&db, &["tag", "list", "E1", "--video", "V1"]).expect("tag list");
    assert_eq!(tags, "DANCER=alice");

    let notifications =
        cli_db(&db, &["notifications", "list", "--actor", "alice"]).expect("notifications");
    assert_ne!(field(&notifications, "unread"), "0");
    assert!(notifications.contains("REQUEST_APPROVED"));
    let notification_id = notifications
        .lines()
        .find(|line| line.contains("REQUEST_APPROVED"))
        .and_then(|line| line.split_whitespace().next())
        .expect("notification id")
        .to_string();

    let url = cli_db(&db, &["notifications", "url", &notification_id, "--actor", "alice"])
        .expect("url");
    assert_eq!(url, "url=/events/E1/sections/S1/videos/V1");

    let err = cli_db(&db, &["notifications", "url", &notification_id, "--actor", "carol"])
        .expect_err("not carol's notification");
    assert!(err.starts_with("not_found:"), "{err}");

    let dismissed = cli_db(&db, &["notifications", "dismiss-all", "--actor", "alice"])
        .expect("dismiss all");
    assert_ne!(dismissed, "dismissed=0");
    let after = cli_db(&db, &["notifications", "list", "--actor", "alice"]).expect("list");
    assert_eq!(field(&after, "unread"), "0");
}

#[test]
fn app_cli_module_edits_teams_and_shows_events() {
    let temp = tempdir().expect("tempdir");
    let db = temp.path().join("tagflow.db");
    seed(&db);

    let added = cli_db(&db, &["team", "add", "E1", "dave", "--actor", "carol", "--level", "1"])
        .expect("team add");
    assert_eq!(added, "added=true");
    let shown = cli_db(&db, &["event", "show", "E1"]).expect("show");
    assert_eq!(field(&shown, "team"), "dave");

    let requested = cli_db(&db, &["team", "request", "E1", "--actor", "erin", "--level", "creator"])
        .expect("team request");
    assert_eq!(field(&requested, "kind"), "TEAM_MEMBER");

    let err = cli_db(&db, &["team", "request", "E1", "--actor", "erin"])
        .expect_err("base users cannot ask to join");
    assert!(err.starts_with("unauthorized:"), "{err}");

    let err = cli_db(
        &db,
        &["ownership", "claim", "E1", "--actor", "frank", "--unverified"],
    )
    .expect_err("unverified accounts cannot create requests");
    assert!(err.starts_with("unauthorized:"), "{err}");
}

#[test]
fn app_cli_module_hides_other_callers_jobs() {
    let temp = tempdir().expect("tempdir");
    let db = temp.path().join("tagflow.db");
    seed(&db);
    let items = temp.path().join("items.json");
    fs::write(
        &items,
        r#"[{"eventId":"E1","sectionId":"S1","role":"WINNER","userId":"bob"}]"#,
    )
    .expect("write items");
    let items = items.display().to_string();

    let err = cli_db(&db, &["job", "bulk-tag", &items, "--actor", "carol", "--level", "admin"])
        .expect_err("admins cannot bulk tag");
    assert!(err.starts_with("unauthorized:"), "{err}");

    let output = cli_db(
        &db,
        &["job", "bulk-tag", &items, "--actor", "root", "--level", "super_admin"],
    )
    .expect("bulk tag");
    let job: serde_json::Value = serde_json::from_str(&output).expect("job json");
    assert_eq!(job["status"], "completed");
    let job_id = job["id"].as_str().expect("job id").to_string();

    let shown = cli_db(&db, &["job", "show", &job_id, "--actor", "root"]).expect("show");
    assert!(shown.contains(&job_id));
    let err = cli_db(&db, &["job", "show", &job_id, "--actor", "alice"])
        .expect_err("another caller's job");
    assert!(err.starts_with("not_found:"), "{err}");

    let tags = cli_db(&db, &["tag", "list", "E1", "--section", "S1"]).expect("tags");
    assert_eq!(tags, "WINNER=bob");
}

#[test]
fn app_cli_module_init_writes_config_once() {
    let temp = tempdir().expect("tempdir");
    let config = temp.path().join("conf").join("config.yaml");
    let config_arg = config.display().to_string();

    let output = cli(&["init", "--config", &config_arg]).expect("init");
    assert!(output.starts_with("initialized"));
    assert!(config.is_file());
    assert!(temp.path().join("conf").join("tagflow.db").is_file());

    let err = cli(&["init", "--config", &config_arg]).expect_err("second init");
    assert!(err.contains("already exists"), "{err}");

    let created = cli(&[
        "event", "create", "E9", "Autumn", "--actor", "carol", "--config", &config_arg,
    ])
    .expect("event via config");
    assert_eq!(field(&created, "id"), "E9");
}

#[test]
fn app_cli_module_serve_reports_unusable_listen_addresses() {
    let temp = tempdir().expect("tempdir");
    let db = temp.path().join("tagflow.db");

    let err = cli_db(&db, &["serve", "extra"]).expect_err("positional");
    assert!(err.contains("usage: serve"));

    let err = cli_db(&db, &["serve", "--listen", "not-an-address"]).expect_err("bad addr");
    assert!(err.contains("api server on not-an-address failed"), "{err}");
}
