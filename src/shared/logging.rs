use serde_json::{Map, Value};
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing_subscriber::EnvFilter;

pub const LOG_FILTER_ENV: &str = "TAGFLOW_LOG";

/// Appends one `{"timestamp", "event", ...fields}` JSON line to the workflow event log.
pub fn append_workflow_event(
    path: &Path,
    event: &str,
    fields: &[(&str, Value)],
) -> Result<(), std::io::Error> {
    let mut payload = Map::new();
    payload.insert(
        "timestamp".to_string(),
        Value::from(super::clock::now_secs()),
    );
    payload.insert("event".to_string(), Value::String(event.to_string()));
    for (key, value) in fields {
        payload.insert((*key).to_string(), value.clone());
    }

    let line = serde_json::to_string(&payload)
        .map_err(|source| std::io::Error::other(source.to_string()))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    writeln!(file, "{line}")
}

/// Installs the process-wide fmt subscriber; a second call is a no-op.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
