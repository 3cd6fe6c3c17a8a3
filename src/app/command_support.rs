use crate::auth::{Actor, AuthLevel};
use crate::config::{default_config_path, load_settings_from, ConfigError, Settings};
use crate::engine::Engine;
use crate::shared::ids::UserId;
use crate::shared::WorkflowError;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

const VALUE_FLAGS: &[&str] = &[
    "--config", "--db", "--actor", "--level", "--section", "--video", "--bracket", "--roles",
    "--limit", "--listen",
];
const SWITCH_FLAGS: &[&str] = &["--unverified"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArgs {
    pub positional: Vec<String>,
    values: BTreeMap<String, String>,
    switches: BTreeSet<String>,
}

impl ParsedArgs {
    pub fn parse(args: &[String]) -> Result<Self, String> {
        let mut parsed = Self::default();
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            if VALUE_FLAGS.contains(&arg.as_str()) {
                let value = iter
                    .next()
                    .ok_or_else(|| format!("flag `{arg}` requires a value"))?;
                parsed.values.insert(arg.clone(), value.clone());
            } else if SWITCH_FLAGS.contains(&arg.as_str()) {
                parsed.switches.insert(arg.clone());
            } else if arg.starts_with("--") {
                return Err(format!("unknown flag `{arg}`"));
            } else {
                parsed.positional.push(arg.clone());
            }
        }
        Ok(parsed)
    }

    pub fn value(&self, flag: &str) -> Option<&str> {
        self.values.get(flag).map(String::as_str)
    }

    pub fn has(&self, flag: &str) -> bool {
        self.switches.contains(flag)
    }

    pub fn positional(&self, index: usize, name: &str) -> Result<&str, String> {
        self.positional
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| format!("missing argument <{name}>"))
    }

    pub fn expect_positional(&self, count: usize, usage: &str) -> Result<(), String> {
        if self.positional.len() != count {
            return Err(format!("usage: {usage}"));
        }
        Ok(())
    }

    pub fn parse_value<T>(&self, flag: &str) -> Result<Option<T>, String>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.value(flag)
            .map(|raw| {
                raw.parse::<T>()
                    .map_err(|err| format!("invalid value for `{flag}`: {err}"))
            })
            .transpose()
    }
}

pub fn map_config_err(err: ConfigError) -> String {
    err.to_string()
}

pub fn map_workflow_err(err: WorkflowError) -> String {
    format!("{}: {err}", err.code())
}

pub fn config_path(args: &ParsedArgs) -> Result<PathBuf, String> {
    match args.value("--config") {
        Some(path) => Ok(PathBuf::from(path)),
        None => default_config_path().map_err(map_config_err),
    }
}

/// `--db` wins over any config file and runs with default settings.
pub fn load_settings(args: &ParsedArgs) -> Result<Settings, String> {
    if let Some(db) = args.value("--db") {
        let settings = Settings::with_database(db);
        settings.validate().map_err(map_config_err)?;
        return Ok(settings);
    }
    load_settings_from(&config_path(args)?).map_err(map_config_err)
}

pub fn open_engine(args: &ParsedArgs) -> Result<Engine, String> {
    let settings = load_settings(args)?;
    Engine::open(settings).map_err(|err| err.to_string())
}

pub fn actor_from_args(args: &ParsedArgs) -> Result<Actor, String> {
    let id = args
        .value("--actor")
        .ok_or_else(|| "missing required flag `--actor <user_id>`".to_string())?;
    let id = UserId::parse(id).map_err(|err| format!("invalid --actor: {err}"))?;
    let level = match args.value("--level") {
        Some(raw) => AuthLevel::parse(raw).map_err(|err| format!("invalid --level: {err}"))?,
        None => AuthLevel::BaseUser,
    };
    let actor = Actor::new(id, level);
    Ok(if args.has("--unverified") {
        actor.unverified()
    } else {
        actor
    })
}

pub fn parse_id<T>(raw: &str, name: &str) -> Result<T, String>
where
    T: std::str::FromStr<Err = String>,
{
    raw.parse::<T>()
        .map_err(|err| format!("invalid {name} `{raw}`: {err}"))
}

pub fn render_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|err| format!("failed to encode output: {err}"))
}
