#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliVerb {
    Init,
    Event,
    Section,
    Video,
    Tag,
    Team,
    Ownership,
    Request,
    Notifications,
    Job,
    Serve,
    Unknown,
}

pub fn parse_cli_verb(input: &str) -> CliVerb {
    match input {
        "init" => CliVerb::Init,
        "event" => CliVerb::Event,
        "section" => CliVerb::Section,
        "video" => CliVerb::Video,
        "tag" => CliVerb::Tag,
        "team" => CliVerb::Team,
        "ownership" => CliVerb::Ownership,
        "request" => CliVerb::Request,
        "notifications" => CliVerb::Notifications,
        "job" => CliVerb::Job,
        "serve" => CliVerb::Serve,
        _ => CliVerb::Unknown,
    }
}

pub fn cli_help_lines() -> Vec<String> {
    [
        "Commands:",
        "  init [--db <path>]                         Write a config file and create the database",
        "  event create <event_id> <title>            Create an event owned by --actor",
        "  event show <event_id>                      Show an event and its team",
        "  section create <section_id> <event_id> <title>",
        "  section bracket <bracket_id> <section_id> <title>",
        "  video create <video_id> <section_id> <title> [--bracket <id>]",
        "  tag add <event_id> <role> <user_id> [--section <id>|--video <id>]",
        "  tag remove <event_id> <role> <user_id> [--section <id>|--video <id>]",
        "  tag list <event_id> [--section <id>|--video <id>]",
        "  team request <event_id>                    Ask to join an event team",
        "  team add|remove <event_id> <user_id>       Edit an event team directly",
        "  ownership claim <event_id>                 Ask to take over an event",
        "  request approve|deny|cancel|show <request_id>",
        "  request incoming                           Pending requests you can decide",
        "  request pending <event_id> [--section <id>|--video <id>] [--roles a,b]",
        "  notifications list [--limit <n>]",
        "  notifications url|dismiss <notification_id>",
        "  notifications dismiss-all",
        "  job bulk-tag <items.json>                  Run bulk tagging (super admin)",
        "  job show <job_id>",
        "  serve [--listen <addr>]                    Serve the HTTP API (default: 127.0.0.1:8080)",
        "",
        "Global flags:",
        "  --config <path>      Config file (default: $TAGFLOW_CONFIG or ~/.tagflow/config.yaml)",
        "  --db <path>          Use this database with default settings instead of a config file",
        "  --actor <user_id>    The caller; required by every command that acts",
        "  --level <0-4|name>   The caller's auth level (default: 0)",
        "  --unverified         Treat the caller's account as unverified",
    ]
    .iter()
    .map(|line| line.to_string())
    .collect()
}

pub(crate) fn help_text() -> String {
    cli_help_lines().join("\n")
}
