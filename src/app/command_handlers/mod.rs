use crate::app::cli::{help_text, parse_cli_verb, CliVerb};
use crate::app::command_support::ParsedArgs;

pub mod init;
pub mod jobs;
pub mod notifications;
pub mod requests;
pub mod resources;
pub mod serve;
pub mod tags;
pub mod team;

pub fn run_cli(args: Vec<String>) -> Result<String, String> {
    if args.is_empty() {
        return Ok(help_text());
    }
    if matches!(args[0].as_str(), "help" | "--help" | "-h") {
        return Ok(help_text());
    }

    let parsed = ParsedArgs::parse(&args[1..])?;
    match parse_cli_verb(args[0].as_str()) {
        CliVerb::Init => init::cmd_init(&parsed),
        CliVerb::Event => resources::cmd_event(&parsed),
        CliVerb::Section => resources::cmd_section(&parsed),
        CliVerb::Video => resources::cmd_video(&parsed),
        CliVerb::Tag => tags::cmd_tag(&parsed),
        CliVerb::Team => team::cmd_team(&parsed),
        CliVerb::Ownership => team::cmd_ownership(&parsed),
        CliVerb::Request => requests::cmd_request(&parsed),
        CliVerb::Notifications => notifications::cmd_notifications(&parsed),
        CliVerb::Job => jobs::cmd_job(&parsed),
        CliVerb::Serve => serve::cmd_serve(&parsed),
        CliVerb::Unknown => Err(format!("unknown command `{}`", args[0])),
    }
}
