use crate::app::command_support::{actor_from_args, open_engine, parse_id, ParsedArgs};
use crate::resources::ResourceGraph;
use crate::shared::ids::{BracketId, EventId, SectionId, VideoId};

pub fn cmd_event(args: &ParsedArgs) -> Result<String, String> {
    match args.positional.first().map(String::as_str) {
        Some("create") => {
            args.expect_positional(3, "event create <event_id> <title> --actor <user_id>")?;
            let actor = actor_from_args(args)?;
            let event_id: EventId = parse_id(&args.positional[1], "event id")?;
            let engine = open_engine(args)?;
            let event = engine
                .resources()
                .create_event(&event_id, &args.positional[2], &actor.id)
                .map_err(|err| err.to_string())?;
            Ok(format!(
                "event created\nid={}\ncreator={}",
                event.event_id, event.creator_id
            ))
        }
        Some("show") => {
            args.expect_positional(2, "event show <event_id>")?;
            let event_id: EventId = parse_id(&args.positional[1], "event id")?;
            let engine = open_engine(args)?;
            let event = engine
                .resources()
                .event(&event_id)
                .map_err(|err| err.to_string())?
                .ok_or_else(|| format!("unknown event `{event_id}`"))?;
            let team = event
                .team_member_ids
                .iter()
                .map(|id| id.as_str())
                .collect::<Vec<_>>()
                .join(",");
            Ok(format!(
                "id={}\ntitle={}\ncreator={}\nteam={team}",
                event.event_id, event.title, event.creator_id
            ))
        }
        _ => Err("usage: event <create|show> ...".to_string()),
    }
}

pub fn cmd_section(args: &ParsedArgs) -> Result<String, String> {
    match args.positional.first().map(String::as_str) {
        Some("create") => {
            args.expect_positional(4, "section create <section_id> <event_id> <title>")?;
            let section_id: SectionId = parse_id(&args.positional[1], "section id")?;
            let event_id: EventId = parse_id(&args.positional[2], "event id")?;
            let engine = open_engine(args)?;
            let section = engine
                .resources()
                .create_section(&section_id, &event_id, &args.positional[3])
                .map_err(|err| err.to_string())?;
            Ok(format!(
                "section created\nid={}\nevent={}",
                section.section_id, section.event_id
            ))
        }
        Some("bracket") => {
            args.expect_positional(4, "section bracket <bracket_id> <section_id> <title>")?;
            let bracket_id: BracketId = parse_id(&args.positional[1], "bracket id")?;
            let section_id: SectionId = parse_id(&args.positional[2], "section id")?;
            let engine = open_engine(args)?;
            let bracket = engine
                .resources()
                .create_bracket(&bracket_id, &section_id, &args.positional[3])
                .map_err(|err| err.to_string())?;
            Ok(format!(
                "bracket created\nid={}\nsection={}",
                bracket.bracket_id, bracket.section_id
            ))
        }
        _ => Err("usage: section <create|bracket> ...".to_string()),
    }
}

pub fn cmd_video(args: &ParsedArgs) -> Result<String, String> {
    if args.positional.first().map(String::as_str) != Some("create") {
        return Err("usage: video create <video_id> <section_id> <title> [--bracket <id>]".to_string());
    }
    args.expect_positional(
        4,
        "video create <video_id> <section_id> <title> [--bracket <id>]",
    )?;
    let video_id: VideoId = parse_id(&args.positional[1], "video id")?;
    let section_id: SectionId = parse_id(&args.positional[2], "section id")?;
    let bracket_id = args
        .value("--bracket")
        .map(|raw| parse_id::<BracketId>(raw, "bracket id"))
        .transpose()?;
    let engine = open_engine(args)?;
    let video = engine
        .resources()
        .create_video(&video_id, &section_id, bracket_id.as_ref(), &args.positional[3])
        .map_err(|err| err.to_string())?;
    Ok(format!(
        "video created\nid={}\nsection={}\nbracket={}",
        video.video_id,
        video.section_id,
        video.bracket_id.map(|id| id.to_string()).unwrap_or_default()
    ))
}
