use super::requests::render_outcome;
use crate::app::command_support::{
    actor_from_args, map_workflow_err, open_engine, parse_id, ParsedArgs,
};
use crate::domain::{Role, TagTarget};
use crate::requests::TaggingInput;
use crate::resources::ResourceGraph;
use crate::shared::ids::{EventId, SectionId, UserId, VideoId};

struct TagScope {
    event_id: EventId,
    section_id: Option<SectionId>,
    video_id: Option<VideoId>,
}

impl TagScope {
    fn from_args(args: &ParsedArgs) -> Result<Self, String> {
        Ok(Self {
            event_id: parse_id(args.positional(1, "event_id")?, "event id")?,
            section_id: args
                .value("--section")
                .map(|raw| parse_id(raw, "section id"))
                .transpose()?,
            video_id: args
                .value("--video")
                .map(|raw| parse_id(raw, "video id"))
                .transpose()?,
        })
    }

    fn target(&self) -> Result<TagTarget, String> {
        TagTarget::from_parts(
            self.event_id.clone(),
            self.video_id.clone(),
            self.section_id.clone(),
        )
    }
}

pub fn cmd_tag(args: &ParsedArgs) -> Result<String, String> {
    match args.positional.first().map(String::as_str) {
        Some("add") => {
            args.expect_positional(
                4,
                "tag add <event_id> <role> <user_id> [--section <id>|--video <id>]",
            )?;
            let actor = actor_from_args(args)?;
            let scope = TagScope::from_args(args)?;
            let role = Role::parse(&args.positional[2])?;
            let target_user_id: UserId = parse_id(&args.positional[3], "user id")?;
            let engine = open_engine(args)?;
            let outcome = engine
                .request_service()
                .create_tagging_request(
                    &actor,
                    TaggingInput {
                        event_id: scope.event_id,
                        video_id: scope.video_id,
                        section_id: scope.section_id,
                        role,
                        target_user_id,
                    },
                )
                .map_err(map_workflow_err)?;
            Ok(render_outcome("tag applied", &outcome))
        }
        Some("remove") => {
            args.expect_positional(
                4,
                "tag remove <event_id> <role> <user_id> [--section <id>|--video <id>]",
            )?;
            let actor = actor_from_args(args)?;
            let target = TagScope::from_args(args)?.target()?;
            let role = Role::parse(&args.positional[2])?;
            let user_id: UserId = parse_id(&args.positional[3], "user id")?;
            let engine = open_engine(args)?;
            let removed = engine
                .request_service()
                .remove_tag(&actor, &target, role, &user_id)
                .map_err(map_workflow_err)?;
            Ok(format!("removed={removed}"))
        }
        Some("list") => {
            args.expect_positional(2, "tag list <event_id> [--section <id>|--video <id>]")?;
            let target = TagScope::from_args(args)?.target()?;
            let engine = open_engine(args)?;
            let tags = engine
                .resources()
                .tags_for(&target)
                .map_err(|err| err.to_string())?;
            Ok(tags
                .iter()
                .map(|tag| format!("{}={}", tag.role.as_canonical(), tag.user_id))
                .collect::<Vec<_>>()
                .join("\n"))
        }
        _ => Err("usage: tag <add|remove|list> ...".to_string()),
    }
}
