use super::requests::render_outcome;
use crate::app::command_support::{
    actor_from_args, map_workflow_err, open_engine, parse_id, ParsedArgs,
};
use crate::shared::ids::{EventId, UserId};

pub fn cmd_team(args: &ParsedArgs) -> Result<String, String> {
    match args.positional.first().map(String::as_str) {
        Some("request") => {
            args.expect_positional(2, "team request <event_id>")?;
            let actor = actor_from_args(args)?;
            let event_id: EventId = parse_id(&args.positional[1], "event id")?;
            let engine = open_engine(args)?;
            let outcome = engine
                .request_service()
                .request_team_membership(&actor, &event_id)
                .map_err(map_workflow_err)?;
            Ok(render_outcome("team member added", &outcome))
        }
        Some(action @ ("add" | "remove")) => {
            args.expect_positional(3, &format!("team {action} <event_id> <user_id>"))?;
            let actor = actor_from_args(args)?;
            let event_id: EventId = parse_id(&args.positional[1], "event id")?;
            let user_id: UserId = parse_id(&args.positional[2], "user id")?;
            let engine = open_engine(args)?;
            let service = engine.request_service();
            if action == "add" {
                let added = service
                    .add_team_member(&actor, &event_id, &user_id)
                    .map_err(map_workflow_err)?;
                Ok(format!("added={added}"))
            } else {
                let removed = service
                    .remove_team_member(&actor, &event_id, &user_id)
                    .map_err(map_workflow_err)?;
                Ok(format!("removed={removed}"))
            }
        }
        _ => Err("usage: team <request|add|remove> ...".to_string()),
    }
}

pub fn cmd_ownership(args: &ParsedArgs) -> Result<String, String> {
    if args.positional.first().map(String::as_str) != Some("claim") {
        return Err("usage: ownership claim <event_id>".to_string());
    }
    args.expect_positional(2, "ownership claim <event_id>")?;
    let actor = actor_from_args(args)?;
    let event_id: EventId = parse_id(&args.positional[1], "event id")?;
    let engine = open_engine(args)?;
    let outcome = engine
        .request_service()
        .claim_ownership(&actor, &event_id)
        .map_err(map_workflow_err)?;
    Ok(render_outcome("ownership transferred", &outcome))
}
