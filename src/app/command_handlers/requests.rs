use crate::app::command_support::{
    actor_from_args, map_workflow_err, open_engine, parse_id, ParsedArgs,
};
use crate::domain::{Role, WorkflowRequest};
use crate::requests::{Creation, PendingQuery, RequestOutcome};
use crate::shared::ids::{EventId, RequestId};
use crate::shared::serde_ext::split_csv;

pub(crate) fn render_request(request: &WorkflowRequest) -> String {
    let mut lines = vec![
        format!("request_id={}", request.id()),
        format!("kind={}", request.kind()),
        format!("status={}", request.status()),
        format!("event_id={}", request.event_id()),
        format!("sender_id={}", request.sender_id()),
        format!("target_user_id={}", request.target_user_id()),
    ];
    if let WorkflowRequest::Tagging(tagging) = request {
        lines.push(format!("role={}", tagging.role.as_canonical()));
        if let Some(section_id) = &tagging.section_id {
            lines.push(format!("section_id={section_id}"));
        }
        if let Some(video_id) = &tagging.video_id {
            lines.push(format!("video_id={video_id}"));
        }
    }
    lines.join("\n")
}

pub(crate) fn render_outcome(applied: &str, outcome: &RequestOutcome) -> String {
    match &outcome.request {
        Some(request) => format!(
            "request pending\n{}\nexisting={}",
            render_request(request),
            outcome.creation == Some(Creation::Existing)
        ),
        None => applied.to_string(),
    }
}

pub fn cmd_request(args: &ParsedArgs) -> Result<String, String> {
    match args.positional.first().map(String::as_str) {
        Some(action @ ("approve" | "deny" | "cancel")) => {
            args.expect_positional(2, &format!("request {action} <request_id>"))?;
            let actor = actor_from_args(args)?;
            let request_id: RequestId = parse_id(&args.positional[1], "request id")?;
            let engine = open_engine(args)?;
            let service = engine.request_service();
            let request = match action {
                "approve" => service.approve_request(&actor, &request_id),
                "deny" => service.deny_request(&actor, &request_id),
                _ => service.cancel_request(&actor, &request_id),
            }
            .map_err(map_workflow_err)?;
            Ok(render_request(&request))
        }
        Some("show") => {
            args.expect_positional(2, "request show <request_id>")?;
            let request_id: RequestId = parse_id(&args.positional[1], "request id")?;
            let engine = open_engine(args)?;
            let request = engine
                .request_service()
                .find_request(&request_id)
                .map_err(map_workflow_err)?;
            Ok(render_request(&request))
        }
        Some("incoming") => {
            args.expect_positional(1, "request incoming --actor <user_id>")?;
            let actor = actor_from_args(args)?;
            let engine = open_engine(args)?;
            let incoming = engine
                .request_service()
                .incoming_requests(&actor)
                .map_err(map_workflow_err)?;
            if incoming.is_empty() {
                return Ok("no incoming requests".to_string());
            }
            Ok(incoming
                .iter()
                .map(render_request)
                .collect::<Vec<_>>()
                .join("\n\n"))
        }
        Some("pending") => {
            args.expect_positional(
                2,
                "request pending <event_id> [--section <id>|--video <id>] [--roles a,b]",
            )?;
            let actor = actor_from_args(args)?;
            let event_id: EventId = parse_id(&args.positional[1], "event id")?;
            let roles = args
                .value("--roles")
                .map(split_csv)
                .unwrap_or_default()
                .iter()
                .map(|raw| Role::parse(raw))
                .collect::<Result<Vec<_>, _>>()?;
            let query = PendingQuery {
                event_id,
                section_id: args
                    .value("--section")
                    .map(|raw| parse_id(raw, "section id"))
                    .transpose()?,
                video_id: args
                    .value("--video")
                    .map(|raw| parse_id(raw, "video id"))
                    .transpose()?,
                roles,
            };
            let engine = open_engine(args)?;
            let pending = engine
                .request_service()
                .pending_requests_for_caller(&actor, &query)
                .map_err(map_workflow_err)?;
            Ok(pending
                .iter()
                .map(|(role, summary)| format!("{}={}", role.as_canonical(), summary.id))
                .collect::<Vec<_>>()
                .join("\n"))
        }
        _ => Err("usage: request <approve|deny|cancel|show|incoming|pending> ...".to_string()),
    }
}
