use crate::app::command_support::{
    actor_from_args, map_workflow_err, open_engine, parse_id, ParsedArgs,
};
use crate::config::MAX_NOTIFICATION_LIST_LIMIT;
use crate::shared::clock::format_timestamp;
use crate::shared::ids::NotificationId;

pub fn cmd_notifications(args: &ParsedArgs) -> Result<String, String> {
    match args.positional.first().map(String::as_str) {
        Some("list") => {
            args.expect_positional(1, "notifications list [--limit <n>]")?;
            let actor = actor_from_args(args)?;
            let engine = open_engine(args)?;
            let limit = args
                .parse_value::<usize>("--limit")?
                .unwrap_or(engine.settings().notifications.list_limit)
                .clamp(1, MAX_NOTIFICATION_LIST_LIMIT);
            let service = engine.notification_service();
            let notifications = service
                .list_for_user(&actor.id, limit)
                .map_err(map_workflow_err)?;
            let unread = service.count_unread(&actor.id).map_err(map_workflow_err)?;
            let mut lines = vec![format!("unread={unread}")];
            for notification in notifications {
                lines.push(format!(
                    "{} {} {}{} {}",
                    notification.id,
                    format_timestamp(notification.created_at),
                    notification.notification_type,
                    if notification.is_old { "" } else { " (new)" },
                    notification.title
                ));
            }
            Ok(lines.join("\n"))
        }
        Some("url") => {
            args.expect_positional(2, "notifications url <notification_id>")?;
            let actor = actor_from_args(args)?;
            let notification_id: NotificationId =
                parse_id(&args.positional[1], "notification id")?;
            let engine = open_engine(args)?;
            let notification = engine
                .notification_service()
                .find_owned(&actor.id, &notification_id)
                .map_err(map_workflow_err)?;
            let url = engine
                .target_resolver()
                .resolve(&notification, &engine.related_lookup());
            Ok(format!("url={}", url.unwrap_or_default()))
        }
        Some("dismiss") => {
            args.expect_positional(2, "notifications dismiss <notification_id>")?;
            let actor = actor_from_args(args)?;
            let notification_id: NotificationId =
                parse_id(&args.positional[1], "notification id")?;
            let engine = open_engine(args)?;
            engine
                .notification_service()
                .mark_as_old(&actor.id, &notification_id)
                .map_err(map_workflow_err)?;
            Ok(format!("dismissed={notification_id}"))
        }
        Some("dismiss-all") => {
            args.expect_positional(1, "notifications dismiss-all")?;
            let actor = actor_from_args(args)?;
            let engine = open_engine(args)?;
            let count = engine
                .notification_service()
                .mark_all_as_old(&actor.id)
                .map_err(map_workflow_err)?;
            Ok(format!("dismissed={count}"))
        }
        _ => Err("usage: notifications <list|url|dismiss|dismiss-all> ...".to_string()),
    }
}
