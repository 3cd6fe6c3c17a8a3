use crate::app::command_support::{
    actor_from_args, map_workflow_err, open_engine, parse_id, render_json, ParsedArgs,
};
use crate::jobs::{run_bulk_tagging, BulkTagItem, JobLedger};
use crate::shared::ids::JobId;
use std::fs;

pub fn cmd_job(args: &ParsedArgs) -> Result<String, String> {
    match args.positional.first().map(String::as_str) {
        Some("bulk-tag") => {
            args.expect_positional(2, "job bulk-tag <items.json>")?;
            let actor = actor_from_args(args)?;
            let path = &args.positional[1];
            let raw =
                fs::read_to_string(path).map_err(|e| format!("failed to read {path}: {e}"))?;
            let items: Vec<BulkTagItem> = serde_json::from_str(&raw)
                .map_err(|e| format!("invalid bulk tag items in {path}: {e}"))?;
            let engine = open_engine(args)?;
            let job = run_bulk_tagging(
                &engine.request_service(),
                engine.jobs(),
                &actor,
                items,
                engine.settings().jobs.max_bulk_items,
            )
            .map_err(map_workflow_err)?;
            render_json(&job)
        }
        Some("show") => {
            args.expect_positional(2, "job show <job_id>")?;
            let actor = actor_from_args(args)?;
            let job_id: JobId = parse_id(&args.positional[1], "job id")?;
            let engine = open_engine(args)?;
            let job = engine
                .jobs()
                .get_job(&job_id)
                .map_err(|err| err.to_string())?
                .filter(|job| job.created_by == actor.id || actor.is_admin())
                .ok_or_else(|| format!("not_found: unknown job `{job_id}`"))?;
            render_json(&job)
        }
        _ => Err("usage: job <bulk-tag|show> ...".to_string()),
    }
}
