use super::{JobLedger, JobRecord, JobReporter};
use crate::auth::{can_bulk_import, Actor};
use crate::domain::Role;
use crate::requests::{Creation, RequestService, TaggingInput};
use crate::shared::ids::{EventId, SectionId, UserId, VideoId};
use crate::shared::WorkflowError;
use serde::{Deserialize, Serialize};

pub const BULK_TAG_JOB_KIND: &str = "bulk_tag";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkTagItem {
    pub event_id: EventId,
    #[serde(default)]
    pub section_id: Option<SectionId>,
    #[serde(default)]
    pub video_id: Option<VideoId>,
    pub role: Role,
    pub user_id: UserId,
}

impl From<BulkTagItem> for TaggingInput {
    fn from(item: BulkTagItem) -> Self {
        TaggingInput {
            event_id: item.event_id,
            video_id: item.video_id,
            section_id: item.section_id,
            role: item.role,
            target_user_id: item.user_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkTagFailure {
    pub index: usize,
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkTagSummary {
    pub total: usize,
    pub applied: usize,
    pub pending_created: usize,
    pub pending_existing: usize,
    pub failures: Vec<BulkTagFailure>,
}

/// Runs every item through the regular tagging path under one job.
///
/// Per-item errors are collected into the summary; the job itself fails only
/// when the summary cannot be produced.
pub fn run_bulk_tagging(
    service: &RequestService<'_>,
    ledger: &dyn JobLedger,
    actor: &Actor,
    items: Vec<BulkTagItem>,
    max_items: usize,
) -> Result<JobRecord, WorkflowError> {
    if !can_bulk_import(actor) {
        return Err(WorkflowError::unauthorized(format!(
            "user `{}` may not run bulk tagging",
            actor.id
        )));
    }
    if items.len() > max_items {
        return Err(WorkflowError::validation(format!(
            "bulk tagging accepts at most {max_items} items; got {}",
            items.len()
        )));
    }

    let reporter = JobReporter::start(ledger, BULK_TAG_JOB_KIND, &actor.id)?;
    reporter.processing()?;

    let mut summary = BulkTagSummary {
        total: items.len(),
        ..BulkTagSummary::default()
    };
    for (index, item) in items.into_iter().enumerate() {
        match service.create_tagging_request(actor, item.into()) {
            Ok(outcome) if outcome.direct_apply => summary.applied += 1,
            Ok(outcome) => match outcome.creation {
                Some(Creation::Existing) => summary.pending_existing += 1,
                _ => summary.pending_created += 1,
            },
            Err(err) => {
                tracing::warn!(job_id = %reporter.job_id(), index, error = %err, "bulk tag item failed");
                summary.failures.push(BulkTagFailure {
                    index,
                    code: err.code().to_string(),
                    message: err.to_string(),
                });
            }
        }
    }

    match serde_json::to_value(&summary) {
        Ok(result) => Ok(reporter.complete(&result)?),
        Err(err) => Ok(reporter.fail(&format!("failed to encode job summary: {err}"))?),
    }
}
