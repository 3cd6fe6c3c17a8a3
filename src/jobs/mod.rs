pub mod bulk_tag;
pub mod reporter;
pub mod sqlite;

use crate::shared::ids::{JobId, UserId};
use crate::shared::WorkflowError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use bulk_tag::{run_bulk_tagging, BulkTagFailure, BulkTagItem, BulkTagSummary, BULK_TAG_JOB_KIND};
pub use reporter::JobReporter;
pub use sqlite::SqliteJobLedger;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (JobStatus::Pending, JobStatus::Processing)
                | (JobStatus::Pending, JobStatus::Failed)
                | (JobStatus::Processing, JobStatus::Completed)
                | (JobStatus::Processing, JobStatus::Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(JobStatus::Pending),
            "processing" => Ok(JobStatus::Processing),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            _ => Err(format!(
                "job status must be one of: pending, processing, completed, failed; got `{raw}`"
            )),
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub id: JobId,
    pub kind: String,
    pub created_by: UserId,
    pub status: JobStatus,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum JobLedgerError {
    #[error("sqlite open failed at {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: rusqlite::Error,
    },
    #[error("failed to create job database parent {path}: {source}")]
    CreateParent {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("sqlite statement failed: {source}")]
    Sql {
        #[source]
        source: rusqlite::Error,
    },
    #[error("job `{job_id}` not found")]
    NotFound { job_id: String },
    #[error("job `{job_id}` cannot move from `{from}` to `{to}`")]
    InvalidTransition {
        job_id: String,
        from: JobStatus,
        to: JobStatus,
    },
    #[error("invalid {field} `{value}` in database: {reason}")]
    InvalidColumn {
        field: &'static str,
        value: String,
        reason: String,
    },
}

impl From<JobLedgerError> for WorkflowError {
    fn from(value: JobLedgerError) -> Self {
        match value {
            JobLedgerError::NotFound { job_id } => WorkflowError::not_found("job", job_id),
            other => WorkflowError::Internal(other.to_string()),
        }
    }
}

/// The background-job ledger polled by clients. A job reaches exactly one
/// terminal status and is never resumed afterwards.
pub trait JobLedger: Send + Sync {
    fn create_job(&self, kind: &str, created_by: &UserId) -> Result<JobRecord, JobLedgerError>;

    fn update_job_status(
        &self,
        job_id: &JobId,
        status: JobStatus,
        result: Option<&Value>,
        error: Option<&str>,
    ) -> Result<JobRecord, JobLedgerError>;

    fn get_job(&self, job_id: &JobId) -> Result<Option<JobRecord>, JobLedgerError>;
}

#[cfg(test)]
mod tests {
    use super::JobStatus;

    #[test]
    fn terminal_job_states_never_move() {
        for terminal in [JobStatus::Completed, JobStatus::Failed] {
            for next in [
                JobStatus::Pending,
                JobStatus::Processing,
                JobStatus::Completed,
                JobStatus::Failed,
            ] {
                assert!(!terminal.can_transition_to(next));
            }
        }
        assert!(JobStatus::Pending.can_transition_to(JobStatus::Processing));
        assert!(!JobStatus::Pending.can_transition_to(JobStatus::Completed));
    }
}
