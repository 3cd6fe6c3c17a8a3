use super::{JobLedger, JobLedgerError, JobRecord, JobStatus};
use crate::shared::ids::{JobId, UserId};
use serde_json::Value;

const ABANDONED_JOB_ERROR: &str = "job ended without reporting a result";

/// Drives one job through `processing` to exactly one terminal status.
///
/// Dropping a reporter that never finished marks the job failed, so a job
/// that panics or returns early still stops being polled as in-progress.
pub struct JobReporter<'a> {
    ledger: &'a dyn JobLedger,
    job_id: JobId,
    finished: bool,
}

impl<'a> JobReporter<'a> {
    pub fn start(
        ledger: &'a dyn JobLedger,
        kind: &str,
        created_by: &UserId,
    ) -> Result<Self, JobLedgerError> {
        let job = ledger.create_job(kind, created_by)?;
        tracing::info!(job_id = %job.id, kind, "job created");
        Ok(Self {
            ledger,
            job_id: job.id,
            finished: false,
        })
    }

    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    pub fn processing(&self) -> Result<JobRecord, JobLedgerError> {
        self.ledger
            .update_job_status(&self.job_id, JobStatus::Processing, None, None)
    }

    pub fn complete(mut self, result: &Value) -> Result<JobRecord, JobLedgerError> {
        self.finish(JobStatus::Completed, Some(result), None)
    }

    pub fn fail(mut self, error: &str) -> Result<JobRecord, JobLedgerError> {
        self.finish(JobStatus::Failed, None, Some(error))
    }

    fn finish(
        &mut self,
        status: JobStatus,
        result: Option<&Value>,
        error: Option<&str>,
    ) -> Result<JobRecord, JobLedgerError> {
        let record = self
            .ledger
            .update_job_status(&self.job_id, status, result, error)?;
        self.finished = true;
        tracing::info!(job_id = %self.job_id, status = %record.status, "job finished");
        Ok(record)
    }
}

impl Drop for JobReporter<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Err(err) = self.ledger.update_job_status(
            &self.job_id,
            JobStatus::Failed,
            None,
            Some(ABANDONED_JOB_ERROR),
        ) {
            tracing::warn!(job_id = %self.job_id, error = %err, "failed to mark abandoned job");
        }
    }
}
