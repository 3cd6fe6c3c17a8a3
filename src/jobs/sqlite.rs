use super::{JobLedger, JobLedgerError, JobRecord, JobStatus};
use crate::shared::clock::now_secs;
use crate::shared::ids::{JobId, UserId};
use crate::shared::sqlite::{ensure_parent_dir, open_connection};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use serde_json::Value;
use std::path::{Path, PathBuf};

const JOB_COLUMNS: &str = "job_id, kind, created_by, status, result, error, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct SqliteJobLedger {
    db_path: PathBuf,
}

struct JobRow {
    job_id: String,
    kind: String,
    created_by: String,
    status: String,
    result: Option<String>,
    error: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl SqliteJobLedger {
    pub fn open(db_path: &Path) -> Result<Self, JobLedgerError> {
        ensure_parent_dir(db_path).map_err(|source| JobLedgerError::CreateParent {
            path: db_path.display().to_string(),
            source,
        })?;
        let ledger = Self {
            db_path: db_path.to_path_buf(),
        };
        let _ = ledger.connect()?;
        Ok(ledger)
    }

    pub fn ensure_schema(&self) -> Result<(), JobLedgerError> {
        let connection = self.connect()?;
        connection
            .execute_batch(
                "
                CREATE TABLE IF NOT EXISTS jobs (
                    job_id TEXT PRIMARY KEY,
                    kind TEXT NOT NULL,
                    created_by TEXT NOT NULL,
                    status TEXT NOT NULL,
                    result TEXT,
                    error TEXT,
                    created_at INTEGER NOT NULL,
                    updated_at INTEGER NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_jobs_status_updated
                    ON jobs(status, updated_at);
                ",
            )
            .map_err(|source| JobLedgerError::Sql { source })?;
        Ok(())
    }

    fn connect(&self) -> Result<Connection, JobLedgerError> {
        open_connection(&self.db_path).map_err(|source| JobLedgerError::Open {
            path: self.db_path.display().to_string(),
            source,
        })
    }
}

impl JobLedger for SqliteJobLedger {
    fn create_job(&self, kind: &str, created_by: &UserId) -> Result<JobRecord, JobLedgerError> {
        let now = now_secs();
        let job_id = JobId::generate(now).map_err(|reason| JobLedgerError::InvalidColumn {
            field: "job_id",
            value: String::new(),
            reason,
        })?;
        let connection = self.connect()?;
        connection
            .execute(
                "
                INSERT INTO jobs (job_id, kind, created_by, status, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?5)
                ",
                params![
                    job_id.as_str(),
                    kind,
                    created_by.as_str(),
                    JobStatus::Pending.as_str(),
                    now
                ],
            )
            .map_err(|source| JobLedgerError::Sql { source })?;
        Ok(JobRecord {
            id: job_id,
            kind: kind.to_string(),
            created_by: created_by.clone(),
            status: JobStatus::Pending,
            result: None,
            error: None,
            created_at: now,
            updated_at: now,
        })
    }

    fn update_job_status(
        &self,
        job_id: &JobId,
        status: JobStatus,
        result: Option<&Value>,
        error: Option<&str>,
    ) -> Result<JobRecord, JobLedgerError> {
        let result_text = result
            .map(serde_json::to_string)
            .transpose()
            .map_err(|err| JobLedgerError::InvalidColumn {
                field: "result",
                value: String::new(),
                reason: err.to_string(),
            })?;

        let mut connection = self.connect()?;
        let tx = connection
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|source| JobLedgerError::Sql { source })?;
        let Some(current) = select_by_id(&tx, job_id)? else {
            return Err(JobLedgerError::NotFound {
                job_id: job_id.to_string(),
            });
        };
        if !current.status.can_transition_to(status) {
            return Err(JobLedgerError::InvalidTransition {
                job_id: job_id.to_string(),
                from: current.status,
                to: status,
            });
        }
        tx.execute(
            "
            UPDATE jobs
            SET status = ?2,
                result = COALESCE(?3, result),
                error = COALESCE(?4, error),
                updated_at = ?5
            WHERE job_id = ?1 AND status = ?6
            ",
            params![
                job_id.as_str(),
                status.as_str(),
                result_text,
                error,
                now_secs(),
                current.status.as_str()
            ],
        )
        .map_err(|source| JobLedgerError::Sql { source })?;
        let updated = select_by_id(&tx, job_id)?;
        tx.commit().map_err(|source| JobLedgerError::Sql { source })?;
        updated.ok_or_else(|| JobLedgerError::NotFound {
            job_id: job_id.to_string(),
        })
    }

    fn get_job(&self, job_id: &JobId) -> Result<Option<JobRecord>, JobLedgerError> {
        let connection = self.connect()?;
        select_by_id(&connection, job_id)
    }
}

fn select_by_id(connection: &Connection, job_id: &JobId) -> Result<Option<JobRecord>, JobLedgerError> {
    let sql = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE job_id = ?1");
    let row = connection
        .query_row(&sql, params![job_id.as_str()], read_row)
        .optional()
        .map_err(|source| JobLedgerError::Sql { source })?;
    row.map(decode_row).transpose()
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<JobRow> {
    Ok(JobRow {
        job_id: row.get(0)?,
        kind: row.get(1)?,
        created_by: row.get(2)?,
        status: row.get(3)?,
        result: row.get(4)?,
        error: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn decode_row(row: JobRow) -> Result<JobRecord, JobLedgerError> {
    let result = match row.result {
        Some(raw) => Some(serde_json::from_str::<Value>(&raw).map_err(|err| {
            JobLedgerError::InvalidColumn {
                field: "result",
                value: raw.clone(),
                reason: err.to_string(),
            }
        })?),
        None => None,
    };
    Ok(JobRecord {
        id: decode_column("job_id", &row.job_id, JobId::parse)?,
        kind: row.kind,
        created_by: decode_column("created_by", &row.created_by, UserId::parse)?,
        status: decode_column("status", &row.status, JobStatus::parse)?,
        result,
        error: row.error,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn decode_column<T>(
    field: &'static str,
    raw: &str,
    parse: impl FnOnce(&str) -> Result<T, String>,
) -> Result<T, JobLedgerError> {
    parse(raw).map_err(|reason| JobLedgerError::InvalidColumn {
        field,
        value: raw.to_string(),
        reason,
    })
}
