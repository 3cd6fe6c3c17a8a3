use super::pending_key::compute_pending_key;
use super::store::{RequestStore, RequestStoreError};
use crate::domain::{
    OwnershipRequest, PendingKey, RequestKind, RequestStatus, Role, TaggingRequest,
    TeamMemberRequest, WorkflowRequest,
};
use crate::shared::ids::{EventId, RequestId, SectionId, UserId, VideoId};
use crate::shared::sqlite::{ensure_parent_dir, open_connection};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::path::{Path, PathBuf};

const REQUEST_COLUMNS: &str = "request_id, kind, event_id, video_id, section_id, role, \
                               sender_id, target_user_id, status, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct SqliteRequestStore {
    db_path: PathBuf,
}

struct RequestRow {
    request_id: String,
    kind: String,
    event_id: String,
    video_id: Option<String>,
    section_id: Option<String>,
    role: Option<String>,
    sender_id: String,
    target_user_id: String,
    status: String,
    created_at: i64,
    updated_at: i64,
}

impl SqliteRequestStore {
    pub fn open(db_path: &Path) -> Result<Self, RequestStoreError> {
        ensure_parent_dir(db_path).map_err(|source| RequestStoreError::CreateParent {
            path: db_path.display().to_string(),
            source,
        })?;
        let store = Self {
            db_path: db_path.to_path_buf(),
        };
        let _ = store.connect()?;
        Ok(store)
    }

    pub fn ensure_schema(&self) -> Result<(), RequestStoreError> {
        let connection = self.connect()?;
        connection
            .execute_batch(
                "
                CREATE TABLE IF NOT EXISTS workflow_requests (
                    request_id TEXT PRIMARY KEY,
                    kind TEXT NOT NULL,
                    event_id TEXT NOT NULL,
                    video_id TEXT,
                    section_id TEXT,
                    role TEXT,
                    sender_id TEXT NOT NULL,
                    target_user_id TEXT NOT NULL,
                    status TEXT NOT NULL,
                    pending_key TEXT NOT NULL,
                    created_at INTEGER NOT NULL,
                    updated_at INTEGER NOT NULL
                );

                CREATE UNIQUE INDEX IF NOT EXISTS idx_workflow_requests_single_pending
                    ON workflow_requests(pending_key)
                    WHERE status = 'PENDING';
                CREATE INDEX IF NOT EXISTS idx_workflow_requests_event_status
                    ON workflow_requests(event_id, status, created_at);
                CREATE INDEX IF NOT EXISTS idx_workflow_requests_sender_status
                    ON workflow_requests(sender_id, event_id, status);
                ",
            )
            .map_err(|source| RequestStoreError::Sql { source })?;
        Ok(())
    }

    pub fn count_with_status(&self, status: RequestStatus) -> Result<u64, RequestStoreError> {
        let connection = self.connect()?;
        let count: i64 = connection
            .query_row(
                "SELECT COUNT(*) FROM workflow_requests WHERE status = ?1",
                params![status.as_str()],
                |row| row.get(0),
            )
            .map_err(|source| RequestStoreError::Sql { source })?;
        Ok(count as u64)
    }

    fn connect(&self) -> Result<Connection, RequestStoreError> {
        open_connection(&self.db_path).map_err(|source| RequestStoreError::Open {
            path: self.db_path.display().to_string(),
            source,
        })
    }
}

impl RequestStore for SqliteRequestStore {
    fn find_pending(&self, key: &PendingKey) -> Result<Option<WorkflowRequest>, RequestStoreError> {
        let connection = self.connect()?;
        let sql = format!(
            "SELECT {REQUEST_COLUMNS} FROM workflow_requests
             WHERE pending_key = ?1 AND status = 'PENDING'
             LIMIT 1"
        );
        let row = connection
            .query_row(&sql, params![compute_pending_key(key)], read_row)
            .optional()
            .map_err(|source| RequestStoreError::Sql { source })?;
        row.map(decode_row).transpose()
    }

    fn create(&self, request: &WorkflowRequest) -> Result<WorkflowRequest, RequestStoreError> {
        if request.status() != RequestStatus::Pending {
            return Err(RequestStoreError::NotCreatedPending {
                status: request.status(),
            });
        }
        let pending_key = compute_pending_key(&request.pending_key());
        let (video_id, section_id, role, updated_at) = match request {
            WorkflowRequest::Tagging(tagging) => (
                tagging.video_id.as_ref().map(VideoId::as_str),
                tagging.section_id.as_ref().map(SectionId::as_str),
                Some(tagging.role.as_canonical()),
                tagging.updated_at,
            ),
            WorkflowRequest::TeamMember(team) => (None, None, None, team.updated_at),
            WorkflowRequest::Ownership(ownership) => (None, None, None, ownership.updated_at),
        };

        let connection = self.connect()?;
        let inserted = connection
            .execute(
                "
                INSERT INTO workflow_requests (
                    request_id, kind, event_id, video_id, section_id, role,
                    sender_id, target_user_id, status, pending_key, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                ON CONFLICT DO NOTHING
                ",
                params![
                    request.id().as_str(),
                    request.kind().as_str(),
                    request.event_id().as_str(),
                    video_id,
                    section_id,
                    role,
                    request.sender_id().as_str(),
                    request.target_user_id().as_str(),
                    RequestStatus::Pending.as_str(),
                    pending_key,
                    request.created_at(),
                    updated_at,
                ],
            )
            .map_err(|source| RequestStoreError::Sql { source })?;

        if inserted == 0 {
            return Err(RequestStoreError::DuplicatePending { pending_key });
        }
        Ok(request.clone())
    }

    fn transition(
        &self,
        request_id: &RequestId,
        next: RequestStatus,
        now: i64,
    ) -> Result<WorkflowRequest, RequestStoreError> {
        if !RequestStatus::Pending.can_transition_to(next) {
            return Err(RequestStoreError::InvalidTransition {
                from: RequestStatus::Pending,
                to: next,
            });
        }

        let mut connection = self.connect()?;
        let tx = connection
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|source| RequestStoreError::Sql { source })?;
        let updated = tx
            .execute(
                "
                UPDATE workflow_requests
                SET status = ?2, updated_at = ?3
                WHERE request_id = ?1 AND status = 'PENDING'
                ",
                params![request_id.as_str(), next.as_str(), now],
            )
            .map_err(|source| RequestStoreError::Sql { source })?;
        let current = select_by_id(&tx, request_id)?;
        tx.commit()
            .map_err(|source| RequestStoreError::Sql { source })?;

        let Some(current) = current else {
            return Err(RequestStoreError::NotFound {
                request_id: request_id.to_string(),
            });
        };
        if updated == 0 {
            return Err(RequestStoreError::NotPending {
                request_id: request_id.to_string(),
                status: current.status(),
            });
        }
        Ok(current)
    }

    fn find_by_id(
        &self,
        request_id: &RequestId,
    ) -> Result<Option<WorkflowRequest>, RequestStoreError> {
        let connection = self.connect()?;
        select_by_id(&connection, request_id)
    }

    fn list_pending(
        &self,
        event_id: Option<&EventId>,
    ) -> Result<Vec<WorkflowRequest>, RequestStoreError> {
        let connection = self.connect()?;
        let sql = format!(
            "SELECT {REQUEST_COLUMNS} FROM workflow_requests
             WHERE status = 'PENDING' AND (?1 IS NULL OR event_id = ?1)
             ORDER BY created_at ASC, request_id ASC"
        );
        let mut statement = connection
            .prepare(&sql)
            .map_err(|source| RequestStoreError::Sql { source })?;
        let rows = statement
            .query_map(params![event_id.map(EventId::as_str)], read_row)
            .map_err(|source| RequestStoreError::Sql { source })?;
        collect_rows(rows)
    }

    fn list_pending_for_sender(
        &self,
        sender_id: &UserId,
        event_id: &EventId,
    ) -> Result<Vec<WorkflowRequest>, RequestStoreError> {
        let connection = self.connect()?;
        let sql = format!(
            "SELECT {REQUEST_COLUMNS} FROM workflow_requests
             WHERE status = 'PENDING' AND sender_id = ?1 AND event_id = ?2
             ORDER BY created_at ASC, request_id ASC"
        );
        let mut statement = connection
            .prepare(&sql)
            .map_err(|source| RequestStoreError::Sql { source })?;
        let rows = statement
            .query_map(params![sender_id.as_str(), event_id.as_str()], read_row)
            .map_err(|source| RequestStoreError::Sql { source })?;
        collect_rows(rows)
    }
}

fn select_by_id(
    connection: &Connection,
    request_id: &RequestId,
) -> Result<Option<WorkflowRequest>, RequestStoreError> {
    let sql = format!("SELECT {REQUEST_COLUMNS} FROM workflow_requests WHERE request_id = ?1");
    let row = connection
        .query_row(&sql, params![request_id.as_str()], read_row)
        .optional()
        .map_err(|source| RequestStoreError::Sql { source })?;
    row.map(decode_row).transpose()
}

fn collect_rows(
    rows: impl Iterator<Item = rusqlite::Result<RequestRow>>,
) -> Result<Vec<WorkflowRequest>, RequestStoreError> {
    let mut out = Vec::new();
    for row in rows {
        let row = row.map_err(|source| RequestStoreError::Sql { source })?;
        out.push(decode_row(row)?);
    }
    Ok(out)
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<RequestRow> {
    Ok(RequestRow {
        request_id: row.get(0)?,
        kind: row.get(1)?,
        event_id: row.get(2)?,
        video_id: row.get(3)?,
        section_id: row.get(4)?,
        role: row.get(5)?,
        sender_id: row.get(6)?,
        target_user_id: row.get(7)?,
        status: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

fn decode_row(row: RequestRow) -> Result<WorkflowRequest, RequestStoreError> {
    let id = decode_column("request_id", &row.request_id, RequestId::parse)?;
    let kind = decode_column("kind", &row.kind, RequestKind::parse)?;
    let event_id = decode_column("event_id", &row.event_id, EventId::parse)?;
    let sender_id = decode_column("sender_id", &row.sender_id, UserId::parse)?;
    let status = decode_column("status", &row.status, RequestStatus::parse)?;

    let request = match kind {
        RequestKind::Tagging => {
            let role_raw = row.role.unwrap_or_default();
            WorkflowRequest::Tagging(TaggingRequest {
                id,
                event_id,
                video_id: row
                    .video_id
                    .map(|raw| decode_column("video_id", &raw, VideoId::parse))
                    .transpose()?,
                section_id: row
                    .section_id
                    .map(|raw| decode_column("section_id", &raw, SectionId::parse))
                    .transpose()?,
                role: decode_column("role", &role_raw, Role::parse)?,
                sender_id,
                target_user_id: decode_column(
                    "target_user_id",
                    &row.target_user_id,
                    UserId::parse,
                )?,
                status,
                created_at: row.created_at,
                updated_at: row.updated_at,
            })
        }
        RequestKind::TeamMember => WorkflowRequest::TeamMember(TeamMemberRequest {
            id,
            event_id,
            sender_id,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }),
        RequestKind::Ownership => WorkflowRequest::Ownership(OwnershipRequest {
            id,
            event_id,
            sender_id,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }),
    };
    Ok(request)
}

fn decode_column<T>(
    field: &'static str,
    raw: &str,
    parse: impl FnOnce(&str) -> Result<T, String>,
) -> Result<T, RequestStoreError> {
    parse(raw).map_err(|reason| RequestStoreError::InvalidColumn {
        field,
        value: raw.to_string(),
        reason,
    })
}
