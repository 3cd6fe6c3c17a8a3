use crate::domain::{PendingKey, RequestStatus, WorkflowRequest};
use crate::shared::ids::{EventId, RequestId, UserId};
use crate::shared::WorkflowError;

#[derive(Debug, thiserror::Error)]
pub enum RequestStoreError {
    #[error("sqlite open failed at {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: rusqlite::Error,
    },
    #[error("failed to create request database parent {path}: {source}")]
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
    #[error("a pending request already exists for key {pending_key}")]
    DuplicatePending { pending_key: String },
    #[error("request `{request_id}` not found")]
    NotFound { request_id: String },
    #[error("request `{request_id}` is `{status}`, not pending")]
    NotPending {
        request_id: String,
        status: RequestStatus,
    },
    #[error("request status transition `{from}` -> `{to}` is invalid")]
    InvalidTransition {
        from: RequestStatus,
        to: RequestStatus,
    },
    #[error("new requests must be created as PENDING, got `{status}`")]
    NotCreatedPending { status: RequestStatus },
    #[error("invalid {field} `{value}` in database: {reason}")]
    InvalidColumn {
        field: &'static str,
        value: String,
        reason: String,
    },
}

impl From<RequestStoreError> for WorkflowError {
    fn from(value: RequestStoreError) -> Self {
        match value {
            RequestStoreError::NotFound { request_id } => {
                WorkflowError::not_found("request", request_id)
            }
            RequestStoreError::NotPending { request_id, status } => {
                WorkflowError::InvalidState { request_id, status }
            }
            other => WorkflowError::Internal(other.to_string()),
        }
    }
}

/// Persistence boundary for tagging, team-member and ownership requests.
///
/// Implementations must enforce the pending-uniqueness invariant atomically:
/// `create` fails with [`RequestStoreError::DuplicatePending`] when another
/// pending request shares the same [`PendingKey`], and `transition` only
/// succeeds for a request that is still pending at the moment of the write.
pub trait RequestStore: Send + Sync {
    fn find_pending(&self, key: &PendingKey) -> Result<Option<WorkflowRequest>, RequestStoreError>;

    fn create(&self, request: &WorkflowRequest) -> Result<WorkflowRequest, RequestStoreError>;

    fn transition(
        &self,
        request_id: &RequestId,
        next: RequestStatus,
        now: i64,
    ) -> Result<WorkflowRequest, RequestStoreError>;

    fn find_by_id(&self, request_id: &RequestId)
        -> Result<Option<WorkflowRequest>, RequestStoreError>;

    /// Pending requests on one event, or on every event when `event_id` is `None`; oldest first.
    fn list_pending(
        &self,
        event_id: Option<&EventId>,
    ) -> Result<Vec<WorkflowRequest>, RequestStoreError>;

    fn list_pending_for_sender(
        &self,
        sender_id: &UserId,
        event_id: &EventId,
    ) -> Result<Vec<WorkflowRequest>, RequestStoreError>;
}
