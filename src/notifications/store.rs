use crate::domain::Notification;
use crate::shared::ids::{NotificationId, UserId};
use crate::shared::WorkflowError;

#[derive(Debug, thiserror::Error)]
pub enum NotificationStoreError {
    #[error("sqlite open failed at {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: rusqlite::Error,
    },
    #[error("failed to create notification database parent {path}: {source}")]
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
    #[error("notification `{notification_id}` already exists")]
    DuplicateId { notification_id: String },
    #[error("invalid {field} `{value}` in database: {reason}")]
    InvalidColumn {
        field: &'static str,
        value: String,
        reason: String,
    },
}

impl From<NotificationStoreError> for WorkflowError {
    fn from(value: NotificationStoreError) -> Self {
        WorkflowError::Internal(value.to_string())
    }
}

/// Append-only notification storage; `is_old` is the only mutable column.
pub trait NotificationStore: Send + Sync {
    fn append(&self, notification: &Notification) -> Result<(), NotificationStoreError>;

    /// Newest first.
    fn list_for_user(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<Notification>, NotificationStoreError>;

    fn find_by_id(
        &self,
        notification_id: &NotificationId,
    ) -> Result<Option<Notification>, NotificationStoreError>;

    /// Returns `false` when the notification does not exist.
    fn mark_old(&self, notification_id: &NotificationId) -> Result<bool, NotificationStoreError>;

    /// Returns how many notifications flipped from new to old.
    fn mark_all_old(&self, user_id: &UserId) -> Result<usize, NotificationStoreError>;

    fn count_unread(&self, user_id: &UserId) -> Result<usize, NotificationStoreError>;
}
