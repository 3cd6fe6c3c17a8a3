use super::store::{NotificationStore, NotificationStoreError};
use crate::domain::{Notification, NotificationType, RelatedRequestType};
use crate::shared::ids::{NotificationId, UserId};
use crate::shared::sqlite::{ensure_parent_dir, open_connection};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};

const NOTIFICATION_COLUMNS: &str = "notification_id, user_id, notification_type, title, message, \
                                    related_request_type, related_request_id, is_old, created_at";

#[derive(Debug, Clone)]
pub struct SqliteNotificationStore {
    db_path: PathBuf,
}

struct NotificationRow {
    notification_id: String,
    user_id: String,
    notification_type: String,
    title: String,
    message: String,
    related_request_type: Option<String>,
    related_request_id: Option<String>,
    is_old: bool,
    created_at: i64,
}

impl SqliteNotificationStore {
    pub fn open(db_path: &Path) -> Result<Self, NotificationStoreError> {
        ensure_parent_dir(db_path).map_err(|source| NotificationStoreError::CreateParent {
            path: db_path.display().to_string(),
            source,
        })?;
        let store = Self {
            db_path: db_path.to_path_buf(),
        };
        let _ = store.connect()?;
        Ok(store)
    }

    pub fn ensure_schema(&self) -> Result<(), NotificationStoreError> {
        let connection = self.connect()?;
        connection
            .execute_batch(
                "
                CREATE TABLE IF NOT EXISTS notifications (
                    notification_id TEXT PRIMARY KEY,
                    user_id TEXT NOT NULL,
                    notification_type TEXT NOT NULL,
                    title TEXT NOT NULL,
                    message TEXT NOT NULL,
                    related_request_type TEXT,
                    related_request_id TEXT,
                    is_old INTEGER NOT NULL DEFAULT 0,
                    created_at INTEGER NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_notifications_user_created
                    ON notifications(user_id, created_at DESC);
                ",
            )
            .map_err(|source| NotificationStoreError::Sql { source })?;
        Ok(())
    }

    fn connect(&self) -> Result<Connection, NotificationStoreError> {
        open_connection(&self.db_path).map_err(|source| NotificationStoreError::Open {
            path: self.db_path.display().to_string(),
            source,
        })
    }
}

impl NotificationStore for SqliteNotificationStore {
    fn append(&self, notification: &Notification) -> Result<(), NotificationStoreError> {
        let connection = self.connect()?;
        let inserted = connection
            .execute(
                "
                INSERT INTO notifications (
                    notification_id, user_id, notification_type, title, message,
                    related_request_type, related_request_id, is_old, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                ON CONFLICT(notification_id) DO NOTHING
                ",
                params![
                    notification.id.as_str(),
                    notification.user_id.as_str(),
                    notification.notification_type.as_str(),
                    notification.title,
                    notification.message,
                    notification.related_request_type.map(RelatedRequestType::as_str),
                    notification.related_request_id,
                    notification.is_old,
                    notification.created_at,
                ],
            )
            .map_err(|source| NotificationStoreError::Sql { source })?;
        if inserted == 0 {
            return Err(NotificationStoreError::DuplicateId {
                notification_id: notification.id.to_string(),
            });
        }
        Ok(())
    }

    fn list_for_user(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<Notification>, NotificationStoreError> {
        let connection = self.connect()?;
        let sql = format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications
             WHERE user_id = ?1
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?2"
        );
        let mut statement = connection
            .prepare(&sql)
            .map_err(|source| NotificationStoreError::Sql { source })?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = statement
            .query_map(params![user_id.as_str(), limit], read_row)
            .map_err(|source| NotificationStoreError::Sql { source })?;

        let mut out = Vec::new();
        for row in rows {
            let row = row.map_err(|source| NotificationStoreError::Sql { source })?;
            out.push(decode_row(row)?);
        }
        Ok(out)
    }

    fn find_by_id(
        &self,
        notification_id: &NotificationId,
    ) -> Result<Option<Notification>, NotificationStoreError> {
        let connection = self.connect()?;
        let sql =
            format!("SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE notification_id = ?1");
        let row = connection
            .query_row(&sql, params![notification_id.as_str()], read_row)
            .optional()
            .map_err(|source| NotificationStoreError::Sql { source })?;
        row.map(decode_row).transpose()
    }

    fn mark_old(&self, notification_id: &NotificationId) -> Result<bool, NotificationStoreError> {
        let connection = self.connect()?;
        let updated = connection
            .execute(
                "UPDATE notifications SET is_old = 1 WHERE notification_id = ?1",
                params![notification_id.as_str()],
            )
            .map_err(|source| NotificationStoreError::Sql { source })?;
        Ok(updated > 0)
    }

    fn mark_all_old(&self, user_id: &UserId) -> Result<usize, NotificationStoreError> {
        let connection = self.connect()?;
        connection
            .execute(
                "UPDATE notifications SET is_old = 1 WHERE user_id = ?1 AND is_old = 0",
                params![user_id.as_str()],
            )
            .map_err(|source| NotificationStoreError::Sql { source })
    }

    fn count_unread(&self, user_id: &UserId) -> Result<usize, NotificationStoreError> {
        let connection = self.connect()?;
        let count: i64 = connection
            .query_row(
                "SELECT COUNT(*) FROM notifications WHERE user_id = ?1 AND is_old = 0",
                params![user_id.as_str()],
                |row| row.get(0),
            )
            .map_err(|source| NotificationStoreError::Sql { source })?;
        Ok(count as usize)
    }
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<NotificationRow> {
    Ok(NotificationRow {
        notification_id: row.get(0)?,
        user_id: row.get(1)?,
        notification_type: row.get(2)?,
        title: row.get(3)?,
        message: row.get(4)?,
        related_request_type: row.get(5)?,
        related_request_id: row.get(6)?,
        is_old: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn decode_row(row: NotificationRow) -> Result<Notification, NotificationStoreError> {
    Ok(Notification {
        id: decode_column("notification_id", &row.notification_id, NotificationId::parse)?,
        user_id: decode_column("user_id", &row.user_id, UserId::parse)?,
        notification_type: decode_column(
            "notification_type",
            &row.notification_type,
            NotificationType::parse,
        )?,
        title: row.title,
        message: row.message,
        related_request_type: row
            .related_request_type
            .map(|raw| decode_column("related_request_type", &raw, RelatedRequestType::parse))
            .transpose()?,
        related_request_id: row.related_request_id,
        is_old: row.is_old,
        created_at: row.created_at,
    })
}

fn decode_column<T>(
    field: &'static str,
    raw: &str,
    parse: impl FnOnce(&str) -> Result<T, String>,
) -> Result<T, NotificationStoreError> {
    parse(raw).map_err(|reason| NotificationStoreError::InvalidColumn {
        field,
        value: raw.to_string(),
        reason,
    })
}
