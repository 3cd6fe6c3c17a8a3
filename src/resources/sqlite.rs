use super::{ResourceGraph, ResourceGraphError};
use crate::domain::{
    BracketRecord, EventRecord, Role, SectionRecord, TagRecord, TagTarget, VideoRecord,
};
use crate::shared::clock::now_secs;
use crate::shared::ids::{BracketId, EventId, SectionId, UserId, VideoId};
use crate::shared::sqlite::{ensure_parent_dir, open_connection};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct SqliteResourceGraph {
    db_path: PathBuf,
}

impl SqliteResourceGraph {
    pub fn open(db_path: &Path) -> Result<Self, ResourceGraphError> {
        ensure_parent_dir(db_path).map_err(|source| ResourceGraphError::CreateParent {
            path: db_path.display().to_string(),
            source,
        })?;
        let graph = Self {
            db_path: db_path.to_path_buf(),
        };
        let _ = graph.connect()?;
        Ok(graph)
    }

    pub fn ensure_schema(&self) -> Result<(), ResourceGraphError> {
        let connection = self.connect()?;
        connection
            .execute_batch(
                "
                CREATE TABLE IF NOT EXISTS events (
                    event_id TEXT PRIMARY KEY,
                    title TEXT NOT NULL,
                    creator_id TEXT NOT NULL,
                    created_at INTEGER NOT NULL
                );

                CREATE TABLE IF NOT EXISTS event_team_members (
                    event_id TEXT NOT NULL REFERENCES events(event_id) ON DELETE CASCADE,
                    user_id TEXT NOT NULL,
                    position INTEGER NOT NULL,
                    added_at INTEGER NOT NULL,
                    PRIMARY KEY (event_id, user_id)
                );

                CREATE TABLE IF NOT EXISTS sections (
                    section_id TEXT PRIMARY KEY,
                    event_id TEXT NOT NULL REFERENCES events(event_id) ON DELETE CASCADE,
                    title TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS brackets (
                    bracket_id TEXT PRIMARY KEY,
                    section_id TEXT NOT NULL REFERENCES sections(section_id) ON DELETE CASCADE,
                    title TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS videos (
                    video_id TEXT PRIMARY KEY,
                    section_id TEXT NOT NULL REFERENCES sections(section_id) ON DELETE CASCADE,
                    bracket_id TEXT REFERENCES brackets(bracket_id) ON DELETE CASCADE,
                    title TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS resource_tags (
                    resource_kind TEXT NOT NULL,
                    resource_id TEXT NOT NULL,
                    event_id TEXT NOT NULL REFERENCES events(event_id) ON DELETE CASCADE,
                    role TEXT NOT NULL,
                    user_id TEXT NOT NULL,
                    created_at INTEGER NOT NULL,
                    PRIMARY KEY (resource_kind, resource_id, role, user_id)
                );

                CREATE INDEX IF NOT EXISTS idx_event_team_members_position
                    ON event_team_members(event_id, position ASC);
                CREATE INDEX IF NOT EXISTS idx_resource_tags_user
                    ON resource_tags(user_id, event_id);
                ",
            )
            .map_err(|source| ResourceGraphError::Sql { source })?;
        Ok(())
    }

    pub fn create_event(
        &self,
        event_id: &EventId,
        title: &str,
        creator_id: &UserId,
    ) -> Result<EventRecord, ResourceGraphError> {
        let connection = self.connect()?;
        connection
            .execute(
                "
                INSERT INTO events (event_id, title, creator_id, created_at)
                VALUES (?1, ?2, ?3, ?4)
                ",
                params![event_id.as_str(), title, creator_id.as_str(), now_secs()],
            )
            .map_err(|source| ResourceGraphError::Sql { source })?;
        Ok(EventRecord {
            event_id: event_id.clone(),
            title: title.to_string(),
            creator_id: creator_id.clone(),
            team_member_ids: Vec::new(),
        })
    }

    pub fn create_section(
        &self,
        section_id: &SectionId,
        event_id: &EventId,
        title: &str,
    ) -> Result<SectionRecord, ResourceGraphError> {
        let connection = self.connect()?;
        ensure_event_exists(&connection, event_id)?;
        connection
            .execute(
                "INSERT INTO sections (section_id, event_id, title) VALUES (?1, ?2, ?3)",
                params![section_id.as_str(), event_id.as_str(), title],
            )
            .map_err(|source| ResourceGraphError::Sql { source })?;
        Ok(SectionRecord {
            section_id: section_id.clone(),
            event_id: event_id.clone(),
            title: title.to_string(),
        })
    }

    pub fn create_bracket(
        &self,
        bracket_id: &BracketId,
        section_id: &SectionId,
        title: &str,
    ) -> Result<BracketRecord, ResourceGraphError> {
        if self.section(section_id)?.is_none() {
            return Err(ResourceGraphError::UnknownSection {
                section_id: section_id.to_string(),
            });
        }
        let connection = self.connect()?;
        connection
            .execute(
                "INSERT INTO brackets (bracket_id, section_id, title) VALUES (?1, ?2, ?3)",
                params![bracket_id.as_str(), section_id.as_str(), title],
            )
            .map_err(|source| ResourceGraphError::Sql { source })?;
        Ok(BracketRecord {
            bracket_id: bracket_id.clone(),
            section_id: section_id.clone(),
            title: title.to_string(),
        })
    }

    /// A bracketed video is stored against the bracket's section.
    pub fn create_video(
        &self,
        video_id: &VideoId,
        section_id: &SectionId,
        bracket_id: Option<&BracketId>,
        title: &str,
    ) -> Result<VideoRecord, ResourceGraphError> {
        if self.section(section_id)?.is_none() {
            return Err(ResourceGraphError::UnknownSection {
                section_id: section_id.to_string(),
            });
        }
        let connection = self.connect()?;
        if let Some(bracket_id) = bracket_id {
            let bracket_section: Option<String> = connection
                .query_row(
                    "SELECT section_id FROM brackets WHERE bracket_id = ?1",
                    params![bracket_id.as_str()],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|source| ResourceGraphError::Sql { source })?;
            if bracket_section.as_deref() != Some(section_id.as_str()) {
                return Err(ResourceGraphError::InvalidColumn {
                    field: "bracket_id",
                    value: bracket_id.to_string(),
                    reason: format!("bracket does not belong to section `{section_id}`"),
                });
            }
        }
        connection
            .execute(
                "
                INSERT INTO videos (video_id, section_id, bracket_id, title)
                VALUES (?1, ?2, ?3, ?4)
                ",
                params![
                    video_id.as_str(),
                    section_id.as_str(),
                    bracket_id.map(BracketId::as_str),
                    title
                ],
            )
            .map_err(|source| ResourceGraphError::Sql { source })?;
        Ok(VideoRecord {
            video_id: video_id.clone(),
            section_id: section_id.clone(),
            bracket_id: bracket_id.cloned(),
            title: title.to_string(),
        })
    }

    fn connect(&self) -> Result<Connection, ResourceGraphError> {
        open_connection(&self.db_path).map_err(|source| ResourceGraphError::Open {
            path: self.db_path.display().to_string(),
            source,
        })
    }
}

impl ResourceGraph for SqliteResourceGraph {
    fn event(&self, event_id: &EventId) -> Result<Option<EventRecord>, ResourceGraphError> {
        let connection = self.connect()?;
        let row = connection
            .query_row(
                "SELECT title, creator_id FROM events WHERE event_id = ?1",
                params![event_id.as_str()],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()
            .map_err(|source| ResourceGraphError::Sql { source })?;
        let Some((title, creator_raw)) = row else {
            return Ok(None);
        };

        let mut statement = connection
            .prepare(
                "
                SELECT user_id FROM event_team_members
                WHERE event_id = ?1
                ORDER BY position ASC
                ",
            )
            .map_err(|source| ResourceGraphError::Sql { source })?;
        let rows = statement
            .query_map(params![event_id.as_str()], |row| row.get::<_, String>(0))
            .map_err(|source| ResourceGraphError::Sql { source })?;
        let mut team_member_ids = Vec::new();
        for row in rows {
            let raw = row.map_err(|source| ResourceGraphError::Sql { source })?;
            team_member_ids.push(decode_column("user_id", &raw, UserId::parse)?);
        }

        Ok(Some(EventRecord {
            event_id: event_id.clone(),
            title,
            creator_id: decode_column("creator_id", &creator_raw, UserId::parse)?,
            team_member_ids,
        }))
    }

    fn section(&self, section_id: &SectionId) -> Result<Option<SectionRecord>, ResourceGraphError> {
        let connection = self.connect()?;
        let row = connection
            .query_row(
                "SELECT event_id, title FROM sections WHERE section_id = ?1",
                params![section_id.as_str()],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()
            .map_err(|source| ResourceGraphError::Sql { source })?;
        row.map(|(event_raw, title)| {
            Ok(SectionRecord {
                section_id: section_id.clone(),
                event_id: decode_column("event_id", &event_raw, EventId::parse)?,
                title,
            })
        })
        .transpose()
    }

    fn video(&self, video_id: &VideoId) -> Result<Option<VideoRecord>, ResourceGraphError> {
        let connection = self.connect()?;
        let row = connection
            .query_row(
                "SELECT section_id, bracket_id, title FROM videos WHERE video_id = ?1",
                params![video_id.as_str()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()
            .map_err(|source| ResourceGraphError::Sql { source })?;
        row.map(|(section_raw, bracket_raw, title)| {
            Ok(VideoRecord {
                video_id: video_id.clone(),
                section_id: decode_column("section_id", &section_raw, SectionId::parse)?,
                bracket_id: bracket_raw
                    .map(|raw| decode_column("bracket_id", &raw, BracketId::parse))
                    .transpose()?,
                title,
            })
        })
        .transpose()
    }

    fn tag_user(
        &self,
        target: &TagTarget,
        role: Role,
        user_id: &UserId,
    ) -> Result<bool, ResourceGraphError> {
        let connection = self.connect()?;
        ensure_event_exists(&connection, target.event_id())?;
        let inserted = connection
            .execute(
                "
                INSERT INTO resource_tags (
                    resource_kind, resource_id, event_id, role, user_id, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(resource_kind, resource_id, role, user_id) DO NOTHING
                ",
                params![
                    target.resource_kind(),
                    target.resource_id(),
                    target.event_id().as_str(),
                    role.as_canonical(),
                    user_id.as_str(),
                    now_secs(),
                ],
            )
            .map_err(|source| ResourceGraphError::Sql { source })?;
        Ok(inserted > 0)
    }

    fn untag_user(
        &self,
        target: &TagTarget,
        role: Role,
        user_id: &UserId,
    ) -> Result<bool, ResourceGraphError> {
        let connection = self.connect()?;
        let deleted = connection
            .execute(
                "
                DELETE FROM resource_tags
                WHERE resource_kind = ?1 AND resource_id = ?2 AND role = ?3 AND user_id = ?4
                ",
                params![
                    target.resource_kind(),
                    target.resource_id(),
                    role.as_canonical(),
                    user_id.as_str(),
                ],
            )
            .map_err(|source| ResourceGraphError::Sql { source })?;
        Ok(deleted > 0)
    }

    fn tags_for(&self, target: &TagTarget) -> Result<Vec<TagRecord>, ResourceGraphError> {
        let connection = self.connect()?;
        let mut statement = connection
            .prepare(
                "
                SELECT role, user_id, created_at FROM resource_tags
                WHERE resource_kind = ?1 AND resource_id = ?2
                ORDER BY created_at ASC, role ASC, user_id ASC
                ",
            )
            .map_err(|source| ResourceGraphError::Sql { source })?;
        let rows = statement
            .query_map(
                params![target.resource_kind(), target.resource_id()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                    ))
                },
            )
            .map_err(|source| ResourceGraphError::Sql { source })?;

        let mut out = Vec::new();
        for row in rows {
            let (role_raw, user_raw, created_at) =
                row.map_err(|source| ResourceGraphError::Sql { source })?;
            out.push(TagRecord {
                target: target.clone(),
                role: decode_column("role", &role_raw, Role::parse)?,
                user_id: decode_column("user_id", &user_raw, UserId::parse)?,
                created_at,
            });
        }
        Ok(out)
    }

    fn add_team_member(
        &self,
        event_id: &EventId,
        user_id: &UserId,
    ) -> Result<bool, ResourceGraphError> {
        let mut connection = self.connect()?;
        let tx = connection
            .transaction()
            .map_err(|source| ResourceGraphError::Sql { source })?;
        ensure_event_exists(&tx, event_id)?;
        let inserted = insert_team_member(&tx, event_id, user_id)?;
        tx.commit()
            .map_err(|source| ResourceGraphError::Sql { source })?;
        Ok(inserted)
    }

    fn remove_team_member(
        &self,
        event_id: &EventId,
        user_id: &UserId,
    ) -> Result<bool, ResourceGraphError> {
        let connection = self.connect()?;
        ensure_event_exists(&connection, event_id)?;
        let deleted = connection
            .execute(
                "DELETE FROM event_team_members WHERE event_id = ?1 AND user_id = ?2",
                params![event_id.as_str(), user_id.as_str()],
            )
            .map_err(|source| ResourceGraphError::Sql { source })?;
        Ok(deleted > 0)
    }

    fn events_managed_by(&self, user_id: &UserId) -> Result<Vec<EventId>, ResourceGraphError> {
        let connection = self.connect()?;
        let mut statement = connection
            .prepare(
                "
                SELECT event_id FROM events WHERE creator_id = ?1
                UNION
                SELECT event_id FROM event_team_members WHERE user_id = ?1
                ORDER BY event_id ASC
                ",
            )
            .map_err(|source| ResourceGraphError::Sql { source })?;
        let rows = statement
            .query_map(params![user_id.as_str()], |row| row.get::<_, String>(0))
            .map_err(|source| ResourceGraphError::Sql { source })?;
        let mut out = Vec::new();
        for row in rows {
            let raw = row.map_err(|source| ResourceGraphError::Sql { source })?;
            out.push(decode_column("event_id", &raw, EventId::parse)?);
        }
        Ok(out)
    }

    fn transfer_ownership(
        &self,
        event_id: &EventId,
        new_creator_id: &UserId,
    ) -> Result<UserId, ResourceGraphError> {
        let mut connection = self.connect()?;
        let tx = connection
            .transaction()
            .map_err(|source| ResourceGraphError::Sql { source })?;
        let previous_raw: Option<String> = tx
            .query_row(
                "SELECT creator_id FROM events WHERE event_id = ?1",
                params![event_id.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(|source| ResourceGraphError::Sql { source })?;
        let Some(previous_raw) = previous_raw else {
            return Err(ResourceGraphError::UnknownEvent {
                event_id: event_id.to_string(),
            });
        };
        let previous = decode_column("creator_id", &previous_raw, UserId::parse)?;
        if &previous == new_creator_id {
            return Ok(previous);
        }

        tx.execute(
            "UPDATE events SET creator_id = ?2 WHERE event_id = ?1",
            params![event_id.as_str(), new_creator_id.as_str()],
        )
        .map_err(|source| ResourceGraphError::Sql { source })?;
        tx.execute(
            "DELETE FROM event_team_members WHERE event_id = ?1 AND user_id = ?2",
            params![event_id.as_str(), new_creator_id.as_str()],
        )
        .map_err(|source| ResourceGraphError::Sql { source })?;
        // The previous owner keeps edit access as a regular team member.
        insert_team_member(&tx, event_id, &previous)?;
        tx.commit()
            .map_err(|source| ResourceGraphError::Sql { source })?;
        Ok(previous)
    }
}

fn ensure_event_exists(
    connection: &Connection,
    event_id: &EventId,
) -> Result<(), ResourceGraphError> {
    let exists = connection
        .query_row(
            "SELECT 1 FROM events WHERE event_id = ?1 LIMIT 1",
            params![event_id.as_str()],
            |row| row.get::<_, i64>(0),
        )
        .optional()
        .map_err(|source| ResourceGraphError::Sql { source })?
        .is_some();
    if !exists {
        return Err(ResourceGraphError::UnknownEvent {
            event_id: event_id.to_string(),
        });
    }
    Ok(())
}

fn insert_team_member(
    connection: &Connection,
    event_id: &EventId,
    user_id: &UserId,
) -> Result<bool, ResourceGraphError> {
    let inserted = connection
        .execute(
            "
            INSERT INTO event_team_members (event_id, user_id, position, added_at)
            SELECT ?1, ?2, COALESCE(MAX(position), 0) + 1, ?3
            FROM event_team_members WHERE event_id = ?1
            ON CONFLICT(event_id, user_id) DO NOTHING
            ",
            params![event_id.as_str(), user_id.as_str(), now_secs()],
        )
        .map_err(|source| ResourceGraphError::Sql { source })?;
    Ok(inserted > 0)
}

fn decode_column<T>(
    field: &'static str,
    raw: &str,
    parse: impl FnOnce(&str) -> Result<T, String>,
) -> Result<T, ResourceGraphError> {
    parse(raw).map_err(|reason| ResourceGraphError::InvalidColumn {
        field,
        value: raw.to_string(),
        reason,
    })
}
