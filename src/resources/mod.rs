pub mod sqlite;

use crate::domain::{EventRecord, Role, SectionRecord, TagRecord, TagTarget, VideoRecord};
use crate::shared::ids::{EventId, SectionId, UserId, VideoId};
use crate::shared::WorkflowError;

pub use sqlite::SqliteResourceGraph;

#[derive(Debug, thiserror::Error)]
pub enum ResourceGraphError {
    #[error("sqlite open failed at {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: rusqlite::Error,
    },
    #[error("failed to create resource database parent {path}: {source}")]
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
    #[error("event `{event_id}` not found")]
    UnknownEvent { event_id: String },
    #[error("section `{section_id}` not found")]
    UnknownSection { section_id: String },
    #[error("invalid {field} `{value}` in database: {reason}")]
    InvalidColumn {
        field: &'static str,
        value: String,
        reason: String,
    },
}

impl From<ResourceGraphError> for WorkflowError {
    fn from(value: ResourceGraphError) -> Self {
        match value {
            ResourceGraphError::UnknownEvent { event_id } => {
                WorkflowError::not_found("event", event_id)
            }
            ResourceGraphError::UnknownSection { section_id } => {
                WorkflowError::not_found("section", section_id)
            }
            other => WorkflowError::Internal(other.to_string()),
        }
    }
}

/// Mutation and lookup capabilities over events, sections and videos.
pub trait ResourceGraph: Send + Sync {
    fn event(&self, event_id: &EventId) -> Result<Option<EventRecord>, ResourceGraphError>;

    fn section(&self, section_id: &SectionId) -> Result<Option<SectionRecord>, ResourceGraphError>;

    fn video(&self, video_id: &VideoId) -> Result<Option<VideoRecord>, ResourceGraphError>;

    fn is_creator(&self, event_id: &EventId, user_id: &UserId) -> Result<bool, ResourceGraphError> {
        Ok(self
            .event(event_id)?
            .is_some_and(|event| event.is_creator(user_id)))
    }

    /// The creator counts as a team member.
    fn is_team_member(
        &self,
        event_id: &EventId,
        user_id: &UserId,
    ) -> Result<bool, ResourceGraphError> {
        Ok(self
            .event(event_id)?
            .is_some_and(|event| event.is_team_member(user_id)))
    }

    /// Returns `false` when the tag already existed.
    fn tag_user(
        &self,
        target: &TagTarget,
        role: Role,
        user_id: &UserId,
    ) -> Result<bool, ResourceGraphError>;

    /// Returns `false` when there was nothing to remove.
    fn untag_user(
        &self,
        target: &TagTarget,
        role: Role,
        user_id: &UserId,
    ) -> Result<bool, ResourceGraphError>;

    fn tags_for(&self, target: &TagTarget) -> Result<Vec<TagRecord>, ResourceGraphError>;

    /// Returns `false` when the user was already on the team.
    fn add_team_member(
        &self,
        event_id: &EventId,
        user_id: &UserId,
    ) -> Result<bool, ResourceGraphError>;

    fn remove_team_member(
        &self,
        event_id: &EventId,
        user_id: &UserId,
    ) -> Result<bool, ResourceGraphError>;

    /// Events the user created or joins as a team member, ordered by id.
    fn events_managed_by(&self, user_id: &UserId) -> Result<Vec<EventId>, ResourceGraphError>;

    /// Makes `new_creator_id` the creator and returns the previous creator.
    fn transfer_ownership(
        &self,
        event_id: &EventId,
        new_creator_id: &UserId,
    ) -> Result<UserId, ResourceGraphError>;
}
