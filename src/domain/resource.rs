use super::roles::RoleScope;
use crate::shared::ids::{BracketId, EventId, SectionId, UserId, VideoId};
use serde::{Deserialize, Serialize};

/// What a tag attaches to. A tag names a section or a video, never both.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TagTarget {
    Event {
        event_id: EventId,
    },
    Section {
        event_id: EventId,
        section_id: SectionId,
    },
    Video {
        event_id: EventId,
        video_id: VideoId,
    },
}

impl TagTarget {
    pub fn from_parts(
        event_id: EventId,
        video_id: Option<VideoId>,
        section_id: Option<SectionId>,
    ) -> Result<Self, String> {
        match (video_id, section_id) {
            (Some(_), Some(_)) => {
                Err("a tag may reference a video or a section, not both".to_string())
            }
            (Some(video_id), None) => Ok(Self::Video { event_id, video_id }),
            (None, Some(section_id)) => Ok(Self::Section {
                event_id,
                section_id,
            }),
            (None, None) => Ok(Self::Event { event_id }),
        }
    }

    pub fn event_id(&self) -> &EventId {
        match self {
            Self::Event { event_id }
            | Self::Section { event_id, .. }
            | Self::Video { event_id, .. } => event_id,
        }
    }

    pub fn section_id(&self) -> Option<&SectionId> {
        match self {
            Self::Section { section_id, .. } => Some(section_id),
            _ => None,
        }
    }

    pub fn video_id(&self) -> Option<&VideoId> {
        match self {
            Self::Video { video_id, .. } => Some(video_id),
            _ => None,
        }
    }

    pub fn role_scope(&self) -> RoleScope {
        match self {
            Self::Event { .. } => RoleScope::Event,
            Self::Section { .. } => RoleScope::Section,
            Self::Video { .. } => RoleScope::Video,
        }
    }

    pub fn resource_kind(&self) -> &'static str {
        self.role_scope().as_str()
    }

    pub fn resource_id(&self) -> &str {
        match self {
            Self::Event { event_id } => event_id.as_str(),
            Self::Section { section_id, .. } => section_id.as_str(),
            Self::Video { video_id, .. } => video_id.as_str(),
        }
    }
}

impl std::fmt::Display for TagTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Event { event_id } => write!(f, "event {event_id}"),
            Self::Section {
                event_id,
                section_id,
            } => write!(f, "section {section_id} of event {event_id}"),
            Self::Video { event_id, video_id } => {
                write!(f, "video {video_id} of event {event_id}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub event_id: EventId,
    pub title: String,
    pub creator_id: UserId,
    /// Ordered by join time; never contains the creator.
    pub team_member_ids: Vec<UserId>,
}

impl EventRecord {
    pub fn is_creator(&self, user_id: &UserId) -> bool {
        &self.creator_id == user_id
    }

    pub fn is_team_member(&self, user_id: &UserId) -> bool {
        self.is_creator(user_id) || self.team_member_ids.contains(user_id)
    }

    /// Creator first, then team members in join order.
    pub fn approvers(&self) -> Vec<UserId> {
        let mut out = Vec::with_capacity(self.team_member_ids.len() + 1);
        out.push(self.creator_id.clone());
        out.extend(
            self.team_member_ids
                .iter()
                .filter(|id| **id != self.creator_id)
                .cloned(),
        );
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionRecord {
    pub section_id: SectionId,
    pub event_id: EventId,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketRecord {
    pub bracket_id: BracketId,
    pub section_id: SectionId,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    pub video_id: VideoId,
    pub section_id: SectionId,
    #[serde(default)]
    pub bracket_id: Option<BracketId>,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagRecord {
    pub target: TagTarget,
    pub role: super::roles::Role,
    pub user_id: UserId,
    pub created_at: i64,
}
