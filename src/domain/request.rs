use super::resource::TagTarget;
use super::roles::Role;
use crate::shared::ids::{EventId, RequestId, SectionId, UserId, VideoId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Pending,
    Approved,
    Denied,
    Cancelled,
}

impl RequestStatus {
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (RequestStatus::Pending, RequestStatus::Approved)
                | (RequestStatus::Pending, RequestStatus::Denied)
                | (RequestStatus::Pending, RequestStatus::Cancelled)
        )
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "PENDING",
            RequestStatus::Approved => "APPROVED",
            RequestStatus::Denied => "DENIED",
            RequestStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw {
            "PENDING" => Ok(RequestStatus::Pending),
            "APPROVED" => Ok(RequestStatus::Approved),
            "DENIED" => Ok(RequestStatus::Denied),
            "CANCELLED" => Ok(RequestStatus::Cancelled),
            other => Err(format!("unknown request status `{other}`")),
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestKind {
    Tagging,
    TeamMember,
    Ownership,
}

impl RequestKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestKind::Tagging => "TAGGING",
            RequestKind::TeamMember => "TEAM_MEMBER",
            RequestKind::Ownership => "OWNERSHIP",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "TAGGING" => Ok(RequestKind::Tagging),
            "TEAM_MEMBER" => Ok(RequestKind::TeamMember),
            "OWNERSHIP" => Ok(RequestKind::Ownership),
            _ => Err(format!(
                "request kind must be one of: TAGGING, TEAM_MEMBER, OWNERSHIP; got `{raw}`"
            )),
        }
    }
}

impl std::fmt::Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaggingRequest {
    pub id: RequestId,
    pub event_id: EventId,
    #[serde(default)]
    pub video_id: Option<VideoId>,
    #[serde(default)]
    pub section_id: Option<SectionId>,
    pub role: Role,
    pub sender_id: UserId,
    pub target_user_id: UserId,
    pub status: RequestStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

impl TaggingRequest {
    pub fn target(&self) -> Result<TagTarget, String> {
        TagTarget::from_parts(
            self.event_id.clone(),
            self.video_id.clone(),
            self.section_id.clone(),
        )
    }
}

/// Team-member requests are self-requests: the sender is the user who joins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMemberRequest {
    pub id: RequestId,
    pub event_id: EventId,
    pub sender_id: UserId,
    pub status: RequestStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Ownership requests are self-requests: the sender becomes the event creator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnershipRequest {
    pub id: RequestId,
    pub event_id: EventId,
    pub sender_id: UserId,
    pub status: RequestStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowRequest {
    Tagging(TaggingRequest),
    TeamMember(TeamMemberRequest),
    Ownership(OwnershipRequest),
}

impl WorkflowRequest {
    pub fn id(&self) -> &RequestId {
        match self {
            Self::Tagging(request) => &request.id,
            Self::TeamMember(request) => &request.id,
            Self::Ownership(request) => &request.id,
        }
    }

    pub fn kind(&self) -> RequestKind {
        match self {
            Self::Tagging(_) => RequestKind::Tagging,
            Self::TeamMember(_) => RequestKind::TeamMember,
            Self::Ownership(_) => RequestKind::Ownership,
        }
    }

    pub fn event_id(&self) -> &EventId {
        match self {
            Self::Tagging(request) => &request.event_id,
            Self::TeamMember(request) => &request.event_id,
            Self::Ownership(request) => &request.event_id,
        }
    }

    pub fn sender_id(&self) -> &UserId {
        match self {
            Self::Tagging(request) => &request.sender_id,
            Self::TeamMember(request) => &request.sender_id,
            Self::Ownership(request) => &request.sender_id,
        }
    }

    pub fn target_user_id(&self) -> &UserId {
        match self {
            Self::Tagging(request) => &request.target_user_id,
            Self::TeamMember(request) => &request.sender_id,
            Self::Ownership(request) => &request.sender_id,
        }
    }

    pub fn status(&self) -> RequestStatus {
        match self {
            Self::Tagging(request) => request.status,
            Self::TeamMember(request) => request.status,
            Self::Ownership(request) => request.status,
        }
    }

    pub fn created_at(&self) -> i64 {
        match self {
            Self::Tagging(request) => request.created_at,
            Self::TeamMember(request) => request.created_at,
            Self::Ownership(request) => request.created_at,
        }
    }

    pub fn role(&self) -> Option<Role> {
        match self {
            Self::Tagging(request) => Some(request.role),
            Self::TeamMember(_) | Self::Ownership(_) => None,
        }
    }

    pub fn pending_key(&self) -> PendingKey {
        match self {
            Self::Tagging(request) => PendingKey {
                kind: RequestKind::Tagging,
                sender_id: request.sender_id.clone(),
                target_user_id: request.target_user_id.clone(),
                event_id: request.event_id.clone(),
                video_id: request.video_id.clone(),
                section_id: request.section_id.clone(),
                role: Some(request.role),
            },
            Self::TeamMember(request) => {
                PendingKey::self_request(RequestKind::TeamMember, &request.sender_id, &request.event_id)
            }
            Self::Ownership(request) => {
                PendingKey::self_request(RequestKind::Ownership, &request.sender_id, &request.event_id)
            }
        }
    }

    pub(crate) fn with_status(mut self, status: RequestStatus, now: i64) -> Self {
        match &mut self {
            Self::Tagging(request) => {
                request.status = status;
                request.updated_at = now;
            }
            Self::TeamMember(request) => {
                request.status = status;
                request.updated_at = now;
            }
            Self::Ownership(request) => {
                request.status = status;
                request.updated_at = now;
            }
        }
        self
    }
}

/// The tuple that admits at most one pending request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PendingKey {
    pub kind: RequestKind,
    pub sender_id: UserId,
    pub target_user_id: UserId,
    pub event_id: EventId,
    pub video_id: Option<VideoId>,
    pub section_id: Option<SectionId>,
    pub role: Option<Role>,
}

impl PendingKey {
    pub fn tagging(sender_id: &UserId, target_user_id: &UserId, target: &TagTarget, role: Role) -> Self {
        Self {
            kind: RequestKind::Tagging,
            sender_id: sender_id.clone(),
            target_user_id: target_user_id.clone(),
            event_id: target.event_id().clone(),
            video_id: target.video_id().cloned(),
            section_id: target.section_id().cloned(),
            role: Some(role),
        }
    }

    pub fn self_request(kind: RequestKind, sender_id: &UserId, event_id: &EventId) -> Self {
        Self {
            kind,
            sender_id: sender_id.clone(),
            target_user_id: sender_id.clone(),
            event_id: event_id.clone(),
            video_id: None,
            section_id: None,
            role: None,
        }
    }
}
