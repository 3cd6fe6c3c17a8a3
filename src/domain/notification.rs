use super::request::RequestKind;
use crate::shared::ids::{NotificationId, UserId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    IncomingRequest,
    RequestApproved,
    RequestDenied,
    Tagged,
    OwnershipTransferred,
    OwnershipRequested,
    OwnershipRequestApproved,
    OwnershipRequestDenied,
}

impl NotificationType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::IncomingRequest => "INCOMING_REQUEST",
            Self::RequestApproved => "REQUEST_APPROVED",
            Self::RequestDenied => "REQUEST_DENIED",
            Self::Tagged => "TAGGED",
            Self::OwnershipTransferred => "OWNERSHIP_TRANSFERRED",
            Self::OwnershipRequested => "OWNERSHIP_REQUESTED",
            Self::OwnershipRequestApproved => "OWNERSHIP_REQUEST_APPROVED",
            Self::OwnershipRequestDenied => "OWNERSHIP_REQUEST_DENIED",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw {
            "INCOMING_REQUEST" => Ok(Self::IncomingRequest),
            "REQUEST_APPROVED" => Ok(Self::RequestApproved),
            "REQUEST_DENIED" => Ok(Self::RequestDenied),
            "TAGGED" => Ok(Self::Tagged),
            "OWNERSHIP_TRANSFERRED" => Ok(Self::OwnershipTransferred),
            "OWNERSHIP_REQUESTED" => Ok(Self::OwnershipRequested),
            "OWNERSHIP_REQUEST_APPROVED" => Ok(Self::OwnershipRequestApproved),
            "OWNERSHIP_REQUEST_DENIED" => Ok(Self::OwnershipRequestDenied),
            other => Err(format!("unknown notification type `{other}`")),
        }
    }

    /// Types whose navigation context lives in the message tail.
    pub fn uses_legacy_tail(self) -> bool {
        matches!(self, Self::Tagged | Self::OwnershipTransferred)
    }
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelatedRequestType {
    Tagging,
    TeamMember,
    Ownership,
    AuthLevelChange,
}

impl RelatedRequestType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tagging => "TAGGING",
            Self::TeamMember => "TEAM_MEMBER",
            Self::Ownership => "OWNERSHIP",
            Self::AuthLevelChange => "AUTH_LEVEL_CHANGE",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw {
            "TAGGING" => Ok(Self::Tagging),
            "TEAM_MEMBER" => Ok(Self::TeamMember),
            "OWNERSHIP" => Ok(Self::Ownership),
            "AUTH_LEVEL_CHANGE" => Ok(Self::AuthLevelChange),
            other => Err(format!("unknown related request type `{other}`")),
        }
    }

    pub fn request_kind(self) -> Option<RequestKind> {
        match self {
            Self::Tagging => Some(RequestKind::Tagging),
            Self::TeamMember => Some(RequestKind::TeamMember),
            Self::Ownership => Some(RequestKind::Ownership),
            Self::AuthLevelChange => None,
        }
    }
}

impl From<RequestKind> for RelatedRequestType {
    fn from(value: RequestKind) -> Self {
        match value {
            RequestKind::Tagging => Self::Tagging,
            RequestKind::TeamMember => Self::TeamMember,
            RequestKind::Ownership => Self::Ownership,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub related_request_type: Option<RelatedRequestType>,
    /// Kept as raw text: legacy rows may hold ids that no longer parse.
    #[serde(default)]
    pub related_request_id: Option<String>,
    pub is_old: bool,
    pub created_at: i64,
}
