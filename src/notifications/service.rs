use super::navigation::NavigationContext;
use super::store::NotificationStore;
use crate::domain::{
    Notification, NotificationType, RelatedRequestType, Role, TagTarget, WorkflowRequest,
};
use crate::shared::clock::now_secs;
use crate::shared::ids::{EventId, NotificationId, UserId};
use crate::shared::WorkflowError;

/// Builds and appends notifications. `TAGGED` and `OWNERSHIP_TRANSFERRED` carry a
/// legacy message tail; every other type links through
/// `related_request_type`/`related_request_id`.
#[derive(Clone, Copy)]
pub struct NotificationService<'a> {
    store: &'a dyn NotificationStore,
}

struct Draft {
    notification_type: NotificationType,
    title: String,
    message: String,
    related: Option<(RelatedRequestType, String)>,
}

impl<'a> NotificationService<'a> {
    pub fn new(store: &'a dyn NotificationStore) -> Self {
        Self { store }
    }

    pub fn notify_incoming_request(
        &self,
        recipients: &[UserId],
        request: &WorkflowRequest,
    ) -> Result<Vec<Notification>, WorkflowError> {
        let (title, message) = match request {
            WorkflowRequest::Tagging(tagging) => (
                "New tagging request".to_string(),
                format!(
                    "{} asked to tag {} as {} on {}",
                    tagging.sender_id,
                    tagging.target_user_id,
                    tagging.role,
                    describe_tagging(request)
                ),
            ),
            WorkflowRequest::TeamMember(team) => (
                "New team member request".to_string(),
                format!(
                    "{} asked to join the team of event {}",
                    team.sender_id, team.event_id
                ),
            ),
            WorkflowRequest::Ownership(ownership) => (
                "New ownership request".to_string(),
                format!(
                    "{} asked to take over ownership of event {}",
                    ownership.sender_id, ownership.event_id
                ),
            ),
        };
        let mut out = Vec::with_capacity(recipients.len());
        for recipient in recipients {
            out.push(self.append(
                recipient,
                Draft {
                    notification_type: NotificationType::IncomingRequest,
                    title: title.clone(),
                    message: message.clone(),
                    related: Some(related(request)),
                },
            )?);
        }
        Ok(out)
    }

    pub fn notify_ownership_requested(
        &self,
        owner_id: &UserId,
        request: &WorkflowRequest,
    ) -> Result<Notification, WorkflowError> {
        self.append(
            owner_id,
            Draft {
                notification_type: NotificationType::OwnershipRequested,
                title: "Ownership requested".to_string(),
                message: format!(
                    "{} asked to take over ownership of event {}",
                    request.sender_id(),
                    request.event_id()
                ),
                related: Some(related(request)),
            },
        )
    }

    pub fn notify_request_approved(
        &self,
        request: &WorkflowRequest,
    ) -> Result<Notification, WorkflowError> {
        let (notification_type, title) = match request {
            WorkflowRequest::Ownership(_) => (
                NotificationType::OwnershipRequestApproved,
                "Ownership request approved",
            ),
            _ => (NotificationType::RequestApproved, "Request approved"),
        };
        self.append(
            request.sender_id(),
            Draft {
                notification_type,
                title: title.to_string(),
                message: format!("Your request to {} was approved", describe_request(request)),
                related: Some(related(request)),
            },
        )
    }

    pub fn notify_request_denied(
        &self,
        request: &WorkflowRequest,
    ) -> Result<Notification, WorkflowError> {
        let (notification_type, title) = match request {
            WorkflowRequest::Ownership(_) => (
                NotificationType::OwnershipRequestDenied,
                "Ownership request denied",
            ),
            _ => (NotificationType::RequestDenied, "Request denied"),
        };
        self.append(
            request.sender_id(),
            Draft {
                notification_type,
                title: title.to_string(),
                message: format!("Your request to {} was denied", describe_request(request)),
                related: Some(related(request)),
            },
        )
    }

    pub fn notify_tagged(
        &self,
        user_id: &UserId,
        tagged_by: &UserId,
        role: Role,
        target: &TagTarget,
        navigation: &NavigationContext,
    ) -> Result<Notification, WorkflowError> {
        self.append(
            user_id,
            Draft {
                notification_type: NotificationType::Tagged,
                title: "You were tagged".to_string(),
                message: format!(
                    "{tagged_by} tagged you as {role} on {target}{}",
                    navigation.encode_legacy_tail()
                ),
                related: None,
            },
        )
    }

    pub fn notify_ownership_transferred(
        &self,
        user_id: &UserId,
        event_id: &EventId,
        new_owner_id: &UserId,
        request: Option<&WorkflowRequest>,
    ) -> Result<Notification, WorkflowError> {
        self.append(
            user_id,
            Draft {
                notification_type: NotificationType::OwnershipTransferred,
                title: "Ownership transferred".to_string(),
                message: format!(
                    "Ownership of event {event_id} was transferred to {new_owner_id}{}",
                    NavigationContext::from_parts(event_id.as_str(), None, None)
                        .encode_legacy_tail()
                ),
                related: request.map(related),
            },
        )
    }

    pub fn list_for_user(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<Notification>, WorkflowError> {
        Ok(self.store.list_for_user(user_id, limit)?)
    }

    pub fn count_unread(&self, user_id: &UserId) -> Result<usize, WorkflowError> {
        Ok(self.store.count_unread(user_id)?)
    }

    /// Another user's notification is reported as missing.
    pub fn find_owned(
        &self,
        user_id: &UserId,
        notification_id: &NotificationId,
    ) -> Result<Notification, WorkflowError> {
        match self.store.find_by_id(notification_id)? {
            Some(notification) if &notification.user_id == user_id => Ok(notification),
            _ => Err(WorkflowError::not_found("notification", notification_id)),
        }
    }

    pub fn mark_as_old(
        &self,
        user_id: &UserId,
        notification_id: &NotificationId,
    ) -> Result<(), WorkflowError> {
        let notification = self.find_owned(user_id, notification_id)?;
        if notification.is_old {
            return Ok(());
        }
        if !self.store.mark_old(notification_id)? {
            return Err(WorkflowError::not_found("notification", notification_id));
        }
        Ok(())
    }

    pub fn mark_all_as_old(&self, user_id: &UserId) -> Result<usize, WorkflowError> {
        Ok(self.store.mark_all_old(user_id)?)
    }

    fn append(&self, user_id: &UserId, draft: Draft) -> Result<Notification, WorkflowError> {
        let now = now_secs();
        let (related_request_type, related_request_id) = match draft.related {
            Some((kind, id)) => (Some(kind), Some(id)),
            None => (None, None),
        };
        let notification = Notification {
            id: NotificationId::generate(now).map_err(WorkflowError::Internal)?,
            user_id: user_id.clone(),
            notification_type: draft.notification_type,
            title: draft.title,
            message: draft.message,
            related_request_type,
            related_request_id,
            is_old: false,
            created_at: now,
        };
        self.store.append(&notification)?;
        tracing::debug!(
            notification_id = %notification.id,
            user_id = %notification.user_id,
            notification_type = %notification.notification_type,
            "notification appended"
        );
        Ok(notification)
    }
}

fn related(request: &WorkflowRequest) -> (RelatedRequestType, String) {
    (request.kind().into(), request.id().to_string())
}

fn describe_tagging(request: &WorkflowRequest) -> String {
    match request {
        WorkflowRequest::Tagging(tagging) => match tagging.target() {
            Ok(target) => target.to_string(),
            Err(_) => format!("event {}", tagging.event_id),
        },
        other => format!("event {}", other.event_id()),
    }
}

fn describe_request(request: &WorkflowRequest) -> String {
    match request {
        WorkflowRequest::Tagging(tagging) => format!(
            "tag {} as {} on {}",
            tagging.target_user_id,
            tagging.role,
            describe_tagging(request)
        ),
        WorkflowRequest::TeamMember(team) => {
            format!("join the team of event {}", team.event_id)
        }
        WorkflowRequest::Ownership(ownership) => {
            format!("take over ownership of event {}", ownership.event_id)
        }
    }
}
