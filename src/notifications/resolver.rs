use super::navigation::{decode_legacy_tail, NavigationContext};
use crate::domain::{Notification, NotificationType, RelatedRequestType, RequestKind, WorkflowRequest};
use crate::requests::store::RequestStore;
use crate::resources::ResourceGraph;
use crate::shared::ids::{RequestId, SectionId, VideoId};
use std::collections::BTreeMap;

pub const DEFAULT_DASHBOARD_PATH: &str = "/dashboard#requests";

/// Read-only access the resolver needs to turn related ids into navigation.
///
/// Lookups are infallible from the resolver's point of view: an implementation
/// that hits a storage error reports it and answers `None`.
pub trait RelatedRequestLookup {
    fn find_request(&self, kind: RequestKind, request_id: &str) -> Option<WorkflowRequest>;

    fn section_for_video(&self, _video_id: &VideoId) -> Option<SectionId> {
        None
    }
}

/// Resolves only what the notification itself carries.
pub struct NoLookup;

impl RelatedRequestLookup for NoLookup {
    fn find_request(&self, _kind: RequestKind, _request_id: &str) -> Option<WorkflowRequest> {
        None
    }
}

impl RelatedRequestLookup for BTreeMap<String, WorkflowRequest> {
    fn find_request(&self, kind: RequestKind, request_id: &str) -> Option<WorkflowRequest> {
        self.get(request_id)
            .filter(|request| request.kind() == kind)
            .cloned()
    }
}

pub struct StoreLookup<'a> {
    pub requests: &'a dyn RequestStore,
    pub resources: &'a dyn ResourceGraph,
}

impl RelatedRequestLookup for StoreLookup<'_> {
    fn find_request(&self, kind: RequestKind, request_id: &str) -> Option<WorkflowRequest> {
        let request_id = RequestId::parse(request_id).ok()?;
        match self.requests.find_by_id(&request_id) {
            Ok(found) => found.filter(|request| request.kind() == kind),
            Err(err) => {
                tracing::warn!(%request_id, error = %err, "related request lookup failed");
                None
            }
        }
    }

    fn section_for_video(&self, video_id: &VideoId) -> Option<SectionId> {
        match self.resources.video(video_id) {
            Ok(found) => found.map(|video| video.section_id),
            Err(err) => {
                tracing::warn!(%video_id, error = %err, "video lookup failed");
                None
            }
        }
    }
}

/// Maps a notification to the in-app path it should open, or `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationTargetResolver {
    dashboard_path: String,
}

impl Default for NotificationTargetResolver {
    fn default() -> Self {
        Self::new(DEFAULT_DASHBOARD_PATH)
    }
}

impl NotificationTargetResolver {
    pub fn new(dashboard_path: impl Into<String>) -> Self {
        Self {
            dashboard_path: dashboard_path.into(),
        }
    }

    pub fn dashboard_path(&self) -> &str {
        &self.dashboard_path
    }

    pub fn resolve(
        &self,
        notification: &Notification,
        lookup: &dyn RelatedRequestLookup,
    ) -> Option<String> {
        self.resolve_context(notification, lookup)
            .map(|target| match target {
                Target::Dashboard => self.dashboard_path.clone(),
                Target::Context(context) => context.path(),
            })
    }

    fn resolve_context(
        &self,
        notification: &Notification,
        lookup: &dyn RelatedRequestLookup,
    ) -> Option<Target> {
        let related_type = notification.related_request_type;
        let related_id = notification.related_request_id.as_deref();

        match notification.notification_type {
            NotificationType::IncomingRequest => related_type.map(|_| Target::Dashboard),
            NotificationType::RequestApproved | NotificationType::RequestDenied => {
                match related_type? {
                    RelatedRequestType::Tagging => {
                        let request = lookup.find_request(RequestKind::Tagging, related_id?)?;
                        tagging_context(&request, lookup).map(Target::Context)
                    }
                    RelatedRequestType::TeamMember => {
                        let request = lookup.find_request(RequestKind::TeamMember, related_id?)?;
                        Some(event_target(&request))
                    }
                    RelatedRequestType::Ownership | RelatedRequestType::AuthLevelChange => None,
                }
            }
            NotificationType::Tagged => decode_legacy_tail(&notification.message).map(Target::Context),
            NotificationType::OwnershipTransferred => decode_legacy_tail(&notification.message)
                .map(|context| Target::Context(context.event_only()))
                .or_else(|| {
                    let request = lookup.find_request(RequestKind::Ownership, related_id?)?;
                    Some(event_target(&request))
                }),
            NotificationType::OwnershipRequested
            | NotificationType::OwnershipRequestApproved
            | NotificationType::OwnershipRequestDenied => {
                ownership_target(related_id, &notification.message, lookup)
            }
        }
    }
}

enum Target {
    Dashboard,
    Context(NavigationContext),
}

fn event_target(request: &WorkflowRequest) -> Target {
    Target::Context(NavigationContext::from_parts(
        request.event_id().as_str(),
        None,
        None,
    ))
}

fn ownership_target(
    related_id: Option<&str>,
    message: &str,
    lookup: &dyn RelatedRequestLookup,
) -> Option<Target> {
    related_id
        .and_then(|id| lookup.find_request(RequestKind::Ownership, id))
        .map(|request| event_target(&request))
        .or_else(|| {
            decode_legacy_tail(message).map(|context| Target::Context(context.event_only()))
        })
}

/// Video beats section beats event; a video whose section is unknown
/// degrades to the event page.
fn tagging_context(
    request: &WorkflowRequest,
    lookup: &dyn RelatedRequestLookup,
) -> Option<NavigationContext> {
    let WorkflowRequest::Tagging(tagging) = request else {
        return None;
    };
    let event_id = tagging.event_id.as_str();
    let context = match (&tagging.video_id, &tagging.section_id) {
        (Some(video_id), section_id) => {
            let section_id = section_id
                .clone()
                .or_else(|| lookup.section_for_video(video_id));
            NavigationContext::from_parts(
                event_id,
                section_id.map(|id| id.to_string()),
                Some(video_id.to_string()),
            )
        }
        (None, Some(section_id)) => {
            NavigationContext::from_parts(event_id, Some(section_id.to_string()), None)
        }
        (None, None) => NavigationContext::from_parts(event_id, None, None),
    };
    Some(context)
}
