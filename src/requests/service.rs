use super::decision::{decide, has_update_rights, ApplyDecision, RequestAction};
use super::store::{RequestStore, RequestStoreError};
use crate::auth::{can_transfer_ownership, can_update_event, Actor, ResourceContext};
use crate::config::RequestsConfig;
use crate::domain::{
    EventRecord, OwnershipRequest, PendingKey, RequestKind, RequestStatus, Role, TagTarget,
    TaggingRequest, TeamMemberRequest, WorkflowRequest,
};
use crate::notifications::{NavigationContext, NotificationService, NotificationStore};
use crate::resources::ResourceGraph;
use crate::shared::clock::now_secs;
use crate::shared::ids::{EventId, RequestId, SectionId, UserId, VideoId};
use crate::shared::logging::append_workflow_event;
use crate::shared::WorkflowError;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

const CREATE_ATTEMPTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Creation {
    Created,
    /// An identical pending request already existed and was returned instead.
    Existing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestOutcome {
    /// The mutation was applied immediately; no request exists.
    pub direct_apply: bool,
    pub request: Option<WorkflowRequest>,
    pub creation: Option<Creation>,
}

impl RequestOutcome {
    fn applied() -> Self {
        Self {
            direct_apply: true,
            request: None,
            creation: None,
        }
    }

    fn pending(request: WorkflowRequest, creation: Creation) -> Self {
        Self {
            direct_apply: false,
            request: Some(request),
            creation: Some(creation),
        }
    }

    /// For callers that must tell a fresh request from a reused one.
    pub fn require_created(&self) -> Result<Option<&WorkflowRequest>, WorkflowError> {
        match (&self.request, self.creation) {
            (Some(request), Some(Creation::Existing)) => Err(WorkflowError::AlreadyExists {
                request_id: request.id().to_string(),
            }),
            (request, _) => Ok(request.as_ref()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggingInput {
    pub event_id: EventId,
    pub video_id: Option<VideoId>,
    pub section_id: Option<SectionId>,
    pub role: Role,
    pub target_user_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingQuery {
    pub event_id: EventId,
    pub section_id: Option<SectionId>,
    pub video_id: Option<VideoId>,
    /// Empty means every role.
    pub roles: Vec<Role>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingSummary {
    pub id: RequestId,
    pub status: RequestStatus,
    pub created_at: i64,
}

/// Orchestrates permission checks, direct application, deduplicated pending
/// requests, approval transitions and the notifications they emit.
pub struct RequestService<'a> {
    requests: &'a dyn RequestStore,
    resources: &'a dyn ResourceGraph,
    notifications: NotificationService<'a>,
    config: RequestsConfig,
    event_log: Option<&'a Path>,
}

impl<'a> RequestService<'a> {
    pub fn new(
        requests: &'a dyn RequestStore,
        resources: &'a dyn ResourceGraph,
        notifications: &'a dyn NotificationStore,
    ) -> Self {
        Self {
            requests,
            resources,
            notifications: NotificationService::new(notifications),
            config: RequestsConfig::default(),
            event_log: None,
        }
    }

    pub fn with_config(mut self, config: RequestsConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_event_log(mut self, path: Option<&'a Path>) -> Self {
        self.event_log = path;
        self
    }

    pub fn create_tagging_request(
        &self,
        actor: &Actor,
        input: TaggingInput,
    ) -> Result<RequestOutcome, WorkflowError> {
        let target = TagTarget::from_parts(input.event_id, input.video_id, input.section_id)
            .map_err(WorkflowError::Validation)?;
        let scope = target.role_scope();
        scope.validate(input.role).map_err(WorkflowError::Validation)?;
        let event = self.load_target_event(&target)?;
        let context = context_for(&event, &actor.id);

        match decide(RequestAction::Tag(scope), actor, &context) {
            ApplyDecision::DirectApply => {
                self.apply_tag(&target, input.role, &input.target_user_id, &actor.id)?;
                self.record(
                    "tag.direct_applied",
                    &[
                        ("actor_id", Value::from(actor.id.as_str())),
                        ("target", Value::from(target.to_string())),
                        ("role", Value::from(input.role.as_canonical())),
                        ("user_id", Value::from(input.target_user_id.as_str())),
                    ],
                );
                Ok(RequestOutcome::applied())
            }
            ApplyDecision::CreatePendingRequest => {
                self.ensure_may_request(actor)?;
                let key = PendingKey::tagging(&actor.id, &input.target_user_id, &target, input.role);
                let (request, creation) = self.create_pending(&key, |id, now| {
                    WorkflowRequest::Tagging(TaggingRequest {
                        id,
                        event_id: target.event_id().clone(),
                        video_id: target.video_id().cloned(),
                        section_id: target.section_id().cloned(),
                        role: input.role,
                        sender_id: actor.id.clone(),
                        target_user_id: input.target_user_id.clone(),
                        status: RequestStatus::Pending,
                        created_at: now,
                        updated_at: now,
                    })
                })?;
                if creation == Creation::Created {
                    let recipients = approvers_excluding(&event, &actor.id);
                    self.notify("incoming tagging request", || {
                        self.notifications
                            .notify_incoming_request(&recipients, &request)
                            .map(|_| ())
                    });
                }
                Ok(RequestOutcome::pending(request, creation))
            }
        }
    }

    pub fn request_team_membership(
        &self,
        actor: &Actor,
        event_id: &EventId,
    ) -> Result<RequestOutcome, WorkflowError> {
        let event = self.load_event(event_id)?;
        if !actor.auth_level.is_at_least(self.config.team_request_min_level) {
            return Err(WorkflowError::unauthorized(format!(
                "joining an event team requires auth level {} or higher",
                self.config.team_request_min_level
            )));
        }
        if event.is_team_member(&actor.id) {
            return Err(WorkflowError::validation(format!(
                "user `{}` is already on the team of event `{event_id}`",
                actor.id
            )));
        }

        let context = context_for(&event, &actor.id);
        if decide(RequestAction::JoinTeam, actor, &context) == ApplyDecision::DirectApply {
            self.resources.add_team_member(event_id, &actor.id)?;
            self.record(
                "team_member.direct_applied",
                &[
                    ("actor_id", Value::from(actor.id.as_str())),
                    ("event_id", Value::from(event_id.as_str())),
                ],
            );
            return Ok(RequestOutcome::applied());
        }

        self.ensure_may_request(actor)?;
        let key = PendingKey::self_request(RequestKind::TeamMember, &actor.id, event_id);
        let (request, creation) = self.create_pending(&key, |id, now| {
            WorkflowRequest::TeamMember(TeamMemberRequest {
                id,
                event_id: event_id.clone(),
                sender_id: actor.id.clone(),
                status: RequestStatus::Pending,
                created_at: now,
                updated_at: now,
            })
        })?;
        if creation == Creation::Created {
            let recipients = approvers_excluding(&event, &actor.id);
            self.notify("incoming team member request", || {
                self.notifications
                    .notify_incoming_request(&recipients, &request)
                    .map(|_| ())
            });
        }
        Ok(RequestOutcome::pending(request, creation))
    }

    pub fn claim_ownership(
        &self,
        actor: &Actor,
        event_id: &EventId,
    ) -> Result<RequestOutcome, WorkflowError> {
        let event = self.load_event(event_id)?;
        if event.is_creator(&actor.id) {
            return Err(WorkflowError::validation(format!(
                "user `{}` already owns event `{event_id}`",
                actor.id
            )));
        }

        let context = context_for(&event, &actor.id);
        if decide(RequestAction::ClaimOwnership, actor, &context) == ApplyDecision::DirectApply {
            let previous = self.resources.transfer_ownership(event_id, &actor.id)?;
            self.record(
                "ownership.direct_applied",
                &[
                    ("actor_id", Value::from(actor.id.as_str())),
                    ("event_id", Value::from(event_id.as_str())),
                    ("previous_owner_id", Value::from(previous.as_str())),
                ],
            );
            self.notify("ownership transferred", || {
                self.notifications
                    .notify_ownership_transferred(&previous, event_id, &actor.id, None)
                    .map(|_| ())
            });
            return Ok(RequestOutcome::applied());
        }

        self.ensure_may_request(actor)?;
        let key = PendingKey::self_request(RequestKind::Ownership, &actor.id, event_id);
        let (request, creation) = self.create_pending(&key, |id, now| {
            WorkflowRequest::Ownership(OwnershipRequest {
                id,
                event_id: event_id.clone(),
                sender_id: actor.id.clone(),
                status: RequestStatus::Pending,
                created_at: now,
                updated_at: now,
            })
        })?;
        if creation == Creation::Created {
            self.notify("ownership requested", || {
                self.notifications
                    .notify_ownership_requested(&event.creator_id, &request)
                    .map(|_| ())
            });
        }
        Ok(RequestOutcome::pending(request, creation))
    }

    /// Marks the request approved, then performs its mutation. The status
    /// write is a compare-and-set, so a request is applied at most once.
    pub fn approve_request(
        &self,
        approver: &Actor,
        request_id: &RequestId,
    ) -> Result<WorkflowRequest, WorkflowError> {
        let request = self.load_pending(request_id)?;
        let event = self.load_event(request.event_id())?;
        self.ensure_may_decide(approver, &event, &request)?;

        let approved = self
            .requests
            .transition(request_id, RequestStatus::Approved, now_secs())?;
        if let Err(err) = self.apply_approved(&approved, &approver.id) {
            tracing::error!(
                request_id = %request_id,
                error = %err,
                "request approved but its mutation failed"
            );
            return Err(WorkflowError::Internal(format!(
                "request `{request_id}` was approved but could not be applied: {err}"
            )));
        }
        self.record_transition("request.approved", &approved, &approver.id);
        self.notify("request approved", || {
            self.notifications
                .notify_request_approved(&approved)
                .map(|_| ())
        });
        Ok(approved)
    }

    pub fn deny_request(
        &self,
        approver: &Actor,
        request_id: &RequestId,
    ) -> Result<WorkflowRequest, WorkflowError> {
        let request = self.load_pending(request_id)?;
        let event = self.load_event(request.event_id())?;
        self.ensure_may_decide(approver, &event, &request)?;

        let denied = self
            .requests
            .transition(request_id, RequestStatus::Denied, now_secs())?;
        self.record_transition("request.denied", &denied, &approver.id);
        self.notify("request denied", || {
            self.notifications.notify_request_denied(&denied).map(|_| ())
        });
        Ok(denied)
    }

    /// Only the sender may cancel. No notification is emitted.
    pub fn cancel_request(
        &self,
        sender: &Actor,
        request_id: &RequestId,
    ) -> Result<WorkflowRequest, WorkflowError> {
        let request = self.load_pending(request_id)?;
        if request.sender_id() != &sender.id {
            return Err(WorkflowError::unauthorized(format!(
                "only the sender may cancel request `{request_id}`"
            )));
        }
        let cancelled = self
            .requests
            .transition(request_id, RequestStatus::Cancelled, now_secs())?;
        self.record_transition("request.cancelled", &cancelled, &sender.id);
        Ok(cancelled)
    }

    /// Returns `false` when the tag did not exist.
    pub fn remove_tag(
        &self,
        actor: &Actor,
        target: &TagTarget,
        role: Role,
        user_id: &UserId,
    ) -> Result<bool, WorkflowError> {
        let event = self.load_target_event(target)?;
        let context = context_for(&event, &actor.id);
        if !has_update_rights(target.role_scope(), actor, &context) {
            return Err(WorkflowError::unauthorized(format!(
                "user `{}` may not edit tags on {target}",
                actor.id
            )));
        }
        let removed = self.resources.untag_user(target, role, user_id)?;
        if removed {
            self.record(
                "tag.removed",
                &[
                    ("actor_id", Value::from(actor.id.as_str())),
                    ("target", Value::from(target.to_string())),
                    ("role", Value::from(role.as_canonical())),
                    ("user_id", Value::from(user_id.as_str())),
                ],
            );
        }
        Ok(removed)
    }

    /// Direct add by someone who can already edit the event. Returns `false`
    /// when the user was already a member.
    pub fn add_team_member(
        &self,
        actor: &Actor,
        event_id: &EventId,
        user_id: &UserId,
    ) -> Result<bool, WorkflowError> {
        let event = self.load_event(event_id)?;
        self.ensure_may_edit_team(actor, &event)?;
        if event.is_creator(user_id) {
            return Err(WorkflowError::validation(format!(
                "user `{user_id}` created event `{event_id}` and is already on its team"
            )));
        }
        let added = self.resources.add_team_member(event_id, user_id)?;
        if added {
            self.record(
                "team_member.added",
                &[
                    ("actor_id", Value::from(actor.id.as_str())),
                    ("event_id", Value::from(event_id.as_str())),
                    ("user_id", Value::from(user_id.as_str())),
                ],
            );
        }
        Ok(added)
    }

    /// The creator can never be removed. Returns `false` when the user was not a member.
    pub fn remove_team_member(
        &self,
        actor: &Actor,
        event_id: &EventId,
        user_id: &UserId,
    ) -> Result<bool, WorkflowError> {
        let event = self.load_event(event_id)?;
        self.ensure_may_edit_team(actor, &event)?;
        if event.is_creator(user_id) {
            return Err(WorkflowError::validation(format!(
                "the creator of event `{event_id}` cannot be removed from its team"
            )));
        }
        let removed = self.resources.remove_team_member(event_id, user_id)?;
        if removed {
            self.record(
                "team_member.removed",
                &[
                    ("actor_id", Value::from(actor.id.as_str())),
                    ("event_id", Value::from(event_id.as_str())),
                    ("user_id", Value::from(user_id.as_str())),
                ],
            );
        }
        Ok(removed)
    }

    /// The caller's own pending tagging requests on one resource, keyed by role.
    pub fn pending_requests_for_caller(
        &self,
        actor: &Actor,
        query: &PendingQuery,
    ) -> Result<BTreeMap<Role, PendingSummary>, WorkflowError> {
        if query.section_id.is_some() && query.video_id.is_some() {
            return Err(WorkflowError::validation(
                "query by section or by video, not both",
            ));
        }
        let pending = self
            .requests
            .list_pending_for_sender(&actor.id, &query.event_id)?;
        let mut out = BTreeMap::new();
        for request in pending {
            let WorkflowRequest::Tagging(tagging) = request else {
                continue;
            };
            if tagging.section_id != query.section_id || tagging.video_id != query.video_id {
                continue;
            }
            if !query.roles.is_empty() && !query.roles.contains(&tagging.role) {
                continue;
            }
            out.entry(tagging.role).or_insert(PendingSummary {
                id: tagging.id,
                status: tagging.status,
                created_at: tagging.created_at,
            });
        }
        Ok(out)
    }

    /// Pending requests the actor could approve right now, oldest first.
    pub fn incoming_requests(&self, actor: &Actor) -> Result<Vec<WorkflowRequest>, WorkflowError> {
        let candidates = if actor.is_admin() {
            self.requests.list_pending(None)?
        } else {
            let mut out = Vec::new();
            for event_id in self.resources.events_managed_by(&actor.id)? {
                out.extend(self.requests.list_pending(Some(&event_id))?);
            }
            out
        };

        let mut events: BTreeMap<EventId, Option<EventRecord>> = BTreeMap::new();
        let mut out = Vec::new();
        for request in candidates {
            if !events.contains_key(request.event_id()) {
                let event = self.resources.event(request.event_id())?;
                events.insert(request.event_id().clone(), event);
            }
            let Some(Some(event)) = events.get(request.event_id()) else {
                continue;
            };
            if request.sender_id() != &actor.id && may_decide(actor, event, &request) {
                out.push(request);
            }
        }
        out.sort_by(|left, right| {
            left.created_at()
                .cmp(&right.created_at())
                .then_with(|| left.id().cmp(right.id()))
        });
        Ok(out)
    }

    pub fn find_request(&self, request_id: &RequestId) -> Result<WorkflowRequest, WorkflowError> {
        self.requests
            .find_by_id(request_id)?
            .ok_or_else(|| WorkflowError::not_found("request", request_id))
    }

    fn create_pending(
        &self,
        key: &PendingKey,
        build: impl Fn(RequestId, i64) -> WorkflowRequest,
    ) -> Result<(WorkflowRequest, Creation), WorkflowError> {
        for _ in 0..CREATE_ATTEMPTS {
            if let Some(existing) = self.requests.find_pending(key)? {
                tracing::debug!(request_id = %existing.id(), "reusing pending request");
                return Ok((existing, Creation::Existing));
            }
            let now = now_secs();
            let id = RequestId::generate(now).map_err(WorkflowError::Internal)?;
            match self.requests.create(&build(id, now)) {
                Ok(created) => {
                    tracing::info!(
                        request_id = %created.id(),
                        kind = %created.kind(),
                        event_id = %created.event_id(),
                        sender_id = %created.sender_id(),
                        "pending request created"
                    );
                    self.record_transition("request.created", &created, created.sender_id());
                    return Ok((created, Creation::Created));
                }
                // Lost a race with an identical request; the next pass finds it.
                Err(RequestStoreError::DuplicatePending { .. }) => continue,
                Err(err) => return Err(err.into()),
            }
        }
        Err(WorkflowError::Internal(
            "pending request kept changing while it was being created".to_string(),
        ))
    }

    fn apply_approved(
        &self,
        request: &WorkflowRequest,
        approver_id: &UserId,
    ) -> Result<(), WorkflowError> {
        match request {
            WorkflowRequest::Tagging(tagging) => {
                let target = tagging.target().map_err(WorkflowError::Internal)?;
                self.apply_tag(&target, tagging.role, &tagging.target_user_id, &tagging.sender_id)
            }
            WorkflowRequest::TeamMember(team) => {
                self.resources.add_team_member(&team.event_id, &team.sender_id)?;
                Ok(())
            }
            WorkflowRequest::Ownership(ownership) => {
                let previous = self
                    .resources
                    .transfer_ownership(&ownership.event_id, &ownership.sender_id)?;
                if &previous != approver_id {
                    self.notify("ownership transferred", || {
                        self.notifications
                            .notify_ownership_transferred(
                                &previous,
                                &ownership.event_id,
                                &ownership.sender_id,
                                Some(request),
                            )
                            .map(|_| ())
                    });
                }
                Ok(())
            }
        }
    }

    /// Tags the user; `TAGGED` goes out only for a new tag on someone other than the tagger.
    fn apply_tag(
        &self,
        target: &TagTarget,
        role: Role,
        user_id: &UserId,
        tagged_by: &UserId,
    ) -> Result<(), WorkflowError> {
        let inserted = self.resources.tag_user(target, role, user_id)?;
        if inserted && user_id != tagged_by {
            let navigation = self.navigation_for(target)?;
            self.notify("tagged", || {
                self.notifications
                    .notify_tagged(user_id, tagged_by, role, target, &navigation)
                    .map(|_| ())
            });
        }
        Ok(())
    }

    fn navigation_for(&self, target: &TagTarget) -> Result<NavigationContext, WorkflowError> {
        let event_id = target.event_id().to_string();
        Ok(match target {
            TagTarget::Event { .. } => NavigationContext::from_parts(event_id, None, None),
            TagTarget::Section { section_id, .. } => {
                NavigationContext::from_parts(event_id, Some(section_id.to_string()), None)
            }
            TagTarget::Video { video_id, .. } => {
                let section_id = self
                    .resources
                    .video(video_id)?
                    .map(|video| video.section_id.to_string());
                NavigationContext::from_parts(event_id, section_id, Some(video_id.to_string()))
            }
        })
    }

    fn load_event(&self, event_id: &EventId) -> Result<EventRecord, WorkflowError> {
        self.resources
            .event(event_id)?
            .ok_or_else(|| WorkflowError::not_found("event", event_id))
    }

    /// Loads the owning event after checking that the section or video belongs to it.
    fn load_target_event(&self, target: &TagTarget) -> Result<EventRecord, WorkflowError> {
        let event = self.load_event(target.event_id())?;
        let section_id = match target {
            TagTarget::Event { .. } => return Ok(event),
            TagTarget::Section { section_id, .. } => section_id.clone(),
            TagTarget::Video { video_id, .. } => {
                self.resources
                    .video(video_id)?
                    .ok_or_else(|| WorkflowError::not_found("video", video_id))?
                    .section_id
            }
        };
        let section = self
            .resources
            .section(&section_id)?
            .ok_or_else(|| WorkflowError::not_found("section", &section_id))?;
        if &section.event_id != target.event_id() {
            return Err(WorkflowError::validation(format!(
                "{target} does not belong to event `{}`",
                target.event_id()
            )));
        }
        Ok(event)
    }

    fn load_pending(&self, request_id: &RequestId) -> Result<WorkflowRequest, WorkflowError> {
        let request = self.find_request(request_id)?;
        if request.status().is_terminal() {
            return Err(WorkflowError::InvalidState {
                request_id: request_id.to_string(),
                status: request.status(),
            });
        }
        Ok(request)
    }

    fn ensure_may_request(&self, actor: &Actor) -> Result<(), WorkflowError> {
        if self.config.require_verified_account && !actor.account_verified {
            return Err(WorkflowError::unauthorized(format!(
                "user `{}` must verify their account before sending requests",
                actor.id
            )));
        }
        Ok(())
    }

    fn ensure_may_decide(
        &self,
        approver: &Actor,
        event: &EventRecord,
        request: &WorkflowRequest,
    ) -> Result<(), WorkflowError> {
        if !may_decide(approver, event, request) {
            return Err(WorkflowError::unauthorized(format!(
                "user `{}` may not decide request `{}`",
                approver.id,
                request.id()
            )));
        }
        Ok(())
    }

    fn ensure_may_edit_team(&self, actor: &Actor, event: &EventRecord) -> Result<(), WorkflowError> {
        if !can_update_event(actor, &context_for(event, &actor.id)) {
            return Err(WorkflowError::unauthorized(format!(
                "user `{}` may not edit the team of event `{}`",
                actor.id, event.event_id
            )));
        }
        Ok(())
    }

    /// Side effects after a committed write never undo it; failures are logged.
    fn notify(&self, what: &str, send: impl FnOnce() -> Result<(), WorkflowError>) {
        if let Err(err) = send() {
            tracing::error!(notification = what, error = %err, "failed to append notification");
        }
    }

    fn record_transition(&self, event: &str, request: &WorkflowRequest, actor_id: &UserId) {
        self.record(
            event,
            &[
                ("request_id", Value::from(request.id().as_str())),
                ("kind", Value::from(request.kind().as_str())),
                ("status", Value::from(request.status().as_str())),
                ("event_id", Value::from(request.event_id().as_str())),
                ("sender_id", Value::from(request.sender_id().as_str())),
                ("actor_id", Value::from(actor_id.as_str())),
            ],
        );
    }

    fn record(&self, event: &str, fields: &[(&str, Value)]) {
        tracing::info!(workflow_event = event, "workflow event");
        let Some(path) = self.event_log else {
            return;
        };
        if let Err(err) = append_workflow_event(path, event, fields) {
            tracing::warn!(
                path = %path.display(),
                workflow_event = event,
                error = %err,
                "failed to append workflow event log"
            );
        }
    }
}

fn context_for(event: &EventRecord, actor_id: &UserId) -> ResourceContext {
    let is_member = event.is_team_member(actor_id);
    ResourceContext::owned_by(event.creator_id.clone())
        .with_team_member(is_member)
        .with_event_team_member(is_member)
}

fn approvers_excluding(event: &EventRecord, sender_id: &UserId) -> Vec<UserId> {
    event
        .approvers()
        .into_iter()
        .filter(|id| id != sender_id)
        .collect()
}

/// Tagging and team requests need update rights on the resource; ownership
/// requests need the right to transfer the event.
fn may_decide(actor: &Actor, event: &EventRecord, request: &WorkflowRequest) -> bool {
    let context = context_for(event, &actor.id);
    match request {
        WorkflowRequest::Tagging(tagging) => match tagging.target() {
            Ok(target) => has_update_rights(target.role_scope(), actor, &context),
            Err(_) => false,
        },
        WorkflowRequest::TeamMember(_) => can_update_event(actor, &context),
        WorkflowRequest::Ownership(_) => can_transfer_ownership(actor, &context),
    }
}
