use crate::auth::{can_update_event, can_update_section, Actor, ResourceContext};
use crate::domain::RoleScope;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestAction {
    Tag(RoleScope),
    JoinTeam,
    ClaimOwnership,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyDecision {
    DirectApply,
    CreatePendingRequest,
}

/// Decides whether an action mutates the resource now or waits for approval.
///
/// Tagging is applied directly only for actors who could already edit the
/// resource; tagging oneself grants nothing on its own. Team membership and
/// ownership are privilege elevations and always need an approver, unless the
/// actor is a super admin.
pub fn decide(action: RequestAction, actor: &Actor, context: &ResourceContext) -> ApplyDecision {
    if actor.is_super_admin() {
        return ApplyDecision::DirectApply;
    }
    match action {
        RequestAction::Tag(scope) => {
            if has_update_rights(scope, actor, context) {
                ApplyDecision::DirectApply
            } else {
                ApplyDecision::CreatePendingRequest
            }
        }
        RequestAction::JoinTeam | RequestAction::ClaimOwnership => {
            ApplyDecision::CreatePendingRequest
        }
    }
}

pub fn has_update_rights(scope: RoleScope, actor: &Actor, context: &ResourceContext) -> bool {
    match scope {
        RoleScope::Event => can_update_event(actor, context),
        RoleScope::Section | RoleScope::Video => can_update_section(actor, context),
        RoleScope::Workshop => crate::auth::can_update_workshop(actor, context),
    }
}
