//! Pure permission predicates. Every function here is deterministic over its
//! inputs and performs no I/O; callers gather the resource context first.

use super::{Actor, AuthLevel};
use crate::shared::ids::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceFamily {
    Event,
    /// A section, or anything owned through a section's event.
    Section,
    Workshop,
    UserCity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivilegedOperation {
    Update,
    Delete,
    TransferOwnership,
    BulkImport,
}

impl PrivilegedOperation {
    fn allows_team_members(self) -> bool {
        matches!(self, Self::Update)
    }

    fn admin_threshold(self) -> AuthLevel {
        match self {
            Self::BulkImport => AuthLevel::SuperAdmin,
            Self::Update | Self::Delete | Self::TransferOwnership => AuthLevel::Admin,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceContext {
    pub creator_id: Option<UserId>,
    pub is_team_member: bool,
    pub is_event_team_member: bool,
}

impl ResourceContext {
    pub fn owned_by(creator_id: UserId) -> Self {
        Self {
            creator_id: Some(creator_id),
            ..Self::default()
        }
    }

    pub fn with_team_member(mut self, is_team_member: bool) -> Self {
        self.is_team_member = is_team_member;
        self
    }

    pub fn with_event_team_member(mut self, is_event_team_member: bool) -> Self {
        self.is_event_team_member = is_event_team_member;
        self
    }

    fn is_creator(&self, actor_id: &UserId) -> bool {
        self.creator_id.as_ref() == Some(actor_id)
    }

    fn has_team_membership(&self, family: ResourceFamily) -> bool {
        match family {
            ResourceFamily::Event | ResourceFamily::Workshop => self.is_team_member,
            ResourceFamily::Section => self.is_team_member || self.is_event_team_member,
            ResourceFamily::UserCity => false,
        }
    }
}

pub fn evaluate(
    actor: &Actor,
    family: ResourceFamily,
    operation: PrivilegedOperation,
    context: &ResourceContext,
) -> bool {
    if actor.auth_level.is_at_least(AuthLevel::SuperAdmin) {
        return true;
    }
    if actor.auth_level.is_at_least(operation.admin_threshold()) {
        return true;
    }
    if operation == PrivilegedOperation::BulkImport {
        return false;
    }
    if context.is_creator(&actor.id) {
        return true;
    }
    operation.allows_team_members() && context.has_team_membership(family)
}

pub fn can_update_event(actor: &Actor, context: &ResourceContext) -> bool {
    evaluate(
        actor,
        ResourceFamily::Event,
        PrivilegedOperation::Update,
        context,
    )
}

pub fn can_delete_event(actor: &Actor, context: &ResourceContext) -> bool {
    evaluate(
        actor,
        ResourceFamily::Event,
        PrivilegedOperation::Delete,
        context,
    )
}

pub fn can_update_section(actor: &Actor, context: &ResourceContext) -> bool {
    evaluate(
        actor,
        ResourceFamily::Section,
        PrivilegedOperation::Update,
        context,
    )
}

pub fn can_delete_section(actor: &Actor, context: &ResourceContext) -> bool {
    evaluate(
        actor,
        ResourceFamily::Section,
        PrivilegedOperation::Delete,
        context,
    )
}

pub fn can_update_workshop(actor: &Actor, context: &ResourceContext) -> bool {
    evaluate(
        actor,
        ResourceFamily::Workshop,
        PrivilegedOperation::Update,
        context,
    )
}

pub fn can_delete_workshop(actor: &Actor, context: &ResourceContext) -> bool {
    evaluate(
        actor,
        ResourceFamily::Workshop,
        PrivilegedOperation::Delete,
        context,
    )
}

/// City assignment belongs to the user record itself; `creator_id` is that user.
pub fn can_update_user_city(actor: &Actor, context: &ResourceContext) -> bool {
    evaluate(
        actor,
        ResourceFamily::UserCity,
        PrivilegedOperation::Update,
        context,
    )
}

pub fn can_transfer_ownership(actor: &Actor, context: &ResourceContext) -> bool {
    evaluate(
        actor,
        ResourceFamily::Event,
        PrivilegedOperation::TransferOwnership,
        context,
    )
}

pub fn can_bulk_import(actor: &Actor) -> bool {
    evaluate(
        actor,
        ResourceFamily::Event,
        PrivilegedOperation::BulkImport,
        &ResourceContext::default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, level: AuthLevel) -> Actor {
        Actor::new(UserId::parse(id).expect("user id"), level)
    }

    #[test]
    fn creator_is_permitted_for_every_non_bulk_operation() {
        let actor = user("creator", AuthLevel::BaseUser);
        let context = ResourceContext::owned_by(actor.id.clone());
        for operation in [
            PrivilegedOperation::Update,
            PrivilegedOperation::Delete,
            PrivilegedOperation::TransferOwnership,
        ] {
            assert!(evaluate(&actor, ResourceFamily::Event, operation, &context));
        }
        assert!(!can_bulk_import(&actor));
    }

    #[test]
    fn section_update_honors_event_team_membership() {
        let actor = user("member", AuthLevel::BaseUser);
        let owner = UserId::parse("owner").expect("user id");
        let context = ResourceContext::owned_by(owner).with_event_team_member(true);
        assert!(can_update_section(&actor, &context));
        assert!(!can_delete_section(&actor, &context));
        assert!(!can_update_event(&actor, &context));
    }
}
