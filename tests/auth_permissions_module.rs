use tagflow::auth::{
    can_bulk_import, can_delete_event, can_delete_section, can_delete_workshop,
    can_transfer_ownership, can_update_event, can_update_section, can_update_user_city,
    can_update_workshop, evaluate, Actor, AuthLevel, PrivilegedOperation, ResourceContext,
    ResourceFamily,
};
use tagflow::shared::ids::UserId;

fn user(id: &str) -> UserId {
    UserId::parse(id).expect("user id")
}

fn actor(id: &str, level: AuthLevel) -> Actor {
    Actor::new(user(id), level)
}

#[test]
fn auth_permissions_module_grants_creators_everything_but_bulk_import() {
    let creator = actor("creator", AuthLevel::BaseUser);
    let context = ResourceContext::owned_by(creator.id.clone());
    assert!(can_update_event(&creator, &context));
    assert!(can_delete_event(&creator, &context));
    assert!(can_update_section(&creator, &context));
    assert!(can_delete_section(&creator, &context));
    assert!(can_update_workshop(&creator, &context));
    assert!(can_delete_workshop(&creator, &context));
    assert!(can_update_user_city(&creator, &context));
    assert!(can_transfer_ownership(&creator, &context));
    assert!(!can_bulk_import(&creator));
}

#[test]
fn auth_permissions_module_limits_team_members_to_updates() {
    let member = actor("member", AuthLevel::Creator);
    let context = ResourceContext::owned_by(user("owner")).with_team_member(true);
    assert!(can_update_event(&member, &context));
    assert!(can_update_workshop(&member, &context));
    assert!(!can_delete_event(&member, &context));
    assert!(!can_delete_workshop(&member, &context));
    assert!(!can_transfer_ownership(&member, &context));
}

#[test]
fn auth_permissions_module_keeps_delete_and_transfer_from_team_members_in_every_family() {
    let member = actor("member", AuthLevel::Moderator);
    let context = ResourceContext::owned_by(user("owner"))
        .with_team_member(true)
        .with_event_team_member(true);
    for family in [
        ResourceFamily::Event,
        ResourceFamily::Section,
        ResourceFamily::Workshop,
        ResourceFamily::UserCity,
    ] {
        assert_eq!(
            evaluate(&member, family, PrivilegedOperation::Update, &context),
            family != ResourceFamily::UserCity,
            "{family:?}"
        );
        for operation in [
            PrivilegedOperation::Delete,
            PrivilegedOperation::TransferOwnership,
        ] {
            assert!(
                !evaluate(&member, family, operation, &context),
                "{family:?} {operation:?}"
            );
        }
    }

    let section_only = ResourceContext::owned_by(user("owner")).with_event_team_member(true);
    assert!(can_update_section(&member, &section_only));
    assert!(!can_update_event(&member, &section_only));
    assert!(!can_delete_section(&member, &section_only));
}

#[test]
fn auth_permissions_module_never_extends_team_membership_to_user_city() {
    let member = actor("member", AuthLevel::Moderator);
    let context = ResourceContext::owned_by(user("owner"))
        .with_team_member(true)
        .with_event_team_member(true);
    assert!(!can_update_user_city(&member, &context));
}

#[test]
fn auth_permissions_module_applies_admin_overrides() {
    let context = ResourceContext::owned_by(user("owner"));
    let moderator = actor("mod", AuthLevel::Moderator);
    let admin = actor("admin", AuthLevel::Admin);
    let super_admin = actor("root", AuthLevel::SuperAdmin);

    assert!(!can_update_event(&moderator, &context));
    assert!(can_update_event(&admin, &context));
    assert!(can_delete_section(&admin, &context));
    assert!(can_transfer_ownership(&admin, &context));
    assert!(!can_bulk_import(&admin));
    assert!(can_bulk_import(&super_admin));
}

#[test]
fn auth_permissions_module_denies_strangers_at_every_level_below_admin() {
    let context = ResourceContext::owned_by(user("owner"));
    for level in [AuthLevel::BaseUser, AuthLevel::Creator, AuthLevel::Moderator] {
        let stranger = actor("stranger", level);
        assert!(!can_update_event(&stranger, &context));
        assert!(!can_update_section(&stranger, &context));
        assert!(!can_delete_event(&stranger, &context));
        assert!(!can_transfer_ownership(&stranger, &context));
    }
}

#[test]
fn auth_permissions_module_parses_levels_by_number_and_name() {
    assert_eq!(AuthLevel::parse("0").expect("level"), AuthLevel::BaseUser);
    assert_eq!(AuthLevel::parse("super-admin").expect("level"), AuthLevel::SuperAdmin);
    assert_eq!(AuthLevel::parse("Admin").expect("level"), AuthLevel::Admin);
    assert!(AuthLevel::parse("5").is_err());
    assert!(AuthLevel::parse("owner").is_err());
}
