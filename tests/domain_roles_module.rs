use tagflow::domain::{RequestStatus, Role, RoleScope, TagTarget};
use tagflow::shared::ids::{EventId, SectionId, VideoId};

#[test]
fn domain_roles_module_accepts_display_and_canonical_spellings() {
    assert_eq!(Role::parse("Dancer").expect("role"), Role::Dancer);
    assert_eq!(Role::parse("TEAM_MEMBER").expect("role"), Role::TeamMember);
    assert_eq!(Role::parse("team member").expect("role"), Role::TeamMember);
    assert_eq!(Role::parse("dj").expect("role"), Role::Dj);
    assert!(Role::parse("Referee").is_err());

    assert_eq!(
        serde_json::to_string(&Role::TeamMember).expect("encode"),
        "\"TEAM_MEMBER\""
    );
    assert_eq!(Role::TeamMember.to_string(), "Team Member");
}

#[test]
fn domain_roles_module_restricts_roles_per_scope() {
    assert!(RoleScope::Event.allows(Role::Organizer));
    assert!(!RoleScope::Event.allows(Role::Dancer));
    assert!(RoleScope::Section.allows(Role::Judge));
    assert!(!RoleScope::Section.allows(Role::Choreographer));
    assert!(RoleScope::Video.allows(Role::Choreographer));
    assert!(RoleScope::Workshop.allows(Role::Teacher));

    let err = RoleScope::Video.validate(Role::Dj).expect_err("dj is not a video role");
    assert!(err.contains("not allowed on a video"));
}

#[test]
fn domain_roles_module_builds_tag_targets_from_optional_parts() {
    let event = EventId::parse("E1").expect("event id");
    let section = SectionId::parse("S1").expect("section id");
    let video = VideoId::parse("V1").expect("video id");

    let target = TagTarget::from_parts(event.clone(), None, None).expect("event target");
    assert_eq!(target.role_scope(), RoleScope::Event);

    let target =
        TagTarget::from_parts(event.clone(), None, Some(section.clone())).expect("section target");
    assert_eq!(target.role_scope(), RoleScope::Section);
    assert_eq!(target.section_id(), Some(&section));

    let target = TagTarget::from_parts(event.clone(), Some(video.clone()), None).expect("video");
    assert_eq!(target.role_scope(), RoleScope::Video);

    assert!(TagTarget::from_parts(event, Some(video), Some(section)).is_err());
}

#[test]
fn domain_roles_module_uses_the_workshop_scope_for_role_validation_only() {
    assert_eq!(
        RoleScope::Workshop.allowed_roles(),
        &[Role::Organizer, Role::Teacher]
    );
    let err = RoleScope::Workshop
        .validate(Role::Dancer)
        .expect_err("dancer is not a workshop role");
    assert!(err.contains("not allowed on a workshop"));

    let event = EventId::parse("E1").expect("event id");
    let section = SectionId::parse("S1").expect("section id");
    let video = VideoId::parse("V1").expect("video id");
    for (video, section) in [(None, None), (None, Some(section)), (Some(video), None)] {
        let target = TagTarget::from_parts(event.clone(), video, section).expect("target");
        assert_ne!(target.role_scope(), RoleScope::Workshop);
    }
}

#[test]
fn domain_roles_module_keeps_terminal_request_states_final() {
    for terminal in [
        RequestStatus::Approved,
        RequestStatus::Denied,
        RequestStatus::Cancelled,
    ] {
        assert!(terminal.is_terminal());
        for next in [
            RequestStatus::Pending,
            RequestStatus::Approved,
            RequestStatus::Denied,
            RequestStatus::Cancelled,
        ] {
            assert!(!terminal.can_transition_to(next));
        }
    }
    assert!(!RequestStatus::Pending.is_terminal());
    assert!(RequestStatus::Pending.can_transition_to(RequestStatus::Cancelled));
    assert!(!RequestStatus::Pending.can_transition_to(RequestStatus::Pending));
}
