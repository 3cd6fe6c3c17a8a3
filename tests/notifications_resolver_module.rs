use std::collections::BTreeMap;
use tagflow::domain::{
    Notification, NotificationType, OwnershipRequest, RelatedRequestType, RequestStatus, Role,
    TaggingRequest, TeamMemberRequest, WorkflowRequest,
};
use tagflow::notifications::{
    decode_legacy_tail, NavigationContext, NoLookup, NotificationTargetResolver,
    RelatedRequestLookup, DEFAULT_DASHBOARD_PATH,
};
use tagflow::shared::ids::{EventId, NotificationId, RequestId, SectionId, UserId, VideoId};

fn notification(
    notification_type: NotificationType,
    message: &str,
    related: Option<(RelatedRequestType, &str)>,
) -> Notification {
    Notification {
        id: NotificationId::parse("ntf-1").expect("id"),
        user_id: UserId::parse("carol").expect("user id"),
        notification_type,
        title: "title".to_string(),
        message: message.to_string(),
        related_request_type: related.map(|(kind, _)| kind),
        related_request_id: related.map(|(_, id)| id.to_string()),
        is_old: false,
        created_at: 1,
    }
}

fn tagging(id: &str, section: Option<&str>, video: Option<&str>) -> WorkflowRequest {
    WorkflowRequest::Tagging(TaggingRequest {
        id: RequestId::parse(id).expect("request id"),
        event_id: EventId::parse("E1").expect("event id"),
        video_id: video.map(|raw| VideoId::parse(raw).expect("video id")),
        section_id: section.map(|raw| SectionId::parse(raw).expect("section id")),
        role: Role::Dancer,
        sender_id: UserId::parse("alice").expect("user id"),
        target_user_id: UserId::parse("alice").expect("user id"),
        status: RequestStatus::Approved,
        created_at: 1,
        updated_at: 2,
    })
}

fn lookup(requests: Vec<WorkflowRequest>) -> BTreeMap<String, WorkflowRequest> {
    requests
        .into_iter()
        .map(|request| (request.id().to_string(), request))
        .collect()
}

struct VideoSections;

impl RelatedRequestLookup for VideoSections {
    fn find_request(
        &self,
        kind: tagflow::domain::RequestKind,
        request_id: &str,
    ) -> Option<WorkflowRequest> {
        lookup(vec![tagging("req-v", None, Some("V1"))]).find_request(kind, request_id)
    }

    fn section_for_video(&self, video_id: &VideoId) -> Option<SectionId> {
        (video_id.as_str() == "V1").then(|| SectionId::parse("S1").expect("section id"))
    }
}

#[test]
fn notifications_resolver_module_reads_the_legacy_tagged_tail() {
    let resolver = NotificationTargetResolver::default();
    let tagged = notification(
        NotificationType::Tagged,
        "You were tagged|eventId:E1|sectionId:S1",
        None,
    );
    assert_eq!(
        resolver.resolve(&tagged, &NoLookup).as_deref(),
        Some("/events/E1/sections/S1")
    );

    let reordered = notification(
        NotificationType::Tagged,
        "You were tagged|videoId:V1|sectionId:S1|eventId:E1",
        None,
    );
    assert_eq!(
        resolver.resolve(&reordered, &NoLookup).as_deref(),
        Some("/events/E1/sections/S1/videos/V1")
    );
}

#[test]
fn notifications_resolver_module_degrades_malformed_tails_to_none() {
    let resolver = NotificationTargetResolver::default();
    for message in [
        "You were tagged",
        "You were tagged|sectionId:S1",
        "You were tagged|eventId:",
        "|||",
        "",
    ] {
        let tagged = notification(NotificationType::Tagged, message, None);
        assert_eq!(resolver.resolve(&tagged, &NoLookup), None, "{message}");
    }

    let video_without_section = notification(
        NotificationType::Tagged,
        "You were tagged|eventId:E1|videoId:V1",
        None,
    );
    assert_eq!(
        resolver.resolve(&video_without_section, &NoLookup).as_deref(),
        Some("/events/E1")
    );
}

#[test]
fn notifications_resolver_module_is_deterministic() {
    let resolver = NotificationTargetResolver::default();
    let related = lookup(vec![tagging("req-1", Some("S1"), None)]);
    let approved = notification(
        NotificationType::RequestApproved,
        "Your request was approved",
        Some((RelatedRequestType::Tagging, "req-1")),
    );
    let first = resolver.resolve(&approved, &related);
    for _ in 0..5 {
        assert_eq!(resolver.resolve(&approved, &related), first);
    }
    assert_eq!(first.as_deref(), Some("/events/E1/sections/S1"));
}

#[test]
fn notifications_resolver_module_sends_incoming_requests_to_the_dashboard() {
    let resolver = NotificationTargetResolver::default();
    for kind in [
        RelatedRequestType::Tagging,
        RelatedRequestType::TeamMember,
        RelatedRequestType::Ownership,
        RelatedRequestType::AuthLevelChange,
    ] {
        let incoming = notification(NotificationType::IncomingRequest, "new", Some((kind, "x")));
        assert_eq!(
            resolver.resolve(&incoming, &NoLookup).as_deref(),
            Some(DEFAULT_DASHBOARD_PATH)
        );
    }
    let bare = notification(NotificationType::IncomingRequest, "new", None);
    assert_eq!(resolver.resolve(&bare, &NoLookup), None);

    let custom = NotificationTargetResolver::new("/inbox");
    let incoming = notification(
        NotificationType::IncomingRequest,
        "new",
        Some((RelatedRequestType::Tagging, "x")),
    );
    assert_eq!(custom.resolve(&incoming, &NoLookup).as_deref(), Some("/inbox"));
}

#[test]
fn notifications_resolver_module_prefers_the_most_specific_tagging_path() {
    let resolver = NotificationTargetResolver::default();
    let related = lookup(vec![
        tagging("req-e", None, None),
        tagging("req-s", Some("S1"), None),
        tagging("req-vs", Some("S1"), Some("V1")),
    ]);
    let cases = [
        ("req-e", "/events/E1"),
        ("req-s", "/events/E1/sections/S1"),
        ("req-vs", "/events/E1/sections/S1/videos/V1"),
    ];
    for (id, expected) in cases {
        let denied = notification(
            NotificationType::RequestDenied,
            "denied",
            Some((RelatedRequestType::Tagging, id)),
        );
        assert_eq!(resolver.resolve(&denied, &related).as_deref(), Some(expected));
    }

    let video_only = notification(
        NotificationType::RequestApproved,
        "approved",
        Some((RelatedRequestType::Tagging, "req-v")),
    );
    assert_eq!(
        resolver.resolve(&video_only, &VideoSections).as_deref(),
        Some("/events/E1/sections/S1/videos/V1")
    );

    let missing = notification(
        NotificationType::RequestApproved,
        "approved",
        Some((RelatedRequestType::Tagging, "req-gone")),
    );
    assert_eq!(resolver.resolve(&missing, &related), None);
}

#[test]
fn notifications_resolver_module_links_team_and_ownership_requests_to_the_event() {
    let resolver = NotificationTargetResolver::default();
    let team = WorkflowRequest::TeamMember(TeamMemberRequest {
        id: RequestId::parse("req-t").expect("request id"),
        event_id: EventId::parse("E7").expect("event id"),
        sender_id: UserId::parse("bob").expect("user id"),
        status: RequestStatus::Approved,
        created_at: 1,
        updated_at: 2,
    });
    let ownership = WorkflowRequest::Ownership(OwnershipRequest {
        id: RequestId::parse("req-o").expect("request id"),
        event_id: EventId::parse("E8").expect("event id"),
        sender_id: UserId::parse("bob").expect("user id"),
        status: RequestStatus::Pending,
        created_at: 1,
        updated_at: 1,
    });
    let related = lookup(vec![team, ownership]);

    let approved = notification(
        NotificationType::RequestApproved,
        "approved",
        Some((RelatedRequestType::TeamMember, "req-t")),
    );
    assert_eq!(resolver.resolve(&approved, &related).as_deref(), Some("/events/E7"));

    for kind in [
        NotificationType::OwnershipRequested,
        NotificationType::OwnershipRequestApproved,
        NotificationType::OwnershipRequestDenied,
    ] {
        let owned = notification(kind, "ownership", Some((RelatedRequestType::Ownership, "req-o")));
        assert_eq!(resolver.resolve(&owned, &related).as_deref(), Some("/events/E8"));
    }

    let wrong_kind = notification(
        NotificationType::RequestApproved,
        "approved",
        Some((RelatedRequestType::TeamMember, "req-o")),
    );
    assert_eq!(resolver.resolve(&wrong_kind, &related), None);
}

#[test]
fn notifications_resolver_module_leaves_generic_decisions_on_ownership_unresolved() {
    let resolver = NotificationTargetResolver::default();
    let ownership = WorkflowRequest::Ownership(OwnershipRequest {
        id: RequestId::parse("req-o").expect("request id"),
        event_id: EventId::parse("E8").expect("event id"),
        sender_id: UserId::parse("bob").expect("user id"),
        status: RequestStatus::Approved,
        created_at: 1,
        updated_at: 2,
    });
    let related = lookup(vec![ownership]);

    for kind in [NotificationType::RequestApproved, NotificationType::RequestDenied] {
        let decided = notification(
            kind,
            "decided|eventId:E8",
            Some((RelatedRequestType::Ownership, "req-o")),
        );
        assert_eq!(resolver.resolve(&decided, &related), None);
    }
}

#[test]
fn notifications_resolver_module_falls_back_to_the_tail_for_ownership() {
    let resolver = NotificationTargetResolver::default();

    let legacy_requested = notification(
        NotificationType::OwnershipRequested,
        "bob wants your event|eventId:E3|sectionId:S9",
        Some((RelatedRequestType::Ownership, "req-gone")),
    );
    assert_eq!(
        resolver.resolve(&legacy_requested, &NoLookup).as_deref(),
        Some("/events/E3")
    );

    let transferred = notification(
        NotificationType::OwnershipTransferred,
        "Ownership moved|sectionId:S1|eventId:E4",
        None,
    );
    assert_eq!(
        resolver.resolve(&transferred, &NoLookup).as_deref(),
        Some("/events/E4")
    );

    let untraceable = notification(NotificationType::OwnershipTransferred, "Ownership moved", None);
    assert_eq!(resolver.resolve(&untraceable, &NoLookup), None);
}

#[test]
fn notifications_resolver_module_never_navigates_auth_level_changes() {
    let resolver = NotificationTargetResolver::default();
    let approved = notification(
        NotificationType::RequestApproved,
        "approved|eventId:E1",
        Some((RelatedRequestType::AuthLevelChange, "req-a")),
    );
    assert_eq!(resolver.resolve(&approved, &NoLookup), None);
}

#[test]
fn notifications_resolver_module_decodes_tails_into_typed_contexts() {
    assert_eq!(
        decode_legacy_tail("x|eventId:E1|eventId:E2"),
        Some(NavigationContext::EventOnly {
            event_id: "E1".to_string()
        })
    );
    assert_eq!(
        decode_legacy_tail("x| eventId:E1 | sectionId:S1 "),
        Some(NavigationContext::EventSection {
            event_id: "E1".to_string(),
            section_id: "S1".to_string()
        })
    );
}
