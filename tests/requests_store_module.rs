use tagflow::domain::{
    OwnershipRequest, RequestKind, RequestStatus, Role, TaggingRequest, WorkflowRequest,
};
use tagflow::requests::{RequestStore, RequestStoreError, SqliteRequestStore};
use tagflow::shared::ids::{EventId, RequestId, SectionId, UserId, VideoId};
use tempfile::tempdir;

fn open_store(dir: &std::path::Path) -> SqliteRequestStore {
    let store = SqliteRequestStore::open(&dir.join("tagflow.db")).expect("open store");
    store.ensure_schema().expect("schema");
    store
}

fn tagging(id: &str, created_at: i64, video: Option<&str>, section: Option<&str>) -> WorkflowRequest {
    WorkflowRequest::Tagging(TaggingRequest {
        id: RequestId::parse(id).expect("request id"),
        event_id: EventId::parse("E1").expect("event id"),
        video_id: video.map(|raw| VideoId::parse(raw).expect("video id")),
        section_id: section.map(|raw| SectionId::parse(raw).expect("section id")),
        role: Role::Dancer,
        sender_id: UserId::parse("alice").expect("user id"),
        target_user_id: UserId::parse("alice").expect("user id"),
        status: RequestStatus::Pending,
        created_at,
        updated_at: created_at,
    })
}

fn ownership(id: &str, sender: &str) -> WorkflowRequest {
    WorkflowRequest::Ownership(OwnershipRequest {
        id: RequestId::parse(id).expect("request id"),
        event_id: EventId::parse("E2").expect("event id"),
        sender_id: UserId::parse(sender).expect("user id"),
        status: RequestStatus::Pending,
        created_at: 5,
        updated_at: 5,
    })
}

#[test]
fn requests_store_module_creates_and_finds_pending_requests() {
    let temp = tempdir().expect("tempdir");
    let store = open_store(temp.path());

    let request = tagging("req-1", 10, Some("V1"), None);
    let created = store.create(&request).expect("create");
    assert_eq!(created, request);

    let found = store
        .find_pending(&request.pending_key())
        .expect("find pending")
        .expect("pending request");
    assert_eq!(found, request);

    let by_id = store
        .find_by_id(request.id())
        .expect("find by id")
        .expect("request exists");
    assert_eq!(by_id.kind(), RequestKind::Tagging);
    assert_eq!(by_id.role(), Some(Role::Dancer));
}

#[test]
fn requests_store_module_rejects_a_second_pending_request_for_the_same_key() {
    let temp = tempdir().expect("tempdir");
    let store = open_store(temp.path());

    store
        .create(&tagging("req-1", 10, Some("V1"), None))
        .expect("create first");
    let err = store
        .create(&tagging("req-2", 11, Some("V1"), None))
        .expect_err("duplicate must fail");
    assert!(matches!(err, RequestStoreError::DuplicatePending { .. }));

    store
        .create(&tagging("req-3", 12, None, Some("V1")))
        .expect("section with the same id is a different key");
    assert_eq!(
        store
            .count_with_status(RequestStatus::Pending)
            .expect("count"),
        2
    );
}

#[test]
fn requests_store_module_allows_a_new_request_after_the_previous_one_ends() {
    let temp = tempdir().expect("tempdir");
    let store = open_store(temp.path());

    let first = ownership("req-1", "bob");
    store.create(&first).expect("create");
    store
        .transition(first.id(), RequestStatus::Denied, 20)
        .expect("deny");

    store
        .create(&ownership("req-2", "bob"))
        .expect("a denied request frees the key");
}

#[test]
fn requests_store_module_transitions_only_pending_requests() {
    let temp = tempdir().expect("tempdir");
    let store = open_store(temp.path());

    let request = ownership("req-1", "bob");
    store.create(&request).expect("create");

    let approved = store
        .transition(request.id(), RequestStatus::Approved, 30)
        .expect("approve");
    assert_eq!(approved.status(), RequestStatus::Approved);

    let err = store
        .transition(request.id(), RequestStatus::Cancelled, 31)
        .expect_err("terminal request");
    match err {
        RequestStoreError::NotPending { status, .. } => {
            assert_eq!(status, RequestStatus::Approved)
        }
        other => panic!("unexpected error: {other}"),
    }

    let missing = RequestId::parse("req-missing").expect("request id");
    let err = store
        .transition(&missing, RequestStatus::Denied, 32)
        .expect_err("missing request");
    assert!(matches!(err, RequestStoreError::NotFound { .. }));

    let err = store
        .transition(request.id(), RequestStatus::Pending, 33)
        .expect_err("pending is not a target state");
    assert!(matches!(err, RequestStoreError::InvalidTransition { .. }));
}

#[test]
fn requests_store_module_refuses_to_create_terminal_requests() {
    let temp = tempdir().expect("tempdir");
    let store = open_store(temp.path());

    let WorkflowRequest::Ownership(mut inner) = ownership("req-1", "bob") else {
        panic!("expected ownership request");
    };
    inner.status = RequestStatus::Approved;
    let err = store
        .create(&WorkflowRequest::Ownership(inner))
        .expect_err("only pending requests are created");
    assert!(matches!(err, RequestStoreError::NotCreatedPending { .. }));
}

#[test]
fn requests_store_module_lists_pending_oldest_first() {
    let temp = tempdir().expect("tempdir");
    let store = open_store(temp.path());

    store
        .create(&tagging("req-b", 20, None, Some("S1")))
        .expect("create");
    store
        .create(&tagging("req-a", 10, Some("V1"), None))
        .expect("create");
    store.create(&ownership("req-c", "bob")).expect("create");

    let all = store.list_pending(None).expect("list all");
    let ids: Vec<&str> = all.iter().map(|request| request.id().as_str()).collect();
    assert_eq!(ids, vec!["req-c", "req-a", "req-b"]);

    let e1 = EventId::parse("E1").expect("event id");
    assert_eq!(store.list_pending(Some(&e1)).expect("list e1").len(), 2);

    let alice = UserId::parse("alice").expect("user id");
    let mine = store
        .list_pending_for_sender(&alice, &e1)
        .expect("list for sender");
    assert_eq!(mine.len(), 2);
    let bob = UserId::parse("bob").expect("user id");
    assert!(store
        .list_pending_for_sender(&bob, &e1)
        .expect("list for bob")
        .is_empty());
}
