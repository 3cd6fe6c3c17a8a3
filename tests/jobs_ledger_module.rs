use serde_json::json;
use tagflow::auth::{Actor, AuthLevel};
use tagflow::config::Settings;
use tagflow::domain::{Role, TagTarget};
use tagflow::engine::Engine;
use tagflow::jobs::{
    run_bulk_tagging, BulkTagItem, JobLedger, JobLedgerError, JobRecord, JobReporter, JobStatus,
    SqliteJobLedger, BULK_TAG_JOB_KIND,
};
use tagflow::resources::ResourceGraph;
use tagflow::shared::ids::{EventId, JobId, SectionId, UserId};
use tagflow::shared::WorkflowError;
use tempfile::tempdir;

fn user(id: &str) -> UserId {
    UserId::parse(id).expect("user id")
}

fn open_ledger(dir: &std::path::Path) -> SqliteJobLedger {
    let ledger = SqliteJobLedger::open(&dir.join("tagflow.db")).expect("open ledger");
    ledger.ensure_schema().expect("schema");
    ledger
}

fn section_item(event: &str, section: &str, role: Role, target: &str) -> BulkTagItem {
    BulkTagItem {
        event_id: EventId::parse(event).expect("event id"),
        section_id: Some(SectionId::parse(section).expect("section id")),
        video_id: None,
        role,
        user_id: user(target),
    }
}

#[test]
fn jobs_ledger_module_walks_a_job_to_completion() {
    let temp = tempdir().expect("tempdir");
    let ledger = open_ledger(temp.path());

    let job = ledger.create_job("import", &user("root")).expect("create");
    assert_eq!(job.status, JobStatus::Pending);
    assert!(job.id.as_str().starts_with("job-"));

    let processing = ledger
        .update_job_status(&job.id, JobStatus::Processing, None, None)
        .expect("processing");
    assert_eq!(processing.status, JobStatus::Processing);

    let done = ledger
        .update_job_status(&job.id, JobStatus::Completed, Some(&json!({"ok": 3})), None)
        .expect("complete");
    assert_eq!(done.status, JobStatus::Completed);
    assert_eq!(done.result, Some(json!({"ok": 3})));
    assert!(done.error.is_none());

    let stored = ledger.get_job(&job.id).expect("get").expect("exists");
    assert_eq!(stored, done);
}

#[test]
fn jobs_ledger_module_never_moves_a_terminal_job() {
    let temp = tempdir().expect("tempdir");
    let ledger = open_ledger(temp.path());
    let job = ledger.create_job("import", &user("root")).expect("create");

    let err = ledger
        .update_job_status(&job.id, JobStatus::Completed, None, None)
        .expect_err("pending cannot complete directly");
    assert!(matches!(err, JobLedgerError::InvalidTransition { .. }));

    ledger
        .update_job_status(&job.id, JobStatus::Failed, None, Some("boom"))
        .expect("fail");
    for next in [JobStatus::Pending, JobStatus::Processing, JobStatus::Completed] {
        let err = ledger
            .update_job_status(&job.id, next, None, None)
            .expect_err("terminal job");
        assert!(matches!(
            err,
            JobLedgerError::InvalidTransition {
                from: JobStatus::Failed,
                ..
            }
        ));
    }
    let stored = ledger.get_job(&job.id).expect("get").expect("exists");
    assert_eq!(stored.status, JobStatus::Failed);
    assert_eq!(stored.error.as_deref(), Some("boom"));

    let missing = JobId::parse("job-missing").expect("job id");
    assert!(ledger.get_job(&missing).expect("get").is_none());
    assert!(matches!(
        ledger.update_job_status(&missing, JobStatus::Processing, None, None),
        Err(JobLedgerError::NotFound { .. })
    ));
}

#[test]
fn jobs_ledger_module_marks_abandoned_reporters_failed() {
    let temp = tempdir().expect("tempdir");
    let ledger = open_ledger(temp.path());

    let job_id = {
        let reporter = JobReporter::start(&ledger, "import", &user("root")).expect("start");
        reporter.processing().expect("processing");
        reporter.job_id().clone()
    };
    let stored = ledger.get_job(&job_id).expect("get").expect("exists");
    assert_eq!(stored.status, JobStatus::Failed);
    assert!(stored.error.is_some());

    let reporter = JobReporter::start(&ledger, "import", &user("root")).expect("start");
    reporter.processing().expect("processing");
    let done = reporter.complete(&json!([])).expect("complete");
    let stored = ledger.get_job(&done.id).expect("get").expect("exists");
    assert_eq!(stored.status, JobStatus::Completed);
}

/// Refuses every move to `completed`; everything else reaches the inner ledger.
struct CompletionRefusingLedger<'a> {
    inner: &'a SqliteJobLedger,
}

impl JobLedger for CompletionRefusingLedger<'_> {
    fn create_job(&self, kind: &str, created_by: &UserId) -> Result<JobRecord, JobLedgerError> {
        self.inner.create_job(kind, created_by)
    }

    fn update_job_status(
        &self,
        job_id: &JobId,
        status: JobStatus,
        result: Option<&serde_json::Value>,
        error: Option<&str>,
    ) -> Result<JobRecord, JobLedgerError> {
        if status == JobStatus::Completed {
            return Err(JobLedgerError::NotFound {
                job_id: job_id.to_string(),
            });
        }
        self.inner.update_job_status(job_id, status, result, error)
    }

    fn get_job(&self, job_id: &JobId) -> Result<Option<JobRecord>, JobLedgerError> {
        self.inner.get_job(job_id)
    }
}

#[test]
fn jobs_ledger_module_marks_reporters_failed_when_the_final_update_errors() {
    let temp = tempdir().expect("tempdir");
    let ledger = open_ledger(temp.path());
    let refusing = CompletionRefusingLedger { inner: &ledger };

    let reporter = JobReporter::start(&refusing, "import", &user("root")).expect("start");
    reporter.processing().expect("processing");
    let job_id = reporter.job_id().clone();
    let err = reporter
        .complete(&json!({ "applied": 1 }))
        .expect_err("completion refused");
    assert!(matches!(err, JobLedgerError::NotFound { .. }));

    let stored = ledger.get_job(&job_id).expect("get").expect("exists");
    assert_eq!(stored.status, JobStatus::Failed);
    assert!(stored.result.is_none());
    assert!(stored.error.is_some());
}

#[test]
fn jobs_ledger_module_parses_status_spellings() {
    assert_eq!(JobStatus::parse(" Processing ").expect("parse"), JobStatus::Processing);
    assert!(JobStatus::parse("running").is_err());
    assert!(JobStatus::Failed.is_terminal());
    assert!(!JobStatus::Processing.is_terminal());
}

#[test]
fn jobs_ledger_module_bulk_tagging_summarises_every_item() {
    let temp = tempdir().expect("tempdir");
    let engine =
        Engine::open(Settings::with_database(temp.path().join("tagflow.db"))).expect("engine");
    let resources = engine.resources();
    let e1 = EventId::parse("E1").expect("event id");
    let s1 = SectionId::parse("S1").expect("section id");
    resources
        .create_event(&e1, "Summer Jam", &user("carol"))
        .expect("create E1");
    resources.create_section(&s1, &e1, "Top 16").expect("create S1");

    let root = Actor::new(user("root"), AuthLevel::SuperAdmin);
    let items = vec![
        section_item("E1", "S1", Role::Dancer, "alice"),
        section_item("E1", "S1", Role::Winner, "bob"),
        section_item("E1", "S1", Role::Organizer, "bob"),
        section_item("E404", "S1", Role::Dancer, "bob"),
    ];
    let job = run_bulk_tagging(&engine.request_service(), engine.jobs(), &root, items, 10)
        .expect("bulk tagging");
    assert_eq!(job.kind, BULK_TAG_JOB_KIND);
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.created_by, user("root"));

    let summary = job.result.expect("summary");
    assert_eq!(summary["total"], 4);
    assert_eq!(summary["applied"], 2);
    assert_eq!(summary["pendingCreated"], 0);
    let failures = summary["failures"].as_array().expect("failures");
    assert_eq!(failures.len(), 2);
    assert_eq!(failures[0]["index"], 2);
    assert_eq!(failures[0]["code"], "validation_error");
    assert_eq!(failures[1]["index"], 3);
    assert_eq!(failures[1]["code"], "not_found");

    let tags = resources
        .tags_for(&TagTarget::Section {
            event_id: e1,
            section_id: s1,
        })
        .expect("tags");
    assert_eq!(tags.len(), 2);
}

#[test]
fn jobs_ledger_module_bulk_tagging_is_super_admin_only_and_bounded() {
    let temp = tempdir().expect("tempdir");
    let engine =
        Engine::open(Settings::with_database(temp.path().join("tagflow.db"))).expect("engine");
    let items = || vec![section_item("E1", "S1", Role::Dancer, "alice"); 3];

    for level in [AuthLevel::BaseUser, AuthLevel::Creator, AuthLevel::Moderator, AuthLevel::Admin] {
        let err = run_bulk_tagging(
            &engine.request_service(),
            engine.jobs(),
            &Actor::new(user("someone"), level),
            items(),
            10,
        )
        .expect_err("not a super admin");
        assert!(matches!(err, WorkflowError::Unauthorized(_)));
    }

    let err = run_bulk_tagging(
        &engine.request_service(),
        engine.jobs(),
        &Actor::new(user("root"), AuthLevel::SuperAdmin),
        items(),
        2,
    )
    .expect_err("too many items");
    assert!(matches!(err, WorkflowError::Validation(_)));
}
