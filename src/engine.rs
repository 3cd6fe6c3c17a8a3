use crate::config::Settings;
use crate::jobs::{JobLedgerError, SqliteJobLedger};
use crate::notifications::{
    NotificationService, NotificationStoreError, NotificationTargetResolver,
    SqliteNotificationStore, StoreLookup,
};
use crate::requests::{RequestService, RequestStoreError, SqliteRequestStore};
use crate::resources::{ResourceGraphError, SqliteResourceGraph};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Resources(#[from] ResourceGraphError),
    #[error(transparent)]
    Requests(#[from] RequestStoreError),
    #[error(transparent)]
    Notifications(#[from] NotificationStoreError),
    #[error(transparent)]
    Jobs(#[from] JobLedgerError),
}

/// All stores over one SQLite file, plus the settings the services read.
#[derive(Debug, Clone)]
pub struct Engine {
    settings: Settings,
    resources: SqliteResourceGraph,
    requests: SqliteRequestStore,
    notifications: SqliteNotificationStore,
    jobs: SqliteJobLedger,
}

impl Engine {
    /// Opens every store and creates missing tables.
    pub fn open(settings: Settings) -> Result<Self, EngineError> {
        let path = settings.database_path.as_path();
        let resources = SqliteResourceGraph::open(path)?;
        resources.ensure_schema()?;
        let requests = SqliteRequestStore::open(path)?;
        requests.ensure_schema()?;
        let notifications = SqliteNotificationStore::open(path)?;
        notifications.ensure_schema()?;
        let jobs = SqliteJobLedger::open(path)?;
        jobs.ensure_schema()?;
        tracing::debug!(database = %path.display(), "engine opened");
        Ok(Self {
            settings,
            resources,
            requests,
            notifications,
            jobs,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn resources(&self) -> &SqliteResourceGraph {
        &self.resources
    }

    pub fn request_store(&self) -> &SqliteRequestStore {
        &self.requests
    }

    pub fn notification_store(&self) -> &SqliteNotificationStore {
        &self.notifications
    }

    pub fn jobs(&self) -> &SqliteJobLedger {
        &self.jobs
    }

    pub fn request_service(&self) -> RequestService<'_> {
        RequestService::new(&self.requests, &self.resources, &self.notifications)
            .with_config(self.settings.requests)
            .with_event_log(self.settings.event_log_path.as_deref())
    }

    pub fn notification_service(&self) -> NotificationService<'_> {
        NotificationService::new(&self.notifications)
    }

    pub fn target_resolver(&self) -> NotificationTargetResolver {
        NotificationTargetResolver::new(self.settings.notifications.dashboard_path.clone())
    }

    pub fn related_lookup(&self) -> StoreLookup<'_> {
        StoreLookup {
            requests: &self.requests,
            resources: &self.resources,
        }
    }
}
