pub mod decision;
pub mod pending_key;
pub mod service;
pub mod sqlite;
pub mod store;

pub use decision::{decide, has_update_rights, ApplyDecision, RequestAction};
pub use pending_key::compute_pending_key;
pub use service::{
    Creation, PendingQuery, PendingSummary, RequestOutcome, RequestService, TaggingInput,
};
pub use sqlite::SqliteRequestStore;
pub use store::{RequestStore, RequestStoreError};
