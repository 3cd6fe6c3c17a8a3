pub mod navigation;
pub mod resolver;
pub mod service;
pub mod sqlite;
pub mod store;

pub use navigation::{decode_legacy_tail, strip_legacy_tail, NavigationContext};
pub use resolver::{
    NoLookup, NotificationTargetResolver, RelatedRequestLookup, StoreLookup,
    DEFAULT_DASHBOARD_PATH,
};
pub use service::NotificationService;
pub use sqlite::SqliteNotificationStore;
pub use store::{NotificationStore, NotificationStoreError};
