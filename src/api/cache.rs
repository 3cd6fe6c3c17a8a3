use crate::shared::ids::{NotificationId, UserId};
use moka::future::Cache;
use std::time::Duration;

const MAX_CACHED_URLS: u64 = 10_000;

type CacheKey = (UserId, NotificationId);

/// Resolved notification URLs per caller. A zero TTL disables caching.
#[derive(Clone)]
pub struct UrlCache {
    ttl: Duration,
    inner: Option<Cache<CacheKey, Option<String>>>,
}

impl UrlCache {
    pub fn new(ttl: Duration) -> Self {
        let inner = if ttl.is_zero() {
            None
        } else {
            Some(
                Cache::builder()
                    .max_capacity(MAX_CACHED_URLS)
                    .time_to_live(ttl)
                    .build(),
            )
        };
        Self { ttl, inner }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// `Some(url)` on a hit, where `url` itself may be `None`.
    pub async fn get(
        &self,
        user_id: &UserId,
        notification_id: &NotificationId,
    ) -> Option<Option<String>> {
        let cache = self.inner.as_ref()?;
        cache
            .get(&(user_id.clone(), notification_id.clone()))
            .await
    }

    pub async fn insert(
        &self,
        user_id: &UserId,
        notification_id: &NotificationId,
        url: Option<String>,
    ) {
        if let Some(cache) = &self.inner {
            cache
                .insert((user_id.clone(), notification_id.clone()), url)
                .await;
        }
    }
}
