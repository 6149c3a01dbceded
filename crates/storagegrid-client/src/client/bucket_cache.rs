//! Time-boxed cache of the bucket inventory.

use std::future::Future;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::types::BucketRecord;
use crate::{Result, TRACING_TARGET_BUCKETS};

#[derive(Debug, Default)]
struct Snapshot {
    entries: Vec<BucketRecord>,
    fetched_at: Option<Instant>,
}

impl Snapshot {
    fn is_fresh(&self, ttl: Duration) -> bool {
        !self.entries.is_empty() && self.fetched_at.is_some_and(|at| at.elapsed() < ttl)
    }
}

/// Bucket list cache shared by all callers of one client.
///
/// Lookups take the read lock. A miss upgrades to the write lock and checks
/// freshness again before fetching, so concurrent misses issue one request.
#[derive(Debug)]
pub(crate) struct BucketCache {
    ttl: Duration,
    snapshot: RwLock<Snapshot>,
}

impl BucketCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            snapshot: RwLock::new(Snapshot::default()),
        }
    }

    /// Returns the cached list, or replaces it wholesale with `fetch()`.
    pub async fn get_or_refresh<F, Fut>(&self, fetch: F) -> Result<Vec<BucketRecord>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<BucketRecord>>>,
    {
        {
            let snapshot = self.snapshot.read().await;
            if snapshot.is_fresh(self.ttl) {
                tracing::trace!(
                    target: TRACING_TARGET_BUCKETS,
                    count = snapshot.entries.len(),
                    "Bucket list served from cache"
                );
                return Ok(snapshot.entries.clone());
            }
        }

        let mut snapshot = self.snapshot.write().await;
        if snapshot.is_fresh(self.ttl) {
            return Ok(snapshot.entries.clone());
        }

        let entries = fetch().await?;
        tracing::debug!(
            target: TRACING_TARGET_BUCKETS,
            count = entries.len(),
            "Bucket list cache refreshed"
        );
        *snapshot = Snapshot {
            entries: entries.clone(),
            fetched_at: Some(Instant::now()),
        };
        Ok(entries)
    }

    /// Drops the cached list so the next lookup fetches.
    pub async fn invalidate(&self) {
        *self.snapshot.write().await = Snapshot::default();
        tracing::debug!(target: TRACING_TARGET_BUCKETS, "Bucket list cache invalidated");
    }
}
