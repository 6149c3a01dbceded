//! In-memory [`LifecycleStore`] for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use url::Url;

use super::{LifecycleStore, S3Connector};
use crate::Result;
use crate::types::{IssuedS3AccessKey, LifecycleConfiguration};

/// Lifecycle rules kept in a map keyed by bucket name.
#[derive(Debug, Default)]
pub struct MemoryStore {
    buckets: Mutex<HashMap<String, LifecycleConfiguration>>,
}

impl MemoryStore {
    /// Returns the stored rules of a bucket, if any were put.
    pub fn get(&self, bucket: &str) -> Option<LifecycleConfiguration> {
        self.buckets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(bucket)
            .cloned()
    }
}

#[async_trait]
impl LifecycleStore for MemoryStore {
    async fn get_bucket_lifecycle(&self, bucket: &str) -> Result<LifecycleConfiguration> {
        Ok(self.get(bucket).unwrap_or_default())
    }

    async fn put_bucket_lifecycle(
        &self,
        bucket: &str,
        configuration: &LifecycleConfiguration,
    ) -> Result<()> {
        self.buckets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(bucket.to_owned(), configuration.clone());
        Ok(())
    }

    async fn delete_bucket_lifecycle(&self, bucket: &str) -> Result<()> {
        self.buckets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(bucket);
        Ok(())
    }
}

/// Connector that hands out one shared [`MemoryStore`].
#[derive(Debug, Default)]
pub struct MemoryConnector {
    store: Arc<MemoryStore>,
    connects: AtomicUsize,
}

impl MemoryConnector {
    /// Returns the shared store.
    pub fn store(&self) -> &Arc<MemoryStore> {
        &self.store
    }

    /// Returns how many S3 clients were requested.
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

impl S3Connector for MemoryConnector {
    fn connect(&self, _endpoint: &Url, _key: &IssuedS3AccessKey) -> Result<Arc<dyn LifecycleStore>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(self.store.clone())
    }
}
