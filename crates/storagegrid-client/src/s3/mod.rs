//! S3-protocol access through short-lived access keys.
//!
//! Lifecycle configuration is only reachable over the S3 protocol. The client
//! issues itself a temporary access key through the management API, connects
//! an S3 client with it, and revokes the key again on cleanup.

mod credential_manager;
#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
mod memory_store;
mod minio_store;

use std::sync::Arc;

use async_trait::async_trait;
pub(crate) use credential_manager::CredentialManager;
#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub use memory_store::{MemoryConnector, MemoryStore};
pub use minio_store::MinioConnector;
use url::Url;

use crate::Result;
use crate::types::{IssuedS3AccessKey, LifecycleConfiguration};

/// Bucket lifecycle operations of an S3 client.
#[async_trait]
pub trait LifecycleStore: Send + Sync {
    /// Returns the lifecycle rules of a bucket, empty if none are set.
    async fn get_bucket_lifecycle(&self, bucket: &str) -> Result<LifecycleConfiguration>;

    /// Replaces the lifecycle rules of a bucket.
    async fn put_bucket_lifecycle(
        &self,
        bucket: &str,
        configuration: &LifecycleConfiguration,
    ) -> Result<()>;

    /// Removes all lifecycle rules from a bucket.
    async fn delete_bucket_lifecycle(&self, bucket: &str) -> Result<()>;
}

/// Builds S3 clients for a temporary access key.
pub trait S3Connector: Send + Sync + std::fmt::Debug {
    /// Connects to `endpoint` with the given key.
    fn connect(&self, endpoint: &Url, key: &IssuedS3AccessKey)
    -> Result<Arc<dyn LifecycleStore>>;
}
