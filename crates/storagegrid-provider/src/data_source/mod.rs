//! Read-only data sources.
//!
//! A data source decodes its configuration, looks the object up and returns
//! the flattened attributes. Failures are errors, never removals.

mod bucket;
mod bucket_lifecycle;
mod bucket_object_lock;
mod bucket_versioning;
mod group;
mod user;

use async_trait::async_trait;
pub use bucket::{
    BucketDataModel, BucketDataSource, ComplianceModel, DeleteStatusModel, ObjectLockModel,
};
pub use bucket_lifecycle::BucketLifecycleDataSource;
pub use bucket_object_lock::{BucketObjectLockDataModel, BucketObjectLockDataSource};
pub use bucket_versioning::{BucketVersioningDataModel, BucketVersioningDataSource};
pub use group::{GroupDataModel, GroupDataSource, GroupLookup, GroupPoliciesDataModel};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use storagegrid_client::StorageGridClient;
pub use user::{UserDataModel, UserDataSource, UserLookup};

use crate::resource::{ResourceResult, decode, encode};

/// Configuration block shared by the bucket-scoped data sources.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BucketLookup {
    pub bucket_name: String,
}

/// A read-only lookup against the StorageGRID API.
#[async_trait]
pub trait DataSource: Send + Sync + 'static {
    /// Configuration supplied by the user.
    type Config: DeserializeOwned + Send + 'static;
    /// Attributes returned to the host.
    type Model: Serialize + Send + 'static;

    fn type_name(&self) -> &'static str;

    async fn read(
        &self,
        client: &StorageGridClient,
        config: Self::Config,
    ) -> ResourceResult<Self::Model>;
}

/// Type-erased [`DataSource`] working on JSON attribute objects.
#[async_trait]
pub trait ErasedDataSource: Send + Sync {
    fn type_name(&self) -> &'static str;

    async fn read(&self, client: &StorageGridClient, config: Value) -> ResourceResult<Value>;
}

#[async_trait]
impl<D: DataSource> ErasedDataSource for D {
    fn type_name(&self) -> &'static str {
        DataSource::type_name(self)
    }

    async fn read(&self, client: &StorageGridClient, config: Value) -> ResourceResult<Value> {
        encode(DataSource::read(self, client, decode(config)?).await?)
    }
}
