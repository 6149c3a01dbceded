//! `storagegrid_s3_bucket_versioning` data source.

use async_trait::async_trait;
use serde::Serialize;
use storagegrid_client::StorageGridClient;

use super::{BucketLookup, DataSource};
use crate::diagnostics::Diagnostic;
use crate::resource::ResourceResult;

/// Raw versioning flags of a bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketVersioningDataModel {
    pub bucket_name: String,
    pub versioning_enabled: bool,
    pub versioning_suspended: bool,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BucketVersioningDataSource;

#[async_trait]
impl DataSource for BucketVersioningDataSource {
    type Config = BucketLookup;
    type Model = BucketVersioningDataModel;

    fn type_name(&self) -> &'static str {
        "storagegrid_s3_bucket_versioning"
    }

    async fn read(
        &self,
        client: &StorageGridClient,
        config: BucketLookup,
    ) -> ResourceResult<BucketVersioningDataModel> {
        let versioning = client
            .bucket_versioning(&config.bucket_name)
            .await
            .map_err(|e| {
                Diagnostic::from_client(
                    format!("Unable to Read S3 Bucket Versioning for {}", config.bucket_name),
                    &e,
                )
            })?;

        Ok(BucketVersioningDataModel {
            bucket_name: config.bucket_name,
            versioning_enabled: versioning.versioning_enabled,
            versioning_suspended: versioning.versioning_suspended,
        })
    }
}
