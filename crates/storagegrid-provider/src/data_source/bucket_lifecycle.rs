//! `storagegrid_s3_bucket_lifecycle_configuration` data source.

use async_trait::async_trait;
use storagegrid_client::StorageGridClient;

use super::{BucketLookup, DataSource};
use crate::diagnostics::Diagnostic;
use crate::resource::{BucketLifecycleModel, ResourceResult};

#[derive(Debug, Default, Clone, Copy)]
pub struct BucketLifecycleDataSource;

#[async_trait]
impl DataSource for BucketLifecycleDataSource {
    type Config = BucketLookup;
    type Model = BucketLifecycleModel;

    fn type_name(&self) -> &'static str {
        "storagegrid_s3_bucket_lifecycle_configuration"
    }

    async fn read(
        &self,
        client: &StorageGridClient,
        config: BucketLookup,
    ) -> ResourceResult<BucketLifecycleModel> {
        let configuration = client
            .bucket_lifecycle(&config.bucket_name)
            .await
            .map_err(|e| {
                Diagnostic::from_client(
                    format!(
                        "Unable to Read S3 Bucket Lifecycle Configuration for {}",
                        config.bucket_name
                    ),
                    &e,
                )
            })?;

        Ok(BucketLifecycleModel {
            bucket_name: config.bucket_name.clone(),
            rules: configuration.rules,
            id: Some(config.bucket_name),
        })
    }
}
