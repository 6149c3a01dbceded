//! `storagegrid_s3_bucket_object_lock_configuration` resource.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use storagegrid_client::StorageGridClient;
use storagegrid_client::types::ObjectLockConfig;
use tracing::warn;

use super::{ReadOutcome, Resource, ResourceResult};
use crate::TRACING_TARGET_RESOURCE;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::models::RetentionModel;

/// Upstream message returned by grids that cannot turn object lock off.
const CANNOT_DISABLE: &str = "Invalid ObjectLockEnabled value";

/// Attributes of a bucket's object-lock configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketObjectLockModel {
    pub bucket_name: String,
    #[serde(default)]
    pub default_retention_setting: Option<RetentionModel>,
    #[serde(default)]
    pub id: Option<String>,
}

impl BucketObjectLockModel {
    fn new(bucket_name: &str, lock: &ObjectLockConfig) -> Self {
        Self {
            bucket_name: bucket_name.to_owned(),
            default_retention_setting: lock.default_retention_setting.map(RetentionModel::from),
            id: Some(bucket_name.to_owned()),
        }
    }
}

/// Default retention of a bucket created with object lock.
#[derive(Debug, Default, Clone, Copy)]
pub struct BucketObjectLockResource;

impl BucketObjectLockResource {
    async fn apply(
        &self,
        client: &StorageGridClient,
        action: &str,
        mut planned: BucketObjectLockModel,
    ) -> ResourceResult<BucketObjectLockModel> {
        let retention = planned.default_retention_setting.map(Into::into);
        client
            .update_bucket_object_lock(&planned.bucket_name, true, retention)
            .await
            .map_err(|e| {
                Diagnostic::from_client(
                    format!(
                        "Unable to {action} S3 Bucket Object Lock Configuration for {}",
                        planned.bucket_name
                    ),
                    &e,
                )
            })?;

        planned.id = Some(planned.bucket_name.clone());
        Ok(planned)
    }
}

#[async_trait]
impl Resource for BucketObjectLockResource {
    type Model = BucketObjectLockModel;

    fn type_name(&self) -> &'static str {
        "storagegrid_s3_bucket_object_lock_configuration"
    }

    fn requires_replace(&self) -> &'static [&'static str] {
        &["bucket_name"]
    }

    fn plan(
        &self,
        mut proposed: BucketObjectLockModel,
        _prior: Option<&BucketObjectLockModel>,
    ) -> ResourceResult<BucketObjectLockModel> {
        proposed.id = Some(proposed.bucket_name.clone());
        Ok(proposed)
    }

    async fn create(
        &self,
        client: &StorageGridClient,
        planned: BucketObjectLockModel,
    ) -> ResourceResult<BucketObjectLockModel> {
        let bucket = &planned.bucket_name;
        let current = client.bucket_object_lock(bucket).await.map_err(|e| {
            Diagnostic::from_client(
                format!("Unable to Check Current Object Lock Status for {bucket}"),
                &e,
            )
        })?;

        if !current.enabled {
            return Err(Diagnostic::error(
                "Object Lock Not Enabled on Bucket",
                format!(
                    "Bucket {bucket} does not have object lock enabled. Object lock must be \
                     enabled at bucket creation time using the storagegrid_s3_bucket resource \
                     with object_lock_enabled=true. This resource can only be used on buckets \
                     that already have object lock enabled."
                ),
            )
            .into());
        }

        self.apply(client, "Create", planned).await
    }

    async fn read(
        &self,
        client: &StorageGridClient,
        state: BucketObjectLockModel,
    ) -> ResourceResult<ReadOutcome<BucketObjectLockModel>> {
        let lock = client
            .bucket_object_lock(&state.bucket_name)
            .await
            .map_err(|e| {
                Diagnostic::from_client(
                    format!(
                        "Unable to Read S3 Bucket Object Lock Configuration for {}",
                        state.bucket_name
                    ),
                    &e,
                )
            })?;

        Ok(ReadOutcome::Found(BucketObjectLockModel::new(
            &state.bucket_name,
            &lock,
        )))
    }

    async fn update(
        &self,
        client: &StorageGridClient,
        planned: BucketObjectLockModel,
        _prior: BucketObjectLockModel,
    ) -> ResourceResult<BucketObjectLockModel> {
        self.apply(client, "Update", planned).await
    }

    /// Disables object lock, or clears the default retention where the grid
    /// refuses to disable it.
    async fn delete(
        &self,
        client: &StorageGridClient,
        state: BucketObjectLockModel,
    ) -> ResourceResult<Diagnostics> {
        let bucket = &state.bucket_name;
        let error = match client.update_bucket_object_lock(bucket, false, None).await {
            Ok(_) => return Ok(Diagnostics::new()),
            Err(e) if e.mentions(CANNOT_DISABLE) => e,
            Err(e) => {
                return Err(Diagnostic::from_client(
                    format!("Unable to Delete S3 Bucket Object Lock Configuration for {bucket}"),
                    &e,
                )
                .into());
            }
        };

        warn!(
            target: TRACING_TARGET_RESOURCE,
            bucket = %bucket,
            error = %error,
            "Object lock cannot be disabled, clearing default retention"
        );

        let warning = match client.update_bucket_object_lock(bucket, true, None).await {
            Ok(_) => Diagnostic::warning(
                "Object Lock Remains Enabled",
                format!(
                    "Object lock cannot be disabled on bucket {bucket} once enabled. Default \
                     retention settings have been cleared, but object lock remains active."
                ),
            ),
            Err(_) => Diagnostic::warning(
                "Cannot Disable Object Lock",
                format!(
                    "Object lock cannot be disabled on bucket {bucket} once enabled. The object \
                     lock configuration resource has been removed from Terraform state, but \
                     object lock will remain enabled on the bucket with no default retention \
                     settings."
                ),
            ),
        };
        Ok(warning.into())
    }

    async fn import(
        &self,
        client: &StorageGridClient,
        id: &str,
    ) -> ResourceResult<BucketObjectLockModel> {
        let lock = client.bucket_object_lock(id).await.map_err(|e| {
            Diagnostic::error(
                format!("Unable to Import S3 Bucket Object Lock Configuration for {id}"),
                format!(
                    "Bucket does not exist or object lock configuration is not accessible: {e}"
                ),
            )
        })?;

        if !lock.enabled {
            return Err(Diagnostic::error(
                "Object Lock Not Enabled on Bucket",
                format!(
                    "Cannot import object lock configuration for bucket {id} because object lock \
                     is not enabled. This resource can only be used on buckets that have object \
                     lock enabled."
                ),
            )
            .into());
        }

        Ok(BucketObjectLockModel::new(id, &lock))
    }
}
