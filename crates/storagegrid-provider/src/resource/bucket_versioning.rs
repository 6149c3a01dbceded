//! `storagegrid_s3_bucket_versioning` resource.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use storagegrid_client::types::{BucketVersioning, VersioningStatus};
use storagegrid_client::{Error, StorageGridClient};

use super::{ReadOutcome, Resource, ResourceResult};
use crate::diagnostics::{Diagnostic, Diagnostics};

/// Upstream message returned when versioning is pinned by object lock.
const OBJECT_LOCK_PRESENT: &str = "Object Lock configuration is present";

/// Attributes of a bucket's versioning configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketVersioningModel {
    pub bucket_name: String,
    #[serde(default)]
    pub status: VersioningStatus,
    #[serde(default)]
    pub id: Option<String>,
}

impl BucketVersioningModel {
    fn new(bucket_name: &str, versioning: BucketVersioning) -> Self {
        Self {
            bucket_name: bucket_name.to_owned(),
            status: versioning.into(),
            id: Some(bucket_name.to_owned()),
        }
    }
}

fn object_lock_conflict(bucket: &str) -> Diagnostic {
    Diagnostic::error(
        "Cannot Modify Versioning on Object Lock Enabled Bucket",
        format!(
            "Bucket {bucket} has object lock enabled. When object lock is enabled, versioning \
             cannot be modified. Object lock requires versioning to be enabled and this cannot \
             be changed."
        ),
    )
}

/// Maps an update failure, singling out the object-lock conflict.
fn update_error(action: &str, bucket: &str, error: &Error) -> Diagnostic {
    if error.mentions(OBJECT_LOCK_PRESENT) {
        object_lock_conflict(bucket)
    } else {
        Diagnostic::from_client(
            format!("Unable to {action} S3 Bucket Versioning Configuration for {bucket}"),
            error,
        )
    }
}

/// Versioning state of an existing bucket.
#[derive(Debug, Default, Clone, Copy)]
pub struct BucketVersioningResource;

impl BucketVersioningResource {
    async fn apply(
        &self,
        client: &StorageGridClient,
        action: &str,
        mut planned: BucketVersioningModel,
    ) -> ResourceResult<BucketVersioningModel> {
        client
            .update_bucket_versioning(&planned.bucket_name, planned.status.into())
            .await
            .map_err(|e| update_error(action, &planned.bucket_name, &e))?;

        planned.id = Some(planned.bucket_name.clone());
        Ok(planned)
    }
}

#[async_trait]
impl Resource for BucketVersioningResource {
    type Model = BucketVersioningModel;

    fn type_name(&self) -> &'static str {
        "storagegrid_s3_bucket_versioning"
    }

    fn requires_replace(&self) -> &'static [&'static str] {
        &["bucket_name"]
    }

    fn plan(
        &self,
        mut proposed: BucketVersioningModel,
        _prior: Option<&BucketVersioningModel>,
    ) -> ResourceResult<BucketVersioningModel> {
        if proposed.status == VersioningStatus::Disabled {
            return Err(Diagnostic::error(
                "Invalid Versioning Status",
                "Versioning status must be Enabled or Suspended. A bucket cannot return to \
                 Disabled once versioning was turned on.",
            )
            .with_attribute("status")
            .into());
        }
        proposed.id = Some(proposed.bucket_name.clone());
        Ok(proposed)
    }

    async fn create(
        &self,
        client: &StorageGridClient,
        planned: BucketVersioningModel,
    ) -> ResourceResult<BucketVersioningModel> {
        self.apply(client, "Create", planned).await
    }

    async fn read(
        &self,
        client: &StorageGridClient,
        state: BucketVersioningModel,
    ) -> ResourceResult<ReadOutcome<BucketVersioningModel>> {
        let versioning = client
            .bucket_versioning(&state.bucket_name)
            .await
            .map_err(|e| {
                Diagnostic::from_client(
                    format!(
                        "Unable to Read S3 Bucket Versioning Configuration for {}",
                        state.bucket_name
                    ),
                    &e,
                )
            })?;

        Ok(ReadOutcome::Found(BucketVersioningModel::new(
            &state.bucket_name,
            versioning,
        )))
    }

    async fn update(
        &self,
        client: &StorageGridClient,
        planned: BucketVersioningModel,
        _prior: BucketVersioningModel,
    ) -> ResourceResult<BucketVersioningModel> {
        self.apply(client, "Update", planned).await
    }

    /// Suspends versioning. A bucket pinned by object lock keeps its state.
    async fn delete(
        &self,
        client: &StorageGridClient,
        state: BucketVersioningModel,
    ) -> ResourceResult<Diagnostics> {
        let suspended = BucketVersioning::from(VersioningStatus::Suspended);
        match client
            .update_bucket_versioning(&state.bucket_name, suspended)
            .await
        {
            Ok(_) => Ok(Diagnostics::new()),
            Err(e) if e.mentions(OBJECT_LOCK_PRESENT) => Ok(Diagnostic::warning(
                "Cannot Modify Versioning on Object Lock Enabled Bucket",
                format!(
                    "Bucket {} has object lock enabled. Versioning state cannot be changed when \
                     object lock is present. The versioning configuration resource has been \
                     removed from Terraform state, but the bucket will retain its current \
                     versioning settings.",
                    state.bucket_name
                ),
            )
            .into()),
            Err(e) => Err(update_error("Delete", &state.bucket_name, &e).into()),
        }
    }

    async fn import(
        &self,
        client: &StorageGridClient,
        id: &str,
    ) -> ResourceResult<BucketVersioningModel> {
        let versioning = client.bucket_versioning(id).await.map_err(|e| {
            Diagnostic::error(
                format!("Unable to Import S3 Bucket Versioning Configuration for {id}"),
                format!("Bucket does not exist or versioning configuration is not accessible: {e}"),
            )
        })?;
        Ok(BucketVersioningModel::new(id, versioning))
    }
}
