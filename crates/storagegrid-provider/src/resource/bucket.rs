//! `storagegrid_s3_bucket` resource.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use storagegrid_client::StorageGridClient;
use storagegrid_client::types::{BucketRecord, DEFAULT_REGION};
use tracing::info;

use super::{ReadOutcome, Resource, ResourceResult};
use crate::TRACING_TARGET_RESOURCE;
use crate::diagnostics::{Diagnostic, Diagnostics};

fn default_region() -> String {
    DEFAULT_REGION.to_owned()
}

/// Attributes of an S3 bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketModel {
    pub name: String,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default)]
    pub object_lock_enabled: bool,
    #[serde(default)]
    pub id: Option<String>,
}

impl From<&BucketRecord> for BucketModel {
    fn from(bucket: &BucketRecord) -> Self {
        Self {
            name: bucket.name.clone(),
            region: bucket.region_or_default().to_owned(),
            object_lock_enabled: bucket.object_lock_enabled(),
            id: Some(bucket.name.clone()),
        }
    }
}

/// S3 bucket. Every attribute forces replacement.
#[derive(Debug, Default, Clone, Copy)]
pub struct BucketResource;

#[async_trait]
impl Resource for BucketResource {
    type Model = BucketModel;

    fn type_name(&self) -> &'static str {
        "storagegrid_s3_bucket"
    }

    fn requires_replace(&self) -> &'static [&'static str] {
        &["name", "region", "object_lock_enabled"]
    }

    fn plan(
        &self,
        mut proposed: BucketModel,
        _prior: Option<&BucketModel>,
    ) -> ResourceResult<BucketModel> {
        if proposed.region.is_empty() {
            proposed.region = default_region();
        }
        proposed.id = Some(proposed.name.clone());
        Ok(proposed)
    }

    async fn create(
        &self,
        client: &StorageGridClient,
        mut planned: BucketModel,
    ) -> ResourceResult<BucketModel> {
        client
            .create_bucket(&planned.name, &planned.region, planned.object_lock_enabled)
            .await
            .map_err(|e| {
                Diagnostic::from_client(format!("Unable to Create S3 Bucket {}", planned.name), &e)
            })?;

        planned.id = Some(planned.name.clone());
        Ok(planned)
    }

    async fn read(
        &self,
        client: &StorageGridClient,
        state: BucketModel,
    ) -> ResourceResult<ReadOutcome<BucketModel>> {
        match client.bucket(&state.name).await {
            Ok(bucket) => Ok(ReadOutcome::Found(BucketModel::from(&bucket))),
            Err(e) if e.is_not_found() => {
                info!(
                    target: TRACING_TARGET_RESOURCE,
                    bucket = %state.name,
                    "Bucket disappeared, removing from state"
                );
                Ok(ReadOutcome::Removed(
                    Diagnostic::warning(
                        format!("S3 Bucket {} not found", state.name),
                        "The bucket may have been deleted outside of Terraform. Removing from state.",
                    )
                    .into(),
                ))
            }
            Err(e) => Err(Diagnostic::from_client(
                format!("Unable to Read S3 Bucket {}", state.name),
                &e,
            )
            .into()),
        }
    }

    async fn update(
        &self,
        _client: &StorageGridClient,
        _planned: BucketModel,
        _prior: BucketModel,
    ) -> ResourceResult<BucketModel> {
        Err(Diagnostic::error(
            "Unexpected Update Call",
            "All attributes of this resource require replacement and should trigger a \
             destroy/create instead of update.",
        )
        .into())
    }

    async fn delete(
        &self,
        client: &StorageGridClient,
        state: BucketModel,
    ) -> ResourceResult<Diagnostics> {
        client.delete_bucket(&state.name).await.map_err(|e| {
            Diagnostic::from_client(format!("Unable to Delete S3 Bucket {}", state.name), &e)
        })?;
        Ok(Diagnostics::new())
    }

    async fn import(&self, client: &StorageGridClient, id: &str) -> ResourceResult<BucketModel> {
        let bucket = client.bucket(id).await.map_err(|e| {
            Diagnostic::from_client(format!("Unable to Import S3 Bucket {id}"), &e)
        })?;
        Ok(BucketModel::from(&bucket))
    }
}
