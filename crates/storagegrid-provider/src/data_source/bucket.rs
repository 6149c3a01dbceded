//! `storagegrid_s3_bucket` data source.

use async_trait::async_trait;
use serde::Serialize;
use storagegrid_client::StorageGridClient;
use storagegrid_client::types::{
    BucketRecord, ComplianceConfig, DeleteObjectStatus, ObjectLockConfig,
};

use super::{BucketLookup, DataSource};
use crate::diagnostics::Diagnostic;
use crate::models::RetentionModel;
use crate::resource::ResourceResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ComplianceModel {
    pub auto_delete: bool,
    pub legal_hold: bool,
    pub retention_period_minutes: i64,
}

impl From<ComplianceConfig> for ComplianceModel {
    fn from(value: ComplianceConfig) -> Self {
        Self {
            auto_delete: value.auto_delete,
            legal_hold: value.legal_hold,
            retention_period_minutes: value.retention_period_minutes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ObjectLockModel {
    pub enabled: bool,
    pub default_retention_setting: Option<RetentionModel>,
}

impl From<ObjectLockConfig> for ObjectLockModel {
    fn from(value: ObjectLockConfig) -> Self {
        Self {
            enabled: value.enabled,
            default_retention_setting: value.default_retention_setting.map(Into::into),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteStatusModel {
    pub is_deleting_objects: bool,
    pub initial_object_count: String,
    pub initial_object_bytes: String,
}

impl From<DeleteObjectStatus> for DeleteStatusModel {
    fn from(value: DeleteObjectStatus) -> Self {
        Self {
            is_deleting_objects: value.is_deleting_objects,
            initial_object_count: value.initial_object_count,
            initial_object_bytes: value.initial_object_bytes,
        }
    }
}

/// Attributes of a looked-up bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketDataModel {
    pub bucket_name: String,
    pub name: String,
    pub creation_time: String,
    pub region: String,
    pub compliance: Option<ComplianceModel>,
    pub s3_object_lock: Option<ObjectLockModel>,
    pub delete_status: Option<DeleteStatusModel>,
}

impl BucketDataModel {
    fn new(bucket_name: String, bucket: BucketRecord) -> Self {
        Self {
            bucket_name,
            region: bucket.region_or_default().to_owned(),
            name: bucket.name,
            creation_time: bucket.creation_time,
            compliance: bucket.compliance.map(Into::into),
            s3_object_lock: bucket.s3_object_lock.map(Into::into),
            delete_status: bucket.delete_object_status.map(Into::into),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BucketDataSource;

#[async_trait]
impl DataSource for BucketDataSource {
    type Config = BucketLookup;
    type Model = BucketDataModel;

    fn type_name(&self) -> &'static str {
        "storagegrid_s3_bucket"
    }

    async fn read(
        &self,
        client: &StorageGridClient,
        config: BucketLookup,
    ) -> ResourceResult<BucketDataModel> {
        let bucket = client.bucket(&config.bucket_name).await.map_err(|e| {
            Diagnostic::from_client(format!("Unable to Read S3 Bucket {}", config.bucket_name), &e)
        })?;
        Ok(BucketDataModel::new(config.bucket_name, bucket))
    }
}
