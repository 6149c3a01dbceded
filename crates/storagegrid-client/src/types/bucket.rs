//! Bucket (container) records returned by the management API.

use serde::{Deserialize, Serialize};

use super::RetentionSetting;

/// Region used when a bucket is created without one.
pub const DEFAULT_REGION: &str = "us-east-1";

/// A bucket as listed by `GET /org/containers`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketRecord {
    pub name: String,
    #[serde(default)]
    pub creation_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compliance: Option<ComplianceConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3_object_lock: Option<ObjectLockConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_object_status: Option<DeleteObjectStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cross_grid_replication: Option<ReplicationConfig>,
}

impl BucketRecord {
    /// Returns the bucket region, falling back to the default region.
    pub fn region_or_default(&self) -> &str {
        self.region.as_deref().unwrap_or(DEFAULT_REGION)
    }

    /// Returns whether S3 object lock is enabled on the bucket.
    pub fn object_lock_enabled(&self) -> bool {
        self.s3_object_lock.as_ref().is_some_and(|lock| lock.enabled)
    }
}

/// Legacy compliance settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComplianceConfig {
    pub auto_delete: bool,
    pub legal_hold: bool,
    pub retention_period_minutes: i64,
}

/// S3 object lock state of a bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectLockConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_retention_setting: Option<RetentionSetting>,
}

/// Progress of a background "delete all objects" job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeleteObjectStatus {
    pub is_deleting_objects: bool,
    pub initial_object_count: String,
    pub initial_object_bytes: String,
}

/// Cross-grid replication rules, kept opaque.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplicationConfig {
    pub rules: Vec<serde_json::Value>,
}

/// Request body for `POST /org/containers`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBucketRequest {
    pub name: String,
    pub region: String,
    pub s3_object_lock: ObjectLockConfig,
}
