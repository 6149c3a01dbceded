//! Wire types for the StorageGRID tenant management API.

mod access_key;
mod bucket;
mod envelope;
mod group;
mod lifecycle;
mod policy;
mod retention;
mod string_or_slice;
mod user;
mod versioning;

pub(crate) use access_key::CreateAccessKey;
pub use access_key::{CURRENT_USER, IssuedS3AccessKey, S3AccessKey};
pub use bucket::{
    BucketRecord, ComplianceConfig, CreateBucketRequest, DEFAULT_REGION, DeleteObjectStatus,
    ObjectLockConfig, ReplicationConfig,
};
pub use envelope::{Alert, ApiResponse, ResponseMetadata, STATUS_SUCCESS, TIMESTAMP_FORMAT};
pub use group::{GROUP_PREFIX, Group, GroupPayload};
pub use lifecycle::{
    Expiration, LifecycleConfiguration, LifecycleFilter, LifecycleRule,
    NoncurrentVersionExpiration, RuleStatus,
};
pub use policy::{
    Condition, ManagementPolicy, Policies, S3Policy, Statement, policies_are_equivalent,
};
pub use retention::{RetentionMode, RetentionSetting};
pub use string_or_slice::StringOrSlice;
pub(crate) use user::ChangePassword;
pub use user::{USER_PREFIX, User, UserPayload};
pub use versioning::{BucketVersioning, VersioningStatus};
