//! Management API operations on [`StorageGridClient`].
//!
//! Each submodule adds one resource family to the client: buckets with their
//! cache and delete reconciliation, bucket versioning and object lock, IAM users,
//! groups and access keys, and S3 lifecycle rules.
//!
//! [`StorageGridClient`]: crate::StorageGridClient

mod access_keys;
mod buckets;
mod groups;
mod lifecycle;
mod object_lock;
mod users;
mod versioning;

/// Collection path of the bucket endpoints.
const CONTAINERS_PATH: &str = "/org/containers";

fn container_path(name: &str, suffix: &str) -> String {
    format!("{CONTAINERS_PATH}/{name}{suffix}")
}
