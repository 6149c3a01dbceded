//! Authenticated client for the tenant management API.

mod bucket_cache;
mod client_config;
mod credentials;
mod executor;
mod storagegrid_client;

pub(crate) use bucket_cache::BucketCache;
pub use client_config::{
    ClientConfig, DEFAULT_BUCKET_CACHE_TTL, DEFAULT_DELETE_GRACE_PERIOD, DEFAULT_REQUEST_TIMEOUT,
    MANAGEMENT_PORT, S3_PORT,
};
pub use credentials::Credentials;
pub(crate) use executor::ApiClient;
pub use storagegrid_client::StorageGridClient;
