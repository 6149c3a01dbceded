#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]
#![allow(clippy::result_large_err)]

// Tracing target constants for consistent logging
pub const TRACING_TARGET_CLIENT: &str = "storagegrid_client::client";
pub const TRACING_TARGET_BUCKETS: &str = "storagegrid_client::buckets";
pub const TRACING_TARGET_IAM: &str = "storagegrid_client::iam";
pub const TRACING_TARGET_S3: &str = "storagegrid_client::s3";

pub mod client;
mod error;
mod operations;
pub mod s3;
pub mod types;

pub use crate::client::{ClientConfig, Credentials, StorageGridClient};
pub use crate::error::{Error, Result};
pub use crate::s3::{LifecycleStore, MinioConnector, S3Connector};
