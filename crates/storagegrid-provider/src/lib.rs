#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

// Tracing target constants for consistent logging
pub const TRACING_TARGET_PROVIDER: &str = "storagegrid_provider::provider";
pub const TRACING_TARGET_RESOURCE: &str = "storagegrid_provider::resource";
pub const TRACING_TARGET_DATA_SOURCE: &str = "storagegrid_provider::data_source";

mod config;
pub mod data_source;
mod diagnostics;
pub mod models;
pub mod protocol;
mod provider;
pub mod resource;

pub use crate::config::ProviderConfig;
pub use crate::diagnostics::{Diagnostic, Diagnostics, Severity};
pub use crate::protocol::{Request, Response, Schema};
pub use crate::provider::Provider;
