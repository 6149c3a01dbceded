//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── provider: ProviderConfig   # Endpoint, account, credentials
//! └── cleanup_timeout            # Bound on credential revocation at exit
//! ```
//!
//! All values can be provided via CLI arguments or environment variables.
//! Values left unset here can still be supplied by the host's `configure`
//! request.

use std::process;
use std::time::Duration;

use clap::Parser;
use storagegrid_provider::ProviderConfig;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "terraform-provider-storagegrid")]
#[command(about = "StorageGRID provider plugin")]
#[command(version)]
pub struct Cli {
    /// Default connection settings for the provider.
    #[clap(flatten)]
    pub provider: ProviderConfig,

    /// Maximum time in seconds to wait for cleanup before exiting.
    #[arg(long, env = "STORAGEGRID_CLEANUP_TIMEOUT", default_value_t = 30)]
    pub cleanup_timeout: u64,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing with environment-based filtering.
    ///
    /// Logs are written to stderr; stdout carries protocol responses.
    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    #[inline]
    pub fn cleanup_timeout(&self) -> Duration {
        Duration::from_secs(self.cleanup_timeout)
    }

    /// Logs configuration (no sensitive information).
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            endpoint = ?self.provider.endpoint,
            account_id = ?self.provider.account_id,
            username = ?self.provider.username,
            has_password = self.provider.password.is_some(),
            s3_endpoint = ?self.provider.s3_endpoint,
            request_timeout_secs = ?self.provider.request_timeout,
            cleanup_timeout_secs = self.cleanup_timeout,
            "Provider defaults"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn arguments_fill_provider_defaults() {
        let cli = Cli::parse_from([
            "terraform-provider-storagegrid",
            "--endpoint",
            "https://grid.example.com:9443",
            "--account-id",
            "12345",
            "--cleanup-timeout",
            "5",
        ]);
        assert_eq!(
            cli.provider.endpoint.as_deref(),
            Some("https://grid.example.com:9443")
        );
        assert_eq!(cli.provider.account_id.as_deref(), Some("12345"));
        assert_eq!(cli.cleanup_timeout(), Duration::from_secs(5));
    }
}
