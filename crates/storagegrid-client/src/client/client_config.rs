//! Client configuration.

use std::time::Duration;

use url::Url;

use super::Credentials;
use crate::{Error, Result};

/// Default timeout for management API requests: 60 seconds.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Pause before re-checking a bucket whose delete timed out.
pub const DEFAULT_DELETE_GRACE_PERIOD: Duration = Duration::from_secs(2);

/// How long a fetched bucket list is served from memory.
pub const DEFAULT_BUCKET_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Port of the tenant management API.
pub const MANAGEMENT_PORT: u16 = 9443;

/// Port of the S3 endpoint on the same host.
pub const S3_PORT: u16 = 10443;

/// Configuration for [`StorageGridClient`].
///
/// [`StorageGridClient`]: super::StorageGridClient
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Management API base URL, e.g. `https://grid.example.com:9443`.
    pub endpoint: Url,

    /// Sign-in credentials. Without them the client is unauthenticated.
    pub credentials: Option<Credentials>,

    /// Explicit S3 endpoint. Derived from `endpoint` when absent.
    pub s3_endpoint: Option<Url>,

    /// Timeout applied to every management API request.
    pub request_timeout: Duration,

    /// Pause before reconciling a timed-out bucket delete.
    pub delete_grace_period: Duration,

    /// Lifetime of the cached bucket list.
    pub bucket_cache_ttl: Duration,
}

impl ClientConfig {
    /// Creates a configuration for the given management endpoint.
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            credentials: None,
            s3_endpoint: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            delete_grace_period: DEFAULT_DELETE_GRACE_PERIOD,
            bucket_cache_ttl: DEFAULT_BUCKET_CACHE_TTL,
        }
    }

    /// Parses the endpoint and creates a configuration.
    pub fn parse(endpoint: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| Error::Config(format!("invalid endpoint URL '{endpoint}': {e}")))?;
        Ok(Self::new(endpoint))
    }

    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    #[must_use]
    pub fn with_s3_endpoint(mut self, s3_endpoint: Url) -> Self {
        self.s3_endpoint = Some(s3_endpoint);
        self
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_delete_grace_period(mut self, grace_period: Duration) -> Self {
        self.delete_grace_period = grace_period;
        self
    }

    #[must_use]
    pub fn with_bucket_cache_ttl(mut self, ttl: Duration) -> Self {
        self.bucket_cache_ttl = ttl;
        self
    }

    /// Returns the request timeout, using the default if zero.
    pub fn effective_timeout(&self) -> Duration {
        if self.request_timeout.is_zero() {
            DEFAULT_REQUEST_TIMEOUT
        } else {
            self.request_timeout
        }
    }

    /// Returns the endpoint without credentials or path, safe for logging.
    pub fn endpoint_masked(&self) -> String {
        match (self.endpoint.host_str(), self.endpoint.port()) {
            (Some(host), Some(port)) => format!("{}://{host}:{port}", self.endpoint.scheme()),
            (Some(host), None) => format!("{}://{host}", self.endpoint.scheme()),
            _ => self.endpoint.scheme().to_owned(),
        }
    }

    /// Builds the URL of a management API path such as `/org/users`.
    pub fn api_url(&self, path: &str) -> String {
        format!(
            "{}/api/v4{path}",
            self.endpoint.as_str().trim_end_matches('/')
        )
    }

    /// Returns the S3 endpoint for this grid.
    ///
    /// Uses the explicit S3 endpoint when set; otherwise swaps the management
    /// port for the S3 port on the same host.
    pub fn s3_endpoint(&self) -> Url {
        if let Some(endpoint) = &self.s3_endpoint {
            return endpoint.clone();
        }

        let mut endpoint = self.endpoint.clone();
        if endpoint.port() == Some(MANAGEMENT_PORT) {
            // Infallible for URLs that already carry a port.
            let _ = endpoint.set_port(Some(S3_PORT));
        }
        endpoint
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.endpoint.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "invalid endpoint scheme '{}', expected http or https",
                self.endpoint.scheme()
            )));
        }

        if self.endpoint.host_str().is_none_or(str::is_empty) {
            return Err(Error::Config("endpoint must include a host".to_owned()));
        }

        if let Some(credentials) = &self.credentials
            && credentials.is_incomplete()
        {
            return Err(Error::Config(
                "account id, username and password are all required to sign in".to_owned(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ClientConfig::parse("https://grid.example.com:9443").unwrap();
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.delete_grace_period, Duration::from_secs(2));
        assert_eq!(config.bucket_cache_ttl, Duration::from_secs(300));
        assert!(config.credentials.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn s3_endpoint_swaps_management_port() {
        let config = ClientConfig::parse("https://grid.example.com:9443").unwrap();
        assert_eq!(
            config.s3_endpoint().as_str(),
            "https://grid.example.com:10443/"
        );
    }

    #[test]
    fn s3_endpoint_keeps_other_ports_and_overrides() {
        let config = ClientConfig::parse("https://grid.example.com:8443").unwrap();
        assert_eq!(config.s3_endpoint().port(), Some(8443));

        let config = config.with_s3_endpoint(Url::parse("https://s3.example.com").unwrap());
        assert_eq!(config.s3_endpoint().as_str(), "https://s3.example.com/");
    }

    #[test]
    fn api_url_joins_without_double_slash() {
        let config = ClientConfig::parse("https://grid.example.com:9443/").unwrap();
        assert_eq!(
            config.api_url("/org/containers"),
            "https://grid.example.com:9443/api/v4/org/containers"
        );
    }

    #[test]
    fn validation_rejects_bad_input() {
        let config = ClientConfig::parse("ftp://grid.example.com").unwrap();
        assert!(config.validate().is_err());

        let config = ClientConfig::parse("https://grid.example.com")
            .unwrap()
            .with_credentials(Credentials::new("", "root", "pw"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn debug_output_hides_password() {
        let config = ClientConfig::parse("https://grid.example.com")
            .unwrap()
            .with_credentials(Credentials::new("12345", "root", "hunter2"));
        let debug = format!("{config:?}");
        assert!(debug.contains("12345"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn zero_timeout_falls_back_to_default() {
        let config = ClientConfig::parse("https://grid.example.com")
            .unwrap()
            .with_request_timeout(Duration::ZERO);
        assert_eq!(config.effective_timeout(), DEFAULT_REQUEST_TIMEOUT);
    }
}
