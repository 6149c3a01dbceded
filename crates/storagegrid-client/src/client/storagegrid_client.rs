//! High-level StorageGRID client handle.

use std::sync::Arc;

use tracing::{info, instrument};

use super::{ApiClient, BucketCache, ClientConfig};
use crate::s3::{CredentialManager, MinioConnector, S3Connector};
use crate::{Result, TRACING_TARGET_CLIENT};

pub(crate) struct ClientInner {
    pub(crate) api: ApiClient,
    pub(crate) buckets: BucketCache,
    pub(crate) s3: CredentialManager,
}

/// Client for one StorageGRID tenant account.
///
/// Cheap to clone. All clones share the bearer token, the bucket list cache
/// and the temporary S3 credential.
///
/// # Examples
///
/// ```rust,no_run
/// use storagegrid_client::{ClientConfig, Credentials, StorageGridClient};
///
/// # async fn example() -> storagegrid_client::Result<()> {
/// let config = ClientConfig::parse("https://grid.example.com:9443")?
///     .with_credentials(Credentials::new("12345678901234567890", "root", "secret"));
/// let client = StorageGridClient::connect(config).await?;
///
/// let buckets = client.bucket_list().await?;
/// client.cleanup().await;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct StorageGridClient {
    pub(crate) inner: Arc<ClientInner>,
}

impl std::fmt::Debug for StorageGridClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageGridClient")
            .field("api", &self.inner.api)
            .field("s3", &self.inner.s3)
            .finish_non_exhaustive()
    }
}

impl StorageGridClient {
    /// Connects and signs in, using MinIO for S3 operations.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the HTTP client cannot
    /// be built, or sign-in fails.
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        Self::connect_with(config, Arc::new(MinioConnector)).await
    }

    /// Connects and signs in, building S3 clients with `connector`.
    #[instrument(skip_all, target = TRACING_TARGET_CLIENT, fields(endpoint = %config.endpoint_masked()))]
    pub async fn connect_with(config: ClientConfig, connector: Arc<dyn S3Connector>) -> Result<Self> {
        let bucket_cache_ttl = config.bucket_cache_ttl;
        let api = ApiClient::connect(config).await?;

        info!(
            target: TRACING_TARGET_CLIENT,
            authenticated = api.is_authenticated(),
            "StorageGRID client initialized"
        );

        let inner = ClientInner {
            api,
            buckets: BucketCache::new(bucket_cache_ttl),
            s3: CredentialManager::new(connector),
        };
        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Returns the client configuration.
    #[inline]
    pub fn config(&self) -> &ClientConfig {
        self.inner.api.config()
    }

    /// Returns whether the client holds a bearer token.
    #[inline]
    pub fn is_authenticated(&self) -> bool {
        self.inner.api.is_authenticated()
    }

    /// Returns the id of the temporary S3 access key, if one is issued.
    pub async fn temporary_key_id(&self) -> Option<String> {
        self.inner.s3.issued_key_id().await
    }

    /// Revokes the temporary S3 access key and drops the S3 client.
    ///
    /// Safe to call any number of times, including when no key was issued.
    pub async fn cleanup(&self) {
        self.inner.s3.cleanup(&self.inner.api).await;
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::{Credentials, Error};

    #[tokio::test]
    async fn sign_in_stores_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v4/authorize"))
            .and(body_json(serde_json::json!({
                "accountId": "12345",
                "username": "root",
                "password": "pw",
                "cookie": true,
                "csrfToken": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "responseTime": "2025-01-01T00:00:00.000Z",
                "status": "success",
                "apiVersion": "4.0",
                "data": "token-abc"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v4/org/users/u1"))
            .and(header("authorization", "Bearer token-abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "data": {"id": "u1", "uniqueName": "user/alice"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = ClientConfig::parse(&server.uri())
            .unwrap()
            .with_credentials(Credentials::new("12345", "root", "pw"));
        let client = StorageGridClient::connect(config).await.unwrap();

        assert!(client.is_authenticated());
        let user = client.user("u1").await.unwrap();
        assert_eq!(user.short_name(), "alice");
    }

    #[tokio::test]
    async fn rejected_sign_in_fails_construction() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v4/authorize"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad credentials"))
            .mount(&server)
            .await;

        let config = ClientConfig::parse(&server.uri())
            .unwrap()
            .with_credentials(Credentials::new("12345", "root", "wrong"));
        let error = StorageGridClient::connect(config).await.unwrap_err();

        match error {
            Error::Authentication { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "bad credentials");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn missing_credentials_yield_unauthenticated_client() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let config = ClientConfig::parse(&server.uri()).unwrap();
        let client = StorageGridClient::connect(config).await.unwrap();
        assert!(!client.is_authenticated());
        client.cleanup().await;
    }

    #[tokio::test]
    async fn non_success_status_carries_code_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/org/groups/g1"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let client = StorageGridClient::connect(ClientConfig::parse(&server.uri()).unwrap())
            .await
            .unwrap();
        let error = client.group("g1").await.unwrap_err();
        assert_eq!(error.to_string(), "status: 503, body: maintenance");
        assert!(!error.is_not_found());
    }
}
