//! Temporary S3 credential lifecycle.

use std::future::Future;
use std::sync::Arc;

use jiff::{SignedDuration, Timestamp};
use reqwest::Method;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::{LifecycleStore, S3Connector};
use crate::client::ApiClient;
use crate::types::{CURRENT_USER, CreateAccessKey, IssuedS3AccessKey, TIMESTAMP_FORMAT};
use crate::{Error, Result, TRACING_TARGET_S3};

/// Lifetime requested for temporary access keys.
const TEMPORARY_KEY_LIFETIME: SignedDuration = SignedDuration::from_hours(24);

struct S3Session {
    store: Arc<dyn LifecycleStore>,
    key: IssuedS3AccessKey,
}

/// A connected store together with the key it was built from.
struct Lease {
    store: Arc<dyn LifecycleStore>,
    key_id: String,
}

/// Issues, caches and revokes the temporary access key behind S3 operations.
pub(crate) struct CredentialManager {
    connector: Arc<dyn S3Connector>,
    session: Mutex<Option<S3Session>>,
}

impl std::fmt::Debug for CredentialManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialManager")
            .field("connector", &self.connector)
            .finish_non_exhaustive()
    }
}

impl CredentialManager {
    pub fn new(connector: Arc<dyn S3Connector>) -> Self {
        Self {
            connector,
            session: Mutex::new(None),
        }
    }

    /// Returns the id of the currently issued key, if any.
    pub async fn issued_key_id(&self) -> Option<String> {
        self.session
            .lock()
            .await
            .as_ref()
            .map(|session| session.key.key.id.clone())
    }

    /// Returns the cached store, issuing a key and connecting on first use.
    async fn acquire(&self, api: &ApiClient) -> Result<Lease> {
        let mut session = self.session.lock().await;
        if let Some(session) = session.as_ref() {
            return Ok(Lease {
                store: Arc::clone(&session.store),
                key_id: session.key.key.id.clone(),
            });
        }

        let key = issue_temporary_key(api).await?;
        let endpoint = api.config().s3_endpoint();
        let store = match self.connector.connect(&endpoint, &key) {
            Ok(store) => store,
            Err(e) => {
                revoke_or_warn(api, &key.key.id).await;
                return Err(e);
            }
        };

        info!(
            target: TRACING_TARGET_S3,
            endpoint = %endpoint,
            access_key = %key.access_key_masked(),
            "Created S3 client with temporary access key"
        );

        let lease = Lease {
            store: Arc::clone(&store),
            key_id: key.key.id.clone(),
        };
        *session = Some(S3Session { store, key });
        Ok(lease)
    }

    /// Drops the cached session if it still uses `key_id`, revoking the key.
    async fn discard(&self, api: &ApiClient, key_id: &str) {
        let taken = {
            let mut session = self.session.lock().await;
            match session.as_ref() {
                Some(current) if current.key.key.id == key_id => session.take(),
                _ => None,
            }
        };

        if let Some(session) = taken {
            revoke_or_warn(api, &session.key.key.id).await;
        }
    }

    /// Runs an S3 operation, replacing the credential once on auth failure.
    ///
    /// Access denied, invalid or expired key errors revoke the current key,
    /// issue exactly one fresh key and retry `op` once. Any other error, or a
    /// second failure, is returned to the caller.
    pub async fn execute<T, F, Fut>(&self, api: &ApiClient, op: F) -> Result<T>
    where
        F: Fn(Arc<dyn LifecycleStore>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let lease = self.acquire(api).await?;
        let error = match op(lease.store).await {
            Err(error) if error.is_s3_auth_error() => error,
            result => return result,
        };

        warn!(
            target: TRACING_TARGET_S3,
            error = %error,
            "S3 operation failed with auth error, refreshing temporary credential"
        );

        self.discard(api, &lease.key_id).await;
        let lease = self
            .acquire(api)
            .await
            .map_err(|e| Error::S3Refresh(Box::new(e)))?;

        op(lease.store)
            .await
            .map_err(|e| Error::S3RetryExhausted(Box::new(e)))
    }

    /// Revokes the temporary key, if one was issued, and drops the client.
    pub async fn cleanup(&self, api: &ApiClient) {
        let taken = self.session.lock().await.take();
        match taken {
            Some(session) => {
                revoke_or_warn(api, &session.key.key.id).await;
                info!(target: TRACING_TARGET_S3, "Revoked temporary S3 access key");
            }
            None => debug!(target: TRACING_TARGET_S3, "No temporary S3 access key to revoke"),
        }
    }
}

async fn issue_temporary_key(api: &ApiClient) -> Result<IssuedS3AccessKey> {
    let expires = Timestamp::now()
        .checked_add(TEMPORARY_KEY_LIFETIME)
        .map_err(|e| Error::Config(format!("invalid key expiry: {e}")))?
        .strftime(TIMESTAMP_FORMAT)
        .to_string();

    let path = format!("/org/users/{CURRENT_USER}/s3-access-keys");
    let body = CreateAccessKey {
        expires: Some(&expires),
    };
    let response = api
        .call_with::<_, IssuedS3AccessKey>(Method::POST, &path, &body, "access key response")
        .await?;

    if !response.is_success() {
        return Err(Error::Unsuccessful {
            operation: "access key creation",
            status: response.status,
        });
    }

    debug!(
        target: TRACING_TARGET_S3,
        key_id = %response.data.key.id,
        expires = %expires,
        "Issued temporary S3 access key"
    );
    Ok(response.into_data())
}

async fn revoke_or_warn(api: &ApiClient, key_id: &str) {
    let path = format!("/org/users/{CURRENT_USER}/s3-access-keys/{key_id}");
    if let Err(e) = api.call_discard(Method::DELETE, &path).await {
        warn!(
            target: TRACING_TARGET_S3,
            key_id,
            error = %e,
            "Failed to delete temporary access key"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use url::Url;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::client::ClientConfig;
    use crate::types::LifecycleConfiguration;

    const KEYS_PATH: &str = "/api/v4/org/users/current-user/s3-access-keys";

    /// Store whose first `failures` calls fail with the given error text.
    #[derive(Debug)]
    struct FlakyStore {
        failures: AtomicUsize,
        error: &'static str,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LifecycleStore for FlakyStore {
        async fn get_bucket_lifecycle(&self, _bucket: &str) -> Result<LifecycleConfiguration> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let remaining = self.failures.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures.store(remaining - 1, Ordering::SeqCst);
                return Err(Error::S3(self.error.to_owned()));
            }
            Ok(LifecycleConfiguration::default())
        }

        async fn put_bucket_lifecycle(
            &self,
            _bucket: &str,
            _configuration: &LifecycleConfiguration,
        ) -> Result<()> {
            Ok(())
        }

        async fn delete_bucket_lifecycle(&self, _bucket: &str) -> Result<()> {
            Ok(())
        }
    }

    #[derive(Debug)]
    struct FakeConnector {
        store: Arc<FlakyStore>,
        connects: AtomicUsize,
        endpoints: std::sync::Mutex<Vec<String>>,
    }

    impl FakeConnector {
        fn new(failures: usize, error: &'static str) -> Arc<Self> {
            Arc::new(Self {
                store: Arc::new(FlakyStore {
                    failures: AtomicUsize::new(failures),
                    error,
                    calls: AtomicUsize::new(0),
                }),
                connects: AtomicUsize::new(0),
                endpoints: std::sync::Mutex::new(Vec::new()),
            })
        }
    }

    impl S3Connector for FakeConnector {
        fn connect(
            &self,
            endpoint: &Url,
            _key: &IssuedS3AccessKey,
        ) -> Result<Arc<dyn LifecycleStore>> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            self.endpoints.lock().unwrap().push(endpoint.to_string());
            Ok(self.store.clone())
        }
    }

    fn issued_key() -> serde_json::Value {
        serde_json::json!({
            "responseTime": "2025-01-01T00:00:00.000Z",
            "status": "success",
            "apiVersion": "4.0",
            "data": {"id": "key-1", "accessKey": "AKIATEMPORARY", "secretAccessKey": "secret"}
        })
    }

    async fn api_for(server: &MockServer) -> ApiClient {
        let config = ClientConfig::parse(&server.uri()).unwrap();
        ApiClient::connect(config).await.unwrap()
    }

    async fn get_lifecycle(
        manager: &CredentialManager,
        api: &ApiClient,
    ) -> Result<LifecycleConfiguration> {
        manager
            .execute(api, |store| async move { store.get_bucket_lifecycle("logs").await })
            .await
    }

    #[tokio::test]
    async fn expired_token_refreshes_once_and_retries() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(KEYS_PATH))
            .and(body_string_contains("expires"))
            .respond_with(ResponseTemplate::new(201).set_body_json(issued_key()))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(format!("{KEYS_PATH}/key-1")))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let api = api_for(&server).await;
        let connector = FakeConnector::new(1, "ExpiredToken: The provided token has expired");
        let manager = CredentialManager::new(connector.clone());

        assert!(get_lifecycle(&manager, &api).await.is_ok());
        assert_eq!(connector.connects.load(Ordering::SeqCst), 2);
        assert_eq!(connector.store.calls.load(Ordering::SeqCst), 2);
        assert_eq!(manager.issued_key_id().await.as_deref(), Some("key-1"));
    }

    #[tokio::test]
    async fn second_auth_failure_surfaces() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(KEYS_PATH))
            .respond_with(ResponseTemplate::new(201).set_body_json(issued_key()))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let api = api_for(&server).await;
        let connector = FakeConnector::new(2, "AccessDenied");
        let manager = CredentialManager::new(connector.clone());

        let error = get_lifecycle(&manager, &api).await.unwrap_err();
        assert!(matches!(error, Error::S3RetryExhausted(_)));
        assert!(error.to_string().starts_with("S3 operation failed after retry"));
        assert_eq!(connector.store.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn other_errors_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(KEYS_PATH))
            .respond_with(ResponseTemplate::new(201).set_body_json(issued_key()))
            .expect(1)
            .mount(&server)
            .await;

        let api = api_for(&server).await;
        let connector = FakeConnector::new(1, "NoSuchBucket");
        let manager = CredentialManager::new(connector.clone());

        let error = get_lifecycle(&manager, &api).await.unwrap_err();
        assert!(matches!(error, Error::S3(_)));
        assert_eq!(connector.store.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn client_is_cached_between_operations() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(KEYS_PATH))
            .respond_with(ResponseTemplate::new(201).set_body_json(issued_key()))
            .expect(1)
            .mount(&server)
            .await;

        let api = api_for(&server).await;
        let connector = FakeConnector::new(0, "");
        let manager = CredentialManager::new(connector.clone());

        get_lifecycle(&manager, &api).await.unwrap();
        get_lifecycle(&manager, &api).await.unwrap();
        assert_eq!(connector.connects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn refresh_failure_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(KEYS_PATH))
            .respond_with(ResponseTemplate::new(201).set_body_json(issued_key()))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(KEYS_PATH))
            .respond_with(ResponseTemplate::new(500).set_body_string("quota"))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let api = api_for(&server).await;
        let manager = CredentialManager::new(FakeConnector::new(1, "InvalidAccessKeyId"));

        let error = get_lifecycle(&manager, &api).await.unwrap_err();
        assert!(matches!(error, Error::S3Refresh(_)));
        assert!(manager.issued_key_id().await.is_none());
    }

    #[tokio::test]
    async fn unsuccessful_envelope_is_rejected() {
        let server = MockServer::start().await;
        let mut body = issued_key();
        body["status"] = serde_json::json!("error");
        Mock::given(method("POST"))
            .and(path(KEYS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let api = api_for(&server).await;
        let manager = CredentialManager::new(FakeConnector::new(0, ""));
        let error = get_lifecycle(&manager, &api).await.unwrap_err();
        assert_eq!(error.to_string(), "access key creation failed with status: error");
    }

    #[tokio::test]
    async fn cleanup_without_key_makes_no_requests() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(204))
            .expect(0)
            .mount(&server)
            .await;

        let api = api_for(&server).await;
        let manager = CredentialManager::new(FakeConnector::new(0, ""));
        manager.cleanup(&api).await;
        manager.cleanup(&api).await;
    }

    #[tokio::test]
    async fn cleanup_revokes_issued_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(KEYS_PATH))
            .respond_with(ResponseTemplate::new(201).set_body_json(issued_key()))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(format!("{KEYS_PATH}/key-1")))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let api = api_for(&server).await;
        let manager = CredentialManager::new(FakeConnector::new(0, ""));
        get_lifecycle(&manager, &api).await.unwrap();

        manager.cleanup(&api).await;
        assert!(manager.issued_key_id().await.is_none());
    }

    #[tokio::test]
    async fn connects_to_configured_s3_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(KEYS_PATH))
            .respond_with(ResponseTemplate::new(201).set_body_json(issued_key()))
            .mount(&server)
            .await;

        let config = ClientConfig::parse(&server.uri())
            .unwrap()
            .with_s3_endpoint(Url::parse("https://s3.grid.example.com:10443").unwrap());
        let api = ApiClient::connect(config).await.unwrap();
        let connector = FakeConnector::new(0, "");
        let manager = CredentialManager::new(connector.clone());

        get_lifecycle(&manager, &api).await.unwrap();
        assert_eq!(
            connector.endpoints.lock().unwrap().as_slice(),
            ["https://s3.grid.example.com:10443/".to_owned()]
        );
    }
}
