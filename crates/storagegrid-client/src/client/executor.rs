//! Session establishment and request execution.

use std::time::Instant;

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info};

use super::ClientConfig;
use super::credentials::AuthorizeRequest;
use crate::types::ApiResponse;
use crate::{Error, Result, TRACING_TARGET_CLIENT};

const APPLICATION_JSON: &str = "application/json";

/// Authenticated HTTP executor for the management API.
///
/// Holds the bearer token obtained at construction. The token is never
/// refreshed; once it expires, requests fail with the upstream error.
pub(crate) struct ApiClient {
    http: Client,
    config: ClientConfig,
    token: Option<String>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("endpoint", &self.config.endpoint_masked())
            .field("authenticated", &self.token.is_some())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Builds the HTTP client and signs in when credentials are configured.
    ///
    /// Construction fails entirely if sign-in fails.
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let http = Client::builder()
            .timeout(config.effective_timeout())
            .user_agent(concat!("storagegrid-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let token = match &config.credentials {
            Some(credentials) => Some(Self::sign_in(&http, &config, credentials.into()).await?),
            None => {
                info!(
                    target: TRACING_TARGET_CLIENT,
                    endpoint = %config.endpoint_masked(),
                    "No credentials configured, creating unauthenticated client"
                );
                None
            }
        };

        Ok(Self {
            http,
            config,
            token,
        })
    }

    async fn sign_in(
        http: &Client,
        config: &ClientConfig,
        body: AuthorizeRequest<'_>,
    ) -> Result<String> {
        let url = config.api_url("/authorize");
        debug!(
            target: TRACING_TARGET_CLIENT,
            endpoint = %config.endpoint_masked(),
            account_id = body.account_id,
            username = body.username,
            "Signing in"
        );

        let response = http
            .post(&url)
            .header(ACCEPT, APPLICATION_JSON)
            .header(CONTENT_TYPE, APPLICATION_JSON)
            .json(&body)
            .send()
            .await
            .inspect_err(|e| {
                error!(target: TRACING_TARGET_CLIENT, error = %e, "Sign-in request failed");
            })?;

        let status = response.status();
        let text = response.text().await?;
        if status != StatusCode::OK {
            error!(
                target: TRACING_TARGET_CLIENT,
                status = status.as_u16(),
                "Sign-in rejected"
            );
            return Err(Error::Authentication {
                status: status.as_u16(),
                body: text,
            });
        }

        let envelope: ApiResponse<String> =
            serde_json::from_str(&text).map_err(|e| Error::decode("authorize response", e))?;

        info!(
            target: TRACING_TARGET_CLIENT,
            endpoint = %config.endpoint_masked(),
            "Signed in to StorageGRID"
        );
        Ok(envelope.into_data())
    }

    /// Returns the client configuration.
    #[inline]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns whether a bearer token is held.
    #[inline]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Prepares a request for a management API path.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request = self
            .http
            .request(method, self.config.api_url(path))
            .header(ACCEPT, APPLICATION_JSON);

        match &self.token {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {token}")),
            None => request,
        }
    }

    /// Executes a prepared request and returns the body of a 2xx response.
    ///
    /// Any other status becomes [`Error::Status`] carrying the raw body.
    pub async fn execute(&self, request: RequestBuilder) -> Result<String> {
        let request = request.build()?;
        let method = request.method().clone();
        let path = request.url().path().to_owned();
        let started_at = Instant::now();

        let response = self.http.execute(request).await.inspect_err(|e| {
            error!(
                target: TRACING_TARGET_CLIENT,
                %method,
                path = %path,
                timeout = e.is_timeout(),
                error = %e,
                "Request failed"
            );
        })?;

        let status = response.status();
        let body = response.text().await?;
        let elapsed = started_at.elapsed();

        if !status.is_success() {
            debug!(
                target: TRACING_TARGET_CLIENT,
                %method,
                path = %path,
                status = status.as_u16(),
                elapsed_ms = elapsed.as_millis(),
                "Request returned error status"
            );
            return Err(Error::Status {
                status: status.as_u16(),
                body,
            });
        }

        debug!(
            target: TRACING_TARGET_CLIENT,
            %method,
            path = %path,
            status = status.as_u16(),
            elapsed_ms = elapsed.as_millis(),
            "Request completed"
        );
        Ok(body)
    }

    /// Executes a request without a body and decodes the envelope.
    pub async fn call<T>(
        &self,
        method: Method,
        path: &str,
        context: &'static str,
    ) -> Result<ApiResponse<T>>
    where
        T: DeserializeOwned,
    {
        let body = self.execute(self.request(method, path)).await?;
        decode(&body, context)
    }

    /// Executes a request with a JSON body and decodes the envelope.
    pub async fn call_with<B, T>(
        &self,
        method: Method,
        path: &str,
        payload: &B,
        context: &'static str,
    ) -> Result<ApiResponse<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = serde_json::to_vec(payload).map_err(Error::Encode)?;
        let request = self
            .request(method, path)
            .header(CONTENT_TYPE, APPLICATION_JSON)
            .body(payload);

        let body = self.execute(request).await?;
        decode(&body, context)
    }

    /// Executes a request whose response body is ignored.
    pub async fn call_discard(&self, method: Method, path: &str) -> Result<()> {
        self.execute(self.request(method, path)).await.map(drop)
    }
}

fn decode<T: DeserializeOwned>(body: &str, context: &'static str) -> Result<ApiResponse<T>> {
    serde_json::from_str(body).map_err(|e| Error::decode(context, e))
}
