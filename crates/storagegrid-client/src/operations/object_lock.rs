//! Bucket object lock and default retention.

use reqwest::Method;
use tracing::{info, instrument};

use super::container_path;
use crate::types::{ObjectLockConfig, RetentionSetting};
use crate::{Error, Result, StorageGridClient, TRACING_TARGET_BUCKETS};

impl StorageGridClient {
    /// Returns the object lock configuration of a bucket.
    #[instrument(skip(self), target = TRACING_TARGET_BUCKETS)]
    pub async fn bucket_object_lock(&self, bucket: &str) -> Result<ObjectLockConfig> {
        let path = container_path(bucket, "/object-lock");
        let response = self
            .inner
            .api
            .call::<ObjectLockConfig>(Method::GET, &path, "bucket object lock")
            .await?;
        Ok(response.into_data())
    }

    /// Updates object lock and its default retention.
    ///
    /// Passing `None` as retention removes the default retention setting.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the envelope status is not
    /// `success`. Grids that cannot disable object lock answer with
    /// "Invalid ObjectLockEnabled value".
    ///
    /// A successful envelope without `data` yields the requested configuration.
    #[instrument(skip(self), target = TRACING_TARGET_BUCKETS)]
    pub async fn update_bucket_object_lock(
        &self,
        bucket: &str,
        enabled: bool,
        retention: Option<RetentionSetting>,
    ) -> Result<ObjectLockConfig> {
        let path = container_path(bucket, "/object-lock");
        let request = ObjectLockConfig {
            enabled,
            default_retention_setting: retention,
        };

        let response = self
            .inner
            .api
            .call_with::<_, Option<ObjectLockConfig>>(
                Method::PUT,
                &path,
                &request,
                "bucket object lock",
            )
            .await?;

        if !response.is_success() {
            return Err(Error::Unsuccessful {
                operation: "bucket object lock update",
                status: response.status,
            });
        }

        info!(
            target: TRACING_TARGET_BUCKETS,
            bucket = %bucket,
            enabled,
            has_retention = retention.is_some(),
            "Bucket object lock updated"
        );
        Ok(response.into_data().unwrap_or(request))
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::types::{RetentionMode, RetentionSetting};
    use crate::{ClientConfig, StorageGridClient};

    const OBJECT_LOCK: &str = "/api/v4/org/containers/vault/object-lock";

    async fn client_for(server: &MockServer) -> StorageGridClient {
        StorageGridClient::connect(ClientConfig::parse(&server.uri()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn reads_string_encoded_retention() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(OBJECT_LOCK))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "data": {
                    "enabled": true,
                    "defaultRetentionSetting": {"mode": "compliance", "years": "2"}
                }
            })))
            .mount(&server)
            .await;

        let lock = client_for(&server).await.bucket_object_lock("vault").await.unwrap();
        assert!(lock.enabled);
        let retention = lock.default_retention_setting.unwrap();
        assert_eq!(retention.mode, RetentionMode::Compliance);
        assert_eq!(retention.years, 2);
    }

    #[tokio::test]
    async fn update_prefers_years() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(OBJECT_LOCK))
            .and(body_json(serde_json::json!({
                "enabled": true,
                "defaultRetentionSetting": {"mode": "governance", "years": 3}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "data": {"enabled": true}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let retention = RetentionSetting {
            mode: RetentionMode::Governance,
            days: 10,
            years: 3,
        };
        client_for(&server)
            .await
            .update_bucket_object_lock("vault", true, Some(retention))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn update_accepts_success_without_data() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(OBJECT_LOCK))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "success"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let lock = client_for(&server)
            .await
            .update_bucket_object_lock("vault", true, None)
            .await
            .unwrap();
        assert!(lock.enabled);
        assert!(lock.default_retention_setting.is_none());
    }

    #[tokio::test]
    async fn update_without_retention_omits_setting() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(OBJECT_LOCK))
            .and(body_json(serde_json::json!({"enabled": false})))
            .respond_with(ResponseTemplate::new(400).set_body_string(
                r#"{"message":{"text":"Invalid ObjectLockEnabled value"}}"#,
            ))
            .mount(&server)
            .await;

        let error = client_for(&server)
            .await
            .update_bucket_object_lock("vault", false, None)
            .await
            .unwrap_err();
        assert!(error.mentions("Invalid ObjectLockEnabled value"));
    }
}
