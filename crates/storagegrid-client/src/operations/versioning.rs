//! Bucket versioning.

use reqwest::Method;
use tracing::{info, instrument};

use super::container_path;
use crate::types::BucketVersioning;
use crate::{Error, Result, StorageGridClient, TRACING_TARGET_BUCKETS};

impl StorageGridClient {
    /// Returns the versioning flags of a bucket.
    #[instrument(skip(self), target = TRACING_TARGET_BUCKETS)]
    pub async fn bucket_versioning(&self, bucket: &str) -> Result<BucketVersioning> {
        let path = container_path(bucket, "/versioning");
        let response = self
            .inner
            .api
            .call::<BucketVersioning>(Method::GET, &path, "bucket versioning")
            .await?;
        Ok(response.into_data())
    }

    /// Sets the versioning flags of a bucket.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the envelope status is not
    /// `success`. Buckets with object lock reject suspension with a message
    /// mentioning the object lock configuration.
    ///
    /// A successful envelope without `data` yields the requested flags.
    #[instrument(skip(self), target = TRACING_TARGET_BUCKETS)]
    pub async fn update_bucket_versioning(
        &self,
        bucket: &str,
        versioning: BucketVersioning,
    ) -> Result<BucketVersioning> {
        let path = container_path(bucket, "/versioning");
        let response = self
            .inner
            .api
            .call_with::<_, Option<BucketVersioning>>(
                Method::PUT,
                &path,
                &versioning,
                "bucket versioning",
            )
            .await?;

        if !response.is_success() {
            return Err(Error::Unsuccessful {
                operation: "versioning update",
                status: response.status,
            });
        }

        info!(
            target: TRACING_TARGET_BUCKETS,
            bucket = %bucket,
            enabled = versioning.versioning_enabled,
            suspended = versioning.versioning_suspended,
            "Bucket versioning updated"
        );
        Ok(response.into_data().unwrap_or(versioning))
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::types::{BucketVersioning, VersioningStatus};
    use crate::{ClientConfig, StorageGridClient};

    const VERSIONING: &str = "/api/v4/org/containers/logs/versioning";

    async fn client_for(server: &MockServer) -> StorageGridClient {
        StorageGridClient::connect(ClientConfig::parse(&server.uri()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn reads_versioning_flags() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(VERSIONING))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "data": {"versioningEnabled": false, "versioningSuspended": true}
            })))
            .mount(&server)
            .await;

        let versioning = client_for(&server).await.bucket_versioning("logs").await.unwrap();
        assert_eq!(VersioningStatus::from(versioning), VersioningStatus::Suspended);
    }

    #[tokio::test]
    async fn update_sends_both_flags() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(VERSIONING))
            .and(body_json(serde_json::json!({
                "versioningEnabled": true,
                "versioningSuspended": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "data": {"versioningEnabled": true, "versioningSuspended": false}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let updated = client
            .update_bucket_versioning("logs", BucketVersioning::from(VersioningStatus::Enabled))
            .await
            .unwrap();
        assert!(updated.versioning_enabled);
    }

    #[tokio::test]
    async fn update_accepts_success_without_data() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(VERSIONING))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "success"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let requested = BucketVersioning::from(VersioningStatus::Suspended);
        let updated = client_for(&server)
            .await
            .update_bucket_versioning("logs", requested)
            .await
            .unwrap();
        assert_eq!(updated, requested);
    }

    #[tokio::test]
    async fn object_lock_refusal_is_recognizable() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(VERSIONING))
            .respond_with(ResponseTemplate::new(422).set_body_string(
                r#"{"code":422,"message":{"text":"Object Lock configuration is present"}}"#,
            ))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let error = client
            .update_bucket_versioning("logs", BucketVersioning::from(VersioningStatus::Suspended))
            .await
            .unwrap_err();
        assert!(error.mentions("Object Lock configuration is present"));
    }
}
