//! Bucket lifecycle rules over the S3 protocol.

use tracing::{info, instrument};

use crate::types::LifecycleConfiguration;
use crate::{Result, StorageGridClient, TRACING_TARGET_S3};

impl StorageGridClient {
    /// Returns the lifecycle rules of a bucket, empty when none are set.
    #[instrument(skip(self), target = TRACING_TARGET_S3)]
    pub async fn bucket_lifecycle(&self, bucket: &str) -> Result<LifecycleConfiguration> {
        self.inner
            .s3
            .execute(&self.inner.api, |store| async move {
                store.get_bucket_lifecycle(bucket).await
            })
            .await
    }

    /// Replaces the lifecycle rules of a bucket.
    #[instrument(skip(self, configuration), target = TRACING_TARGET_S3, fields(rules = configuration.rules.len()))]
    pub async fn put_bucket_lifecycle(
        &self,
        bucket: &str,
        configuration: &LifecycleConfiguration,
    ) -> Result<()> {
        self.inner
            .s3
            .execute(&self.inner.api, |store| async move {
                store.put_bucket_lifecycle(bucket, configuration).await
            })
            .await?;

        info!(
            target: TRACING_TARGET_S3,
            bucket = %bucket,
            rules = configuration.rules.len(),
            "Bucket lifecycle configuration applied"
        );
        Ok(())
    }

    /// Removes all lifecycle rules from a bucket.
    #[instrument(skip(self), target = TRACING_TARGET_S3)]
    pub async fn delete_bucket_lifecycle(&self, bucket: &str) -> Result<()> {
        self.inner
            .s3
            .execute(&self.inner.api, |store| async move {
                store.delete_bucket_lifecycle(bucket).await
            })
            .await?;

        info!(target: TRACING_TARGET_S3, bucket = %bucket, "Bucket lifecycle configuration removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::s3::MemoryConnector;
    use crate::types::{
        Expiration, LifecycleConfiguration, LifecycleFilter, LifecycleRule, RuleStatus,
    };
    use crate::{ClientConfig, StorageGridClient};

    async fn mount_key_endpoints(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/api/v4/org/users/current-user/s3-access-keys"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "status": "success",
                "data": {"id": "tmp-1", "accessKey": "AKIATEMP", "secretAccessKey": "secret"}
            })))
            .expect(1)
            .mount(server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/v4/org/users/current-user/s3-access-keys/tmp-1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(server)
            .await;
    }

    fn expire_logs_rule() -> LifecycleRule {
        LifecycleRule {
            id: "expire-logs".to_owned(),
            status: RuleStatus::Enabled,
            filter: Some(LifecycleFilter {
                prefix: "logs/".to_owned(),
            }),
            expiration: Some(Expiration {
                days: Some(30),
                date: None,
            }),
            noncurrent_version_expiration: None,
        }
    }

    #[tokio::test]
    async fn lifecycle_operations_share_one_temporary_key() {
        let server = MockServer::start().await;
        mount_key_endpoints(&server).await;

        let connector = Arc::new(MemoryConnector::default());
        let config = ClientConfig::parse(&server.uri()).unwrap();
        let client = StorageGridClient::connect_with(config, connector.clone())
            .await
            .unwrap();

        assert!(client.bucket_lifecycle("logs").await.unwrap().is_empty());

        let configuration = LifecycleConfiguration {
            rules: vec![expire_logs_rule()],
        };
        client.put_bucket_lifecycle("logs", &configuration).await.unwrap();
        assert_eq!(client.bucket_lifecycle("logs").await.unwrap(), configuration);
        assert_eq!(client.temporary_key_id().await.as_deref(), Some("tmp-1"));

        client.delete_bucket_lifecycle("logs").await.unwrap();
        assert!(connector.store().get("logs").is_none());
        assert_eq!(connector.connects(), 1);

        client.cleanup().await;
        assert!(client.temporary_key_id().await.is_none());
    }
}
