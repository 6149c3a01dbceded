//! `storagegrid_s3_bucket_object_lock_configuration` data source.

use async_trait::async_trait;
use serde::Serialize;
use storagegrid_client::StorageGridClient;

use super::{BucketLookup, DataSource};
use crate::diagnostics::Diagnostic;
use crate::models::RetentionModel;
use crate::resource::ResourceResult;

/// Object lock state of a bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketObjectLockDataModel {
    pub bucket_name: String,
    pub enabled: bool,
    pub default_retention_setting: Option<RetentionModel>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BucketObjectLockDataSource;

#[async_trait]
impl DataSource for BucketObjectLockDataSource {
    type Config = BucketLookup;
    type Model = BucketObjectLockDataModel;

    fn type_name(&self) -> &'static str {
        "storagegrid_s3_bucket_object_lock_configuration"
    }

    async fn read(
        &self,
        client: &StorageGridClient,
        config: BucketLookup,
    ) -> ResourceResult<BucketObjectLockDataModel> {
        let lock = client
            .bucket_object_lock(&config.bucket_name)
            .await
            .map_err(|e| {
                Diagnostic::from_client(
                    format!(
                        "Unable to Read S3 Bucket Object Lock Configuration for {}",
                        config.bucket_name
                    ),
                    &e,
                )
            })?;

        Ok(BucketObjectLockDataModel {
            bucket_name: config.bucket_name,
            enabled: lock.enabled,
            default_retention_setting: lock.default_retention_setting.map(Into::into),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use storagegrid_client::ClientConfig;
    use storagegrid_client::types::RetentionMode;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn read_accepts_string_retention() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/org/containers/vault/object-lock"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "data": {
                    "enabled": true,
                    "defaultRetentionSetting": {"mode": "compliance", "years": "2"}
                }
            })))
            .mount(&server)
            .await;

        let client = StorageGridClient::connect(ClientConfig::parse(&server.uri()).unwrap())
            .await
            .unwrap();
        let model = BucketObjectLockDataSource
            .read(&client, BucketLookup {
                bucket_name: "vault".to_owned(),
            })
            .await
            .unwrap();
        assert!(model.enabled);
        assert_eq!(
            model.default_retention_setting,
            Some(RetentionModel {
                mode: RetentionMode::Compliance,
                days: 0,
                years: 2,
            })
        );
    }
}
