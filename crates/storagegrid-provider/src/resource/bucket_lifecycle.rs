//! `storagegrid_s3_bucket_lifecycle_configuration` resource.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use storagegrid_client::types::{LifecycleConfiguration, LifecycleRule};
use storagegrid_client::{Error, StorageGridClient};

use super::{ReadOutcome, Resource, ResourceResult};
use crate::diagnostics::{Diagnostic, Diagnostics};

/// Attributes of a bucket's lifecycle configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketLifecycleModel {
    pub bucket_name: String,
    #[serde(default, rename = "rule")]
    pub rules: Vec<LifecycleRule>,
    #[serde(default)]
    pub id: Option<String>,
}

impl BucketLifecycleModel {
    fn new(bucket_name: &str, configuration: LifecycleConfiguration) -> Self {
        Self {
            bucket_name: bucket_name.to_owned(),
            rules: configuration.rules,
            id: Some(bucket_name.to_owned()),
        }
    }
}

fn lifecycle_error(action: &str, bucket: &str, error: &Error) -> Diagnostics {
    Diagnostic::from_client(
        format!("Unable to {action} S3 Bucket Lifecycle Configuration for {bucket}"),
        error,
    )
    .into()
}

/// Lifecycle rules of a bucket, managed over the S3 protocol.
#[derive(Debug, Default, Clone, Copy)]
pub struct BucketLifecycleResource;

impl BucketLifecycleResource {
    async fn apply(
        &self,
        client: &StorageGridClient,
        action: &str,
        mut planned: BucketLifecycleModel,
    ) -> ResourceResult<BucketLifecycleModel> {
        let configuration = LifecycleConfiguration {
            rules: planned.rules.clone(),
        };
        client
            .put_bucket_lifecycle(&planned.bucket_name, &configuration)
            .await
            .map_err(|e| lifecycle_error(action, &planned.bucket_name, &e))?;

        planned.id = Some(planned.bucket_name.clone());
        Ok(planned)
    }
}

#[async_trait]
impl Resource for BucketLifecycleResource {
    type Model = BucketLifecycleModel;

    fn type_name(&self) -> &'static str {
        "storagegrid_s3_bucket_lifecycle_configuration"
    }

    fn requires_replace(&self) -> &'static [&'static str] {
        &["bucket_name"]
    }

    fn plan(
        &self,
        mut proposed: BucketLifecycleModel,
        _prior: Option<&BucketLifecycleModel>,
    ) -> ResourceResult<BucketLifecycleModel> {
        proposed.id = Some(proposed.bucket_name.clone());
        Ok(proposed)
    }

    async fn create(
        &self,
        client: &StorageGridClient,
        planned: BucketLifecycleModel,
    ) -> ResourceResult<BucketLifecycleModel> {
        self.apply(client, "Create", planned).await
    }

    async fn read(
        &self,
        client: &StorageGridClient,
        state: BucketLifecycleModel,
    ) -> ResourceResult<ReadOutcome<BucketLifecycleModel>> {
        let configuration = client
            .bucket_lifecycle(&state.bucket_name)
            .await
            .map_err(|e| lifecycle_error("Read", &state.bucket_name, &e))?;

        Ok(ReadOutcome::Found(BucketLifecycleModel::new(
            &state.bucket_name,
            configuration,
        )))
    }

    async fn update(
        &self,
        client: &StorageGridClient,
        planned: BucketLifecycleModel,
        _prior: BucketLifecycleModel,
    ) -> ResourceResult<BucketLifecycleModel> {
        self.apply(client, "Update", planned).await
    }

    async fn delete(
        &self,
        client: &StorageGridClient,
        state: BucketLifecycleModel,
    ) -> ResourceResult<Diagnostics> {
        client
            .delete_bucket_lifecycle(&state.bucket_name)
            .await
            .map_err(|e| lifecycle_error("Delete", &state.bucket_name, &e))?;
        Ok(Diagnostics::new())
    }

    async fn import(
        &self,
        client: &StorageGridClient,
        id: &str,
    ) -> ResourceResult<BucketLifecycleModel> {
        let configuration = client.bucket_lifecycle(id).await.map_err(|e| {
            Diagnostic::error(
                format!("Unable to Import S3 Bucket Lifecycle Configuration for {id}"),
                format!(
                    "Bucket does not exist or lifecycle configuration is not accessible: {e}"
                ),
            )
        })?;
        Ok(BucketLifecycleModel::new(id, configuration))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use storagegrid_client::ClientConfig;
    use storagegrid_client::s3::MemoryConnector;
    use storagegrid_client::types::RuleStatus;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    async fn mount_key_endpoints(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/api/v4/org/users/current-user/s3-access-keys"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "status": "success",
                "data": {"id": "tmp-1", "accessKey": "AKIATEMP", "secretAccessKey": "secret"}
            })))
            .mount(server)
            .await;
    }

    fn planned() -> BucketLifecycleModel {
        serde_json::from_value(json!({
            "bucket_name": "logs",
            "rule": [{
                "id": "expire-logs",
                "status": "Enabled",
                "filter": {"prefix": "logs/"},
                "expiration": {"days": 30}
            }, {
                "id": "old-versions",
                "status": "Disabled",
                "noncurrent_version_expiration": {"noncurrent_days": 7}
            }]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn create_read_delete_through_s3() {
        let server = MockServer::start().await;
        mount_key_endpoints(&server).await;

        let connector = Arc::new(MemoryConnector::default());
        let config = ClientConfig::parse(&server.uri()).unwrap();
        let client = StorageGridClient::connect_with(config, connector.clone())
            .await
            .unwrap();

        let state = BucketLifecycleResource
            .create(&client, planned())
            .await
            .unwrap();
        assert_eq!(state.id.as_deref(), Some("logs"));
        assert_eq!(connector.store().get("logs").unwrap().rules.len(), 2);

        let ReadOutcome::Found(refreshed) = BucketLifecycleResource
            .read(&client, state)
            .await
            .unwrap()
        else {
            panic!("lifecycle configuration should be found");
        };
        assert_eq!(refreshed.rules[1].status, RuleStatus::Disabled);
        assert_eq!(refreshed, BucketLifecycleModel {
            id: Some("logs".to_owned()),
            ..planned()
        });

        let warnings = BucketLifecycleResource
            .delete(&client, refreshed)
            .await
            .unwrap();
        assert!(warnings.is_empty());
        assert!(connector.store().get("logs").is_none());
    }

    #[tokio::test]
    async fn failed_key_issue_reports_action() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v4/org/users/current-user/s3-access-keys"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let connector = Arc::new(MemoryConnector::default());
        let config = ClientConfig::parse(&server.uri()).unwrap();
        let client = StorageGridClient::connect_with(config, connector)
            .await
            .unwrap();

        let diagnostics = BucketLifecycleResource
            .update(&client, planned(), planned())
            .await
            .unwrap_err();
        assert_eq!(
            diagnostics.iter().next().unwrap().summary,
            "Unable to Update S3 Bucket Lifecycle Configuration for logs"
        );
    }
}
