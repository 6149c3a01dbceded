//! [`LifecycleStore`] backed by the MinIO S3 client.

use std::sync::Arc;

use async_trait::async_trait;
use minio::s3::Client;
use minio::s3::creds::StaticProvider;
use minio::s3::http::BaseUrl;
use minio::s3::lifecycle_config::{LifecycleConfig, LifecycleRule as MinioRule};
use minio::s3::types::{Filter, S3Api};
use minio::s3::utils::{UtcTime, from_iso8601utc, to_iso8601utc};
use tracing::{debug, instrument};
use url::Url;

use super::{LifecycleStore, S3Connector};
use crate::types::{
    Expiration, IssuedS3AccessKey, LifecycleConfiguration, LifecycleFilter, LifecycleRule,
    NoncurrentVersionExpiration, RuleStatus,
};
use crate::{Error, Result, TRACING_TARGET_S3};

/// S3 error code returned for buckets without lifecycle rules.
const NO_LIFECYCLE_CONFIGURATION: &str = "NoSuchLifecycleConfiguration";

/// Connects [`MinioStore`]s with static credentials.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinioConnector;

impl S3Connector for MinioConnector {
    fn connect(
        &self,
        endpoint: &Url,
        key: &IssuedS3AccessKey,
    ) -> Result<Arc<dyn LifecycleStore>> {
        let base_url: BaseUrl = endpoint
            .as_str()
            .parse()
            .map_err(|e| Error::Config(format!("invalid S3 endpoint URL: {e}")))?;

        let provider = StaticProvider::new(&key.access_key, &key.secret_access_key, None);
        let client = Client::new(base_url, Some(Box::new(provider)), None, None)
            .map_err(|e| Error::Config(format!("failed to build S3 client: {e}")))?;

        debug!(
            target: TRACING_TARGET_S3,
            endpoint = %endpoint,
            access_key = %key.access_key_masked(),
            "S3 client created"
        );
        Ok(Arc::new(MinioStore { client }))
    }
}

/// Lifecycle operations over a MinIO client.
#[derive(Clone)]
pub struct MinioStore {
    client: Client,
}

impl std::fmt::Debug for MinioStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MinioStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl LifecycleStore for MinioStore {
    #[instrument(skip(self), target = TRACING_TARGET_S3)]
    async fn get_bucket_lifecycle(&self, bucket: &str) -> Result<LifecycleConfiguration> {
        match self.client.get_bucket_lifecycle(bucket).send().await {
            Ok(response) => Ok(from_minio(response.config)),
            Err(e) if e.to_string().contains(NO_LIFECYCLE_CONFIGURATION) => {
                Ok(LifecycleConfiguration::default())
            }
            Err(e) => Err(Error::S3(e.to_string())),
        }
    }

    #[instrument(skip(self, configuration), target = TRACING_TARGET_S3, fields(rules = configuration.rules.len()))]
    async fn put_bucket_lifecycle(
        &self,
        bucket: &str,
        configuration: &LifecycleConfiguration,
    ) -> Result<()> {
        let config = to_minio(configuration)?;
        self.client
            .put_bucket_lifecycle(bucket)
            .life_cycle_config(config)
            .send()
            .await
            .map(drop)
            .map_err(|e| Error::S3(e.to_string()))
    }

    #[instrument(skip(self), target = TRACING_TARGET_S3)]
    async fn delete_bucket_lifecycle(&self, bucket: &str) -> Result<()> {
        self.client
            .delete_bucket_lifecycle(bucket)
            .send()
            .await
            .map(drop)
            .map_err(|e| Error::S3(e.to_string()))
    }
}

fn parse_date(date: &str) -> Result<UtcTime> {
    from_iso8601utc(date)
        .map_err(|e| Error::S3(format!("invalid lifecycle expiration date '{date}': {e}")))
}

fn to_minio(configuration: &LifecycleConfiguration) -> Result<LifecycleConfig> {
    let rules = configuration
        .rules
        .iter()
        .map(|rule| {
            let expiration = rule.expiration.as_ref();
            let expiration_date = expiration
                .and_then(|e| e.date.as_deref())
                .filter(|date| !date.is_empty())
                .map(parse_date)
                .transpose()?;

            Ok(MinioRule {
                id: rule.id.clone(),
                status: rule.status.is_enabled(),
                filter: Filter {
                    and_operator: None,
                    prefix: rule.filter.as_ref().map(|f| f.prefix.clone()),
                    tag: None,
                },
                expiration_days: expiration.and_then(|e| e.days).filter(|days| *days > 0),
                expiration_date,
                noncurrent_version_expiration_noncurrent_days: rule
                    .noncurrent_version_expiration
                    .map(|n| n.noncurrent_days),
                ..Default::default()
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(LifecycleConfig { rules })
}

fn from_minio(config: LifecycleConfig) -> LifecycleConfiguration {
    let rules = config
        .rules
        .into_iter()
        .map(|rule| {
            let days = rule.expiration_days.filter(|days| *days > 0);
            let date = rule.expiration_date.map(to_iso8601utc);
            let expiration =
                (days.is_some() || date.is_some()).then_some(Expiration { days, date });

            LifecycleRule {
                id: rule.id,
                status: RuleStatus::from(rule.status),
                filter: rule
                    .filter
                    .prefix
                    .filter(|prefix| !prefix.is_empty())
                    .map(|prefix| LifecycleFilter { prefix }),
                expiration,
                noncurrent_version_expiration: rule
                    .noncurrent_version_expiration_noncurrent_days
                    .filter(|days| *days > 0)
                    .map(|noncurrent_days| NoncurrentVersionExpiration { noncurrent_days }),
            }
        })
        .collect();

    LifecycleConfiguration { rules }
}
