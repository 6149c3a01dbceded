//! Bucket listing, creation and deletion.

use reqwest::Method;
use tracing::{debug, info, instrument, warn};

use super::{CONTAINERS_PATH, container_path};
use crate::types::{
    BucketRecord, CreateBucketRequest, ObjectLockConfig, RetentionMode, RetentionSetting,
};
use crate::{Error, Result, StorageGridClient, TRACING_TARGET_BUCKETS};

impl StorageGridClient {
    /// Lists the buckets of the tenant, served from cache while fresh.
    ///
    /// # Errors
    ///
    /// Returns an error if the list has to be fetched and the request fails.
    #[instrument(skip(self), target = TRACING_TARGET_BUCKETS)]
    pub async fn bucket_list(&self) -> Result<Vec<BucketRecord>> {
        let api = &self.inner.api;
        self.inner
            .buckets
            .get_or_refresh(|| async move {
                let response = api
                    .call::<Vec<BucketRecord>>(Method::GET, CONTAINERS_PATH, "bucket list")
                    .await?;
                Ok(response.into_data())
            })
            .await
    }

    /// Looks up a bucket by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no bucket has this name.
    pub async fn bucket(&self, name: &str) -> Result<BucketRecord> {
        self.bucket_list()
            .await?
            .into_iter()
            .find(|bucket| bucket.name == name)
            .ok_or_else(|| Error::not_found("bucket", name))
    }

    /// Creates a bucket.
    ///
    /// With object lock enabled the bucket starts with a governance-mode
    /// default retention of one day.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the envelope status is not
    /// `success`.
    #[instrument(skip(self), target = TRACING_TARGET_BUCKETS)]
    pub async fn create_bucket(
        &self,
        name: &str,
        region: &str,
        object_lock_enabled: bool,
    ) -> Result<BucketRecord> {
        let request = CreateBucketRequest {
            name: name.to_owned(),
            region: region.to_owned(),
            s3_object_lock: ObjectLockConfig {
                enabled: object_lock_enabled,
                default_retention_setting: object_lock_enabled
                    .then(|| RetentionSetting::days(RetentionMode::Governance, 1)),
            },
        };

        let response = self
            .inner
            .api
            .call_with::<_, BucketRecord>(Method::POST, CONTAINERS_PATH, &request, "bucket")
            .await?;

        if !response.is_success() {
            return Err(Error::Unsuccessful {
                operation: "bucket creation",
                status: response.status,
            });
        }

        for alert in response.alerts() {
            warn!(
                target: TRACING_TARGET_BUCKETS,
                bucket = %name,
                severity = %alert.severity,
                key = %alert.key,
                "{}", alert.text
            );
        }

        self.inner.buckets.invalidate().await;
        info!(target: TRACING_TARGET_BUCKETS, bucket = %name, "Bucket created");
        Ok(response.into_data())
    }

    /// Deletes a bucket.
    ///
    /// A delete that times out may still have been applied. In that case the
    /// client waits for the configured grace period, re-queries the bucket
    /// and reports success if it is gone.
    ///
    /// # Errors
    ///
    /// Returns the request error, including the original timeout when the
    /// bucket still exists or its existence cannot be confirmed.
    #[instrument(skip(self), target = TRACING_TARGET_BUCKETS)]
    pub async fn delete_bucket(&self, name: &str) -> Result<()> {
        let path = container_path(name, "");
        match self.inner.api.call_discard(Method::DELETE, &path).await {
            Ok(()) => {
                self.inner.buckets.invalidate().await;
                info!(target: TRACING_TARGET_BUCKETS, bucket = %name, "Bucket deleted");
                Ok(())
            }
            Err(error) if error.is_timeout() => self.reconcile_delete(name, error).await,
            Err(error) => Err(error),
        }
    }

    async fn reconcile_delete(&self, name: &str, timeout: Error) -> Result<()> {
        let grace_period = self.config().delete_grace_period;
        warn!(
            target: TRACING_TARGET_BUCKETS,
            bucket = %name,
            error = %timeout,
            grace_period_ms = grace_period.as_millis(),
            "Bucket delete timed out, checking whether it was applied"
        );

        tokio::time::sleep(grace_period).await;
        self.inner.buckets.invalidate().await;

        match self.bucket(name).await {
            Err(e) if e.is_not_found() => {
                self.inner.buckets.invalidate().await;
                info!(
                    target: TRACING_TARGET_BUCKETS,
                    bucket = %name,
                    "Bucket deleted despite timeout"
                );
                Ok(())
            }
            Ok(_) => Err(timeout),
            Err(e) => {
                debug!(
                    target: TRACING_TARGET_BUCKETS,
                    bucket = %name,
                    error = %e,
                    "Existence check after delete timeout failed"
                );
                Err(timeout)
            }
        }
    }
}
