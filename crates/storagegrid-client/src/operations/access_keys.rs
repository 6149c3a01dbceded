//! S3 access keys of tenant users.

use reqwest::Method;
use tracing::{info, instrument};

use crate::types::{CreateAccessKey, IssuedS3AccessKey, S3AccessKey};
use crate::{Result, StorageGridClient, TRACING_TARGET_IAM};

fn keys_path(user_id: &str) -> String {
    format!("/org/users/{user_id}/s3-access-keys")
}

impl StorageGridClient {
    /// Lists the access keys of a user.
    #[instrument(skip(self), target = TRACING_TARGET_IAM)]
    pub async fn s3_access_keys(&self, user_id: &str) -> Result<Vec<S3AccessKey>> {
        let path = format!("{}?includeCloneStatus=false", keys_path(user_id));
        let response = self
            .inner
            .api
            .call::<Vec<S3AccessKey>>(Method::GET, &path, "access key list")
            .await?;
        Ok(response.into_data())
    }

    /// Creates an access key for a user.
    ///
    /// The secret is only returned by this call. `expires` uses the
    /// `YYYY-MM-DDTHH:MM:SS.000Z` layout; without it the key never expires.
    #[instrument(skip(self), target = TRACING_TARGET_IAM)]
    pub async fn create_s3_access_key(
        &self,
        user_id: &str,
        expires: Option<&str>,
    ) -> Result<IssuedS3AccessKey> {
        let body = CreateAccessKey { expires };
        let response = self
            .inner
            .api
            .call_with::<_, IssuedS3AccessKey>(
                Method::POST,
                &keys_path(user_id),
                &body,
                "access key",
            )
            .await?;

        let issued = response.into_data();
        info!(
            target: TRACING_TARGET_IAM,
            key_id = %issued.key.id,
            access_key = %issued.access_key_masked(),
            "Access key created"
        );
        Ok(issued)
    }

    /// Deletes an access key of a user.
    #[instrument(skip(self), target = TRACING_TARGET_IAM)]
    pub async fn delete_s3_access_key(&self, user_id: &str, key_id: &str) -> Result<()> {
        let path = format!("{}/{key_id}", keys_path(user_id));
        self.inner.api.call_discard(Method::DELETE, &path).await?;
        info!(target: TRACING_TARGET_IAM, key_id = %key_id, "Access key deleted");
        Ok(())
    }
}
