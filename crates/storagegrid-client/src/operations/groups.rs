//! Tenant groups and their policies.

use reqwest::Method;
use tracing::{info, instrument};

use crate::types::{Group, GroupPayload};
use crate::{Result, StorageGridClient, TRACING_TARGET_IAM};

const GROUPS_PATH: &str = "/org/groups";

impl StorageGridClient {
    /// Fetches a group by id or by `group/<name>` unique name.
    #[instrument(skip(self), target = TRACING_TARGET_IAM)]
    pub async fn group(&self, id: &str) -> Result<Group> {
        let path = format!("{GROUPS_PATH}/{id}");
        let response = self.inner.api.call::<Group>(Method::GET, &path, "group").await?;
        Ok(response.into_data())
    }

    /// Creates a local group.
    #[instrument(skip(self, payload), target = TRACING_TARGET_IAM, fields(unique_name = %payload.unique_name))]
    pub async fn create_group(&self, payload: &GroupPayload) -> Result<Group> {
        let response = self
            .inner
            .api
            .call_with::<_, Group>(Method::POST, GROUPS_PATH, payload, "group")
            .await?;

        let group = response.into_data();
        info!(target: TRACING_TARGET_IAM, group_id = %group.id, "Group created");
        Ok(group)
    }

    /// Replaces the attributes and policies of a group.
    #[instrument(skip(self, payload), target = TRACING_TARGET_IAM)]
    pub async fn update_group(&self, id: &str, payload: &GroupPayload) -> Result<Group> {
        let path = format!("{GROUPS_PATH}/{id}");
        let response = self
            .inner
            .api
            .call_with::<_, Group>(Method::PUT, &path, payload, "group")
            .await?;

        info!(target: TRACING_TARGET_IAM, group_id = %id, "Group updated");
        Ok(response.into_data())
    }

    /// Deletes a group.
    #[instrument(skip(self), target = TRACING_TARGET_IAM)]
    pub async fn delete_group(&self, id: &str) -> Result<()> {
        let path = format!("{GROUPS_PATH}/{id}");
        self.inner.api.call_discard(Method::DELETE, &path).await?;
        info!(target: TRACING_TARGET_IAM, group_id = %id, "Group deleted");
        Ok(())
    }
}
