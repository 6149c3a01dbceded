//! `storagegrid_group` resource.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use storagegrid_client::StorageGridClient;
use storagegrid_client::types::{GROUP_PREFIX, Group, GroupPayload, Policies, S3Policy};
use tracing::debug;

use super::{ReadOutcome, Resource, ResourceResult};
use crate::TRACING_TARGET_RESOURCE;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::models::ManagementModel;

/// Attributes of a tenant group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupModel {
    pub group_name: String,
    #[serde(default)]
    pub policies: GroupPoliciesModel,
    #[serde(default)]
    pub management_read_only: bool,

    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub unique_name: Option<String>,
    #[serde(default)]
    pub group_urn: Option<String>,
    #[serde(default)]
    pub federated: Option<bool>,
}

/// Policy block: the S3 policy as JSON text plus management flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupPoliciesModel {
    #[serde(default)]
    pub s3: Option<String>,
    #[serde(default)]
    pub management: ManagementModel,
}

impl GroupPoliciesModel {
    fn to_policies(&self) -> ResourceResult<Policies> {
        let s3 = match self.s3.as_deref() {
            Some(text) => S3Policy::from_json(text).map_err(|e| {
                Diagnostic::error(
                    "Invalid S3 Policy JSON",
                    format!("Could not parse the provided S3 policy string: {e}"),
                )
                .with_attribute("policies.s3")
            })?,
            None => S3Policy::default(),
        };

        Ok(Policies {
            management: self.management.into(),
            s3,
        })
    }
}

impl GroupModel {
    /// Copies the server-side attributes of `group` into the model.
    fn apply(&mut self, group: &Group) {
        self.id = Some(group.id.clone());
        self.account_id = Some(group.account_id.clone());
        self.display_name = Some(group.display_name.clone());
        self.unique_name = Some(group.unique_name.clone());
        self.group_urn = Some(group.group_urn.clone());
        self.federated = Some(group.federated);
        self.management_read_only = group.management_read_only;
        self.policies.management = group.policies.management.into();
    }

    /// Builds the full state of an existing group.
    fn from_group(group: &Group) -> ResourceResult<Self> {
        let mut model = Self {
            group_name: group.short_name().to_owned(),
            ..Default::default()
        };
        model.apply(group);
        model.display_name = Some(model.group_name.clone());
        model.policies.s3 = Some(encode_policy(&group.policies.s3)?);
        Ok(model)
    }

    fn id(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }
}

fn encode_policy(policy: &S3Policy) -> ResourceResult<String> {
    policy.to_json().map_err(|e| {
        Diagnostic::error(
            "Error Processing S3 Policy",
            format!("Could not encode the S3 policy from the API: {e}"),
        )
        .into()
    })
}

/// Returns whether the stored policy text still describes `current`.
fn stored_policy_matches(stored: Option<&str>, current: &S3Policy) -> ResourceResult<bool> {
    let Some(stored) = stored else {
        return Ok(false);
    };
    let stored = S3Policy::from_json(stored).map_err(|e| {
        Diagnostic::error(
            "S3 Policy Comparison Error",
            format!("Failed to compare S3 policies: {e}"),
        )
    })?;
    Ok(stored.is_equivalent(current))
}

/// Tenant group with S3 and management policies.
#[derive(Debug, Default, Clone, Copy)]
pub struct GroupResource;

#[async_trait]
impl Resource for GroupResource {
    type Model = GroupModel;

    fn type_name(&self) -> &'static str {
        "storagegrid_group"
    }

    fn requires_replace(&self) -> &'static [&'static str] {
        &["group_name"]
    }

    fn plan(
        &self,
        mut proposed: GroupModel,
        prior: Option<&GroupModel>,
    ) -> ResourceResult<GroupModel> {
        proposed.display_name = Some(proposed.group_name.clone());

        let Some(prior) = prior else {
            return Ok(proposed);
        };

        if prior.group_name == proposed.group_name {
            proposed.id = prior.id.clone();
            proposed.account_id = prior.account_id.clone();
            proposed.unique_name = prior.unique_name.clone();
            proposed.group_urn = prior.group_urn.clone();
            proposed.federated = prior.federated;
        }

        if let (Some(planned), Some(stored)) = (&proposed.policies.s3, &prior.policies.s3) {
            let planned_policy = S3Policy::from_json(planned).map_err(|e| {
                Diagnostic::error(
                    "S3 Policy Comparison Error",
                    format!("Failed to compare JSON strings: {e}"),
                )
            })?;
            if stored_policy_matches(Some(stored), &planned_policy)? {
                proposed.policies.s3 = Some(stored.clone());
            }
        }

        Ok(proposed)
    }

    async fn create(
        &self,
        client: &StorageGridClient,
        mut planned: GroupModel,
    ) -> ResourceResult<GroupModel> {
        let policies = planned.policies.to_policies()?;
        let payload = GroupPayload::local(
            &planned.group_name,
            planned.management_read_only,
            policies,
        );

        let group = client.create_group(&payload).await.map_err(|e| {
            Diagnostic::error(
                format!("Error creating StorageGrid Group: {}", planned.group_name),
                format!("Could not create group, unexpected error: {e}"),
            )
        })?;

        planned.apply(&group);
        Ok(planned)
    }

    async fn read(
        &self,
        client: &StorageGridClient,
        mut state: GroupModel,
    ) -> ResourceResult<ReadOutcome<GroupModel>> {
        let group = match client.group(state.id()).await {
            Ok(group) => group,
            Err(e) if e.is_not_found() => {
                debug!(
                    target: TRACING_TARGET_RESOURCE,
                    group_id = %state.id(),
                    "Group no longer exists"
                );
                return Ok(ReadOutcome::Removed(Diagnostics::new()));
            }
            Err(e) => {
                return Err(Diagnostic::error(
                    "Error Reading StorageGrid Group",
                    format!("Could not read StorageGrid group {}: {e}", state.id()),
                )
                .into());
            }
        };

        state.group_name = group.short_name().to_owned();
        state.apply(&group);

        if !stored_policy_matches(state.policies.s3.as_deref(), &group.policies.s3)? {
            state.policies.s3 = Some(encode_policy(&group.policies.s3)?);
        }

        Ok(ReadOutcome::Found(state))
    }

    async fn update(
        &self,
        client: &StorageGridClient,
        mut planned: GroupModel,
        prior: GroupModel,
    ) -> ResourceResult<GroupModel> {
        let policies = planned.policies.to_policies()?;
        let payload =
            GroupPayload::local(&prior.group_name, planned.management_read_only, policies);

        client.update_group(prior.id(), &payload).await.map_err(|e| {
            Diagnostic::error(
                "Error Updating StorageGrid Group",
                format!(
                    "Could not update group policies for {}: {e}",
                    prior.group_name
                ),
            )
        })?;

        let group = client.group(prior.id()).await.map_err(|e| {
            Diagnostic::error(
                "Error Reading StorageGrid Group",
                format!(
                    "Could not read updated group data for {} after update: {e}",
                    prior.group_name
                ),
            )
        })?;

        planned.apply(&group);
        Ok(planned)
    }

    async fn delete(
        &self,
        client: &StorageGridClient,
        state: GroupModel,
    ) -> ResourceResult<Diagnostics> {
        client.delete_group(state.id()).await.map_err(|e| {
            Diagnostic::error(
                "Error Deleting StorageGrid Group",
                format!("Could not delete group with ID {}: {e}", state.id()),
            )
        })?;
        Ok(Diagnostics::new())
    }

    async fn import(&self, client: &StorageGridClient, id: &str) -> ResourceResult<GroupModel> {
        let unique_name = format!("{GROUP_PREFIX}{id}");
        let group = client.group(&unique_name).await.map_err(|e| {
            if e.is_not_found() {
                Diagnostic::error(
                    "Group Not Found",
                    format!(
                        "Cannot import a group with unique name '{id}' because it does not exist."
                    ),
                )
            } else {
                Diagnostic::error(
                    "Error Importing StorageGrid Group",
                    format!("Could not import StorageGrid group with unique name {id}: {e}"),
                )
            }
        })?;

        GroupModel::from_group(&group)
    }
}
