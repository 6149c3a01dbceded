//! Tenant groups.

use serde::{Deserialize, Serialize};

use super::Policies;

/// Prefix the API requires on local group unique names.
pub const GROUP_PREFIX: &str = "group/";

/// A tenant group as returned by `/org/groups`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Group {
    pub id: String,
    pub account_id: String,
    pub display_name: String,
    pub unique_name: String,
    #[serde(rename = "groupURN")]
    pub group_urn: String,
    pub federated: bool,
    pub management_read_only: bool,
    pub policies: Policies,
}

impl Group {
    /// Returns the unique name without the `group/` prefix.
    pub fn short_name(&self) -> &str {
        self.unique_name
            .strip_prefix(GROUP_PREFIX)
            .unwrap_or(&self.unique_name)
    }
}

/// Request body for creating or replacing a group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupPayload {
    pub unique_name: String,
    pub display_name: String,
    pub management_read_only: bool,
    pub policies: Policies,
}

impl GroupPayload {
    /// Builds a payload for a local group, deriving its unique and display names.
    pub fn local(name: &str, management_read_only: bool, policies: Policies) -> Self {
        Self {
            unique_name: format!("{GROUP_PREFIX}{name}"),
            display_name: name.to_owned(),
            management_read_only,
            policies,
        }
    }
}
