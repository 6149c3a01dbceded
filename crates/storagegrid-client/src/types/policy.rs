//! Group policy documents and their semantic comparison.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::StringOrSlice;
use crate::{Error, Result};

/// Condition block: operator (e.g. `StringLike`) to condition key to values.
pub type Condition = BTreeMap<String, BTreeMap<String, StringOrSlice>>;

/// Management permissions granted to a group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ManagementPolicy {
    pub manage_all_containers: bool,
    pub manage_endpoints: bool,
    pub manage_own_container_objects: bool,
    pub manage_own_s3_credentials: bool,
    pub root_access: bool,
    pub view_all_containers: bool,
}

/// S3 access policy attached to a group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3Policy {
    #[serde(rename = "Id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(rename = "Version", default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(rename = "Statement", default)]
    pub statement: Vec<Statement>,
}

/// A single rule within an [`S3Policy`].
///
/// Keys outside the IAM statement grammar are rejected rather than dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Statement {
    #[serde(rename = "Sid", default, skip_serializing_if = "String::is_empty")]
    pub sid: String,
    #[serde(rename = "Effect", default)]
    pub effect: String,
    #[serde(rename = "Principal", default, skip_serializing_if = "Option::is_none")]
    pub principal: Option<Principal>,
    #[serde(
        rename = "NotPrincipal",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub not_principal: Option<Principal>,
    #[serde(rename = "Action", default, skip_serializing_if = "StringOrSlice::is_empty")]
    pub action: StringOrSlice,
    #[serde(
        rename = "NotAction",
        default,
        skip_serializing_if = "StringOrSlice::is_empty"
    )]
    pub not_action: StringOrSlice,
    #[serde(
        rename = "Resource",
        default,
        skip_serializing_if = "StringOrSlice::is_empty"
    )]
    pub resource: StringOrSlice,
    #[serde(
        rename = "NotResource",
        default,
        skip_serializing_if = "StringOrSlice::is_empty"
    )]
    pub not_resource: StringOrSlice,
    #[serde(
        rename = "Condition",
        default,
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub condition: Condition,
}

/// Who a statement applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Principal {
    /// Bare `"*"`, equivalent to `{"AWS": "*"}`.
    Wildcard(String),
    /// Principal type (e.g. `AWS`) to identifiers.
    Typed(BTreeMap<String, StringOrSlice>),
}

impl Principal {
    fn canonical(&self) -> BTreeMap<&str, Vec<&str>> {
        match self {
            Self::Wildcard(value) => BTreeMap::from([("AWS", vec![value.as_str()])]),
            Self::Typed(map) => map
                .iter()
                .map(|(kind, ids)| (kind.as_str(), ids.normalized()))
                .collect(),
        }
    }
}

/// Both policy blocks of a group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policies {
    #[serde(default)]
    pub management: ManagementPolicy,
    #[serde(default)]
    pub s3: S3Policy,
}

/// Statement with every multi-valued field sorted, so statements can be
/// compared without regard to element order.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct CanonicalStatement<'a> {
    sid: &'a str,
    effect: String,
    principal: Option<BTreeMap<&'a str, Vec<&'a str>>>,
    not_principal: Option<BTreeMap<&'a str, Vec<&'a str>>>,
    action: Vec<&'a str>,
    not_action: Vec<&'a str>,
    resource: Vec<&'a str>,
    not_resource: Vec<&'a str>,
    condition: BTreeMap<&'a str, BTreeMap<&'a str, Vec<&'a str>>>,
}

impl Statement {
    fn canonical(&self) -> CanonicalStatement<'_> {
        let condition = self
            .condition
            .iter()
            .map(|(operator, keys)| {
                let keys = keys
                    .iter()
                    .map(|(key, values)| (key.as_str(), values.normalized()))
                    .collect();
                (operator.as_str(), keys)
            })
            .collect();

        CanonicalStatement {
            sid: &self.sid,
            effect: self.effect.to_ascii_lowercase(),
            principal: self.principal.as_ref().map(Principal::canonical),
            not_principal: self.not_principal.as_ref().map(Principal::canonical),
            action: self.action.normalized(),
            not_action: self.not_action.normalized(),
            resource: self.resource.normalized(),
            not_resource: self.not_resource.normalized(),
            condition,
        }
    }
}

impl S3Policy {
    /// Parses a policy from its JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::decode("S3 policy", e))
    }

    /// Serializes the policy to compact JSON text.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(Error::Encode)
    }

    /// Returns whether two policies grant the same permissions.
    ///
    /// Statement order, value order inside one-or-many fields, duplicated
    /// values, the case of `Effect` and whether a single value was written as
    /// a bare string are all ignored.
    pub fn is_equivalent(&self, other: &Self) -> bool {
        if self.id != other.id || self.version != other.version {
            return false;
        }

        let mut left: Vec<_> = self.statement.iter().map(Statement::canonical).collect();
        let mut right: Vec<_> = other.statement.iter().map(Statement::canonical).collect();
        left.sort();
        right.sort();
        left.dedup();
        right.dedup();
        left == right
    }
}

/// Compares two policy JSON documents semantically.
///
/// Returns an error if either side is not a valid policy document.
pub fn policies_are_equivalent(left: &str, right: &str) -> Result<bool> {
    let left = S3Policy::from_json(left)?;
    let right = S3Policy::from_json(right)?;
    Ok(left.is_equivalent(&right))
}
