//! S3 access keys owned by tenant users.

use serde::{Deserialize, Serialize};

/// User identifier that addresses the signed-in user.
pub const CURRENT_USER: &str = "current-user";

/// Access key metadata as listed by `/org/users/{id}/s3-access-keys`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct S3AccessKey {
    pub id: String,
    pub account_id: String,
    pub display_name: String,
    #[serde(rename = "userURN")]
    pub user_urn: String,
    #[serde(rename = "userUUID")]
    pub user_uuid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
}

/// A freshly issued access key, the only time the secret is visible.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedS3AccessKey {
    #[serde(flatten)]
    pub key: S3AccessKey,
    #[serde(default)]
    pub access_key: String,
    #[serde(default, alias = "secretKey")]
    pub secret_access_key: String,
}

impl IssuedS3AccessKey {
    /// Returns the access key with everything but the first four characters masked.
    pub fn access_key_masked(&self) -> String {
        mask(&self.access_key)
    }
}

impl std::fmt::Debug for IssuedS3AccessKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedS3AccessKey")
            .field("key", &self.key)
            .field("access_key", &self.access_key_masked())
            .field("secret_access_key", &"***")
            .finish()
    }
}

/// Request body for issuing an access key.
#[derive(Debug, Clone, Default, Serialize)]
pub(crate) struct CreateAccessKey<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<&'a str>,
}

fn mask(value: &str) -> String {
    value
        .chars()
        .enumerate()
        .map(|(index, c)| if index < 4 { c } else { '*' })
        .collect()
}
