//! Tenant users.

use serde::{Deserialize, Serialize};

/// Prefix the API requires on local user unique names.
pub const USER_PREFIX: &str = "user/";

/// A tenant user as returned by `/org/users`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    pub id: String,
    pub account_id: String,
    pub full_name: String,
    pub unique_name: String,
    #[serde(rename = "userURN")]
    pub user_urn: String,
    pub federated: bool,
    pub member_of: Vec<String>,
    pub disable: bool,
}

impl User {
    /// Returns the unique name without the `user/` prefix.
    pub fn short_name(&self) -> &str {
        self.unique_name
            .strip_prefix(USER_PREFIX)
            .unwrap_or(&self.unique_name)
    }
}

/// Request body for creating or replacing a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    pub unique_name: String,
    pub full_name: String,
    pub member_of: Vec<String>,
    pub disable: bool,
}

/// Request body for `POST /org/users/{id}/change-password`.
#[derive(Serialize)]
pub(crate) struct ChangePassword<'a> {
    pub password: &'a str,
}
