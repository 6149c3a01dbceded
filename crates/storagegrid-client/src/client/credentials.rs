//! Tenant sign-in credentials.

use serde::Serialize;

/// Credentials of a tenant user, used once to obtain a bearer token.
///
/// Only [`AuthorizeRequest`] puts the password on the wire.
#[derive(Clone)]
pub struct Credentials {
    /// Tenant account identifier.
    pub account_id: String,
    /// Local user name.
    pub username: String,
    /// Password, never printed.
    pub password: String,
}

impl Credentials {
    /// Creates a new set of credentials.
    pub fn new(
        account_id: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns whether any component is empty.
    pub fn is_incomplete(&self) -> bool {
        self.account_id.is_empty() || self.username.is_empty() || self.password.is_empty()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("account_id", &self.account_id)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Request body for `POST /api/v4/authorize`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AuthorizeRequest<'a> {
    pub account_id: &'a str,
    pub username: &'a str,
    pub password: &'a str,
    pub cookie: bool,
    pub csrf_token: bool,
}

impl<'a> From<&'a Credentials> for AuthorizeRequest<'a> {
    fn from(credentials: &'a Credentials) -> Self {
        Self {
            account_id: &credentials.account_id,
            username: &credentials.username,
            password: &credentials.password,
            cookie: true,
            csrf_token: false,
        }
    }
}
