//! `storagegrid_s3_access_key` resource.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use storagegrid_client::types::S3AccessKey;
use storagegrid_client::{Error, StorageGridClient};

use super::{ReadOutcome, Resource, ResourceResult};
use crate::diagnostics::{Diagnostic, Diagnostics};

/// Attributes of an S3 access key owned by a tenant user.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3AccessKeyModel {
    pub user_id: String,
    /// Expiry in `YYYY-MM-DDTHH:MM:SS.000Z` form; absent keys never expire.
    #[serde(default)]
    pub expires: Option<String>,

    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub access_key: Option<String>,
    /// Only known right after creation.
    #[serde(default)]
    pub secret_access_key: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub user_urn: Option<String>,
    #[serde(default)]
    pub user_uuid: Option<String>,
}

impl std::fmt::Debug for S3AccessKeyModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3AccessKeyModel")
            .field("user_id", &self.user_id)
            .field("id", &self.id)
            .field("display_name", &self.display_name)
            .field("expires", &self.expires)
            .field("secret_access_key", &self.secret_access_key.as_ref().map(|_| "***"))
            .finish_non_exhaustive()
    }
}

impl S3AccessKeyModel {
    fn apply(&mut self, key: &S3AccessKey) {
        self.id = Some(key.id.clone());
        self.display_name = Some(key.display_name.clone());
        self.user_urn = Some(key.user_urn.clone());
        self.user_uuid = Some(key.user_uuid.clone());
        self.expires = key.expires.clone();
    }

    fn id(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }
}

fn key_error(summary: &str, user_id: &str, error: &Error) -> Diagnostics {
    Diagnostic::error(
        format!("{summary} for User {user_id}"),
        format!("StorageGrid API error: {error}"),
    )
    .into()
}

/// S3 access key. Every attribute forces replacement.
#[derive(Debug, Default, Clone, Copy)]
pub struct S3AccessKeyResource;

#[async_trait]
impl Resource for S3AccessKeyResource {
    type Model = S3AccessKeyModel;

    fn type_name(&self) -> &'static str {
        "storagegrid_s3_access_key"
    }

    fn requires_replace(&self) -> &'static [&'static str] {
        &["user_id", "expires"]
    }

    fn plan(
        &self,
        mut proposed: S3AccessKeyModel,
        prior: Option<&S3AccessKeyModel>,
    ) -> ResourceResult<S3AccessKeyModel> {
        if let Some(prior) = prior
            && prior.user_id == proposed.user_id
            && prior.expires == proposed.expires
        {
            proposed = prior.clone();
        }
        Ok(proposed)
    }

    async fn create(
        &self,
        client: &StorageGridClient,
        mut planned: S3AccessKeyModel,
    ) -> ResourceResult<S3AccessKeyModel> {
        let issued = client
            .create_s3_access_key(&planned.user_id, planned.expires.as_deref())
            .await
            .map_err(|e| key_error("Error Creating S3 Access Key", &planned.user_id, &e))?;

        planned.apply(&issued.key);
        planned.access_key = Some(issued.access_key.clone());
        planned.secret_access_key = Some(issued.secret_access_key.clone());
        Ok(planned)
    }

    async fn read(
        &self,
        client: &StorageGridClient,
        mut state: S3AccessKeyModel,
    ) -> ResourceResult<ReadOutcome<S3AccessKeyModel>> {
        let keys = match client.s3_access_keys(&state.user_id).await {
            Ok(keys) => keys,
            Err(e) if e.is_not_found() => return Ok(ReadOutcome::Removed(Diagnostics::new())),
            Err(e) => return Err(key_error("Error Reading S3 Access Keys", &state.user_id, &e)),
        };

        match keys.iter().find(|key| key.id == state.id()) {
            Some(key) => {
                state.apply(key);
                Ok(ReadOutcome::Found(state))
            }
            None => Ok(ReadOutcome::Removed(Diagnostics::new())),
        }
    }

    async fn update(
        &self,
        _client: &StorageGridClient,
        _planned: S3AccessKeyModel,
        _prior: S3AccessKeyModel,
    ) -> ResourceResult<S3AccessKeyModel> {
        Err(Diagnostic::error(
            "Unexpected Update Call",
            "Access keys cannot be changed in place. Every attribute change replaces the key.",
        )
        .into())
    }

    async fn delete(
        &self,
        client: &StorageGridClient,
        state: S3AccessKeyModel,
    ) -> ResourceResult<Diagnostics> {
        match client.delete_s3_access_key(&state.user_id, state.id()).await {
            Ok(()) => Ok(Diagnostics::new()),
            Err(e) if e.is_not_found() => Ok(Diagnostics::new()),
            Err(e) => Err(key_error("Error Deleting S3 Access Key", &state.user_id, &e)),
        }
    }

    /// Imports by `<user_id>/<key_id>`. The secret stays unknown.
    async fn import(
        &self,
        client: &StorageGridClient,
        id: &str,
    ) -> ResourceResult<S3AccessKeyModel> {
        let Some((user_id, key_id)) = id.split_once('/') else {
            return Err(Diagnostic::error(
                "Invalid Import Identifier",
                format!("Expected an identifier of the form <user_id>/<key_id>, got '{id}'."),
            )
            .into());
        };

        let keys = client
            .s3_access_keys(user_id)
            .await
            .map_err(|e| key_error("Error Importing S3 Access Key", user_id, &e))?;
        let key = keys.iter().find(|key| key.id == key_id).ok_or_else(|| {
            Diagnostic::error(
                "S3 Access Key Not Found",
                format!("User {user_id} has no access key with id '{key_id}'."),
            )
        })?;

        let mut model = S3AccessKeyModel {
            user_id: user_id.to_owned(),
            ..Default::default()
        };
        model.apply(key);
        Ok(model)
    }
}
