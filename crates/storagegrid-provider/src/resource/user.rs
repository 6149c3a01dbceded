//! `storagegrid_user` resource.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use storagegrid_client::types::{USER_PREFIX, User, UserPayload};
use storagegrid_client::{Error, StorageGridClient};
use tracing::debug;

use super::{ReadOutcome, Resource, ResourceResult};
use crate::TRACING_TARGET_RESOURCE;
use crate::diagnostics::{Diagnostic, Diagnostics};

/// Attributes of a local tenant user.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserModel {
    pub user_name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub member_of: Vec<String>,
    #[serde(default)]
    pub disable: bool,
    /// Write-only. Kept in state so changes can be detected.
    #[serde(default)]
    pub password: Option<String>,

    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub unique_name: Option<String>,
    #[serde(default)]
    pub user_urn: Option<String>,
    #[serde(default)]
    pub federated: Option<bool>,
}

impl std::fmt::Debug for UserModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserModel")
            .field("user_name", &self.user_name)
            .field("id", &self.id)
            .field("member_of", &self.member_of)
            .field("disable", &self.disable)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish_non_exhaustive()
    }
}

impl UserModel {
    fn payload(&self) -> UserPayload {
        UserPayload {
            unique_name: format!("{USER_PREFIX}{}", self.user_name),
            full_name: self.full_name.clone(),
            member_of: self.member_of.clone(),
            disable: self.disable,
        }
    }

    fn apply(&mut self, user: &User) {
        self.user_name = user.short_name().to_owned();
        self.full_name = user.full_name.clone();
        self.member_of = user.member_of.clone();
        self.disable = user.disable;
        self.id = Some(user.id.clone());
        self.account_id = Some(user.account_id.clone());
        self.unique_name = Some(user.unique_name.clone());
        self.user_urn = Some(user.user_urn.clone());
        self.federated = Some(user.federated);
    }

    fn id(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }
}

fn user_error(summary: &str, user: &str, error: &Error) -> Diagnostics {
    Diagnostic::error(
        format!("{summary}: {user}"),
        format!("StorageGrid API error: {error}"),
    )
    .into()
}

/// Local tenant user with optional password.
#[derive(Debug, Default, Clone, Copy)]
pub struct UserResource;

impl UserResource {
    async fn set_password(
        &self,
        client: &StorageGridClient,
        model: &UserModel,
    ) -> ResourceResult<()> {
        let Some(password) = model.password.as_deref() else {
            return Ok(());
        };
        client
            .change_user_password(model.id(), password)
            .await
            .map_err(|e| user_error("Error Setting Password for User", &model.user_name, &e))
    }
}

#[async_trait]
impl Resource for UserResource {
    type Model = UserModel;

    fn type_name(&self) -> &'static str {
        "storagegrid_user"
    }

    fn requires_replace(&self) -> &'static [&'static str] {
        &["user_name"]
    }

    fn plan(
        &self,
        mut proposed: UserModel,
        prior: Option<&UserModel>,
    ) -> ResourceResult<UserModel> {
        if let Some(prior) = prior
            && prior.user_name == proposed.user_name
        {
            proposed.id = prior.id.clone();
            proposed.account_id = prior.account_id.clone();
            proposed.unique_name = prior.unique_name.clone();
            proposed.user_urn = prior.user_urn.clone();
            proposed.federated = prior.federated;
        }
        Ok(proposed)
    }

    async fn create(
        &self,
        client: &StorageGridClient,
        mut planned: UserModel,
    ) -> ResourceResult<UserModel> {
        let user = client
            .create_user(&planned.payload())
            .await
            .map_err(|e| user_error("Error Creating StorageGrid User", &planned.user_name, &e))?;

        planned.apply(&user);
        self.set_password(client, &planned).await?;
        Ok(planned)
    }

    async fn read(
        &self,
        client: &StorageGridClient,
        mut state: UserModel,
    ) -> ResourceResult<ReadOutcome<UserModel>> {
        match client.user(state.id()).await {
            Ok(user) => {
                state.apply(&user);
                Ok(ReadOutcome::Found(state))
            }
            Err(e) if e.is_not_found() => {
                debug!(
                    target: TRACING_TARGET_RESOURCE,
                    user_id = %state.id(),
                    "User no longer exists"
                );
                Ok(ReadOutcome::Removed(Diagnostics::new()))
            }
            Err(e) => Err(user_error(
                "Error Reading StorageGrid User",
                &state.user_name,
                &e,
            )),
        }
    }

    async fn update(
        &self,
        client: &StorageGridClient,
        mut planned: UserModel,
        prior: UserModel,
    ) -> ResourceResult<UserModel> {
        let user = client
            .update_user(prior.id(), &planned.payload())
            .await
            .map_err(|e| user_error("Error Updating StorageGrid User", &prior.user_name, &e))?;
        planned.apply(&user);

        if planned.password != prior.password {
            self.set_password(client, &planned).await?;
        }
        Ok(planned)
    }

    async fn delete(
        &self,
        client: &StorageGridClient,
        state: UserModel,
    ) -> ResourceResult<Diagnostics> {
        client
            .delete_user(state.id())
            .await
            .map_err(|e| user_error("Error Deleting StorageGrid User", &state.user_name, &e))?;
        Ok(Diagnostics::new())
    }

    async fn import(&self, client: &StorageGridClient, id: &str) -> ResourceResult<UserModel> {
        let unique_name = format!("{USER_PREFIX}{id}");
        let user = client.user(&unique_name).await.map_err(|e| {
            if e.is_not_found() {
                Diagnostic::error(
                    "User Not Found",
                    format!(
                        "Cannot import a user with unique name '{id}' because it does not exist."
                    ),
                )
                .into()
            } else {
                user_error("Error Importing StorageGrid User", id, &e)
            }
        })?;

        let mut model = UserModel::default();
        model.apply(&user);
        Ok(model)
    }
}
