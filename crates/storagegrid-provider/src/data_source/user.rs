//! `storagegrid_user` data source.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use storagegrid_client::StorageGridClient;
use storagegrid_client::types::{USER_PREFIX, User};

use super::DataSource;
use crate::diagnostics::Diagnostic;
use crate::resource::ResourceResult;

#[derive(Debug, Clone, Deserialize)]
pub struct UserLookup {
    pub user_name: String,
}

/// Attributes of a looked-up user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserDataModel {
    pub user_name: String,
    pub id: String,
    pub account_id: String,
    pub full_name: String,
    pub unique_name: String,
    pub user_urn: String,
    pub federated: bool,
    pub member_of: Vec<String>,
    pub disable: bool,
}

impl UserDataModel {
    fn new(user_name: String, user: User) -> Self {
        Self {
            user_name,
            id: user.id,
            account_id: user.account_id,
            full_name: user.full_name,
            unique_name: user.unique_name,
            user_urn: user.user_urn,
            federated: user.federated,
            member_of: user.member_of,
            disable: user.disable,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct UserDataSource;

#[async_trait]
impl DataSource for UserDataSource {
    type Config = UserLookup;
    type Model = UserDataModel;

    fn type_name(&self) -> &'static str {
        "storagegrid_user"
    }

    async fn read(
        &self,
        client: &StorageGridClient,
        config: UserLookup,
    ) -> ResourceResult<UserDataModel> {
        let unique_name = format!("{USER_PREFIX}{}", config.user_name);
        let user = client.user(&unique_name).await.map_err(|e| {
            Diagnostic::from_client(format!("Unable to Read User {unique_name}"), &e)
        })?;
        Ok(UserDataModel::new(config.user_name, user))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use storagegrid_client::ClientConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn read_looks_up_unique_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/org/users/user/backup"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "data": {
                    "id": "u-1",
                    "accountId": "12345",
                    "fullName": "Backup Operator",
                    "uniqueName": "user/backup",
                    "userURN": "urn:sgws:identity::12345:user/backup",
                    "memberOf": ["g-1", "g-2"],
                    "disable": true
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = StorageGridClient::connect(ClientConfig::parse(&server.uri()).unwrap())
            .await
            .unwrap();
        let model = UserDataSource
            .read(&client, UserLookup {
                user_name: "backup".to_owned(),
            })
            .await
            .unwrap();
        assert_eq!(model.user_name, "backup");
        assert_eq!(model.member_of, ["g-1", "g-2"]);
        assert!(model.disable);
    }
}
