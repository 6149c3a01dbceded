//! `storagegrid_group` data source.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use storagegrid_client::StorageGridClient;
use storagegrid_client::types::{GROUP_PREFIX, Group};

use super::DataSource;
use crate::diagnostics::Diagnostic;
use crate::models::ManagementModel;
use crate::resource::ResourceResult;

#[derive(Debug, Clone, Deserialize)]
pub struct GroupLookup {
    pub group_name: String,
}

/// Policy block with the S3 policy rendered as JSON text.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupPoliciesDataModel {
    pub s3: String,
    pub management: ManagementModel,
}

/// Attributes of a looked-up group.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupDataModel {
    pub group_name: String,
    pub id: String,
    pub account_id: String,
    pub display_name: String,
    pub unique_name: String,
    pub group_urn: String,
    pub federated: bool,
    pub management_read_only: bool,
    pub policies: GroupPoliciesDataModel,
}

impl GroupDataModel {
    fn new(group_name: String, group: Group, s3: String) -> Self {
        Self {
            group_name,
            id: group.id,
            account_id: group.account_id,
            display_name: group.display_name,
            unique_name: group.unique_name,
            group_urn: group.group_urn,
            federated: group.federated,
            management_read_only: group.management_read_only,
            policies: GroupPoliciesDataModel {
                s3,
                management: group.policies.management.into(),
            },
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct GroupDataSource;

#[async_trait]
impl DataSource for GroupDataSource {
    type Config = GroupLookup;
    type Model = GroupDataModel;

    fn type_name(&self) -> &'static str {
        "storagegrid_group"
    }

    async fn read(
        &self,
        client: &StorageGridClient,
        config: GroupLookup,
    ) -> ResourceResult<GroupDataModel> {
        let unique_name = format!("{GROUP_PREFIX}{}", config.group_name);
        let group = client.group(&unique_name).await.map_err(|e| {
            Diagnostic::from_client(format!("Unable to Read Group {unique_name}"), &e)
        })?;

        let s3 = group.policies.s3.to_json().map_err(|e| {
            Diagnostic::error(
                "Error Processing S3 Policy",
                format!("Could not encode the S3 policy from the API: {e}"),
            )
        })?;
        Ok(GroupDataModel::new(config.group_name, group, s3))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use storagegrid_client::ClientConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    async fn client_for(server: &MockServer) -> StorageGridClient {
        StorageGridClient::connect(ClientConfig::parse(&server.uri()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn read_flattens_group_and_policy() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/org/groups/group/readers"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "apiVersion": "4.0",
                "data": {
                    "id": "g-1",
                    "accountId": "12345",
                    "displayName": "readers",
                    "uniqueName": "group/readers",
                    "groupURN": "urn:sgws:identity::12345:group/readers",
                    "federated": false,
                    "managementReadOnly": true,
                    "policies": {
                        "management": {"viewAllContainers": true},
                        "s3": {
                            "Statement": [{
                                "Effect": "Allow",
                                "Action": "s3:GetObject",
                                "Resource": "arn:aws:s3:::*"
                            }]
                        }
                    }
                }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let model = GroupDataSource
            .read(&client, GroupLookup {
                group_name: "readers".to_owned(),
            })
            .await
            .unwrap();
        assert_eq!(model.id, "g-1");
        assert!(model.management_read_only);
        assert!(model.policies.management.view_all_containers);
        assert!(model.policies.s3.contains("s3:GetObject"));
    }

    #[tokio::test]
    async fn missing_group_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/org/groups/group/ghost"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let diagnostics = GroupDataSource
            .read(&client, GroupLookup {
                group_name: "ghost".to_owned(),
            })
            .await
            .unwrap_err();
        assert_eq!(
            diagnostics.iter().next().unwrap().summary,
            "Unable to Read Group group/ghost"
        );
    }
}
