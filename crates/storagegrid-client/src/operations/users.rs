//! Tenant users.

use reqwest::Method;
use tracing::{info, instrument};

use crate::types::{ChangePassword, User, UserPayload};
use crate::{Result, StorageGridClient, TRACING_TARGET_IAM};

const USERS_PATH: &str = "/org/users";

impl StorageGridClient {
    /// Fetches a user by id or by `user/<name>` unique name.
    #[instrument(skip(self), target = TRACING_TARGET_IAM)]
    pub async fn user(&self, id: &str) -> Result<User> {
        let path = format!("{USERS_PATH}/{id}");
        let response = self.inner.api.call::<User>(Method::GET, &path, "user").await?;
        Ok(response.into_data())
    }

    /// Creates a local user.
    #[instrument(skip(self, payload), target = TRACING_TARGET_IAM, fields(unique_name = %payload.unique_name))]
    pub async fn create_user(&self, payload: &UserPayload) -> Result<User> {
        let response = self
            .inner
            .api
            .call_with::<_, User>(Method::POST, USERS_PATH, payload, "user")
            .await?;

        let user = response.into_data();
        info!(target: TRACING_TARGET_IAM, user_id = %user.id, "User created");
        Ok(user)
    }

    /// Replaces the attributes of a user.
    #[instrument(skip(self, payload), target = TRACING_TARGET_IAM)]
    pub async fn update_user(&self, id: &str, payload: &UserPayload) -> Result<User> {
        let path = format!("{USERS_PATH}/{id}");
        let response = self
            .inner
            .api
            .call_with::<_, User>(Method::PUT, &path, payload, "user")
            .await?;
        Ok(response.into_data())
    }

    /// Deletes a user.
    #[instrument(skip(self), target = TRACING_TARGET_IAM)]
    pub async fn delete_user(&self, id: &str) -> Result<()> {
        let path = format!("{USERS_PATH}/{id}");
        self.inner.api.call_discard(Method::DELETE, &path).await?;
        info!(target: TRACING_TARGET_IAM, user_id = %id, "User deleted");
        Ok(())
    }

    /// Sets the password of a local user.
    #[instrument(skip(self, password), target = TRACING_TARGET_IAM)]
    pub async fn change_user_password(&self, id: &str, password: &str) -> Result<()> {
        let path = format!("{USERS_PATH}/{id}/change-password");
        let body = serde_json::to_vec(&ChangePassword { password }).map_err(crate::Error::Encode)?;
        let request = self
            .inner
            .api
            .request(Method::POST, &path)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);

        self.inner.api.execute(request).await?;
        info!(target: TRACING_TARGET_IAM, user_id = %id, "User password changed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::types::UserPayload;
    use crate::{ClientConfig, StorageGridClient};

    fn user_body() -> serde_json::Value {
        serde_json::json!({
            "status": "success",
            "data": {
                "id": "0f1e2d3c",
                "accountId": "12345",
                "fullName": "Alice Example",
                "uniqueName": "user/alice",
                "userURN": "urn:sgws:identity::12345:user/alice",
                "federated": false,
                "memberOf": ["g1"],
                "disable": false
            }
        })
    }

    async fn client_for(server: &MockServer) -> StorageGridClient {
        StorageGridClient::connect(ClientConfig::parse(&server.uri()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn create_posts_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v4/org/users"))
            .and(body_json(serde_json::json!({
                "uniqueName": "user/alice",
                "fullName": "Alice Example",
                "memberOf": ["g1"],
                "disable": false
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(user_body()))
            .expect(1)
            .mount(&server)
            .await;

        let payload = UserPayload {
            unique_name: "user/alice".to_owned(),
            full_name: "Alice Example".to_owned(),
            member_of: vec!["g1".to_owned()],
            disable: false,
        };
        let user = client_for(&server).await.create_user(&payload).await.unwrap();
        assert_eq!(user.user_urn, "urn:sgws:identity::12345:user/alice");
        assert_eq!(user.short_name(), "alice");
    }

    #[tokio::test]
    async fn update_uses_put() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/v4/org/users/0f1e2d3c"))
            .respond_with(ResponseTemplate::new(200).set_body_json(user_body()))
            .expect(1)
            .mount(&server)
            .await;

        let payload = UserPayload {
            unique_name: "user/alice".to_owned(),
            ..Default::default()
        };
        client_for(&server)
            .await
            .update_user("0f1e2d3c", &payload)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn change_password_posts_password() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v4/org/users/0f1e2d3c/change-password"))
            .and(body_json(serde_json::json!({"password": "n3w-pa55"})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .await
            .change_user_password("0f1e2d3c", "n3w-pa55")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn missing_user_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/org/users/user/ghost"))
            .respond_with(ResponseTemplate::new(404).set_body_string("{}"))
            .mount(&server)
            .await;

        let error = client_for(&server).await.user("user/ghost").await.unwrap_err();
        assert!(error.is_not_found());
    }
}
