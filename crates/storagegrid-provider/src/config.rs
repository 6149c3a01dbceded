//! Provider configuration.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use storagegrid_client::{ClientConfig, Credentials};
use url::Url;

use crate::diagnostics::{Diagnostic, Diagnostics};

const ENV_ENDPOINT: &str = "STORAGEGRID_ENDPOINT";
const ENV_ACCOUNT_ID: &str = "STORAGEGRID_ACCOUNTID";
const ENV_USERNAME: &str = "STORAGEGRID_USERNAME";
const ENV_PASSWORD: &str = "STORAGEGRID_PASSWORD";
const ENV_S3_ENDPOINT: &str = "STORAGEGRID_S3_ENDPOINT";
const ENV_REQUEST_TIMEOUT: &str = "STORAGEGRID_REQUEST_TIMEOUT";

/// Connection settings for one StorageGRID tenant.
///
/// Every field is optional on its own. Values set by the host configuration
/// take precedence over values from the `STORAGEGRID_*` environment variables,
/// see [`ProviderConfig::merge`].
///
/// # Environment Variables
///
/// - `STORAGEGRID_ENDPOINT` - Management API URL, e.g. `https://grid.example.com:9443`
/// - `STORAGEGRID_ACCOUNTID` - Tenant account id
/// - `STORAGEGRID_USERNAME` - Local tenant user
/// - `STORAGEGRID_PASSWORD` - Password of that user
/// - `STORAGEGRID_S3_ENDPOINT` - S3 endpoint (optional, derived from the endpoint)
/// - `STORAGEGRID_REQUEST_TIMEOUT` - Request timeout in seconds (optional, default: 60)
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct ProviderConfig {
    /// URI of the StorageGRID management API.
    #[cfg_attr(feature = "config", arg(long = "endpoint", env = "STORAGEGRID_ENDPOINT"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Account id of the target tenant.
    #[cfg_attr(feature = "config", arg(long = "account-id", env = "STORAGEGRID_ACCOUNTID"))]
    #[serde(default, rename = "accountid", skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,

    /// Tenant user name.
    #[cfg_attr(feature = "config", arg(long = "username", env = "STORAGEGRID_USERNAME"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Tenant user password.
    #[cfg_attr(
        feature = "config",
        arg(long = "password", env = "STORAGEGRID_PASSWORD", hide_env_values = true)
    )]
    #[serde(default, skip_serializing)]
    pub password: Option<String>,

    /// S3 endpoint used for lifecycle configuration.
    #[cfg_attr(feature = "config", arg(long = "s3-endpoint", env = "STORAGEGRID_S3_ENDPOINT"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3_endpoint: Option<String>,

    /// Management API request timeout in seconds.
    #[cfg_attr(
        feature = "config",
        arg(long = "request-timeout", env = "STORAGEGRID_REQUEST_TIMEOUT")
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<u64>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("endpoint", &self.endpoint)
            .field("account_id", &self.account_id)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("s3_endpoint", &self.s3_endpoint)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl ProviderConfig {
    /// Reads the `STORAGEGRID_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let lookup = |key: &str| lookup(key).filter(|value| !value.is_empty());
        Self {
            endpoint: lookup(ENV_ENDPOINT),
            account_id: lookup(ENV_ACCOUNT_ID),
            username: lookup(ENV_USERNAME),
            password: lookup(ENV_PASSWORD),
            s3_endpoint: lookup(ENV_S3_ENDPOINT),
            request_timeout: lookup(ENV_REQUEST_TIMEOUT).and_then(|value| value.parse().ok()),
        }
    }

    /// Layers `explicit` over `self`. Every value set in `explicit` wins.
    pub fn merge(self, explicit: ProviderConfig) -> Self {
        Self {
            endpoint: explicit.endpoint.or(self.endpoint),
            account_id: explicit.account_id.or(self.account_id),
            username: explicit.username.or(self.username),
            password: explicit.password.or(self.password),
            s3_endpoint: explicit.s3_endpoint.or(self.s3_endpoint),
            request_timeout: explicit.request_timeout.or(self.request_timeout),
        }
    }

    /// Builds the client configuration.
    ///
    /// # Errors
    ///
    /// Returns one attribute diagnostic per missing or invalid value.
    pub fn into_client_config(self) -> Result<ClientConfig, Diagnostics> {
        let mut diagnostics = Diagnostics::new();
        let mut require = |value: Option<String>, attribute: &str, label: &str, env: &str| {
            let value = value.filter(|value| !value.is_empty());
            if value.is_none() {
                diagnostics.push(missing_value(attribute, label, env));
            }
            value.unwrap_or_default()
        };

        let endpoint = require(self.endpoint, "endpoint", "Endpoint", ENV_ENDPOINT);
        let account_id = require(self.account_id, "accountid", "AccountID", ENV_ACCOUNT_ID);
        let username = require(self.username, "username", "Username", ENV_USERNAME);
        let password = require(self.password, "password", "Password", ENV_PASSWORD);

        if diagnostics.has_error() {
            return Err(diagnostics);
        }

        let mut config = ClientConfig::parse(&endpoint)
            .map_err(|e| invalid_value("endpoint", "Endpoint", e.to_string()))?
            .with_credentials(Credentials::new(account_id, username, password));

        if let Some(s3_endpoint) = self.s3_endpoint.filter(|value| !value.is_empty()) {
            let url = Url::parse(&s3_endpoint)
                .map_err(|e| invalid_value("s3_endpoint", "S3 Endpoint", e.to_string()))?;
            config = config.with_s3_endpoint(url);
        }

        if let Some(seconds) = self.request_timeout {
            config = config.with_request_timeout(Duration::from_secs(seconds));
        }

        config
            .validate()
            .map_err(|e| invalid_value("endpoint", "Endpoint", e.to_string()))?;
        Ok(config)
    }
}

fn missing_value(attribute: &str, label: &str, env: &str) -> Diagnostic {
    Diagnostic::error(
        format!("Missing StorageGrid API {label}"),
        format!(
            "The provider cannot create the StorageGrid API client as there is a missing or \
             empty value for the StorageGrid API {label}. Set the {attribute} value in the \
             configuration or use the {env} environment variable. If either is already set, \
             ensure the value is not empty."
        ),
    )
    .with_attribute(attribute)
}

fn invalid_value(attribute: &str, label: &str, detail: String) -> Diagnostics {
    Diagnostic::error(format!("Invalid StorageGrid API {label}"), detail)
        .with_attribute(attribute)
        .into()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn complete() -> ProviderConfig {
        ProviderConfig {
            endpoint: Some("https://grid.example.com:9443".to_owned()),
            account_id: Some("12345".to_owned()),
            username: Some("root".to_owned()),
            password: Some("pw".to_owned()),
            ..Default::default()
        }
    }

    #[test]
    fn explicit_values_win_over_environment() {
        let env = HashMap::from([
            (ENV_ENDPOINT, "https://env.example.com"),
            (ENV_USERNAME, "env-user"),
            (ENV_REQUEST_TIMEOUT, "15"),
        ]);
        let from_env = ProviderConfig::from_lookup(|key| env.get(key).map(|v| (*v).to_owned()));

        let explicit = ProviderConfig {
            username: Some("root".to_owned()),
            ..Default::default()
        };
        let merged = from_env.merge(explicit);
        assert_eq!(merged.endpoint.as_deref(), Some("https://env.example.com"));
        assert_eq!(merged.username.as_deref(), Some("root"));
        assert_eq!(merged.request_timeout, Some(15));
    }

    #[test]
    fn empty_environment_values_are_ignored() {
        let from_env = ProviderConfig::from_lookup(|_| Some(String::new()));
        assert_eq!(from_env, ProviderConfig::default());
    }

    #[test]
    fn every_missing_value_is_reported() {
        let diagnostics = ProviderConfig::default().into_client_config().unwrap_err();
        let attributes: Vec<_> = diagnostics
            .iter()
            .filter_map(|d| d.attribute.as_deref())
            .collect();
        assert_eq!(attributes, ["endpoint", "accountid", "username", "password"]);
        assert_eq!(
            diagnostics.iter().next().unwrap().summary,
            "Missing StorageGrid API Endpoint"
        );
    }

    #[test]
    fn complete_config_builds_client_config() {
        let config = ProviderConfig {
            s3_endpoint: Some("https://s3.example.com".to_owned()),
            request_timeout: Some(10),
            ..complete()
        }
        .into_client_config()
        .unwrap();

        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.s3_endpoint().as_str(), "https://s3.example.com/");
        assert_eq!(config.credentials.unwrap().username, "root");
    }

    #[test]
    fn malformed_endpoint_is_an_attribute_error() {
        let diagnostics = ProviderConfig {
            endpoint: Some("not a url".to_owned()),
            ..complete()
        }
        .into_client_config()
        .unwrap_err();
        let diagnostic = diagnostics.iter().next().unwrap();
        assert_eq!(diagnostic.attribute.as_deref(), Some("endpoint"));
        assert!(diagnostic.is_error());
    }

    #[test]
    fn host_configuration_uses_accountid_key() {
        let config: ProviderConfig =
            serde_json::from_value(serde_json::json!({"accountid": "42", "password": "pw"}))
                .unwrap();
        assert_eq!(config.account_id.as_deref(), Some("42"));
        assert!(!format!("{config:?}").contains("\"pw\""));
    }
}
