//! Response envelope shared by every management API endpoint.

use serde::{Deserialize, Serialize};

/// `strftime` layout of timestamps sent to the API, e.g. `2025-01-31T00:00:00.000Z`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S.000Z";

/// Envelope status reported on successful requests.
pub const STATUS_SUCCESS: &str = "success";

/// Wrapper around every JSON payload returned by the management API.
///
/// Endpoints that may answer without `data` are decoded with `T = Option<_>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub response_time: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub deprecated: bool,
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResponseMetadata>,
}

/// Optional metadata attached to mutating responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    #[serde(default)]
    pub alerts: Vec<Alert>,
}

/// Advisory message returned alongside a successful response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Alert {
    pub deprecated: bool,
    pub severity: String,
    pub text: String,
    pub key: String,
}

impl<T> ApiResponse<T> {
    /// Returns whether the envelope reports success.
    #[inline]
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }

    /// Returns the alerts carried in the response metadata.
    pub fn alerts(&self) -> &[Alert] {
        self.metadata
            .as_ref()
            .map(|metadata| metadata.alerts.as_slice())
            .unwrap_or_default()
    }

    /// Consumes the envelope and returns the payload.
    #[inline]
    pub fn into_data(self) -> T {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_payload_tolerates_missing_data() {
        let response: ApiResponse<Option<u32>> =
            serde_json::from_str(r#"{"status":"success"}"#).unwrap();
        assert!(response.is_success());
        assert_eq!(response.into_data(), None);
    }

    #[test]
    fn required_payload_rejects_missing_data() {
        assert!(serde_json::from_str::<ApiResponse<u32>>(r#"{"status":"success"}"#).is_err());
    }
}
