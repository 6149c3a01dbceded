//! Error types for StorageGRID client operations.

use reqwest::StatusCode;

/// Result type alias for StorageGRID client operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Substrings that identify a timeout in transport error text.
const TIMEOUT_MARKERS: &[&str] = &[
    "timeout",
    "timed out",
    "deadline exceeded",
    "Client.Timeout exceeded",
];

/// S3 error codes that indicate the temporary credential is no longer usable.
const S3_AUTH_MARKERS: &[&str] = &[
    "AccessDenied",
    "InvalidAccessKey",
    "TokenRefreshRequired",
    "ExpiredToken",
];

/// Error type for StorageGRID management and S3 operations.
#[derive(Debug, thiserror::Error)]
#[must_use = "errors should be handled appropriately"]
pub enum Error {
    /// Invalid or incomplete client configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The management API rejected the sign-in request.
    #[error("authentication failed: status: {status}, body: {body}")]
    Authentication {
        /// HTTP status returned by the authorize endpoint.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The management API answered with a non-2xx status.
    #[error("status: {status}, body: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The request never produced a response.
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A response body could not be decoded.
    #[error("failed to decode {context}: {source}")]
    Decode {
        /// What was being decoded.
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A request body could not be encoded.
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// The envelope reported a status other than `success`.
    #[error("{operation} failed with status: {status}")]
    Unsuccessful {
        /// Operation that was attempted.
        operation: &'static str,
        /// Envelope status.
        status: String,
    },

    /// A named resource does not exist.
    #[error("{kind} {name} not found")]
    NotFound {
        /// Resource kind, e.g. `bucket`.
        kind: &'static str,
        /// Resource name or identifier.
        name: String,
    },

    /// S3 protocol operation failed.
    #[error("S3 error: {0}")]
    S3(String),

    /// S3 operation still failed after refreshing the temporary credential.
    #[error("S3 operation failed after retry: {0}")]
    S3RetryExhausted(#[source] Box<Error>),

    /// Issuing a fresh temporary credential after an auth failure failed.
    #[error("failed to refresh S3 client after auth error: {0}")]
    S3Refresh(#[source] Box<Error>),
}

impl Error {
    /// Creates a not-found error for the given resource kind and name.
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Creates a decode error with context.
    pub fn decode(context: &'static str, source: serde_json::Error) -> Self {
        Self::Decode { context, source }
    }

    /// Returns the HTTP status code, if this error carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } | Self::Authentication { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns whether the resource addressed by the request does not exist.
    ///
    /// Recognizes the distinguished variant, HTTP 404, and upstream bodies
    /// that report the object as not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Status { status, body } => {
                *status == StatusCode::NOT_FOUND.as_u16()
                    || body.to_ascii_lowercase().contains("not found")
            }
            _ => false,
        }
    }

    /// Returns whether this error is a timeout-class transport failure.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Transport(e) if e.is_timeout() => true,
            Self::Status { .. } | Self::NotFound { .. } => false,
            other => {
                let text = other.to_string();
                TIMEOUT_MARKERS.iter().any(|marker| text.contains(marker))
            }
        }
    }

    /// Returns whether this S3 error means the temporary credential must be replaced.
    pub fn is_s3_auth_error(&self) -> bool {
        match self {
            Self::S3(message) => S3_AUTH_MARKERS.iter().any(|code| message.contains(code)),
            _ => false,
        }
    }

    /// Returns whether the error message contains the given text.
    ///
    /// Upstream validation failures are only distinguishable by their body text.
    pub fn mentions(&self, needle: &str) -> bool {
        self.to_string().contains(needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_formats_code_and_body() {
        let error = Error::Status {
            status: 500,
            body: "boom".to_owned(),
        };
        assert_eq!(error.to_string(), "status: 500, body: boom");
        assert_eq!(error.status(), Some(500));
    }

    #[test]
    fn not_found_classification() {
        assert!(Error::not_found("bucket", "logs").is_not_found());
        assert_eq!(
            Error::not_found("bucket", "logs").to_string(),
            "bucket logs not found"
        );
        assert!(
            Error::Status {
                status: 404,
                body: String::new()
            }
            .is_not_found()
        );
        assert!(
            Error::Status {
                status: 400,
                body: r#"{"message":{"text":"Group Not Found"}}"#.to_owned()
            }
            .is_not_found()
        );
        assert!(
            !Error::Status {
                status: 500,
                body: "internal".to_owned()
            }
            .is_not_found()
        );
    }

    #[test]
    fn timeout_classification_from_text() {
        assert!(Error::S3("context deadline exceeded".to_owned()).is_timeout());
        assert!(!Error::S3("AccessDenied".to_owned()).is_timeout());
        assert!(
            !Error::Status {
                status: 504,
                body: "gateway timeout".to_owned()
            }
            .is_timeout()
        );
    }

    #[test]
    fn s3_auth_classification() {
        for code in ["AccessDenied", "InvalidAccessKeyId", "ExpiredToken", "TokenRefreshRequired"] {
            assert!(Error::S3(format!("code: {code}")).is_s3_auth_error(), "{code}");
        }
        assert!(!Error::S3("NoSuchBucket".to_owned()).is_s3_auth_error());
        assert!(!Error::Config("AccessDenied".to_owned()).is_s3_auth_error());
    }
}
