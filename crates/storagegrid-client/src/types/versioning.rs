//! Bucket versioning state.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Wire form of a bucket's versioning state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BucketVersioning {
    pub versioning_enabled: bool,
    pub versioning_suspended: bool,
}

/// Versioning status as exposed to users.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
    AsRefStr, Display, EnumString
)]
pub enum VersioningStatus {
    #[default]
    Enabled,
    Suspended,
    /// Versioning was never turned on. Read-only.
    Disabled,
}

impl From<BucketVersioning> for VersioningStatus {
    fn from(value: BucketVersioning) -> Self {
        if value.versioning_enabled {
            Self::Enabled
        } else if value.versioning_suspended {
            Self::Suspended
        } else {
            Self::Disabled
        }
    }
}

impl From<VersioningStatus> for BucketVersioning {
    fn from(value: VersioningStatus) -> Self {
        match value {
            VersioningStatus::Enabled => Self {
                versioning_enabled: true,
                versioning_suspended: false,
            },
            VersioningStatus::Suspended => Self {
                versioning_enabled: false,
                versioning_suspended: true,
            },
            VersioningStatus::Disabled => Self::default(),
        }
    }
}
