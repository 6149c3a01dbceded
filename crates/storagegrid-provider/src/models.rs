//! Attribute blocks shared by resources and data sources.

use serde::{Deserialize, Serialize};
use storagegrid_client::types::{ManagementPolicy, RetentionMode, RetentionSetting};

/// Default retention block of an object-lock configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionModel {
    #[serde(default)]
    pub mode: RetentionMode,
    #[serde(default)]
    pub days: u32,
    #[serde(default)]
    pub years: u32,
}

impl From<RetentionSetting> for RetentionModel {
    fn from(value: RetentionSetting) -> Self {
        Self {
            mode: value.mode,
            days: value.days,
            years: value.years,
        }
    }
}

impl From<RetentionModel> for RetentionSetting {
    fn from(value: RetentionModel) -> Self {
        if value.years > 0 {
            RetentionSetting::years(value.mode, value.years)
        } else {
            RetentionSetting::days(value.mode, value.days)
        }
    }
}

/// Management permissions block of a group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagementModel {
    pub manage_all_containers: bool,
    pub manage_endpoints: bool,
    pub manage_own_container_objects: bool,
    pub manage_own_s3_credentials: bool,
    pub root_access: bool,
    pub view_all_containers: bool,
}

impl From<ManagementPolicy> for ManagementModel {
    fn from(value: ManagementPolicy) -> Self {
        Self {
            manage_all_containers: value.manage_all_containers,
            manage_endpoints: value.manage_endpoints,
            manage_own_container_objects: value.manage_own_container_objects,
            manage_own_s3_credentials: value.manage_own_s3_credentials,
            root_access: value.root_access,
            view_all_containers: value.view_all_containers,
        }
    }
}

impl From<ManagementModel> for ManagementPolicy {
    fn from(value: ManagementModel) -> Self {
        Self {
            manage_all_containers: value.manage_all_containers,
            manage_endpoints: value.manage_endpoints,
            manage_own_container_objects: value.manage_own_container_objects,
            manage_own_s3_credentials: value.manage_own_s3_credentials,
            root_access: value.root_access,
            view_all_containers: value.view_all_containers,
        }
    }
}
