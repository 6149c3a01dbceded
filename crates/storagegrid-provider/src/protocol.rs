//! Request and response messages exchanged with the host.
//!
//! Resource and data source attributes travel as plain JSON objects keyed by
//! attribute name. Each request names the operation and, where relevant, the
//! resource or data source type it targets.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ProviderConfig;
use crate::diagnostics::{Diagnostic, Diagnostics};

/// A single host request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum Request {
    /// Lists the supported resource and data source types.
    GetSchema,

    /// Builds the management API client.
    Configure {
        #[serde(default)]
        config: ProviderConfig,
    },

    /// Adjusts a proposed state before it is shown to the user.
    PlanResource {
        type_name: String,
        proposed: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        prior_state: Option<Value>,
    },

    CreateResource {
        type_name: String,
        planned: Value,
    },

    ReadResource {
        type_name: String,
        state: Value,
    },

    UpdateResource {
        type_name: String,
        planned: Value,
        prior_state: Value,
    },

    DeleteResource {
        type_name: String,
        state: Value,
    },

    /// Adopts an existing object by its import identifier.
    ImportResource {
        type_name: String,
        id: String,
    },

    ReadDataSource {
        type_name: String,
        config: Value,
    },
}

impl Request {
    /// Returns the operation name, for logging.
    pub fn operation(&self) -> &'static str {
        match self {
            Self::GetSchema => "get_schema",
            Self::Configure { .. } => "configure",
            Self::PlanResource { .. } => "plan_resource",
            Self::CreateResource { .. } => "create_resource",
            Self::ReadResource { .. } => "read_resource",
            Self::UpdateResource { .. } => "update_resource",
            Self::DeleteResource { .. } => "delete_resource",
            Self::ImportResource { .. } => "import_resource",
            Self::ReadDataSource { .. } => "read_data_source",
        }
    }

    /// Returns the targeted type name, if the operation has one.
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Self::GetSchema | Self::Configure { .. } => None,
            Self::PlanResource { type_name, .. }
            | Self::CreateResource { type_name, .. }
            | Self::ReadResource { type_name, .. }
            | Self::UpdateResource { type_name, .. }
            | Self::DeleteResource { type_name, .. }
            | Self::ImportResource { type_name, .. }
            | Self::ReadDataSource { type_name, .. } => Some(type_name),
        }
    }
}

/// Supported type names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub resources: Vec<ResourceSchema>,
    pub data_sources: Vec<String>,
}

/// A resource type and the attributes whose change forces replacement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSchema {
    pub type_name: String,
    #[serde(default)]
    pub requires_replace: Vec<String>,
}

/// Reply to a [`Request`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// New state, or the data source result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<Value>,

    /// Set when the object no longer exists and must be dropped from state.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub removed: bool,

    /// Changed attributes that cannot be updated in place.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires_replace: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,

    #[serde(default, skip_serializing_if = "Diagnostics::is_empty")]
    pub diagnostics: Diagnostics,
}

impl Response {
    /// A response carrying only diagnostics.
    pub fn diagnostics(diagnostics: impl Into<Diagnostics>) -> Self {
        Self {
            diagnostics: diagnostics.into(),
            ..Default::default()
        }
    }

    /// A response carrying a state and optional warnings.
    pub fn state(state: Value, diagnostics: Diagnostics) -> Self {
        Self {
            state: Some(state),
            diagnostics,
            ..Default::default()
        }
    }

    /// A response telling the host to forget the object.
    pub fn removed(diagnostics: Diagnostics) -> Self {
        Self {
            removed: true,
            diagnostics,
            ..Default::default()
        }
    }

    /// A response for a request that could not be decoded.
    pub fn malformed(error: &serde_json::Error) -> Self {
        Self::diagnostics(Diagnostic::error(
            "Malformed Provider Request",
            error.to_string(),
        ))
    }
}
