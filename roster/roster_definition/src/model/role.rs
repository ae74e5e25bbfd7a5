//! Role definition model.

use chrono::{DateTime, Utc};
use roster_capability::{CapabilitySelection, ScopeMap};
use roster_core::id::RoleId;
use roster_core::Revision;
use serde::{Deserialize, Serialize};

/// One persisted version of a role.
///
/// A role definition is never edited in place: saving writes a new version
/// and every earlier version is retained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleDefinition {
    /// Externally chosen identifier, fixed once the role is persisted.
    pub id: RoleId,

    /// Display name.
    pub label: String,

    /// Free-form description.
    #[serde(default)]
    pub description: String,

    /// Dependency-closed capability selection.
    pub capabilities: CapabilitySelection,

    /// Scope assignments.
    pub scopes: ScopeMap,

    /// Version of this record.
    pub version: Revision,

    /// Whether this is the role's active version.
    #[serde(default)]
    pub active: bool,

    /// Number of users holding the role when this version was written.
    #[serde(default)]
    pub assigned_users: u64,

    /// When the role was first created.
    pub created_at: DateTime<Utc>,

    /// When this version was written.
    pub updated_at: DateTime<Utc>,
}

impl RoleDefinition {
    /// Create an unsaved, inactive role at the first version.
    pub fn new(id: impl Into<RoleId>, label: impl Into<String>) -> Self {
        let now = Utc::now();

        Self {
            id: id.into(),
            label: label.into(),
            description: String::new(),
            capabilities: CapabilitySelection::new(),
            scopes: ScopeMap::new(),
            version: Revision::FIRST,
            active: false,
            assigned_users: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the capability selection.
    pub fn with_capabilities(mut self, capabilities: CapabilitySelection) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Set the scope map.
    pub fn with_scopes(mut self, scopes: ScopeMap) -> Self {
        self.scopes = scopes;
        self
    }

    /// A fresh role carrying this role's capabilities and scopes.
    ///
    /// The copy starts at the first version, inactive and with no assigned
    /// users, so it shares nothing mutable with the source.
    pub fn duplicate(&self, id: RoleId, label: String) -> Self {
        Self::new(id, label)
            .with_description(self.description.clone())
            .with_capabilities(self.capabilities.clone())
            .with_scopes(self.scopes.clone())
    }
}

/// The label given to a clone when the caller does not choose one.
pub fn copy_label(label: &str) -> String {
    format!("{} (Copy)", label)
}
