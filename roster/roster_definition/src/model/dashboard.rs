//! Dashboard definition model.

use chrono::{DateTime, Utc};
use roster_core::id::RoleId;
use roster_core::Revision;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::menu::MenuEntry;

/// One persisted version of the dashboard bound to a role.
///
/// A role has at most one dashboard; its versions are numbered
/// independently of the role's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardDefinition {
    /// The role this dashboard belongs to
    pub role_id: RoleId,

    /// Ordered menu tree
    pub menu: Vec<MenuEntry>,

    /// Page layout payload, opaque to Roster
    #[serde(default)]
    pub layout: Value,

    /// Version of this record
    pub version: Revision,

    /// Whether this is the active dashboard version
    #[serde(default)]
    pub active: bool,

    /// When the first version was written
    pub created_at: DateTime<Utc>,

    /// When this version was written
    pub updated_at: DateTime<Utc>,
}

impl DashboardDefinition {
    /// Create an unsaved, inactive dashboard at the first version.
    pub fn new(role_id: impl Into<RoleId>, menu: Vec<MenuEntry>, layout: Value) -> Self {
        let now = Utc::now();

        Self {
            role_id: role_id.into(),
            menu,
            layout,
            version: Revision::FIRST,
            active: false,
            created_at: now,
            updated_at: now,
        }
    }
}
