//! Role assignment lookup.
//!
//! User-to-role assignments live outside Roster. The controller only needs
//! to know how many users hold a role before deleting it.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use roster_core::error::{Result, StorageError};
use roster_core::id::RoleId;

/// Source of role assignment counts.
#[async_trait]
pub trait AssignmentLookup: Send + Sync {
    /// Number of users currently assigned `role_id`.
    async fn assigned_users(&self, role_id: &RoleId) -> Result<u64>;
}

/// Lookup for deployments that do not track assignments.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAssignments;

#[async_trait]
impl AssignmentLookup for NoAssignments {
    async fn assigned_users(&self, _role_id: &RoleId) -> Result<u64> {
        Ok(0)
    }
}

/// Assignment counts held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAssignments {
    counts: Arc<DashMap<RoleId, u64>>,
}

impl InMemoryAssignments {
    /// Create an empty lookup.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load counts from a JSON object mapping role ID to user count.
    pub fn from_json(content: &str) -> Result<Self> {
        let counts: std::collections::HashMap<String, u64> = serde_json::from_str(content)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let lookup = Self::new();
        for (role, count) in counts {
            lookup.set(RoleId::new(role), count);
        }
        Ok(lookup)
    }

    /// Load counts from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(StorageError::from)?;
        Self::from_json(&content)
    }

    /// Set the count for a role.
    pub fn set(&self, role_id: RoleId, count: u64) {
        if count == 0 {
            self.counts.remove(&role_id);
        } else {
            self.counts.insert(role_id, count);
        }
    }

    /// Record one more user holding `role_id`.
    pub fn assign(&self, role_id: &RoleId) {
        *self.counts.entry(role_id.clone()).or_insert(0) += 1;
    }

    /// Record one fewer user holding `role_id`.
    pub fn unassign(&self, role_id: &RoleId) {
        let remaining = match self.counts.get_mut(role_id) {
            Some(mut count) => {
                *count = count.saturating_sub(1);
                *count
            }
            None => return,
        };
        if remaining == 0 {
            self.counts.remove(role_id);
        }
    }
}

#[async_trait]
impl AssignmentLookup for InMemoryAssignments {
    async fn assigned_users(&self, role_id: &RoleId) -> Result<u64> {
        Ok(self.counts.get(role_id).map(|c| *c).unwrap_or(0))
    }
}
