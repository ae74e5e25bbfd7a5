//! A single grantable capability.

use roster_core::id::CapabilityKey;
use serde::{Deserialize, Serialize};

/// A capability as described by the external catalog.
///
/// Capabilities are immutable for the lifetime of a catalog. `depends_on`
/// is an ordered set: declaration order is kept and duplicates are dropped
/// when the catalog is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capability {
    /// Unique key of this capability
    pub key: CapabilityKey,

    /// Grouping label, e.g. "budget" or "approvals"
    pub area: String,

    /// Display name
    pub label: String,

    /// Capabilities that must also be granted whenever this one is
    #[serde(default, alias = "dependsOn")]
    pub depends_on: Vec<CapabilityKey>,
}

impl Capability {
    /// Create a capability with no dependencies.
    pub fn new(
        key: impl Into<CapabilityKey>,
        area: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            area: area.into(),
            label: label.into(),
            depends_on: Vec::new(),
        }
    }

    /// Add dependencies to this capability.
    pub fn depends_on<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<CapabilityKey>,
    {
        for key in keys {
            let key = key.into();
            if !self.depends_on.contains(&key) {
                self.depends_on.push(key);
            }
        }
        self
    }

    /// Whether this capability lists `key` as a direct dependency.
    pub fn requires(&self, key: &str) -> bool {
        self.depends_on.iter().any(|d| d.as_str() == key)
    }

    /// Drop repeated dependency keys, keeping first occurrences.
    pub(crate) fn dedup_dependencies(&mut self) {
        let mut seen = std::collections::HashSet::new();
        self.depends_on.retain(|k| seen.insert(k.clone()));
    }
}
