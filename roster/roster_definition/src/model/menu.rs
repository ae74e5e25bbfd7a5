//! Dashboard menu entries and the menu catalog.

use std::collections::HashSet;
use std::path::Path;

use roster_core::error::CatalogError;
use roster_core::id::MenuKey;
use serde::{Deserialize, Serialize};

/// A dashboard menu entry, possibly with nested items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuEntry {
    /// Unique key of the entry
    pub key: MenuKey,

    /// Display label
    pub label: String,

    /// Icon name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    /// Route the entry navigates to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,

    /// Nested entries
    #[serde(default, alias = "items", skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuEntry>,
}

impl MenuEntry {
    /// Create a leaf entry.
    pub fn new(key: impl Into<MenuKey>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            icon: None,
            route: None,
            children: Vec::new(),
        }
    }

    /// Set the icon.
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Set the route.
    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.route = Some(route.into());
        self
    }

    /// Set the nested entries.
    pub fn with_children(mut self, children: Vec<MenuEntry>) -> Self {
        self.children = children;
        self
    }

    /// Keys of this entry and all nested entries, depth-first.
    pub fn keys(&self) -> Vec<&MenuKey> {
        let mut keys = vec![&self.key];
        for child in &self.children {
            keys.extend(child.keys());
        }
        keys
    }

    /// Find `key` in this entry or below it.
    pub fn find(&self, key: &str) -> Option<&MenuEntry> {
        if self.key.as_str() == key {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(key))
    }
}

/// Whether `key` appears anywhere in `entries`, nested entries included.
pub fn menu_contains(entries: &[MenuEntry], key: &str) -> bool {
    entries.iter().any(|entry| entry.find(key).is_some())
}

/// First key that appears twice anywhere in `entries`.
pub fn first_duplicate(entries: &[MenuEntry]) -> Option<&MenuKey> {
    let mut seen = HashSet::new();
    for key in entries.iter().flat_map(|entry| entry.keys()) {
        if !seen.insert(key.as_str()) {
            return Some(key);
        }
    }
    None
}

/// The menu entries available to dashboards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MenuCatalog {
    entries: Vec<MenuEntry>,
}

impl MenuCatalog {
    /// Build a catalog, rejecting duplicate keys at any depth.
    pub fn new(entries: Vec<MenuEntry>) -> Result<Self, CatalogError> {
        if let Some(key) = first_duplicate(&entries) {
            return Err(CatalogError::DuplicateMenuEntry(key.clone()));
        }
        Ok(Self { entries })
    }

    /// Parse a JSON array of entries.
    pub fn from_json(content: &str) -> Result<Self, CatalogError> {
        let entries: Vec<MenuEntry> =
            serde_json::from_str(content).map_err(|e| CatalogError::Load(e.to_string()))?;
        Self::new(entries)
    }

    /// Load a JSON menu catalog file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::Load(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }

    /// Find an entry by key at any depth.
    pub fn get(&self, key: &str) -> Option<&MenuEntry> {
        self.entries.iter().find_map(|entry| entry.find(key))
    }

    /// Top-level entries in declaration order.
    pub fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }

    /// Number of top-level entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
