//! The editable dashboard draft.

use roster_core::error::ValidationError;
use roster_core::id::{MenuKey, RoleId};
use roster_core::Revision;
use roster_definition::model::menu::menu_contains;
use roster_definition::validation::validate_menu;
use roster_definition::{DashboardDefinition, MenuCatalog, MenuEntry};
use serde_json::Value;

/// A dashboard being composed for a persisted role.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardDraft {
    role_id: RoleId,
    menu: Vec<MenuEntry>,
    layout: Value,
    base_version: Option<Revision>,
}

impl DashboardDraft {
    /// An empty dashboard for `role_id`.
    pub fn new(role_id: RoleId) -> Self {
        Self {
            role_id,
            menu: Vec::new(),
            layout: Value::Null,
            base_version: None,
        }
    }

    /// A draft revising a persisted dashboard version.
    pub fn from_definition(dashboard: &DashboardDefinition) -> Self {
        Self {
            role_id: dashboard.role_id.clone(),
            menu: dashboard.menu.clone(),
            layout: dashboard.layout.clone(),
            base_version: Some(dashboard.version),
        }
    }

    pub fn role_id(&self) -> &RoleId {
        &self.role_id
    }

    pub fn menu(&self) -> &[MenuEntry] {
        &self.menu
    }

    pub fn layout(&self) -> &Value {
        &self.layout
    }

    /// The persisted version this draft was edited from, if any.
    pub fn base_version(&self) -> Option<Revision> {
        self.base_version
    }

    /// Append an entry to the menu.
    ///
    /// Returns `false` without changing anything if the entry, or any entry
    /// nested under it, is already in the menu.
    pub fn add_entry(&mut self, entry: MenuEntry) -> bool {
        if entry.keys().iter().any(|key| menu_contains(&self.menu, key.as_str())) {
            return false;
        }
        self.menu.push(entry);
        true
    }

    /// Append the catalog entry with `key`.
    pub fn add_from_catalog(
        &mut self,
        catalog: &MenuCatalog,
        key: &str,
    ) -> Result<bool, ValidationError> {
        let entry = catalog
            .get(key)
            .ok_or_else(|| ValidationError::UnknownMenuEntry(MenuKey::from(key)))?;
        Ok(self.add_entry(entry.clone()))
    }

    /// Remove the entry with `key`, at any depth.
    pub fn remove_entry(&mut self, key: &str) -> Option<MenuEntry> {
        remove_from(&mut self.menu, key)
    }

    /// Move the top-level entry at `from` so it ends up at `to`.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), ValidationError> {
        let len = self.menu.len();
        for index in [from, to] {
            if index >= len {
                return Err(ValidationError::MenuIndexOutOfRange { index, len });
            }
        }

        let entry = self.menu.remove(from);
        self.menu.insert(to, entry);
        Ok(())
    }

    /// Replace the whole menu. Duplicates are caught by [`validate`](Self::validate).
    pub fn replace_menu(&mut self, menu: Vec<MenuEntry>) {
        self.menu = menu;
    }

    /// Replace the page layout payload.
    pub fn set_layout(&mut self, layout: Value) {
        self.layout = layout;
    }

    /// Check the menu before saving.
    pub fn validate(&self, catalog: Option<&MenuCatalog>) -> Result<(), ValidationError> {
        validate_menu(&self.menu, catalog)
    }

    /// The dashboard content to persist.
    pub fn to_definition(&self) -> DashboardDefinition {
        DashboardDefinition::new(self.role_id.clone(), self.menu.clone(), self.layout.clone())
    }

    pub(crate) fn mark_saved(&mut self, version: Revision) {
        self.base_version = Some(version);
    }
}

fn remove_from(entries: &mut Vec<MenuEntry>, key: &str) -> Option<MenuEntry> {
    if let Some(position) = entries.iter().position(|e| e.key.as_str() == key) {
        return Some(entries.remove(position));
    }
    entries
        .iter_mut()
        .find_map(|entry| remove_from(&mut entry.children, key))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(draft: &DashboardDraft) -> Vec<&str> {
        draft.menu().iter().map(|e| e.key.as_str()).collect()
    }

    fn draft_with(entries: &[&str]) -> DashboardDraft {
        let mut draft = DashboardDraft::new(RoleId::new("manager"));
        for key in entries {
            assert!(draft.add_entry(MenuEntry::new(*key, key.to_uppercase())));
        }
        draft
    }

    #[test]
    fn test_add_duplicate_is_noop() {
        let mut draft = draft_with(&["home", "reports"]);
        assert!(!draft.add_entry(MenuEntry::new("home", "Home again")));
        assert_eq!(keys(&draft), vec!["home", "reports"]);
        assert_eq!(draft.menu()[0].label, "HOME");
    }

    #[test]
    fn test_add_entry_with_nested_duplicate_is_noop() {
        let mut draft = draft_with(&["home"]);
        let admin = MenuEntry::new("admin", "Admin").with_children(vec![MenuEntry::new("home", "Home")]);
        assert!(!draft.add_entry(admin));
        assert_eq!(draft.menu().len(), 1);
    }

    #[test]
    fn test_reorder_is_a_splice() {
        let mut draft = draft_with(&["a", "b", "c", "d"]);
        draft.reorder(0, 2).unwrap();
        assert_eq!(keys(&draft), vec!["b", "c", "a", "d"]);

        draft.reorder(3, 0).unwrap();
        assert_eq!(keys(&draft), vec!["d", "b", "c", "a"]);

        draft.reorder(1, 1).unwrap();
        assert_eq!(keys(&draft), vec!["d", "b", "c", "a"]);
    }

    #[test]
    fn test_reorder_out_of_range() {
        let mut draft = draft_with(&["a", "b"]);
        assert!(matches!(
            draft.reorder(0, 2),
            Err(ValidationError::MenuIndexOutOfRange { index: 2, len: 2 })
        ));
        assert!(draft.reorder(5, 0).is_err());
        assert_eq!(keys(&draft), vec!["a", "b"]);
    }

    #[test]
    fn test_remove_nested_entry() {
        let mut draft = DashboardDraft::new(RoleId::new("manager"));
        draft.add_entry(
            MenuEntry::new("admin", "Admin").with_children(vec![
                MenuEntry::new("admin.users", "Users"),
                MenuEntry::new("admin.roles", "Roles"),
            ]),
        );

        let removed = draft.remove_entry("admin.users").unwrap();
        assert_eq!(removed.label, "Users");
        assert_eq!(draft.menu()[0].children.len(), 1);
        assert!(draft.remove_entry("admin.users").is_none());
    }

    #[test]
    fn test_add_from_catalog() {
        let catalog = MenuCatalog::new(vec![MenuEntry::new("home", "Home").with_route("/")]).unwrap();
        let mut draft = DashboardDraft::new(RoleId::new("manager"));

        assert!(draft.add_from_catalog(&catalog, "home").unwrap());
        assert!(!draft.add_from_catalog(&catalog, "home").unwrap());
        assert!(matches!(
            draft.add_from_catalog(&catalog, "reports"),
            Err(ValidationError::UnknownMenuEntry(_))
        ));
        assert!(draft.validate(Some(&catalog)).is_ok());
    }

    #[test]
    fn test_empty_menu_fails_validation() {
        let draft = DashboardDraft::new(RoleId::new("manager"));
        assert!(matches!(draft.validate(None), Err(ValidationError::EmptyMenu)));
    }
}
