//! The editable role draft.

use roster_capability::scope::{self, ScopeCatalog};
use roster_capability::selection::{self, CapabilitySelection, ToggleDelta};
use roster_capability::{CapabilityCatalog, ScopeMap};
use roster_core::error::{ScopeError, SelectionError, ValidationError};
use roster_core::id::RoleId;
use roster_core::types::RoleChecklist;
use roster_core::Revision;
use roster_definition::validation::evaluate_role;
use roster_definition::RoleDefinition;

/// A role being composed or revised.
///
/// Capability and scope edits go through the selection engine and scope
/// composer, so a draft's selection stays dependency-closed and its scopes
/// stay within the catalog. Each edit either applies fully or leaves the
/// draft unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoleDraft {
    id: String,
    label: String,
    description: String,
    capabilities: CapabilitySelection,
    scopes: ScopeMap,
    base_version: Option<Revision>,
}

impl RoleDraft {
    /// An empty draft for a new role.
    pub fn new() -> Self {
        Self::default()
    }

    /// A draft revising a persisted role version.
    pub fn from_definition(role: &RoleDefinition) -> Self {
        Self {
            id: role.id.to_string(),
            label: role.label.clone(),
            description: role.description.clone(),
            capabilities: role.capabilities.clone(),
            scopes: role.scopes.clone(),
            base_version: Some(role.version),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn capabilities(&self) -> &CapabilitySelection {
        &self.capabilities
    }

    pub fn scopes(&self) -> &ScopeMap {
        &self.scopes
    }

    /// The persisted version this draft was edited from, if any.
    pub fn base_version(&self) -> Option<Revision> {
        self.base_version
    }

    /// Set the role ID. Refused once the role has been saved.
    pub fn set_id(&mut self, id: impl Into<String>) -> Result<(), ValidationError> {
        if self.base_version.is_some() {
            return Err(ValidationError::IdLocked(RoleId::new(self.id.clone())));
        }
        self.id = id.into();
        Ok(())
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Toggle a capability, cascading as needed.
    pub fn toggle_capability(
        &mut self,
        catalog: &CapabilityCatalog,
        key: &str,
    ) -> Result<ToggleDelta, SelectionError> {
        let delta = selection::toggle_with_delta(catalog, key, &self.capabilities)?;
        self.capabilities = delta.selection.clone();
        Ok(delta)
    }

    /// Select several capabilities with their prerequisites.
    pub fn select_capabilities<I, S>(
        &mut self,
        catalog: &CapabilityCatalog,
        keys: I,
    ) -> Result<(), SelectionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.capabilities = selection::select_all(catalog, keys, &self.capabilities)?;
        Ok(())
    }

    /// Assign a scope value.
    pub fn set_scope(
        &mut self,
        catalog: &ScopeCatalog,
        category: &str,
        value: &str,
    ) -> Result<(), ScopeError> {
        self.scopes = scope::set_scope(catalog, category, value, &self.scopes)?;
        Ok(())
    }

    /// Remove a scope assignment.
    pub fn clear_scope(&mut self, catalog: &ScopeCatalog, category: &str) -> Result<(), ScopeError> {
        self.scopes = scope::clear_scope(catalog, category, &self.scopes)?;
        Ok(())
    }

    /// Evaluate the role requirements.
    pub fn checklist(&self, catalog: &CapabilityCatalog) -> RoleChecklist {
        evaluate_role(
            catalog,
            &self.id,
            &self.label,
            &self.capabilities,
            &self.scopes,
        )
    }

    /// The role content to persist.
    pub fn to_definition(&self) -> RoleDefinition {
        RoleDefinition::new(self.id.trim(), self.label.trim())
            .with_description(self.description.clone())
            .with_capabilities(self.capabilities.clone())
            .with_scopes(self.scopes.clone())
    }

    pub(crate) fn mark_saved(&mut self, version: Revision) {
        self.base_version = Some(version);
    }
}
