//! Validation gates applied before a definition is persisted.
//!
//! Role validation produces a [`RoleChecklist`] rather than a single pass or
//! fail, so every unmet requirement can be shown at once.

use roster_capability::selection;
use roster_capability::{CapabilityCatalog, CapabilitySelection, ScopeMap};
use roster_core::error::ValidationError;
use roster_core::types::RoleChecklist;

use crate::model::menu::first_duplicate;
use crate::model::{MenuCatalog, MenuEntry, RoleDefinition};

/// Evaluate the role requirements for the given fields.
pub fn evaluate_role(
    catalog: &CapabilityCatalog,
    id: &str,
    label: &str,
    capabilities: &CapabilitySelection,
    scopes: &ScopeMap,
) -> RoleChecklist {
    RoleChecklist {
        id_present: !id.trim().is_empty(),
        label_present: !label.trim().is_empty(),
        capabilities_selected: !capabilities.is_empty(),
        scopes_configured: !scopes.is_empty(),
        capabilities_closed: selection::is_closed(catalog, capabilities),
    }
}

/// Evaluate the role requirements for a complete definition.
pub fn evaluate_definition(catalog: &CapabilityCatalog, role: &RoleDefinition) -> RoleChecklist {
    evaluate_role(
        catalog,
        role.id.as_str(),
        &role.label,
        &role.capabilities,
        &role.scopes,
    )
}

/// Check a role definition, reporting every unmet requirement.
pub fn validate_role(
    catalog: &CapabilityCatalog,
    role: &RoleDefinition,
) -> Result<(), ValidationError> {
    evaluate_definition(catalog, role).ensure_complete()
}

/// Check a dashboard menu before it is saved.
///
/// The menu must be non-empty and free of duplicate keys. When a menu
/// catalog is given, every entry must come from it.
pub fn validate_menu(
    menu: &[MenuEntry],
    catalog: Option<&MenuCatalog>,
) -> Result<(), ValidationError> {
    if menu.is_empty() {
        return Err(ValidationError::EmptyMenu);
    }

    if let Some(key) = first_duplicate(menu) {
        return Err(ValidationError::DuplicateMenuEntry(key.clone()));
    }

    if let Some(catalog) = catalog {
        let unknown = menu
            .iter()
            .flat_map(|entry| entry.keys())
            .find(|key| catalog.get(key.as_str()).is_none());
        if let Some(key) = unknown {
            return Err(ValidationError::UnknownMenuEntry(key.clone()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_capability::scope::set_scope;
    use roster_capability::{Capability, ScopeCatalog};
    use roster_core::types::RoleRequirement;

    fn catalog() -> CapabilityCatalog {
        CapabilityCatalog::new(vec![
            Capability::new("audits.view", "audits", "View audits"),
            Capability::new("audits.sign", "audits", "Sign audits").depends_on(["audits.view"]),
        ])
        .unwrap()
    }

    fn scopes() -> ScopeMap {
        set_scope(&ScopeCatalog::default(), "data", "department", &ScopeMap::new()).unwrap()
    }

    #[test]
    fn test_complete_role_passes() {
        let role = RoleDefinition::new("auditor", "Auditor")
            .with_capabilities(CapabilitySelection::from_keys(["audits.view", "audits.sign"]))
            .with_scopes(scopes());
        assert!(validate_role(&catalog(), &role).is_ok());
    }

    #[test]
    fn test_each_missing_condition_fails() {
        let caps = CapabilitySelection::from_keys(["audits.view"]);
        let catalog = catalog();

        let cases = [
            ("  ", "Auditor", caps.clone(), scopes(), RoleRequirement::IdPresent),
            ("auditor", "", caps.clone(), scopes(), RoleRequirement::LabelPresent),
            (
                "auditor",
                "Auditor",
                CapabilitySelection::new(),
                scopes(),
                RoleRequirement::CapabilitiesSelected,
            ),
            ("auditor", "Auditor", caps.clone(), ScopeMap::new(), RoleRequirement::ScopesConfigured),
            (
                "auditor",
                "Auditor",
                CapabilitySelection::from_keys(["audits.sign"]),
                scopes(),
                RoleRequirement::CapabilitiesClosed,
            ),
        ];

        for (id, label, capabilities, scopes, expected) in cases {
            let checklist = evaluate_role(&catalog, id, label, &capabilities, &scopes);
            assert_eq!(checklist.missing(), vec![expected]);
        }
    }

    #[test]
    fn test_all_missing_conditions_reported() {
        let role = RoleDefinition::new("", "");
        match validate_role(&catalog(), &role) {
            Err(ValidationError::RoleIncomplete { missing }) => {
                assert_eq!(
                    missing,
                    vec![
                        RoleRequirement::IdPresent,
                        RoleRequirement::LabelPresent,
                        RoleRequirement::CapabilitiesSelected,
                        RoleRequirement::ScopesConfigured,
                    ]
                );
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_menu_validation() {
        assert!(matches!(
            validate_menu(&[], None),
            Err(ValidationError::EmptyMenu)
        ));

        let duplicated = vec![
            MenuEntry::new("home", "Home"),
            MenuEntry::new("admin", "Admin").with_children(vec![MenuEntry::new("home", "Home")]),
        ];
        assert!(matches!(
            validate_menu(&duplicated, None),
            Err(ValidationError::DuplicateMenuEntry(_))
        ));

        let catalog = MenuCatalog::new(vec![MenuEntry::new("home", "Home")]).unwrap();
        assert!(validate_menu(&[MenuEntry::new("home", "Home")], Some(&catalog)).is_ok());
        assert!(matches!(
            validate_menu(&[MenuEntry::new("reports", "Reports")], Some(&catalog)),
            Err(ValidationError::UnknownMenuEntry(k)) if k.as_str() == "reports"
        ));
    }
}
