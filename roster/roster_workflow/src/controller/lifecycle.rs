//! The definition lifecycle controller.
//!
//! The controller is the only writer of role and dashboard definitions. It
//! applies the validation gates, turns store write outcomes into lifecycle
//! errors and enforces the delete guard. Catalogs are passed in at
//! construction and shared read-only.

use std::sync::Arc;

use roster_capability::scope::{self, ScopeCatalog};
use roster_capability::CapabilityCatalog;
use roster_core::error::{LifecycleError, Result};
use roster_core::id::RoleId;
use roster_core::utils::LogLevel;
use roster_core::{log_event, Revision};
use roster_definition::model::role::copy_label;
use roster_definition::validation::{validate_menu, validate_role};
use roster_definition::{
    DashboardDefinition, DefinitionStore, MenuCatalog, RoleDefinition, WriteOutcome,
};

use super::assignments::{AssignmentLookup, NoAssignments};

/// Coordinates validation, persistence and lifecycle rules for definitions.
pub struct WorkflowController {
    store: Arc<dyn DefinitionStore>,
    capabilities: Arc<CapabilityCatalog>,
    scopes: Arc<ScopeCatalog>,
    menus: Option<Arc<MenuCatalog>>,
    assignments: Arc<dyn AssignmentLookup>,
}

impl WorkflowController {
    /// Create a controller with the default scope catalog, no menu catalog
    /// and no assignment tracking.
    pub fn new(store: Arc<dyn DefinitionStore>, capabilities: Arc<CapabilityCatalog>) -> Self {
        Self {
            store,
            capabilities,
            scopes: Arc::new(ScopeCatalog::default()),
            menus: None,
            assignments: Arc::new(NoAssignments),
        }
    }

    /// Use a custom scope catalog.
    pub fn with_scopes(mut self, scopes: Arc<ScopeCatalog>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Restrict dashboard menus to entries from `menus`.
    pub fn with_menus(mut self, menus: Arc<MenuCatalog>) -> Self {
        self.menus = Some(menus);
        self
    }

    /// Use `assignments` for the delete guard.
    pub fn with_assignments(mut self, assignments: Arc<dyn AssignmentLookup>) -> Self {
        self.assignments = assignments;
        self
    }

    pub fn capabilities(&self) -> &Arc<CapabilityCatalog> {
        &self.capabilities
    }

    pub fn scopes(&self) -> &Arc<ScopeCatalog> {
        &self.scopes
    }

    pub fn menus(&self) -> Option<&Arc<MenuCatalog>> {
        self.menus.as_ref()
    }

    pub fn store(&self) -> &Arc<dyn DefinitionStore> {
        &self.store
    }

    /// Create or update a role.
    ///
    /// # Arguments
    ///
    /// * `role` - The role content.
    /// * `expected` - The version the caller edited from, `None` to create.
    ///
    /// # Returns
    ///
    /// * `Ok(Revision)` - The version written.
    /// * `Err` - A validation error, `Conflict` if another writer saved
    ///   first, `RoleNotFound` when updating a role that does not exist,
    ///   or a store failure.
    pub async fn save_role(
        &self,
        mut role: RoleDefinition,
        expected: Option<Revision>,
    ) -> Result<Revision> {
        validate_role(&self.capabilities, &role)?;
        scope::validate(&self.scopes, &role.scopes)?;

        role.assigned_users = self.assignments.assigned_users(&role.id).await?;
        let id = role.id.clone();

        match self.store.save_role(role, expected).await? {
            WriteOutcome::Written(version) => {
                log_event!(LogLevel::Info, "Role saved", role => id, version => version);
                Ok(version)
            }
            WriteOutcome::Conflict { current } => {
                log_event!(LogLevel::Warning, "Role save rejected", role => id,
                    expected => format!("{:?}", expected),
                    current => format!("{:?}", current),
                );
                Err(write_conflict(id, expected, current).into())
            }
        }
    }

    /// Make `version` the active version of a role.
    ///
    /// Returns the previously active version.
    pub async fn publish_role(&self, id: &RoleId, version: Revision) -> Result<Option<Revision>> {
        self.store.publish_role(id, version).await
    }

    /// Activate a role's latest version, or deactivate the role.
    ///
    /// Deactivating leaves no version of the role active, including an
    /// older published one. The latest version is returned either way.
    pub async fn set_active(&self, id: &RoleId, active: bool) -> Result<RoleDefinition> {
        self.store.set_role_active(id, active).await
    }

    /// Clone a role under a new ID.
    ///
    /// Without `new_id` the first free ID of `{id}-copy`, `{id}-copy-2`, ...
    /// is used. Without `new_label` the source label gets a ` (Copy)` suffix.
    pub async fn clone_role(
        &self,
        id: &RoleId,
        new_id: Option<RoleId>,
        new_label: Option<String>,
    ) -> Result<RoleDefinition> {
        let source = self.get_role(id).await?;

        let target = match new_id {
            Some(new_id) => {
                if self.store.role_exists(&new_id).await? {
                    return Err(LifecycleError::AlreadyExists(new_id).into());
                }
                new_id
            }
            None => self.free_copy_id(id).await?,
        };
        let label = new_label.unwrap_or_else(|| copy_label(&source.label));

        let copy = source.duplicate(target.clone(), label);
        match self.store.save_role(copy, None).await? {
            WriteOutcome::Written(_) => {}
            WriteOutcome::Conflict { .. } => {
                return Err(LifecycleError::AlreadyExists(target).into());
            }
        }

        log_event!(LogLevel::Info, "Role cloned", source => id, role => target);
        self.get_role(&target).await
    }

    async fn free_copy_id(&self, id: &RoleId) -> Result<RoleId> {
        let base = format!("{}-copy", id);
        let mut candidate = RoleId::new(base.clone());
        let mut suffix = 2u32;
        while self.store.role_exists(&candidate).await? {
            candidate = RoleId::new(format!("{}-{}", base, suffix));
            suffix += 1;
        }
        Ok(candidate)
    }

    /// Delete a role with all its versions and its dashboard.
    ///
    /// Refused while any user is assigned the role.
    pub async fn delete_role(&self, id: &RoleId) -> Result<()> {
        if !self.store.role_exists(id).await? {
            return Err(LifecycleError::RoleNotFound(id.clone()).into());
        }

        let assigned = self.assignments.assigned_users(id).await?;
        if assigned > 0 {
            log_event!(LogLevel::Warning, "Role delete rejected", role => id, assigned => assigned);
            return Err(LifecycleError::RoleInUse {
                role_id: id.clone(),
                assigned,
            }
            .into());
        }

        self.store.delete_role(id).await
    }

    /// Save a dashboard version for an existing role.
    pub async fn save_dashboard(
        &self,
        dashboard: DashboardDefinition,
        expected: Option<Revision>,
    ) -> Result<Revision> {
        validate_menu(&dashboard.menu, self.menus.as_deref())?;
        let id = dashboard.role_id.clone();

        match self.store.save_dashboard(dashboard, expected).await? {
            WriteOutcome::Written(version) => {
                log_event!(LogLevel::Info, "Dashboard saved", role => id, version => version);
                Ok(version)
            }
            WriteOutcome::Conflict { current: Some(current) } => Err(LifecycleError::Conflict {
                role_id: id,
                expected,
                current,
            }
            .into()),
            WriteOutcome::Conflict { current: None } => {
                Err(LifecycleError::DashboardNotFound(id).into())
            }
        }
    }

    /// Make `version` the active dashboard version of a role.
    pub async fn publish_dashboard(
        &self,
        role_id: &RoleId,
        version: Revision,
    ) -> Result<Option<Revision>> {
        self.store.publish_dashboard(role_id, version).await
    }

    /// Activate a role version and a dashboard version together.
    pub async fn publish_definition(
        &self,
        role_id: &RoleId,
        role_version: Revision,
        dashboard_version: Revision,
    ) -> Result<()> {
        self.store
            .publish_definition(role_id, role_version, dashboard_version)
            .await
    }

    /// The latest version of a role.
    pub async fn get_role(&self, id: &RoleId) -> Result<RoleDefinition> {
        self.store
            .get_role(id)
            .await?
            .ok_or_else(|| LifecycleError::RoleNotFound(id.clone()).into())
    }

    /// A specific version of a role.
    pub async fn get_role_version(&self, id: &RoleId, version: Revision) -> Result<RoleDefinition> {
        match self.store.get_role_version(id, version).await? {
            Some(role) => Ok(role),
            None if self.store.role_exists(id).await? => Err(LifecycleError::VersionNotFound {
                role_id: id.clone(),
                version,
            }
            .into()),
            None => Err(LifecycleError::RoleNotFound(id.clone()).into()),
        }
    }

    /// The active version of a role, if one is active.
    pub async fn active_role(&self, id: &RoleId) -> Result<Option<RoleDefinition>> {
        self.store.active_role(id).await
    }

    /// The latest version of every role, sorted by ID.
    pub async fn list_roles(&self) -> Result<Vec<RoleDefinition>> {
        self.store.list_roles().await
    }

    /// Every version of a role, oldest first.
    pub async fn role_versions(&self, id: &RoleId) -> Result<Vec<RoleDefinition>> {
        let versions = self.store.role_versions(id).await?;
        if versions.is_empty() {
            return Err(LifecycleError::RoleNotFound(id.clone()).into());
        }
        Ok(versions)
    }

    /// The latest dashboard version of a role.
    pub async fn get_dashboard(&self, role_id: &RoleId) -> Result<DashboardDefinition> {
        self.store
            .get_dashboard(role_id)
            .await?
            .ok_or_else(|| LifecycleError::DashboardNotFound(role_id.clone()).into())
    }

    /// The latest dashboard version of a role, if one was saved.
    pub async fn find_dashboard(&self, role_id: &RoleId) -> Result<Option<DashboardDefinition>> {
        self.store.get_dashboard(role_id).await
    }

    /// A specific dashboard version.
    pub async fn get_dashboard_version(
        &self,
        role_id: &RoleId,
        version: Revision,
    ) -> Result<DashboardDefinition> {
        self.store
            .get_dashboard_version(role_id, version)
            .await?
            .ok_or_else(|| {
                LifecycleError::DashboardVersionNotFound {
                    role_id: role_id.clone(),
                    version,
                }
                .into()
            })
    }

    /// The active dashboard version of a role, if one is active.
    pub async fn active_dashboard(&self, role_id: &RoleId) -> Result<Option<DashboardDefinition>> {
        self.store.active_dashboard(role_id).await
    }
}

/// Map a refused role write to the matching lifecycle error.
fn write_conflict(
    role_id: RoleId,
    expected: Option<Revision>,
    current: Option<Revision>,
) -> LifecycleError {
    match current {
        Some(current) => LifecycleError::Conflict {
            role_id,
            expected,
            current,
        },
        None => LifecycleError::RoleNotFound(role_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::assignments::InMemoryAssignments;
    use roster_capability::selection::CapabilitySelection;
    use roster_capability::{Capability, ScopeMap};
    use roster_core::error::{Error, ErrorKind, ValidationError};
    use roster_definition::{InMemoryDefinitionStore, MenuEntry};

    fn rev(n: u32) -> Revision {
        Revision::new(n).unwrap()
    }

    fn catalog() -> Arc<CapabilityCatalog> {
        Arc::new(
            CapabilityCatalog::new(vec![
                Capability::new("audits.view", "audits", "View audits"),
                Capability::new("audits.sign", "audits", "Sign audits")
                    .depends_on(["audits.view"]),
            ])
            .unwrap(),
        )
    }

    fn controller() -> (WorkflowController, InMemoryAssignments) {
        let assignments = InMemoryAssignments::new();
        let controller =
            WorkflowController::new(Arc::new(InMemoryDefinitionStore::new()), catalog())
                .with_assignments(Arc::new(assignments.clone()));
        (controller, assignments)
    }

    fn role(id: &str, label: &str) -> RoleDefinition {
        let scopes =
            scope::set_scope(&ScopeCatalog::default(), "project", "assigned", &ScopeMap::new())
                .unwrap();
        RoleDefinition::new(id, label)
            .with_capabilities(CapabilitySelection::from_keys(["audits.view", "audits.sign"]))
            .with_scopes(scopes)
    }

    fn dashboard(id: &str) -> DashboardDefinition {
        DashboardDefinition::new(
            id,
            vec![MenuEntry::new("audits", "Audits")],
            serde_json::json!({"widgets": []}),
        )
    }

    #[tokio::test]
    async fn test_upsert_versions() {
        let (controller, _) = controller();
        let id = RoleId::new("auditor");

        assert_eq!(controller.save_role(role("auditor", "Auditor"), None).await.unwrap(), rev(1));
        assert_eq!(
            controller
                .save_role(role("auditor", "Lead auditor"), Some(rev(1)))
                .await
                .unwrap(),
            rev(2)
        );

        let versions = controller.role_versions(&id).await.unwrap();
        assert_eq!(versions.len(), 2);
        assert_eq!(versions[0].label, "Auditor");
        assert_eq!(controller.get_role(&id).await.unwrap().label, "Lead auditor");
    }

    #[tokio::test]
    async fn test_save_rejects_invalid_role_without_writing() {
        let (controller, _) = controller();
        let dangling = role("auditor", "Auditor")
            .with_capabilities(CapabilitySelection::from_keys(["audits.sign"]));

        let err = controller.save_role(dangling, None).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::RoleIncomplete { .. })
        ));
        assert!(controller.list_roles().await.unwrap().is_empty());

        let bad_scope: ScopeMap = [("project", "galaxy")].into_iter().collect();
        let err = controller
            .save_role(role("auditor", "Auditor").with_scopes(bad_scope), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_conflicts() {
        let (controller, _) = controller();
        controller.save_role(role("auditor", "A"), None).await.unwrap();
        controller
            .save_role(role("auditor", "B"), Some(rev(1)))
            .await
            .unwrap();

        let err = controller
            .save_role(role("auditor", "stale"), Some(rev(1)))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(matches!(
            err,
            Error::Lifecycle(LifecycleError::Conflict { current, .. }) if current == rev(2)
        ));

        let err = controller
            .save_role(role("auditor", "again"), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let err = controller
            .save_role(role("ghost", "Ghost"), Some(rev(1)))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Lifecycle(LifecycleError::RoleNotFound(_))));
    }

    #[tokio::test]
    async fn test_publish_is_exclusive() {
        let (controller, _) = controller();
        let id = RoleId::new("auditor");
        controller.save_role(role("auditor", "A"), None).await.unwrap();
        controller
            .save_role(role("auditor", "B"), Some(rev(1)))
            .await
            .unwrap();

        controller.publish_role(&id, rev(1)).await.unwrap();
        controller.publish_role(&id, rev(2)).await.unwrap();

        let active: Vec<_> = controller
            .role_versions(&id)
            .await
            .unwrap()
            .into_iter()
            .filter(|r| r.active)
            .map(|r| r.version)
            .collect();
        assert_eq!(active, vec![rev(2)]);

        let err = controller.publish_role(&id, rev(3)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invariant);
    }

    #[tokio::test]
    async fn test_toggle_active_flag() {
        let (controller, _) = controller();
        let id = RoleId::new("auditor");
        controller.save_role(role("auditor", "A"), None).await.unwrap();

        assert!(controller.set_active(&id, true).await.unwrap().active);
        assert_eq!(
            controller.active_role(&id).await.unwrap().unwrap().version,
            rev(1)
        );
        assert!(!controller.set_active(&id, false).await.unwrap().active);
        assert!(controller.active_role(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_deactivate_after_newer_draft() {
        let (controller, _) = controller();
        let id = RoleId::new("auditor");
        controller.save_role(role("auditor", "A"), None).await.unwrap();
        controller.publish_role(&id, rev(1)).await.unwrap();
        controller
            .save_role(role("auditor", "B"), Some(rev(1)))
            .await
            .unwrap();

        let latest = controller.set_active(&id, false).await.unwrap();
        assert_eq!(latest.version, rev(2));
        assert!(!latest.active);
        assert!(controller.active_role(&id).await.unwrap().is_none());
        assert!(controller
            .role_versions(&id)
            .await
            .unwrap()
            .iter()
            .all(|r| !r.active));
    }

    #[tokio::test]
    async fn test_clone_ids_and_isolation() {
        let (controller, assignments) = controller();
        let id = RoleId::new("auditor");
        controller.save_role(role("auditor", "Auditor"), None).await.unwrap();
        controller.publish_role(&id, rev(1)).await.unwrap();
        assignments.set(id.clone(), 4);

        let first = controller.clone_role(&id, None, None).await.unwrap();
        assert_eq!(first.id.as_str(), "auditor-copy");
        assert_eq!(first.label, "Auditor (Copy)");
        assert_eq!(first.version, rev(1));
        assert!(!first.active);
        assert_eq!(first.assigned_users, 0);

        let second = controller.clone_role(&id, None, None).await.unwrap();
        assert_eq!(second.id.as_str(), "auditor-copy-2");

        let named = controller
            .clone_role(&id, Some(RoleId::new("reviewer")), Some("Reviewer".to_string()))
            .await
            .unwrap();
        assert_eq!(named.label, "Reviewer");

        let err = controller
            .clone_role(&id, Some(RoleId::new("reviewer")), None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Lifecycle(LifecycleError::AlreadyExists(_))));

        // Revising the clone leaves the source untouched.
        let revised = first
            .clone()
            .with_capabilities(CapabilitySelection::from_keys(["audits.view"]));
        controller
            .save_role(revised, Some(first.version))
            .await
            .unwrap();
        let source = controller.get_role(&id).await.unwrap();
        assert_eq!(source.capabilities.len(), 2);
        assert_eq!(source.version, rev(1));
    }

    #[tokio::test]
    async fn test_delete_guard() {
        let (controller, assignments) = controller();
        let id = RoleId::new("auditor");
        controller.save_role(role("auditor", "Auditor"), None).await.unwrap();
        controller.save_dashboard(dashboard("auditor"), None).await.unwrap();

        assignments.set(id.clone(), 1);
        let err = controller.delete_role(&id).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Lifecycle(LifecycleError::RoleInUse { assigned: 1, .. })
        ));
        assert!(controller.get_role(&id).await.is_ok());

        assignments.set(id.clone(), 0);
        controller.delete_role(&id).await.unwrap();
        assert!(controller.get_role(&id).await.is_err());
        assert!(controller.get_dashboard(&id).await.is_err());
    }

    #[tokio::test]
    async fn test_dashboard_lifecycle() {
        let (controller, _) = controller();
        let id = RoleId::new("auditor");

        let err = controller
            .save_dashboard(dashboard("auditor"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Lifecycle(LifecycleError::RoleNotFound(_))));

        controller.save_role(role("auditor", "Auditor"), None).await.unwrap();
        let empty = DashboardDefinition::new("auditor", Vec::new(), serde_json::Value::Null);
        assert!(controller.save_dashboard(empty, None).await.is_err());

        let v1 = controller.save_dashboard(dashboard("auditor"), None).await.unwrap();
        let v2 = controller
            .save_dashboard(dashboard("auditor"), Some(v1))
            .await
            .unwrap();
        assert_eq!(v2, rev(2));

        let err = controller
            .save_dashboard(dashboard("auditor"), Some(v1))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        controller.publish_definition(&id, rev(1), v2).await.unwrap();
        assert_eq!(
            controller.active_dashboard(&id).await.unwrap().unwrap().version,
            v2
        );
        assert!(controller.active_role(&id).await.unwrap().is_some());
        assert!(controller.get_dashboard_version(&id, rev(9)).await.is_err());
    }

    #[tokio::test]
    async fn test_menu_catalog_restricts_entries() {
        let menus = MenuCatalog::new(vec![MenuEntry::new("home", "Home")]).unwrap();
        let controller = WorkflowController::new(Arc::new(InMemoryDefinitionStore::new()), catalog())
            .with_menus(Arc::new(menus));
        controller.save_role(role("auditor", "Auditor"), None).await.unwrap();

        let err = controller
            .save_dashboard(dashboard("auditor"), None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::UnknownMenuEntry(_))
        ));
    }

    #[tokio::test]
    async fn test_lookup_errors() {
        let (controller, _) = controller();
        let id = RoleId::new("auditor");
        assert!(matches!(
            controller.get_role_version(&id, rev(1)).await,
            Err(Error::Lifecycle(LifecycleError::RoleNotFound(_)))
        ));

        controller.save_role(role("auditor", "Auditor"), None).await.unwrap();
        assert!(matches!(
            controller.get_role_version(&id, rev(2)).await,
            Err(Error::Lifecycle(LifecycleError::VersionNotFound { .. }))
        ));
        assert!(matches!(
            controller.role_versions(&RoleId::new("ghost")).await,
            Err(Error::Lifecycle(LifecycleError::RoleNotFound(_)))
        ));
    }
}
