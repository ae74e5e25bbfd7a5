//! A definition wizard session.

use std::sync::Arc;

use roster_capability::selection::ToggleDelta;
use roster_core::error::Result;
use roster_core::id::RoleId;
use roster_core::types::RoleChecklist;
use roster_core::utils::LogLevel;
use roster_core::{log_event, Revision};
use roster_definition::MenuEntry;
use uuid::Uuid;

use super::machine::{CancelOutcome, WizardState};
use crate::controller::WorkflowController;
use crate::draft::{DashboardDraft, RoleDraft};

/// One administrator's pass through role and dashboard creation.
///
/// Every transition that touches the store either completes or leaves the
/// state and both drafts as they were, so a failed submit can be retried.
/// The one exception is a dashboard submit whose save succeeded but whose
/// publish failed: the draft then remembers the saved version, and the retry
/// writes on top of it.
pub struct DefinitionWizard {
    session_id: Uuid,
    controller: Arc<WorkflowController>,
    state: WizardState,
    role: RoleDraft,
    dashboard: Option<DashboardDraft>,
}

impl DefinitionWizard {
    /// Start a session for a new role.
    pub fn new(controller: Arc<WorkflowController>) -> Self {
        let session_id = Uuid::new_v4();
        log_event!(LogLevel::Debug, "Wizard started", session => session_id);
        Self {
            session_id,
            controller,
            state: WizardState::DraftingRole,
            role: RoleDraft::new(),
            dashboard: None,
        }
    }

    /// Start a session revising the latest version of an existing role and
    /// its dashboard.
    pub async fn edit(controller: Arc<WorkflowController>, role_id: &RoleId) -> Result<Self> {
        let role = controller.get_role(role_id).await?;
        let dashboard = controller.find_dashboard(role_id).await?;

        let session_id = Uuid::new_v4();
        log_event!(LogLevel::Debug, "Wizard editing role",
            session => session_id,
            role => role_id,
            version => role.version,
        );
        Ok(Self {
            session_id,
            controller,
            state: WizardState::DraftingRole,
            role: RoleDraft::from_definition(&role),
            dashboard: dashboard.as_ref().map(DashboardDraft::from_definition),
        })
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn role(&self) -> &RoleDraft {
        &self.role
    }

    pub fn dashboard(&self) -> Option<&DashboardDraft> {
        self.dashboard.as_ref()
    }

    /// The role draft, editable only while drafting the role.
    pub fn role_mut(&mut self) -> Result<&mut RoleDraft> {
        match self.state {
            WizardState::DraftingRole => Ok(&mut self.role),
            _ => Err(self.state.reject("edit role").into()),
        }
    }

    /// The dashboard draft, editable only while drafting the dashboard.
    pub fn dashboard_mut(&mut self) -> Result<&mut DashboardDraft> {
        match (&self.state, self.dashboard.as_mut()) {
            (WizardState::DraftingDashboard { .. }, Some(dashboard)) => Ok(dashboard),
            _ => Err(self.state.reject("edit dashboard").into()),
        }
    }

    /// Toggle a capability against the controller's catalog.
    pub fn toggle_capability(&mut self, key: &str) -> Result<ToggleDelta> {
        let catalog = Arc::clone(self.controller.capabilities());
        Ok(self.role_mut()?.toggle_capability(&catalog, key)?)
    }

    /// Assign a scope value against the controller's scope catalog.
    pub fn set_scope(&mut self, category: &str, value: &str) -> Result<()> {
        let scopes = Arc::clone(self.controller.scopes());
        Ok(self.role_mut()?.set_scope(&scopes, category, value)?)
    }

    /// Add the menu catalog entry with `key` to the dashboard.
    ///
    /// Without a menu catalog, `entry` is used instead when given.
    pub fn add_menu_entry(&mut self, key: &str, entry: Option<MenuEntry>) -> Result<bool> {
        let menus = self.controller.menus().cloned();
        let dashboard = self.dashboard_mut()?;
        match (menus, entry) {
            (Some(menus), _) => Ok(dashboard.add_from_catalog(&menus, key)?),
            (None, Some(entry)) => Ok(dashboard.add_entry(entry)),
            (None, None) => Ok(dashboard.add_entry(MenuEntry::new(key, key))),
        }
    }

    /// The role requirements as they stand.
    pub fn checklist(&self) -> RoleChecklist {
        self.role.checklist(self.controller.capabilities())
    }

    /// Persist the role and move on to the dashboard.
    ///
    /// Fails with every unmet requirement if the role checklist is
    /// incomplete. Revising a persisted role writes a new version on top of
    /// the one the draft was edited from.
    pub async fn submit_role(&mut self) -> Result<Revision> {
        if self.state != WizardState::DraftingRole {
            return Err(self.state.reject("submit role").into());
        }
        self.checklist().ensure_complete()?;

        let definition = self.role.to_definition();
        let role_id = definition.id.clone();

        let existing_dashboard = match &self.dashboard {
            Some(_) => None,
            None => self.controller.find_dashboard(&role_id).await?,
        };

        let version = self
            .controller
            .save_role(definition, self.role.base_version())
            .await?;

        self.role.mark_saved(version);
        if self.dashboard.is_none() {
            self.dashboard = Some(match existing_dashboard {
                Some(dashboard) => DashboardDraft::from_definition(&dashboard),
                None => DashboardDraft::new(role_id.clone()),
            });
        }
        self.state = WizardState::DraftingDashboard {
            role_id: role_id.clone(),
            role_version: version,
        };

        log_event!(LogLevel::Info, "Wizard role submitted",
            session => self.session_id,
            role => role_id,
            version => version,
        );
        Ok(version)
    }

    /// Persist the dashboard, then publish it together with the submitted
    /// role version.
    pub async fn submit_dashboard(&mut self) -> Result<Revision> {
        let (role_id, role_version) = match &self.state {
            WizardState::DraftingDashboard {
                role_id,
                role_version,
            } => (role_id.clone(), *role_version),
            other => return Err(other.reject("submit dashboard").into()),
        };
        let dashboard = match self.dashboard.as_mut() {
            Some(dashboard) => dashboard,
            None => return Err(self.state.reject("submit dashboard").into()),
        };

        dashboard.validate(self.controller.menus().map(Arc::as_ref))?;
        let dashboard_version = self
            .controller
            .save_dashboard(dashboard.to_definition(), dashboard.base_version())
            .await?;
        dashboard.mark_saved(dashboard_version);

        self.controller
            .publish_definition(&role_id, role_version, dashboard_version)
            .await?;

        self.state = WizardState::Published {
            role_id: role_id.clone(),
            role_version,
            dashboard_version,
        };
        log_event!(LogLevel::Info, "Wizard published definition",
            session => self.session_id,
            role => role_id,
            version => role_version,
            dashboard => dashboard_version,
        );
        Ok(dashboard_version)
    }

    /// Return to the role step to revise the persisted role.
    pub fn back_to_role(&mut self) -> Result<()> {
        match self.state {
            WizardState::DraftingDashboard { .. } => {
                self.state = WizardState::DraftingRole;
                Ok(())
            }
            _ => Err(self.state.reject("go back to role").into()),
        }
    }

    /// End the session.
    ///
    /// A role persisted earlier in the session stays stored. Cancelling a
    /// published session is refused.
    pub fn cancel(self) -> Result<CancelOutcome> {
        if self.state.is_terminal() {
            return Err(self.state.reject("cancel").into());
        }

        let outcome = match self.role.base_version() {
            Some(version) => CancelOutcome::RoleKept {
                role_id: RoleId::new(self.role.id()),
                version,
            },
            None => CancelOutcome::Discarded,
        };
        log_event!(LogLevel::Info, "Wizard cancelled",
            session => self.session_id,
            outcome => format!("{:?}", outcome),
        );
        Ok(outcome)
    }
}
