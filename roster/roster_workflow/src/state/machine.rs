use std::fmt;

use roster_core::error::WorkflowError;
use roster_core::id::RoleId;
use roster_core::Revision;
use serde::{Deserialize, Serialize};

/// Where a wizard session is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum WizardState {
    /// Composing the role. The role may already be persisted if the
    /// session came back from the dashboard step or is editing a role.
    DraftingRole,

    /// The role is persisted; composing its dashboard.
    DraftingDashboard {
        /// The persisted role
        role_id: RoleId,

        /// The role version written by the last role submit
        role_version: Revision,
    },

    /// Role and dashboard are persisted and active.
    Published {
        /// The published role
        role_id: RoleId,

        /// The active role version
        role_version: Revision,

        /// The active dashboard version
        dashboard_version: Revision,
    },
}

impl WizardState {
    /// Short name of the state, used in transition errors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::DraftingRole => "drafting role",
            Self::DraftingDashboard { .. } => "drafting dashboard",
            Self::Published { .. } => "published",
        }
    }

    /// Whether the session has finished.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Published { .. })
    }

    pub(crate) fn reject(&self, action: &'static str) -> WorkflowError {
        WorkflowError::InvalidTransition {
            from: self.name().to_string(),
            action,
        }
    }
}

impl fmt::Display for WizardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DraftingRole => write!(f, "{}", self.name()),
            Self::DraftingDashboard {
                role_id,
                role_version,
            } => write!(f, "{} for {} {}", self.name(), role_id, role_version),
            Self::Published {
                role_id,
                role_version,
                dashboard_version,
            } => write!(
                f,
                "{} {} {} with dashboard {}",
                self.name(),
                role_id,
                role_version,
                dashboard_version
            ),
        }
    }
}

/// What cancelling a session left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The role was persisted before cancelling and stays stored without
    /// a new dashboard.
    RoleKept {
        role_id: RoleId,
        version: Revision,
    },

    /// Nothing was persisted.
    Discarded,
}
