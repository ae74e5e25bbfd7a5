//! Role validation checklist.
//!
//! A role draft may only leave the role-editing step when every requirement
//! holds. The checklist keeps one boolean per requirement so that a caller can
//! render which conditions are still unmet instead of a single pass/fail.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// A single condition a role draft must satisfy before it can be persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleRequirement {
    /// The role ID is non-empty.
    IdPresent,

    /// The role label is non-empty.
    LabelPresent,

    /// At least one capability is selected.
    CapabilitiesSelected,

    /// At least one scope category is configured.
    ScopesConfigured,

    /// Every selected capability has all its prerequisites selected.
    CapabilitiesClosed,
}

impl RoleRequirement {
    /// All requirements, in checklist order.
    pub const ALL: [RoleRequirement; 5] = [
        Self::IdPresent,
        Self::LabelPresent,
        Self::CapabilitiesSelected,
        Self::ScopesConfigured,
        Self::CapabilitiesClosed,
    ];

    /// Human-readable description of the requirement.
    pub fn description(&self) -> &'static str {
        match self {
            Self::IdPresent => "role id must not be empty",
            Self::LabelPresent => "role label must not be empty",
            Self::CapabilitiesSelected => "at least one capability must be selected",
            Self::ScopesConfigured => "at least one scope must be configured",
            Self::CapabilitiesClosed => "every selected capability needs its prerequisites",
        }
    }
}

impl fmt::Display for RoleRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Per-requirement outcome of validating a role draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoleChecklist {
    /// The role ID is non-empty.
    pub id_present: bool,

    /// The role label is non-empty.
    pub label_present: bool,

    /// At least one capability is selected.
    pub capabilities_selected: bool,

    /// At least one scope is configured.
    pub scopes_configured: bool,

    /// The capability selection is dependency-closed.
    pub capabilities_closed: bool,
}

impl RoleChecklist {
    /// Whether a specific requirement holds.
    pub fn holds(&self, requirement: RoleRequirement) -> bool {
        match requirement {
            RoleRequirement::IdPresent => self.id_present,
            RoleRequirement::LabelPresent => self.label_present,
            RoleRequirement::CapabilitiesSelected => self.capabilities_selected,
            RoleRequirement::ScopesConfigured => self.scopes_configured,
            RoleRequirement::CapabilitiesClosed => self.capabilities_closed,
        }
    }

    /// Whether every requirement holds.
    pub fn is_complete(&self) -> bool {
        RoleRequirement::ALL.iter().all(|r| self.holds(*r))
    }

    /// The requirements that do not hold, in checklist order.
    pub fn missing(&self) -> Vec<RoleRequirement> {
        RoleRequirement::ALL
            .iter()
            .copied()
            .filter(|r| !self.holds(*r))
            .collect()
    }

    /// Turn the checklist into a transition guard.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If every requirement holds.
    /// * `Err(ValidationError::RoleIncomplete)` - Listing every unmet requirement.
    pub fn ensure_complete(&self) -> Result<(), ValidationError> {
        let missing = self.missing();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::RoleIncomplete { missing })
        }
    }
}
