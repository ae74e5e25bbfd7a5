//! Error types for the Roster role definition model.
//!
//! Errors are organized by subsystem, with each subsystem owning its own
//! enum. The root `Error` wraps all of them so callers at the top level can
//! handle failures uniformly, while `Error::kind` tells a caller which family
//! an error belongs to (validation, invariant violation, conflict or
//! persistence) so it can render an actionable message.

use crate::id::{CapabilityKey, MenuKey, RoleId};
use crate::types::RoleRequirement;
use crate::utils::Revision;
use thiserror::Error;

/// Root error type for Roster.
#[derive(Debug, Error)]
pub enum Error {
    /// Capability, scope or menu catalog errors
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Capability selection errors
    #[error("Selection error: {0}")]
    Selection(#[from] SelectionError),

    /// Scope composition errors
    #[error("Scope error: {0}")]
    Scope(#[from] ScopeError),

    /// Draft validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Role and dashboard lifecycle errors
    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    /// Definition wizard state machine errors
    #[error("Workflow error: {0}")]
    Workflow(#[from] WorkflowError),

    /// Persistence errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Broad family an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The caller supplied something invalid; nothing was changed.
    Validation,

    /// The operation would break a lifecycle invariant.
    Invariant,

    /// A concurrent writer got there first.
    Conflict,

    /// The store could not be reached or failed mid-operation.
    Persistence,

    /// Anything else.
    Internal,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Selection(_) | Self::Scope(_) | Self::Validation(_) | Self::Catalog(_) => {
                ErrorKind::Validation
            }
            Self::Lifecycle(LifecycleError::Conflict { .. }) => ErrorKind::Conflict,
            Self::Lifecycle(_) | Self::Workflow(_) => ErrorKind::Invariant,
            Self::Storage(_) | Self::Io(_) => ErrorKind::Persistence,
            Self::Config(_) | Self::Serialization(_) => ErrorKind::Internal,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Errors raised while building a catalog from external data.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The same capability key appears twice
    #[error("Duplicate capability: {0}")]
    DuplicateCapability(CapabilityKey),

    /// A capability depends on a key the catalog does not define
    #[error("Capability {capability} depends on unknown capability {dependency}")]
    UnknownDependency {
        /// The capability declaring the dependency
        capability: CapabilityKey,

        /// The missing dependency
        dependency: CapabilityKey,
    },

    /// The dependency relation is not acyclic
    #[error("Dependency cycle among capabilities: {}", format_keys(.0))]
    DependencyCycle(Vec<CapabilityKey>),

    /// The same scope category is declared twice
    #[error("Duplicate scope category: {0}")]
    DuplicateCategory(String),

    /// A scope category declares no values
    #[error("Scope category {0} has no allowed values")]
    EmptyCategory(String),

    /// The same menu key appears twice in the menu catalog
    #[error("Duplicate menu entry: {0}")]
    DuplicateMenuEntry(MenuKey),

    /// Catalog source could not be read or parsed
    #[error("Failed to load catalog: {0}")]
    Load(String),
}

/// Errors related to capability selection.
#[derive(Debug, Error)]
pub enum SelectionError {
    /// The capability is not in the catalog
    #[error("Unknown capability: {0}")]
    UnknownCapability(CapabilityKey),
}

/// Errors related to scope composition.
#[derive(Debug, Error)]
pub enum ScopeError {
    /// The category is not one of the known scope categories
    #[error("Unknown scope category: {0}")]
    UnknownCategory(String),

    /// The value is not in the category's enumeration
    #[error("Invalid value '{value}' for scope {category} (allowed: {})", .allowed.join(", "))]
    InvalidValue {
        /// The scope category
        category: String,

        /// The rejected value
        value: String,

        /// The values the category accepts
        allowed: Vec<String>,
    },

    /// A `category=value` assignment could not be parsed
    #[error("Malformed scope assignment: {0}")]
    MalformedAssignment(String),
}

/// Errors raised by draft validation before a step transition.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// One or more role requirements are unmet
    #[error("Role definition incomplete: {}", describe_missing(.missing))]
    RoleIncomplete {
        /// Every requirement that failed
        missing: Vec<RoleRequirement>,
    },

    /// The dashboard menu has no entries
    #[error("Dashboard menu is empty")]
    EmptyMenu,

    /// A menu reorder index is outside the menu
    #[error("Menu index {index} out of range for menu of length {len}")]
    MenuIndexOutOfRange {
        /// The offending index
        index: usize,

        /// The menu length
        len: usize,
    },

    /// The menu catalog has no entry with this key
    #[error("Unknown menu entry: {0}")]
    UnknownMenuEntry(MenuKey),

    /// The same menu key appears twice in a dashboard menu
    #[error("Menu entry {0} appears more than once")]
    DuplicateMenuEntry(MenuKey),

    /// A persisted role's ID cannot be changed
    #[error("Role id {0} cannot change once the role is saved")]
    IdLocked(RoleId),
}

/// Errors related to persisted role and dashboard lifecycles.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// No role with this ID has been persisted
    #[error("Role not found: {0}")]
    RoleNotFound(RoleId),

    /// The role exists but has no such version
    #[error("Role {role_id} has no version {version}")]
    VersionNotFound {
        /// The role
        role_id: RoleId,

        /// The requested version
        version: Revision,
    },

    /// No dashboard has been persisted for this role
    #[error("Dashboard not found for role {0}")]
    DashboardNotFound(RoleId),

    /// The role's dashboard has no such version
    #[error("Dashboard for role {role_id} has no version {version}")]
    DashboardVersionNotFound {
        /// The role
        role_id: RoleId,

        /// The requested version
        version: Revision,
    },

    /// A role with this ID already exists
    #[error("Role already exists: {0}")]
    AlreadyExists(RoleId),

    /// No further version number is available for the role or its dashboard
    #[error("Role {0} has used every version number")]
    VersionsExhausted(RoleId),

    /// The role cannot be deleted while users are assigned to it
    #[error("Role {role_id} is assigned to {assigned} user(s) and cannot be deleted")]
    RoleInUse {
        /// The role
        role_id: RoleId,

        /// Number of assigned users
        assigned: u64,
    },

    /// The record changed since the caller read it
    #[error("Version conflict on {role_id}: edited from {}, current is {current}", format_expected(.expected))]
    Conflict {
        /// The role
        role_id: RoleId,

        /// The version the caller edited from
        expected: Option<Revision>,

        /// The version currently stored
        current: Revision,
    },
}

/// Errors related to the definition wizard state machine.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The action is not allowed in the current state
    #[error("Cannot {action} while {from}")]
    InvalidTransition {
        /// Name of the current state
        from: String,

        /// The attempted action
        action: &'static str,
    },
}

/// Errors raised by storage backends and definition stores.
#[derive(Debug, Error)]
pub enum StorageError {
    /// I/O failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Key not found
    #[error("Key not found: {0}")]
    NotFound(String),

    /// A record could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The backend is unavailable or failed
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration could not be read
    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),

    /// The configuration could not be parsed
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// The configuration is semantically invalid
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Result type used throughout Roster.
pub type Result<T> = std::result::Result<T, Error>;

fn format_keys(keys: &[CapabilityKey]) -> String {
    keys.iter()
        .map(|k| k.as_str())
        .collect::<Vec<_>>()
        .join(" -> ")
}

fn describe_missing(missing: &[RoleRequirement]) -> String {
    missing
        .iter()
        .map(|r| r.description())
        .collect::<Vec<_>>()
        .join("; ")
}

fn format_expected(expected: &Option<Revision>) -> String {
    match expected {
        Some(v) => v.to_string(),
        None => "a new role".to_string(),
    }
}
