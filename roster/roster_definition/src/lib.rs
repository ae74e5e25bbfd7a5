//! # Roster Definition
//!
//! Role and dashboard definitions, the validation gates they pass before
//! being persisted, and versioned storage for them.
//!
//! ## Core Components
//!
//! - **Model**: `RoleDefinition`, `DashboardDefinition`, menu entries and the menu catalog
//! - **Validation**: The role checklist and dashboard menu checks
//! - **Store**: The `DefinitionStore` trait with in-memory and key-value implementations
//!
//! ## Versioning
//!
//! Saving never edits a stored definition. Each save appends a version after
//! checking that the caller edited from the latest one, and publishing moves
//! the single active flag in one atomic step.

pub mod model;
pub mod store;
pub mod validation;

// Re-export commonly used types
pub use model::{DashboardDefinition, MenuCatalog, MenuEntry, RoleDefinition};
pub use store::{
    DefinitionStore, FileStorage, InMemoryDefinitionStore, KvDefinitionStore, MemoryStorage,
    StorageBackend, WriteOutcome,
};
pub use validation::{evaluate_role, validate_menu, validate_role};
