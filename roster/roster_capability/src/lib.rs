//! # Roster Capability
//!
//! This crate holds the two read-only catalogs a role is composed from and
//! the pure operations that compose it.
//!
//! The capability catalog is a dependency DAG. A role's capability selection
//! must always be dependency-closed: whenever a capability is selected, so is
//! everything it depends on. The selection engine keeps that true by adding
//! prerequisites transitively and by cascading removals through reverse
//! dependency edges.
//!
//! The scope catalog enumerates the access levels allowed for each scope
//! category. A scope map assigns one of them per category, with no rules
//! between categories.
//!
//! ## Core Components
//!
//! - **Model**: `Capability` and the validated `CapabilityCatalog`
//! - **Selection**: `CapabilitySelection` and the toggle/cascade engine
//! - **Scope**: `ScopeCatalog`, `ScopeMap` and the scope composer
//!
//! ## Usage Example
//!
//! ```rust
//! use roster_capability::model::{Capability, CapabilityCatalog};
//! use roster_capability::selection::{self, CapabilitySelection};
//! use roster_capability::scope::{self, ScopeCatalog, ScopeMap};
//!
//! let catalog = CapabilityCatalog::new(vec![
//!     Capability::new("reports.view", "reports", "View reports"),
//!     Capability::new("reports.export", "reports", "Export reports")
//!         .depends_on(["reports.view"]),
//! ])
//! .unwrap();
//!
//! let chosen = selection::toggle(&catalog, "reports.export", &CapabilitySelection::new()).unwrap();
//! assert!(chosen.contains("reports.view"));
//!
//! let scopes = scope::set_scope(&ScopeCatalog::default(), "project", "assigned", &ScopeMap::new()).unwrap();
//! assert_eq!(scopes.get("project"), Some("assigned"));
//! ```

pub mod model;
pub mod scope;
pub mod selection;

// Re-export commonly used types
pub use model::{Capability, CapabilityCatalog};
pub use scope::{ScopeCatalog, ScopeMap};
pub use selection::{CapabilitySelection, ToggleDelta};
