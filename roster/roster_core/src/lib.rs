//! # Roster Core
//!
//! `roster_core` provides the building blocks shared by every Roster crate:
//! the error hierarchy, strongly-typed keys, the revision counter, the role
//! validation checklist and the logging/configuration utilities.
//!
//! ## Model Overview
//!
//! Roster lets an administrator compose a named *role* from a catalog of
//! fine-grained *capabilities* connected by dependency edges, pair it with a
//! *scope map* bounding data access, and bind both to a *dashboard*
//! definition under an explicit version/publish lifecycle.
//!
//! 1. **Dependency closure**: a role's capability set always contains every
//!    prerequisite of every selected capability.
//!
//! 2. **Independent scopes**: each scope category holds one value drawn from
//!    that category's enumeration.
//!
//! 3. **Versioned lifecycle**: saves write new revisions; at most one
//!    revision of a role or dashboard is active at a time.
//!
//! ## Crate Structure
//!
//! - **error**: Error types for all Roster components
//! - **id**: Strongly-typed string keys
//! - **types**: Data structures shared across crates
//! - **utils**: Logging, configuration and revisions
//! - **macros**: The `log_event!` macro

pub mod error;
pub mod id;
pub mod macros;
pub mod types;
pub mod utils;

#[doc(hidden)]
pub use tracing as __tracing;

pub use error::{Error, ErrorKind, Result};
pub use id::{CapabilityKey, MenuKey, RoleId};
pub use types::{RoleChecklist, RoleRequirement};
pub use utils::{LogLevel, Revision, RosterConfig};
