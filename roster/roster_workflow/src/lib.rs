//! # Roster Workflow
//!
//! The definition workflow on top of the Roster model: editable drafts, the
//! lifecycle controller that persists them, and the two-step wizard that
//! takes an administrator from an empty role to a published role and
//! dashboard.
//!
//! ## Core Components
//!
//! - **Drafts**: `RoleDraft` and `DashboardDraft`, edited in memory
//! - **Controller**: `WorkflowController`, the single writer of definitions
//! - **Wizard**: `DefinitionWizard`, an explicit state machine over the two steps
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use roster_capability::{Capability, CapabilityCatalog};
//! use roster_definition::InMemoryDefinitionStore;
//! use roster_workflow::{DefinitionWizard, WorkflowController};
//!
//! # async fn run() -> roster_core::Result<()> {
//! let catalog = CapabilityCatalog::new(vec![
//!     Capability::new("users.view", "users", "View users"),
//! ])?;
//! let controller = Arc::new(WorkflowController::new(
//!     Arc::new(InMemoryDefinitionStore::new()),
//!     Arc::new(catalog),
//! ));
//!
//! let mut wizard = DefinitionWizard::new(controller);
//! wizard.role_mut()?.set_id("viewer")?;
//! wizard.role_mut()?.set_label("Viewer");
//! wizard.toggle_capability("users.view")?;
//! wizard.set_scope("users", "self")?;
//! wizard.submit_role().await?;
//!
//! wizard.add_menu_entry("users", None)?;
//! wizard.submit_dashboard().await?;
//! # Ok(())
//! # }
//! ```

pub mod controller;
pub mod draft;
pub mod state;

pub use controller::{AssignmentLookup, InMemoryAssignments, NoAssignments, WorkflowController};
pub use draft::{DashboardDraft, RoleDraft};
pub use state::{CancelOutcome, DefinitionWizard, WizardState};
