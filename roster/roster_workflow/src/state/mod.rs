//! The two-step definition wizard.
//!
//! A wizard session first drafts and persists a role, then composes and
//! persists the dashboard bound to it, publishing both together.

mod machine;
mod wizard;

pub use machine::{CancelOutcome, WizardState};
pub use wizard::DefinitionWizard;
