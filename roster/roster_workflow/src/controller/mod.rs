//! Lifecycle controller and the assignment lookup it consults.

pub mod assignments;
mod lifecycle;

pub use assignments::{AssignmentLookup, InMemoryAssignments, NoAssignments};
pub use lifecycle::WorkflowController;
