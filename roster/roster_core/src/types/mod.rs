//! Data structures shared across Roster crates.

pub mod checklist;

pub use checklist::{RoleChecklist, RoleRequirement};
