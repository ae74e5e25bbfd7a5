//! In-progress edits held by a wizard session.

mod dashboard;
mod role;

pub use dashboard::DashboardDraft;
pub use role::RoleDraft;
