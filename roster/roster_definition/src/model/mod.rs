//! Role and dashboard definition model.

pub mod dashboard;
pub mod menu;
pub mod role;

pub use dashboard::DashboardDefinition;
pub use menu::{MenuCatalog, MenuEntry};
pub use role::RoleDefinition;
