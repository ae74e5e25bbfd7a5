//! Capability model.

pub mod capability;
pub mod catalog;

pub use capability::Capability;
pub use catalog::CapabilityCatalog;

pub(crate) use catalog::is_json;
