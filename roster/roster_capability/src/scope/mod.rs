pub mod catalog;
mod composer;

pub use catalog::ScopeCatalog;
pub use composer::{clear_scope, parse_assignment, set_scope, validate, ScopeMap};
