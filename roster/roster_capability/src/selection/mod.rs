mod engine;
mod set;

pub use engine::{
    close, deselect, is_closed, missing_dependencies, select, select_all, toggle,
    toggle_with_delta, MissingDependency, ToggleDelta,
};
pub use set::CapabilitySelection;
