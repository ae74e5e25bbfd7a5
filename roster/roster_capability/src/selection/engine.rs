//! Dependency-closed selection operations.
//!
//! Every function here takes the catalog explicitly and returns a fresh
//! selection. Adding a capability pulls in everything it requires,
//! transitively; removing one cascades to every selected capability that
//! requires it, directly or indirectly. Starting from a closed selection,
//! the result of any operation is closed again.

use std::collections::{BTreeSet, HashSet, VecDeque};

use roster_core::error::SelectionError;
use roster_core::id::CapabilityKey;
use tracing::debug;

use super::set::CapabilitySelection;
use crate::model::CapabilityCatalog;

/// Result of a toggle, with the keys that changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleDelta {
    /// The selection after the toggle
    pub selection: CapabilitySelection,

    /// Keys that were added, sorted
    pub added: Vec<CapabilityKey>,

    /// Keys that were removed, sorted
    pub removed: Vec<CapabilityKey>,
}

impl ToggleDelta {
    /// Whether the toggle removed more than the toggled key itself.
    pub fn cascaded(&self) -> bool {
        self.removed.len() > 1
    }
}

/// A selected capability whose dependency is not selected.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MissingDependency {
    /// The selected capability
    pub capability: CapabilityKey,

    /// The dependency it lacks
    pub dependency: CapabilityKey,
}

/// Toggle `key` in `selection`.
///
/// If `key` is not selected it is added along with all of its prerequisites.
/// If it is selected it is removed along with every selected capability that
/// depends on it.
///
/// # Returns
///
/// * `Ok(CapabilitySelection)` - The new selection.
/// * `Err(SelectionError::UnknownCapability)` - If the catalog does not define `key`.
pub fn toggle(
    catalog: &CapabilityCatalog,
    key: &str,
    selection: &CapabilitySelection,
) -> Result<CapabilitySelection, SelectionError> {
    toggle_with_delta(catalog, key, selection).map(|delta| delta.selection)
}

/// Toggle `key` and report which keys were added or removed.
pub fn toggle_with_delta(
    catalog: &CapabilityCatalog,
    key: &str,
    selection: &CapabilitySelection,
) -> Result<ToggleDelta, SelectionError> {
    ensure_known(catalog, key)?;

    if selection.contains(key) {
        let removed = cascade(catalog, key, selection);
        debug!(
            capability = key,
            removed = removed.len(),
            "Deselected capability"
        );
        Ok(ToggleDelta {
            selection: selection.without(&removed),
            added: Vec::new(),
            removed,
        })
    } else {
        let added = closure_additions(catalog, key, selection);
        debug!(capability = key, added = added.len(), "Selected capability");
        Ok(ToggleDelta {
            selection: selection.with_added(&added),
            added,
            removed: Vec::new(),
        })
    }
}

/// Ensure `key` and its prerequisites are selected.
///
/// Unlike [`toggle`], this never removes anything.
pub fn select(
    catalog: &CapabilityCatalog,
    key: &str,
    selection: &CapabilitySelection,
) -> Result<CapabilitySelection, SelectionError> {
    ensure_known(catalog, key)?;
    let added = closure_additions(catalog, key, selection);
    Ok(selection.with_added(&added))
}

/// Select several keys at once.
///
/// Every key is checked before anything is added, so an unknown key leaves
/// the selection untouched.
pub fn select_all<I, S>(
    catalog: &CapabilityCatalog,
    keys: I,
    selection: &CapabilitySelection,
) -> Result<CapabilitySelection, SelectionError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let keys: Vec<S> = keys.into_iter().collect();
    for key in &keys {
        ensure_known(catalog, key.as_ref())?;
    }

    let mut next = selection.clone();
    for key in &keys {
        let added = closure_additions(catalog, key.as_ref(), &next);
        next = next.with_added(&added);
    }
    Ok(next)
}

/// Ensure `key` is not selected, cascading to its dependents.
///
/// Unlike [`toggle`], this never adds anything.
pub fn deselect(
    catalog: &CapabilityCatalog,
    key: &str,
    selection: &CapabilitySelection,
) -> Result<CapabilitySelection, SelectionError> {
    ensure_known(catalog, key)?;
    if !selection.contains(key) {
        return Ok(selection.clone());
    }
    let removed = cascade(catalog, key, selection);
    Ok(selection.without(&removed))
}

/// Whether every selected capability is known and has its dependencies selected.
pub fn is_closed(catalog: &CapabilityCatalog, selection: &CapabilitySelection) -> bool {
    selection.iter().all(|key| {
        catalog.contains(key.as_str())
            && catalog
                .dependencies_of(key.as_str())
                .iter()
                .all(|dep| selection.contains(dep.as_str()))
    })
}

/// Every dependency edge leaving the selection, sorted.
pub fn missing_dependencies(
    catalog: &CapabilityCatalog,
    selection: &CapabilitySelection,
) -> Vec<MissingDependency> {
    let mut missing = Vec::new();
    for key in selection {
        for dep in catalog.dependencies_of(key.as_str()) {
            if !selection.contains(dep.as_str()) {
                missing.push(MissingDependency {
                    capability: key.clone(),
                    dependency: dep.clone(),
                });
            }
        }
    }
    missing.sort();
    missing
}

/// Repair a selection by adding every missing prerequisite.
///
/// # Returns
///
/// * `Ok(CapabilitySelection)` - A closed selection containing the input.
/// * `Err(SelectionError::UnknownCapability)` - If a selected key is not in the catalog.
pub fn close(
    catalog: &CapabilityCatalog,
    selection: &CapabilitySelection,
) -> Result<CapabilitySelection, SelectionError> {
    if let Some(unknown) = selection.iter().find(|k| !catalog.contains(k.as_str())) {
        return Err(SelectionError::UnknownCapability(unknown.clone()));
    }

    let mut next = selection.clone();
    for key in selection {
        let added = closure_additions(catalog, key.as_str(), &next);
        next = next.with_added(&added);
    }
    Ok(next)
}

fn ensure_known(catalog: &CapabilityCatalog, key: &str) -> Result<(), SelectionError> {
    if catalog.contains(key) {
        Ok(())
    } else {
        Err(SelectionError::UnknownCapability(CapabilityKey::from(key)))
    }
}

/// `key` plus its prerequisites, minus what is already selected. Sorted.
fn closure_additions(
    catalog: &CapabilityCatalog,
    key: &str,
    selection: &CapabilitySelection,
) -> Vec<CapabilityKey> {
    let mut added: BTreeSet<CapabilityKey> = catalog
        .prerequisites(key)
        .into_iter()
        .filter(|k| !selection.contains(k.as_str()))
        .collect();
    if !selection.contains(key) {
        added.insert(CapabilityKey::from(key));
    }
    added.into_iter().collect()
}

/// `key` and every selected capability that reaches it through reverse
/// dependency edges. Sorted.
///
/// The walk follows every dependent, selected or not, so a selection that
/// was not closed to begin with still loses everything that needs `key`.
fn cascade(
    catalog: &CapabilityCatalog,
    key: &str,
    selection: &CapabilitySelection,
) -> Vec<CapabilityKey> {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut removed: BTreeSet<CapabilityKey> = BTreeSet::new();
    let mut queue: VecDeque<&str> = VecDeque::from([key]);

    while let Some(current) = queue.pop_front() {
        if !visited.insert(current) {
            continue;
        }
        if selection.contains(current) {
            removed.insert(CapabilityKey::from(current));
        }
        queue.extend(catalog.dependents_of(current).iter().map(|k| k.as_str()));
    }

    removed.into_iter().collect()
}
