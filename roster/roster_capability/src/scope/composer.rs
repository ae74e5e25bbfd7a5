//! Scope map composition.
//!
//! A scope map assigns at most one access level to each scope category.
//! Every write is checked against the catalog before anything changes, and
//! categories never constrain one another.

use std::collections::BTreeMap;

use roster_core::error::ScopeError;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::catalog::ScopeCatalog;

/// Category to access level assignments for a role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeMap {
    entries: BTreeMap<String, String>,
}

impl ScopeMap {
    /// The empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Access level assigned to `category`.
    pub fn get(&self, category: &str) -> Option<&str> {
        self.entries.get(category).map(String::as_str)
    }

    /// Number of configured categories.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no category is configured.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(category, value)` pairs sorted by category.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(category, value)| (category.as_str(), value.as_str()))
    }
}

impl<C: Into<String>, V: Into<String>> FromIterator<(C, V)> for ScopeMap {
    /// Build a map without checking it against a catalog. Use [`validate`]
    /// on the result before trusting it.
    fn from_iter<I: IntoIterator<Item = (C, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(c, v)| (c.into(), v.into()))
                .collect(),
        }
    }
}

/// Assign `value` to `category`, replacing any previous value.
///
/// # Returns
///
/// * `Ok(ScopeMap)` - The updated map.
/// * `Err(ScopeError::UnknownCategory)` - If the catalog has no such category.
/// * `Err(ScopeError::InvalidValue)` - If `value` is not allowed for the category.
pub fn set_scope(
    catalog: &ScopeCatalog,
    category: &str,
    value: &str,
    map: &ScopeMap,
) -> Result<ScopeMap, ScopeError> {
    check(catalog, category, value)?;

    let mut next = map.clone();
    next.entries.insert(category.to_string(), value.to_string());
    debug!(category, value, "Scope set");
    Ok(next)
}

/// Remove the assignment for `category`.
pub fn clear_scope(
    catalog: &ScopeCatalog,
    category: &str,
    map: &ScopeMap,
) -> Result<ScopeMap, ScopeError> {
    if !catalog.has_category(category) {
        return Err(ScopeError::UnknownCategory(category.to_string()));
    }

    let mut next = map.clone();
    next.entries.remove(category);
    Ok(next)
}

/// Check every entry of a map, e.g. one loaded from storage.
pub fn validate(catalog: &ScopeCatalog, map: &ScopeMap) -> Result<(), ScopeError> {
    map.iter()
        .try_for_each(|(category, value)| check(catalog, category, value))
}

/// Parse a `category=value` assignment.
pub fn parse_assignment(input: &str) -> Result<(String, String), ScopeError> {
    let (category, value) = input
        .split_once('=')
        .ok_or_else(|| ScopeError::MalformedAssignment(input.to_string()))?;

    let category = category.trim();
    let value = value.trim();
    if category.is_empty() || value.is_empty() {
        return Err(ScopeError::MalformedAssignment(input.to_string()));
    }

    Ok((category.to_string(), value.to_string()))
}

fn check(catalog: &ScopeCatalog, category: &str, value: &str) -> Result<(), ScopeError> {
    let allowed = catalog
        .allowed(category)
        .ok_or_else(|| ScopeError::UnknownCategory(category.to_string()))?;

    if allowed.iter().any(|v| v == value) {
        Ok(())
    } else {
        Err(ScopeError::InvalidValue {
            category: category.to_string(),
            value: value.to_string(),
            allowed: allowed.to_vec(),
        })
    }
}
