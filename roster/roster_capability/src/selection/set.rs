//! The capability selection held by a role.

use std::collections::BTreeSet;

use roster_core::id::CapabilityKey;
use serde::{Deserialize, Serialize};

/// A set of capability keys chosen for a role.
///
/// Selections are values: every engine operation returns a new selection and
/// leaves its input untouched. Selections produced by the engine are always
/// dependency-closed; selections rebuilt from storage with
/// [`CapabilitySelection::from_keys`] are not checked and should be verified
/// with `engine::is_closed` before use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilitySelection {
    keys: BTreeSet<CapabilityKey>,
}

impl CapabilitySelection {
    /// The empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a selection from stored keys without checking closure.
    pub fn from_keys<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<CapabilityKey>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `key` is selected.
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Number of selected capabilities.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Iterate selected keys in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &CapabilityKey> {
        self.keys.iter()
    }

    /// Selected keys as plain strings, sorted.
    pub fn to_strings(&self) -> Vec<String> {
        self.keys.iter().map(|k| k.to_string()).collect()
    }

    /// A copy of this selection with `keys` added.
    pub(crate) fn with_added<'a, I>(&self, keys: I) -> Self
    where
        I: IntoIterator<Item = &'a CapabilityKey>,
    {
        let mut next = self.keys.clone();
        next.extend(keys.into_iter().cloned());
        Self { keys: next }
    }

    /// A copy of this selection with `keys` removed.
    pub(crate) fn without<'a, I>(&self, keys: I) -> Self
    where
        I: IntoIterator<Item = &'a CapabilityKey>,
    {
        let mut next = self.keys.clone();
        for key in keys {
            next.remove(key);
        }
        Self { keys: next }
    }
}

impl<'a> IntoIterator for &'a CapabilitySelection {
    type Item = &'a CapabilityKey;
    type IntoIter = std::collections::btree_set::Iter<'a, CapabilityKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.iter()
    }
}
