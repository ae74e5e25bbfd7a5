//! Strongly-typed keys for Roster.
//!
//! Capabilities, roles and menu entries are all identified by externally
//! chosen strings. Each key type is a thin wrapper around a `String` with a
//! phantom marker so that, for example, a role ID can never be passed where
//! a capability key is expected.
//!
//! # Examples
//!
//! ```
//! use roster_core::id::{CapabilityKey, RoleId};
//!
//! let role = RoleId::new("auditor");
//! let capability = CapabilityKey::from("budget.view");
//!
//! assert_eq!(role.as_str(), "auditor");
//! assert_eq!(capability.to_string(), "budget.view");
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// A type-safe string key.
///
/// Comparison, hashing and serialization all delegate to the inner string,
/// so a `Key<T>` can be looked up in sets and maps by `&str`.
pub struct Key<T> {
    value: String,
    _marker: PhantomData<T>,
}

impl<T> Key<T> {
    /// Create a key from any string-like value.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            _marker: PhantomData,
        }
    }

    /// Borrow the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Check whether the key is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }

    /// Consume the key, returning the inner string.
    pub fn into_inner(self) -> String {
        self.value
    }
}

impl<T> Clone for Key<T> {
    fn clone(&self) -> Self {
        Self::new(self.value.clone())
    }
}

impl<T> PartialEq for Key<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Key<T> {}

impl<T> PartialOrd for Key<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Key<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl<T> Hash for Key<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> Borrow<str> for Key<T> {
    fn borrow(&self) -> &str {
        &self.value
    }
}

impl<T> AsRef<str> for Key<T> {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl<T> fmt::Debug for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.value)
    }
}

impl<T> fmt::Display for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.value)
    }
}

impl<T> From<&str> for Key<T> {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<T> From<String> for Key<T> {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl<T> Serialize for Key<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}

impl<'de, T> Deserialize<'de> for Key<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

/// Marker type for capabilities.
pub struct CapabilityMarker;
/// Key of a capability in the catalog.
pub type CapabilityKey = Key<CapabilityMarker>;

/// Marker type for roles.
pub struct RoleMarker;
/// Identifier of a role definition.
pub type RoleId = Key<RoleMarker>;

/// Marker type for menu entries.
pub struct MenuMarker;
/// Key of a dashboard menu entry.
pub type MenuKey = Key<MenuMarker>;
