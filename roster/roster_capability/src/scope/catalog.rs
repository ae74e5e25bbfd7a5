//! Scope categories and their allowed access levels.

use std::collections::BTreeMap;
use std::path::Path;

use roster_core::error::CatalogError;
use serde::Serialize;

/// Category bounding project visibility.
pub const PROJECT: &str = "project";
/// Category bounding tenant visibility.
pub const TENANT: &str = "tenant";
/// Category bounding record-level data visibility.
pub const DATA: &str = "data";
/// Category bounding which user accounts can be seen.
pub const USERS: &str = "users";

/// The fixed enumeration of access levels for each scope category.
///
/// Categories are independent of each other. Allowed values keep the order
/// in which they were declared, broadest first by convention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ScopeCatalog {
    categories: BTreeMap<String, Vec<String>>,
}

impl Default for ScopeCatalog {
    fn default() -> Self {
        let categories = [
            (PROJECT, &["all", "organization", "self", "assigned"][..]),
            (TENANT, &["all", "own"][..]),
            (DATA, &["all", "organization", "department", "self"][..]),
            (USERS, &["all", "organization", "self"][..]),
        ]
        .into_iter()
        .map(|(category, values)| {
            (
                category.to_string(),
                values.iter().map(|v| v.to_string()).collect(),
            )
        })
        .collect();

        Self { categories }
    }
}

impl ScopeCatalog {
    /// Build a catalog from `(category, allowed values)` pairs.
    ///
    /// # Returns
    ///
    /// * `Ok(ScopeCatalog)` - If every category is unique and non-empty.
    /// * `Err(CatalogError)` - On a duplicate or empty category.
    pub fn new<I, C, V>(categories: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = (C, Vec<V>)>,
        C: Into<String>,
        V: Into<String>,
    {
        let mut map = BTreeMap::new();
        for (category, values) in categories {
            let category = category.into();
            let mut allowed: Vec<String> = Vec::with_capacity(values.len());
            for value in values {
                let value = value.into();
                if !allowed.contains(&value) {
                    allowed.push(value);
                }
            }
            if allowed.is_empty() {
                return Err(CatalogError::EmptyCategory(category));
            }
            if map.insert(category.clone(), allowed).is_some() {
                return Err(CatalogError::DuplicateCategory(category));
            }
        }
        Ok(Self { categories: map })
    }

    /// Parse a JSON object mapping category to an array of values.
    pub fn from_json(content: &str) -> Result<Self, CatalogError> {
        let raw: BTreeMap<String, Vec<String>> =
            serde_json::from_str(content).map_err(|e| CatalogError::Load(e.to_string()))?;
        Self::new(raw)
    }

    /// Parse a TOML table mapping category to an array of values.
    pub fn from_toml(content: &str) -> Result<Self, CatalogError> {
        let raw: BTreeMap<String, Vec<String>> =
            toml::from_str(content).map_err(|e| CatalogError::Load(e.to_string()))?;
        Self::new(raw)
    }

    /// Load a catalog file, choosing the format by extension.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::Load(format!("{}: {}", path.display(), e)))?;

        if crate::model::is_json(path) {
            Self::from_json(&content)
        } else {
            Self::from_toml(&content)
        }
    }

    /// Category names, sorted.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// Whether `category` is known.
    pub fn has_category(&self, category: &str) -> bool {
        self.categories.contains_key(category)
    }

    /// Allowed values of `category`, if it is known.
    pub fn allowed(&self, category: &str) -> Option<&[String]> {
        self.categories.get(category).map(Vec::as_slice)
    }

    /// Whether `value` is allowed for `category`.
    pub fn allows(&self, category: &str, value: &str) -> bool {
        self.allowed(category)
            .map(|values| values.iter().any(|v| v == value))
            .unwrap_or(false)
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Whether the catalog has no categories.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
