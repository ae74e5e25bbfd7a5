//! The capability catalog.
//!
//! The catalog is read-only once built and is shared between sessions
//! behind an `Arc`. Building it checks that every key is unique, that every
//! dependency refers to a known capability and that the dependency relation
//! is acyclic, and precomputes the reverse dependency index used by cascading
//! removal.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::path::Path;

use roster_core::error::CatalogError;
use roster_core::id::CapabilityKey;
use serde::Deserialize;
use tracing::debug;

use super::capability::Capability;

/// A validated, immutable capability catalog.
#[derive(Debug, Clone, Default)]
pub struct CapabilityCatalog {
    /// Capabilities in declaration order
    capabilities: Vec<Capability>,

    /// Position of each capability in `capabilities`
    index: HashMap<CapabilityKey, usize>,

    /// Reverse dependency edges: key -> capabilities that list key in `depends_on`
    dependents: HashMap<CapabilityKey, Vec<CapabilityKey>>,
}

/// TOML catalogs are a table with a `capabilities` array.
#[derive(Deserialize)]
struct CatalogDocument {
    #[serde(alias = "capability")]
    capabilities: Vec<Capability>,
}

impl CapabilityCatalog {
    /// Build a catalog from a list of capabilities.
    ///
    /// # Returns
    ///
    /// * `Ok(CapabilityCatalog)` - If the list forms a valid dependency DAG.
    /// * `Err(CatalogError)` - On a duplicate key, an unknown dependency or a cycle.
    pub fn new(capabilities: Vec<Capability>) -> Result<Self, CatalogError> {
        let mut capabilities = capabilities;
        let mut index = HashMap::with_capacity(capabilities.len());

        for (position, capability) in capabilities.iter_mut().enumerate() {
            capability.dedup_dependencies();
            if index.insert(capability.key.clone(), position).is_some() {
                return Err(CatalogError::DuplicateCapability(capability.key.clone()));
            }
        }

        let mut dependents: HashMap<CapabilityKey, Vec<CapabilityKey>> = HashMap::new();
        for capability in &capabilities {
            for dependency in &capability.depends_on {
                if !index.contains_key(dependency) {
                    return Err(CatalogError::UnknownDependency {
                        capability: capability.key.clone(),
                        dependency: dependency.clone(),
                    });
                }
                dependents
                    .entry(dependency.clone())
                    .or_default()
                    .push(capability.key.clone());
            }
        }

        let catalog = Self {
            capabilities,
            index,
            dependents,
        };

        if let Some(cycle) = catalog.find_cycle() {
            return Err(CatalogError::DependencyCycle(cycle));
        }

        debug!(
            capabilities = catalog.capabilities.len(),
            "Capability catalog built"
        );

        Ok(catalog)
    }

    /// Parse a catalog from a JSON array of capabilities.
    pub fn from_json(content: &str) -> Result<Self, CatalogError> {
        let capabilities: Vec<Capability> =
            serde_json::from_str(content).map_err(|e| CatalogError::Load(e.to_string()))?;
        Self::new(capabilities)
    }

    /// Parse a catalog from TOML with a `[[capabilities]]` array.
    pub fn from_toml(content: &str) -> Result<Self, CatalogError> {
        let document: CatalogDocument =
            toml::from_str(content).map_err(|e| CatalogError::Load(e.to_string()))?;
        Self::new(document.capabilities)
    }

    /// Load a catalog file, choosing the format by extension (`.json` or TOML).
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::Load(format!("{}: {}", path.display(), e)))?;

        if is_json(path) {
            Self::from_json(&content)
        } else {
            Self::from_toml(&content)
        }
    }

    /// Get a capability by key.
    pub fn get(&self, key: &str) -> Option<&Capability> {
        self.index.get(key).map(|&i| &self.capabilities[i])
    }

    /// Whether the catalog defines `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Number of capabilities.
    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }

    /// Iterate capabilities in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Capability> {
        self.capabilities.iter()
    }

    /// Direct dependencies of `key` (empty for unknown keys).
    pub fn dependencies_of(&self, key: &str) -> &[CapabilityKey] {
        self.get(key).map(|c| c.depends_on.as_slice()).unwrap_or(&[])
    }

    /// Capabilities that list `key` as a direct dependency.
    pub fn dependents_of(&self, key: &str) -> &[CapabilityKey] {
        self.dependents
            .get(key)
            .map(|d| d.as_slice())
            .unwrap_or(&[])
    }

    /// Every capability `key` requires, directly or transitively, in
    /// breadth-first order. Does not include `key` itself.
    pub fn prerequisites(&self, key: &str) -> Vec<CapabilityKey> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut order = Vec::new();
        let mut queue: VecDeque<&CapabilityKey> = self.dependencies_of(key).iter().collect();

        while let Some(next) = queue.pop_front() {
            if !seen.insert(next.as_str()) {
                continue;
            }
            order.push(next.clone());
            queue.extend(self.dependencies_of(next.as_str()));
        }

        order
    }

    /// Areas in order of first appearance.
    pub fn areas(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.capabilities
            .iter()
            .map(|c| c.area.as_str())
            .filter(|area| seen.insert(*area))
            .collect()
    }

    /// Capabilities belonging to `area`, in declaration order.
    pub fn in_area<'a>(&'a self, area: &'a str) -> impl Iterator<Item = &'a Capability> + 'a {
        self.capabilities.iter().filter(move |c| c.area == area)
    }

    /// Find a dependency cycle, if any.
    ///
    /// Kahn's algorithm peels off every capability whose dependencies are all
    /// resolved. Whatever remains sits on or behind a cycle; following
    /// unresolved dependencies from the smallest remaining key must revisit a
    /// node, and the walk from that node is reported.
    fn find_cycle(&self) -> Option<Vec<CapabilityKey>> {
        let mut unresolved: HashMap<&str, usize> = self
            .capabilities
            .iter()
            .map(|c| (c.key.as_str(), c.depends_on.len()))
            .collect();

        let mut queue: VecDeque<&str> = unresolved
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(key, _)| *key)
            .collect();

        let mut resolved = 0;
        while let Some(key) = queue.pop_front() {
            resolved += 1;
            for dependent in self.dependents_of(key) {
                if let Some(count) = unresolved.get_mut(dependent.as_str()) {
                    *count -= 1;
                    if *count == 0 {
                        queue.push_back(dependent.as_str());
                    }
                }
            }
        }

        if resolved == self.capabilities.len() {
            return None;
        }

        let remaining: BTreeSet<&str> = unresolved
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(key, _)| *key)
            .collect();

        let mut path: Vec<&str> = Vec::new();
        let mut current = *remaining.iter().next()?;
        loop {
            if let Some(start) = path.iter().position(|k| *k == current) {
                let mut cycle: Vec<CapabilityKey> =
                    path[start..].iter().map(|k| CapabilityKey::from(*k)).collect();
                cycle.push(CapabilityKey::from(current));
                return Some(cycle);
            }
            path.push(current);
            current = self
                .dependencies_of(current)
                .iter()
                .map(|d| d.as_str())
                .find(|d| remaining.contains(d))?;
        }
    }
}

pub(crate) fn is_json(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> Vec<Capability> {
        vec![
            Capability::new("a", "core", "A"),
            Capability::new("b", "core", "B").depends_on(["a"]),
            Capability::new("c", "reports", "C").depends_on(["b"]),
        ]
    }

    #[test]
    fn test_build_and_lookup() {
        let catalog = CapabilityCatalog::new(chain()).unwrap();
        assert_eq!(catalog.len(), 3);
        assert!(catalog.contains("b"));
        assert!(!catalog.contains("z"));
        assert_eq!(catalog.get("c").unwrap().label, "C");
        assert_eq!(catalog.dependencies_of("b"), &[CapabilityKey::from("a")]);
        assert_eq!(catalog.dependents_of("a"), &[CapabilityKey::from("b")]);
        assert!(catalog.dependents_of("c").is_empty());
    }

    #[test]
    fn test_prerequisites_are_transitive() {
        let catalog = CapabilityCatalog::new(chain()).unwrap();
        assert_eq!(
            catalog.prerequisites("c"),
            vec![CapabilityKey::from("b"), CapabilityKey::from("a")]
        );
        assert!(catalog.prerequisites("a").is_empty());
    }

    #[test]
    fn test_diamond_prerequisites_visited_once() {
        let catalog = CapabilityCatalog::new(vec![
            Capability::new("root", "core", "Root"),
            Capability::new("left", "core", "Left").depends_on(["root"]),
            Capability::new("right", "core", "Right").depends_on(["root"]),
            Capability::new("top", "core", "Top").depends_on(["left", "right"]),
        ])
        .unwrap();

        let prereqs = catalog.prerequisites("top");
        assert_eq!(prereqs.len(), 3);
        assert_eq!(prereqs.last().unwrap().as_str(), "root");
    }

    #[test]
    fn test_areas() {
        let catalog = CapabilityCatalog::new(chain()).unwrap();
        assert_eq!(catalog.areas(), vec!["core", "reports"]);
        assert_eq!(catalog.in_area("core").count(), 2);
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let mut caps = chain();
        caps.push(Capability::new("a", "core", "A again"));
        assert!(matches!(
            CapabilityCatalog::new(caps),
            Err(CatalogError::DuplicateCapability(k)) if k.as_str() == "a"
        ));
    }

    #[test]
    fn test_unknown_dependency_rejected() {
        let caps = vec![Capability::new("b", "core", "B").depends_on(["ghost"])];
        assert!(matches!(
            CapabilityCatalog::new(caps),
            Err(CatalogError::UnknownDependency { dependency, .. }) if dependency.as_str() == "ghost"
        ));
    }

    #[test]
    fn test_cycle_rejected() {
        let caps = vec![
            Capability::new("a", "core", "A").depends_on(["c"]),
            Capability::new("b", "core", "B").depends_on(["a"]),
            Capability::new("c", "core", "C").depends_on(["b"]),
            Capability::new("d", "core", "D"),
        ];

        match CapabilityCatalog::new(caps) {
            Err(CatalogError::DependencyCycle(cycle)) => {
                assert_eq!(cycle.first(), cycle.last());
                assert_eq!(cycle.len(), 4);
            }
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_self_dependency_rejected() {
        let caps = vec![Capability::new("a", "core", "A").depends_on(["a"])];
        assert!(matches!(
            CapabilityCatalog::new(caps),
            Err(CatalogError::DependencyCycle(_))
        ));
    }

    #[test]
    fn test_node_behind_cycle_reports_cycle_only() {
        let caps = vec![
            Capability::new("a", "core", "A").depends_on(["b"]),
            Capability::new("b", "core", "B").depends_on(["a"]),
            Capability::new("aa", "core", "behind").depends_on(["a"]),
        ];

        match CapabilityCatalog::new(caps) {
            Err(CatalogError::DependencyCycle(cycle)) => {
                let keys: Vec<&str> = cycle.iter().map(|k| k.as_str()).collect();
                assert_eq!(keys, vec!["a", "b", "a"]);
            }
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_from_json_and_toml() {
        let json = r#"[
            {"key": "a", "area": "core", "label": "A"},
            {"key": "b", "area": "core", "label": "B", "depends_on": ["a"]}
        ]"#;
        let catalog = CapabilityCatalog::from_json(json).unwrap();
        assert_eq!(catalog.len(), 2);

        let toml_src = r#"
[[capabilities]]
key = "a"
area = "core"
label = "A"

[[capabilities]]
key = "b"
area = "core"
label = "B"
depends_on = ["a"]
"#;
        let catalog = CapabilityCatalog::from_toml(toml_src).unwrap();
        assert_eq!(catalog.dependents_of("a").len(), 1);

        assert!(matches!(
            CapabilityCatalog::from_json("{not json"),
            Err(CatalogError::Load(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("caps.json");
        std::fs::write(&path, r#"[{"key": "a", "area": "core", "label": "A"}]"#).unwrap();
        assert_eq!(CapabilityCatalog::load(&path).unwrap().len(), 1);

        assert!(CapabilityCatalog::load(&dir.path().join("missing.toml")).is_err());
    }
}
