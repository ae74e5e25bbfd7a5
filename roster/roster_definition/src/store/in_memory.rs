//! In-memory definition store.
//!
//! Records live in a `DashMap` keyed by role ID. Every change to a role is
//! applied while holding that role's map entry, so changes to one role are
//! serialized while different roles proceed in parallel.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use roster_core::error::Result;
use roster_core::id::RoleId;

use super::{RecordStore, RoleRecord};

/// An in-memory definition store.
#[derive(Clone, Default)]
pub struct InMemoryDefinitionStore {
    /// The records, indexed by role ID.
    records: Arc<DashMap<RoleId, RoleRecord>>,
}

impl InMemoryDefinitionStore {
    /// Create a new in-memory definition store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored roles.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no role is stored.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl RecordStore for InMemoryDefinitionStore {
    async fn read(&self, id: &RoleId) -> Result<Option<RoleRecord>> {
        Ok(self.records.get(id).map(|r| r.value().clone()))
    }

    async fn read_all(&self) -> Result<Vec<RoleRecord>> {
        Ok(self.records.iter().map(|r| r.value().clone()).collect())
    }

    async fn modify<F, T>(&self, id: &RoleId, change: F) -> Result<T>
    where
        F: FnOnce(&mut RoleRecord) -> Result<T> + Send,
        T: Send,
    {
        // Work on a copy so a failed change leaves the entry untouched.
        match self.records.entry(id.clone()) {
            Entry::Occupied(mut occupied) => {
                let mut working = occupied.get().clone();
                let result = change(&mut working)?;
                if working.is_empty() {
                    occupied.remove();
                } else {
                    *occupied.get_mut() = working;
                }
                Ok(result)
            }
            Entry::Vacant(vacant) => {
                let mut working = RoleRecord::default();
                let result = change(&mut working)?;
                if !working.is_empty() {
                    vacant.insert(working);
                }
                Ok(result)
            }
        }
    }
}
