//! Version history shared by both store implementations.
//!
//! A history holds every version of one role (or one role's dashboard) in
//! ascending order and enforces the lifecycle rules: versions are appended
//! only when the writer's expected version matches the latest one, and at
//! most one version is active at any time.

use chrono::Utc;
use roster_core::Revision;
use serde::{Deserialize, Serialize};

use super::WriteOutcome;
use crate::model::{DashboardDefinition, RoleDefinition};

/// A definition that carries a version and an active flag.
pub trait Versioned: Clone {
    /// The record's version
    fn version(&self) -> Revision;

    /// Assign the record's version
    fn set_version(&mut self, version: Revision);

    /// Whether the record is active
    fn is_active(&self) -> bool;

    /// Set the active flag
    fn set_active(&mut self, active: bool);

    /// Carry creation time over from the first version and stamp the write
    fn stamp(&mut self, first: Option<&Self>);
}

impl Versioned for RoleDefinition {
    fn version(&self) -> Revision {
        self.version
    }

    fn set_version(&mut self, version: Revision) {
        self.version = version;
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn stamp(&mut self, first: Option<&Self>) {
        let now = Utc::now();
        self.created_at = first.map(|f| f.created_at).unwrap_or(now);
        self.updated_at = now;
    }
}

impl Versioned for DashboardDefinition {
    fn version(&self) -> Revision {
        self.version
    }

    fn set_version(&mut self, version: Revision) {
        self.version = version;
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn stamp(&mut self, first: Option<&Self>) {
        let now = Utc::now();
        self.created_at = first.map(|f| f.created_at).unwrap_or(now);
        self.updated_at = now;
    }
}

/// Every version of one definition, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History<T> {
    versions: Vec<T>,
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self {
            versions: Vec::new(),
        }
    }
}

impl<T: Versioned> History<T> {
    /// Whether no version has been written.
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// The most recent version.
    pub fn latest(&self) -> Option<&T> {
        self.versions.last()
    }

    /// A specific version.
    pub fn get(&self, version: Revision) -> Option<&T> {
        self.versions.iter().find(|v| v.version() == version)
    }

    /// The active version, if any.
    pub fn active(&self) -> Option<&T> {
        self.versions.iter().find(|v| v.is_active())
    }

    /// All versions, oldest first.
    pub fn all(&self) -> &[T] {
        &self.versions
    }

    /// Append `record` as the next version.
    ///
    /// `expected` is the version the writer edited from, `None` for a new
    /// definition. The write is refused when it does not match the latest
    /// version. New versions are written inactive.
    ///
    /// Returns `None`, appending nothing, when the latest version is the
    /// last one a [`Revision`] can hold.
    pub fn append(&mut self, mut record: T, expected: Option<Revision>) -> Option<WriteOutcome> {
        let current = self.latest().map(Versioned::version);
        if current != expected {
            return Some(WriteOutcome::Conflict { current });
        }

        let version = match current {
            Some(current) => current.next()?,
            None => Revision::FIRST,
        };
        record.set_version(version);
        record.set_active(false);
        record.stamp(self.versions.first());
        self.versions.push(record);

        Some(WriteOutcome::Written(version))
    }

    /// Make `version` the only active version.
    ///
    /// # Returns
    ///
    /// * `Some(previous)` - The previously active version, if any, when `version` exists.
    /// * `None` - If there is no such version; nothing changes.
    pub fn activate(&mut self, version: Revision) -> Option<Option<Revision>> {
        if self.get(version).is_none() {
            return None;
        }

        let previous = self.active().map(Versioned::version);
        for record in &mut self.versions {
            let is_target = record.version() == version;
            record.set_active(is_target);
        }
        Some(previous)
    }

    /// Deactivate every version.
    pub fn deactivate_all(&mut self) {
        for record in &mut self.versions {
            record.set_active(false);
        }
    }

    /// Activate the latest version, or deactivate the definition.
    ///
    /// Activating deactivates every other version. Deactivating clears the
    /// flag on every version, so no version stays active afterwards.
    pub fn set_latest_active(&mut self, active: bool) -> Option<&T> {
        let latest = self.latest()?.version();
        if active {
            self.activate(latest);
        } else {
            self.deactivate_all();
        }
        self.latest()
    }

    /// Number of active versions.
    pub fn active_count(&self) -> usize {
        self.versions.iter().filter(|v| v.is_active()).count()
    }
}
