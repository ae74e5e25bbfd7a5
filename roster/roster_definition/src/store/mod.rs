//! Definition storage.
//!
//! This module provides versioned persistence for role and dashboard
//! definitions. Every write appends a version; concurrent writers are
//! detected by comparing the version they edited from with the latest one.

mod backend;
mod history;
mod in_memory;
mod kv;
mod record;

pub use backend::{FileStorage, MemoryStorage, StorageBackend};
pub use history::{History, Versioned};
pub use in_memory::InMemoryDefinitionStore;
pub use kv::KvDefinitionStore;
pub use record::RoleRecord;

use async_trait::async_trait;
use roster_core::error::{LifecycleError, Result};
use roster_core::id::RoleId;
use roster_core::Revision;
use tracing::{debug, info};

use crate::model::{DashboardDefinition, RoleDefinition};

/// Outcome of a versioned write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The record was written at this version.
    Written(Revision),

    /// The latest stored version differs from the one the writer edited
    /// from; nothing was written.
    Conflict {
        /// The latest stored version, `None` if nothing is stored.
        current: Option<Revision>,
    },
}

/// Trait for definition storage.
///
/// A definition store keeps every version of every role and of the
/// dashboard bound to it. Each method applies to a single role and is
/// atomic with respect to other calls on the same role.
#[async_trait]
pub trait DefinitionStore: Send + Sync {
    /// Append a role version.
    ///
    /// # Arguments
    ///
    /// * `role` - The role content. Version, active flag and timestamps are
    ///   assigned by the store.
    /// * `expected` - The version the caller edited from, `None` for a new role.
    ///
    /// # Returns
    ///
    /// * `Ok(WriteOutcome::Written)` - The version that was written.
    /// * `Ok(WriteOutcome::Conflict)` - If `expected` is not the latest version.
    /// * `Err` - If the store failed.
    async fn save_role(
        &self,
        role: RoleDefinition,
        expected: Option<Revision>,
    ) -> Result<WriteOutcome>;

    /// Get the latest version of a role.
    async fn get_role(&self, id: &RoleId) -> Result<Option<RoleDefinition>>;

    /// Get a specific version of a role.
    async fn get_role_version(
        &self,
        id: &RoleId,
        version: Revision,
    ) -> Result<Option<RoleDefinition>>;

    /// Get the active version of a role.
    async fn active_role(&self, id: &RoleId) -> Result<Option<RoleDefinition>>;

    /// Every version of a role, oldest first. Empty if the role is unknown.
    async fn role_versions(&self, id: &RoleId) -> Result<Vec<RoleDefinition>>;

    /// The latest version of every role, sorted by ID.
    async fn list_roles(&self) -> Result<Vec<RoleDefinition>>;

    /// Make `version` the only active version of a role.
    ///
    /// # Returns
    ///
    /// * `Ok(Option<Revision>)` - The previously active version.
    /// * `Err` - `RoleNotFound` or `VersionNotFound`, or a store failure.
    async fn publish_role(&self, id: &RoleId, version: Revision) -> Result<Option<Revision>>;

    /// Activate a role's latest version, or deactivate every version.
    async fn set_role_active(&self, id: &RoleId, active: bool) -> Result<RoleDefinition>;

    /// Remove every version of a role and of its dashboard.
    async fn delete_role(&self, id: &RoleId) -> Result<()>;

    /// Append a dashboard version for an existing role.
    ///
    /// Fails with `RoleNotFound` if the role has never been saved.
    async fn save_dashboard(
        &self,
        dashboard: DashboardDefinition,
        expected: Option<Revision>,
    ) -> Result<WriteOutcome>;

    /// Get the latest dashboard version of a role.
    async fn get_dashboard(&self, role_id: &RoleId) -> Result<Option<DashboardDefinition>>;

    /// Get a specific dashboard version.
    async fn get_dashboard_version(
        &self,
        role_id: &RoleId,
        version: Revision,
    ) -> Result<Option<DashboardDefinition>>;

    /// Get the active dashboard version of a role.
    async fn active_dashboard(&self, role_id: &RoleId) -> Result<Option<DashboardDefinition>>;

    /// Every dashboard version of a role, oldest first.
    async fn dashboard_versions(&self, role_id: &RoleId) -> Result<Vec<DashboardDefinition>>;

    /// Make `version` the only active dashboard version of a role.
    async fn publish_dashboard(
        &self,
        role_id: &RoleId,
        version: Revision,
    ) -> Result<Option<Revision>>;

    /// Activate a role version and a dashboard version in one operation.
    async fn publish_definition(
        &self,
        role_id: &RoleId,
        role_version: Revision,
        dashboard_version: Revision,
    ) -> Result<()>;

    /// Check whether a role has been saved.
    async fn role_exists(&self, id: &RoleId) -> Result<bool> {
        Ok(self.get_role(id).await?.is_some())
    }
}

/// Low-level access to per-role records.
///
/// Implementors provide atomic read and read-modify-write of one
/// [`RoleRecord`]; every [`DefinitionStore`] operation is derived from these
/// two primitives.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Read the record of a role.
    async fn read(&self, id: &RoleId) -> Result<Option<RoleRecord>>;

    /// Read every record.
    async fn read_all(&self) -> Result<Vec<RoleRecord>>;

    /// Apply `change` to the record of a role atomically.
    ///
    /// A missing record is presented as empty. When `change` fails nothing
    /// is written. A record left without role versions is removed.
    async fn modify<F, T>(&self, id: &RoleId, change: F) -> Result<T>
    where
        F: FnOnce(&mut RoleRecord) -> Result<T> + Send,
        T: Send;
}

fn require_role(record: &RoleRecord, id: &RoleId) -> Result<()> {
    if record.is_empty() {
        Err(LifecycleError::RoleNotFound(id.clone()).into())
    } else {
        Ok(())
    }
}

#[async_trait]
impl<S: RecordStore> DefinitionStore for S {
    async fn save_role(
        &self,
        role: RoleDefinition,
        expected: Option<Revision>,
    ) -> Result<WriteOutcome> {
        let id = role.id.clone();
        let outcome = self
            .modify(&id, move |record| Ok(record.save_role(role, expected)?))
            .await?;
        debug!(role = %id, ?expected, ?outcome, "Role save");
        Ok(outcome)
    }

    async fn get_role(&self, id: &RoleId) -> Result<Option<RoleDefinition>> {
        Ok(self
            .read(id)
            .await?
            .and_then(|record| record.roles.latest().cloned()))
    }

    async fn get_role_version(
        &self,
        id: &RoleId,
        version: Revision,
    ) -> Result<Option<RoleDefinition>> {
        Ok(self
            .read(id)
            .await?
            .and_then(|record| record.roles.get(version).cloned()))
    }

    async fn active_role(&self, id: &RoleId) -> Result<Option<RoleDefinition>> {
        Ok(self
            .read(id)
            .await?
            .and_then(|record| record.roles.active().cloned()))
    }

    async fn role_versions(&self, id: &RoleId) -> Result<Vec<RoleDefinition>> {
        Ok(self
            .read(id)
            .await?
            .map(|record| record.roles.all().to_vec())
            .unwrap_or_default())
    }

    async fn list_roles(&self) -> Result<Vec<RoleDefinition>> {
        let mut roles: Vec<RoleDefinition> = self
            .read_all()
            .await?
            .into_iter()
            .filter_map(|record| record.roles.latest().cloned())
            .collect();
        roles.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(roles)
    }

    async fn publish_role(&self, id: &RoleId, version: Revision) -> Result<Option<Revision>> {
        let previous = self
            .modify(id, |record| {
                require_role(record, id)?;
                Ok(record.publish_role(id, version)?)
            })
            .await?;
        info!(role = %id, %version, ?previous, "Role version published");
        Ok(previous)
    }

    async fn set_role_active(&self, id: &RoleId, active: bool) -> Result<RoleDefinition> {
        let role = self
            .modify(id, |record| Ok(record.set_role_active(id, active)?))
            .await?;
        info!(role = %id, version = %role.version, active, "Role active flag set");
        Ok(role)
    }

    async fn delete_role(&self, id: &RoleId) -> Result<()> {
        self.modify(id, |record| {
            require_role(record, id)?;
            *record = RoleRecord::default();
            Ok(())
        })
        .await?;
        info!(role = %id, "Role deleted");
        Ok(())
    }

    async fn save_dashboard(
        &self,
        dashboard: DashboardDefinition,
        expected: Option<Revision>,
    ) -> Result<WriteOutcome> {
        let id = dashboard.role_id.clone();
        let outcome = self
            .modify(&id, |record| {
                require_role(record, &id)?;
                Ok(record.save_dashboard(dashboard, expected)?)
            })
            .await?;
        debug!(role = %id, ?expected, ?outcome, "Dashboard save");
        Ok(outcome)
    }

    async fn get_dashboard(&self, role_id: &RoleId) -> Result<Option<DashboardDefinition>> {
        Ok(self
            .read(role_id)
            .await?
            .and_then(|record| record.dashboards.latest().cloned()))
    }

    async fn get_dashboard_version(
        &self,
        role_id: &RoleId,
        version: Revision,
    ) -> Result<Option<DashboardDefinition>> {
        Ok(self
            .read(role_id)
            .await?
            .and_then(|record| record.dashboards.get(version).cloned()))
    }

    async fn active_dashboard(&self, role_id: &RoleId) -> Result<Option<DashboardDefinition>> {
        Ok(self
            .read(role_id)
            .await?
            .and_then(|record| record.dashboards.active().cloned()))
    }

    async fn dashboard_versions(&self, role_id: &RoleId) -> Result<Vec<DashboardDefinition>> {
        Ok(self
            .read(role_id)
            .await?
            .map(|record| record.dashboards.all().to_vec())
            .unwrap_or_default())
    }

    async fn publish_dashboard(
        &self,
        role_id: &RoleId,
        version: Revision,
    ) -> Result<Option<Revision>> {
        let previous = self
            .modify(role_id, |record| {
                require_role(record, role_id)?;
                Ok(record.publish_dashboard(role_id, version)?)
            })
            .await?;
        info!(role = %role_id, %version, ?previous, "Dashboard version published");
        Ok(previous)
    }

    async fn publish_definition(
        &self,
        role_id: &RoleId,
        role_version: Revision,
        dashboard_version: Revision,
    ) -> Result<()> {
        self.modify(role_id, |record| {
            require_role(record, role_id)?;
            Ok(record.publish_both(role_id, role_version, dashboard_version)?)
        })
        .await?;
        info!(
            role = %role_id,
            %role_version,
            %dashboard_version,
            "Role and dashboard published"
        );
        Ok(())
    }
}
