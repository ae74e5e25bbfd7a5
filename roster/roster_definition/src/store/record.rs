//! The per-role record both stores operate on.
//!
//! A record groups every version of a role with every version of its
//! dashboard, so that any lifecycle change to one role is a single
//! read-modify-write of one record.

use roster_core::error::LifecycleError;
use roster_core::id::RoleId;
use roster_core::Revision;
use serde::{Deserialize, Serialize};

use super::history::History;
use super::WriteOutcome;
use crate::model::{DashboardDefinition, RoleDefinition};

/// All persisted state of one role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleRecord {
    /// Role versions, oldest first
    pub roles: History<RoleDefinition>,

    /// Dashboard versions, oldest first
    #[serde(default)]
    pub dashboards: History<DashboardDefinition>,
}

impl RoleRecord {
    /// Whether the record has no role versions.
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Append a role version.
    pub fn save_role(
        &mut self,
        role: RoleDefinition,
        expected: Option<Revision>,
    ) -> Result<WriteOutcome, LifecycleError> {
        let id = role.id.clone();
        self.roles
            .append(role, expected)
            .ok_or(LifecycleError::VersionsExhausted(id))
    }

    /// Activate a role version, deactivating any other.
    pub fn publish_role(
        &mut self,
        id: &RoleId,
        version: Revision,
    ) -> Result<Option<Revision>, LifecycleError> {
        self.roles
            .activate(version)
            .ok_or_else(|| LifecycleError::VersionNotFound {
                role_id: id.clone(),
                version,
            })
    }

    /// Activate the latest role version, or deactivate all of them.
    pub fn set_role_active(
        &mut self,
        id: &RoleId,
        active: bool,
    ) -> Result<RoleDefinition, LifecycleError> {
        self.roles
            .set_latest_active(active)
            .cloned()
            .ok_or_else(|| LifecycleError::RoleNotFound(id.clone()))
    }

    /// Append a dashboard version.
    pub fn save_dashboard(
        &mut self,
        dashboard: DashboardDefinition,
        expected: Option<Revision>,
    ) -> Result<WriteOutcome, LifecycleError> {
        let id = dashboard.role_id.clone();
        self.dashboards
            .append(dashboard, expected)
            .ok_or(LifecycleError::VersionsExhausted(id))
    }

    /// Activate a dashboard version, deactivating any other.
    pub fn publish_dashboard(
        &mut self,
        id: &RoleId,
        version: Revision,
    ) -> Result<Option<Revision>, LifecycleError> {
        if self.dashboards.is_empty() {
            return Err(LifecycleError::DashboardNotFound(id.clone()));
        }
        self.dashboards
            .activate(version)
            .ok_or_else(|| LifecycleError::DashboardVersionNotFound {
                role_id: id.clone(),
                version,
            })
    }

    /// Activate a role version and a dashboard version together.
    ///
    /// Both versions are checked before either flag changes.
    pub fn publish_both(
        &mut self,
        id: &RoleId,
        role_version: Revision,
        dashboard_version: Revision,
    ) -> Result<(), LifecycleError> {
        if self.roles.get(role_version).is_none() {
            return Err(LifecycleError::VersionNotFound {
                role_id: id.clone(),
                version: role_version,
            });
        }
        if self.dashboards.get(dashboard_version).is_none() {
            return Err(LifecycleError::DashboardVersionNotFound {
                role_id: id.clone(),
                version: dashboard_version,
            });
        }

        self.publish_role(id, role_version)?;
        self.publish_dashboard(id, dashboard_version)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MenuEntry;

    fn rev(n: u32) -> Revision {
        Revision::new(n).unwrap()
    }

    fn record() -> RoleRecord {
        let mut record = RoleRecord::default();
        record
            .save_role(RoleDefinition::new("auditor", "Auditor"), None)
            .unwrap();
        record
            .save_role(RoleDefinition::new("auditor", "Auditor II"), Some(rev(1)))
            .unwrap();
        record
    }

    fn dashboard() -> DashboardDefinition {
        DashboardDefinition::new(
            "auditor",
            vec![MenuEntry::new("audits", "Audits")],
            serde_json::Value::Null,
        )
    }

    #[test]
    fn test_publish_missing_version() {
        let mut record = record();
        let id = RoleId::new("auditor");
        assert!(matches!(
            record.publish_role(&id, rev(5)),
            Err(LifecycleError::VersionNotFound { .. })
        ));
        assert!(matches!(
            record.publish_dashboard(&id, rev(1)),
            Err(LifecycleError::DashboardNotFound(_))
        ));
    }

    #[test]
    fn test_publish_both_checks_before_changing() {
        let mut record = record();
        let id = RoleId::new("auditor");
        record.publish_role(&id, rev(1)).unwrap();
        record.save_dashboard(dashboard(), None).unwrap();

        assert!(record.publish_both(&id, rev(2), rev(7)).is_err());
        assert_eq!(record.roles.active().unwrap().version, rev(1));

        record.publish_both(&id, rev(2), rev(1)).unwrap();
        assert_eq!(record.roles.active().unwrap().version, rev(2));
        assert_eq!(record.dashboards.active().unwrap().version, rev(1));
    }

    #[test]
    fn test_record_serializes_both_histories() {
        let mut record = record();
        record.save_dashboard(dashboard(), None).unwrap();

        let json = serde_json::to_string(&record).unwrap();
        let back: RoleRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
        assert_eq!(back.roles.all().len(), 2);
        assert_eq!(back.dashboards.all().len(), 1);
    }
}
