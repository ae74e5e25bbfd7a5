//! Command implementations.
//!
//! Every command loads the configured catalogs, opens the file-backed
//! definition store under the data directory and goes through the
//! [`WorkflowController`].

pub mod catalog;
pub mod dashboard;
pub mod role;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use roster_capability::{CapabilityCatalog, ScopeCatalog};
use roster_core::RosterConfig;
use roster_definition::{FileStorage, KvDefinitionStore, MenuCatalog};
use roster_workflow::{InMemoryAssignments, WorkflowController};
use serde::Serialize;
use tracing::debug;

/// Assignment counts file, looked up in the data directory.
pub const ASSIGNMENTS_FILE: &str = "assignments.json";

/// Shared state for one CLI invocation.
pub struct Context {
    pub config: RosterConfig,
    pub json: bool,
}

impl Context {
    pub fn new(config: RosterConfig, json: bool) -> Self {
        Self { config, json }
    }

    pub fn capabilities(&self) -> Result<CapabilityCatalog> {
        let path = &self.config.capability_catalog;
        CapabilityCatalog::load(path).with_context(|| {
            format!("Failed to load capability catalog {}", path.display())
        })
    }

    pub fn scopes(&self) -> Result<ScopeCatalog> {
        match &self.config.scope_catalog {
            Some(path) => ScopeCatalog::load(path)
                .with_context(|| format!("Failed to load scope catalog {}", path.display())),
            None => Ok(ScopeCatalog::default()),
        }
    }

    pub fn menus(&self) -> Result<Option<MenuCatalog>> {
        self.config
            .menu_catalog
            .as_ref()
            .map(|path| {
                MenuCatalog::load(path)
                    .with_context(|| format!("Failed to load menu catalog {}", path.display()))
            })
            .transpose()
    }

    fn assignments_path(&self) -> PathBuf {
        self.config.data_dir.join(ASSIGNMENTS_FILE)
    }

    /// Build the controller over the file store.
    pub fn controller(&self) -> Result<WorkflowController> {
        let store = KvDefinitionStore::new(FileStorage::new(&self.config.data_dir));
        let mut controller =
            WorkflowController::new(Arc::new(store), Arc::new(self.capabilities()?))
                .with_scopes(Arc::new(self.scopes()?));

        if let Some(menus) = self.menus()? {
            controller = controller.with_menus(Arc::new(menus));
        }

        let assignments_path = self.assignments_path();
        if assignments_path.exists() {
            debug!(path = %assignments_path.display(), "Loading role assignments");
            let assignments = InMemoryAssignments::load(&assignments_path).with_context(|| {
                format!("Failed to load assignments {}", assignments_path.display())
            })?;
            controller = controller.with_assignments(Arc::new(assignments));
        }

        Ok(controller)
    }

    /// Print `value` as JSON when `--json` was given, otherwise run `text`.
    pub fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce()) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            text();
        }
        Ok(())
    }
}
