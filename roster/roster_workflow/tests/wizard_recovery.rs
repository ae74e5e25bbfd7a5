use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use roster_capability::{Capability, CapabilityCatalog};
use roster_core::error::{ErrorKind, StorageError};
use roster_core::id::RoleId;
use roster_core::Revision;
use roster_definition::{
    DashboardDefinition, FileStorage, InMemoryDefinitionStore, KvDefinitionStore, MemoryStorage,
    MenuEntry, RoleDefinition, StorageBackend,
};
use roster_workflow::{DefinitionWizard, WizardState, WorkflowController};

/// A backend whose writes can be switched off.
struct FlakyStorage {
    inner: MemoryStorage,
    failing: AtomicBool,
}

impl FlakyStorage {
    fn new() -> Self {
        Self {
            inner: MemoryStorage::new(),
            failing: AtomicBool::new(false),
        }
    }

    fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StorageError::Backend("connection reset".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl StorageBackend for FlakyStorage {
    async fn store(&self, key: &str, data: &[u8]) -> Result<(), StorageError> {
        self.check()?;
        self.inner.store(key, data).await
    }

    async fn load(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        self.inner.load(key).await
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.check()?;
        self.inner.delete(key).await
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        self.inner.exists(key).await
    }

    async fn list(&self) -> Result<Vec<String>, StorageError> {
        self.inner.list().await
    }
}

fn catalog() -> Arc<CapabilityCatalog> {
    Arc::new(
        CapabilityCatalog::new(vec![
            Capability::new("reports.view", "reports", "View reports"),
            Capability::new("reports.export", "reports", "Export reports")
                .depends_on(["reports.view"]),
        ])
        .unwrap(),
    )
}

fn fill_role(wizard: &mut DefinitionWizard) {
    let draft = wizard.role_mut().unwrap();
    draft.set_id("analyst").unwrap();
    draft.set_label("Analyst");
    wizard.toggle_capability("reports.export").unwrap();
    wizard.set_scope("data", "department").unwrap();
}

#[tokio::test]
async fn failed_role_submit_can_be_retried() {
    let storage = Arc::new(FlakyStorage::new());
    let store = KvDefinitionStore::with_shared(Arc::clone(&storage));
    let controller = Arc::new(WorkflowController::new(Arc::new(store), catalog()));

    let mut wizard = DefinitionWizard::new(Arc::clone(&controller));
    fill_role(&mut wizard);
    let before = wizard.role().clone();

    storage.set_failing(true);
    let err = wizard.submit_role().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Persistence);
    assert_eq!(wizard.state(), &WizardState::DraftingRole);
    assert_eq!(wizard.role(), &before);
    assert!(wizard.dashboard().is_none());

    storage.set_failing(false);
    assert_eq!(wizard.submit_role().await.unwrap(), Revision::FIRST);
}

#[tokio::test]
async fn failed_dashboard_submit_keeps_step_two() {
    let storage = Arc::new(FlakyStorage::new());
    let store = KvDefinitionStore::with_shared(Arc::clone(&storage));
    let controller = Arc::new(WorkflowController::new(Arc::new(store), catalog()));

    let mut wizard = DefinitionWizard::new(Arc::clone(&controller));
    fill_role(&mut wizard);
    wizard.submit_role().await.unwrap();
    wizard.add_menu_entry("reports", None).unwrap();
    let state = wizard.state().clone();
    let menu = wizard.dashboard().unwrap().menu().to_vec();

    storage.set_failing(true);
    assert!(wizard.submit_dashboard().await.is_err());
    assert_eq!(wizard.state(), &state);
    assert_eq!(wizard.dashboard().unwrap().menu(), menu.as_slice());
    assert!(wizard.dashboard().unwrap().base_version().is_none());

    storage.set_failing(false);
    wizard.submit_dashboard().await.unwrap();
    assert!(wizard.state().is_terminal());

    let id = RoleId::new("analyst");
    assert!(controller.active_role(&id).await.unwrap().is_some());
    assert!(controller.active_dashboard(&id).await.unwrap().is_some());
}

#[tokio::test]
async fn concurrent_publishes_leave_one_active_version() {
    let controller = Arc::new(WorkflowController::new(
        Arc::new(InMemoryDefinitionStore::new()),
        catalog(),
    ));

    let mut wizard = DefinitionWizard::new(Arc::clone(&controller));
    fill_role(&mut wizard);
    wizard.submit_role().await.unwrap();

    let id = RoleId::new("analyst");
    let mut latest = controller.get_role(&id).await.unwrap();
    for _ in 0..4 {
        let next = RoleDefinition::new("analyst", "Analyst")
            .with_capabilities(latest.capabilities.clone())
            .with_scopes(latest.scopes.clone());
        controller.save_role(next, Some(latest.version)).await.unwrap();
        latest = controller.get_role(&id).await.unwrap();
    }

    let mut handles = Vec::new();
    for n in 1..=5u32 {
        let controller = Arc::clone(&controller);
        let id = id.clone();
        handles.push(tokio::spawn(async move {
            controller
                .publish_role(&id, Revision::new(n).unwrap())
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let active = controller
        .role_versions(&id)
        .await
        .unwrap()
        .into_iter()
        .filter(|role| role.active)
        .count();
    assert_eq!(active, 1);
}

#[tokio::test]
async fn file_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let id = RoleId::new("analyst");

    {
        let store = KvDefinitionStore::new(FileStorage::new(dir.path()));
        let controller = Arc::new(WorkflowController::new(Arc::new(store), catalog()));
        let mut wizard = DefinitionWizard::new(controller);
        fill_role(&mut wizard);
        wizard.submit_role().await.unwrap();
        wizard.add_menu_entry("reports", None).unwrap();
        wizard.submit_dashboard().await.unwrap();
    }

    let store = KvDefinitionStore::new(FileStorage::new(dir.path()));
    let controller = WorkflowController::new(Arc::new(store), catalog());
    let role = controller.active_role(&id).await.unwrap().unwrap();
    assert_eq!(role.capabilities.len(), 2);

    let dashboard: DashboardDefinition = controller.active_dashboard(&id).await.unwrap().unwrap();
    assert_eq!(dashboard.menu, vec![MenuEntry::new("reports", "reports")]);
}
