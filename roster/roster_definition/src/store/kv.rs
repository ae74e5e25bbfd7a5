//! Definition store on top of a key-value storage backend.
//!
//! Each role's record (every role version, every dashboard version and the
//! active flags) is serialized as one JSON value under one key, so every
//! lifecycle change is a single backend write. Mutations go through a
//! `tokio` mutex to make the read-modify-write atomic.

use std::sync::Arc;

use async_trait::async_trait;
use roster_core::error::{Result, StorageError};
use roster_core::id::RoleId;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::backend::StorageBackend;
use super::{RecordStore, RoleRecord};

const KEY_PREFIX: &str = "role-";
const KEY_SUFFIX: &str = ".json";

/// A definition store persisting records through a [`StorageBackend`].
pub struct KvDefinitionStore<S: StorageBackend> {
    storage: Arc<S>,
    write_lock: Mutex<()>,
}

impl<S: StorageBackend> KvDefinitionStore<S> {
    /// Create a store over `storage`.
    pub fn new(storage: S) -> Self {
        Self::with_shared(Arc::new(storage))
    }

    /// Create a store over a shared backend.
    pub fn with_shared(storage: Arc<S>) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }

    /// The underlying backend.
    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }

    async fn load_key(&self, key: &str) -> Result<Option<RoleRecord>> {
        match self.storage.load(key).await {
            Ok(bytes) => {
                let record = serde_json::from_slice(&bytes)
                    .map_err(|e| StorageError::Serialization(format!("{}: {}", key, e)))?;
                Ok(Some(record))
            }
            Err(StorageError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Backend key for a role.
///
/// Characters outside `[A-Za-z0-9._-]` are percent-encoded so any role ID
/// maps to a single flat key.
pub fn record_key(id: &RoleId) -> String {
    let mut key = String::with_capacity(KEY_PREFIX.len() + id.as_str().len() + KEY_SUFFIX.len());
    key.push_str(KEY_PREFIX);
    for byte in id.as_str().bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'.' | b'_' | b'-' => key.push(byte as char),
            _ => key.push_str(&format!("%{:02X}", byte)),
        }
    }
    key.push_str(KEY_SUFFIX);
    key
}

#[async_trait]
impl<S: StorageBackend> RecordStore for KvDefinitionStore<S> {
    async fn read(&self, id: &RoleId) -> Result<Option<RoleRecord>> {
        self.load_key(&record_key(id)).await
    }

    async fn read_all(&self) -> Result<Vec<RoleRecord>> {
        let mut keys: Vec<String> = self
            .storage
            .list()
            .await?
            .into_iter()
            .filter(|k| k.starts_with(KEY_PREFIX) && k.ends_with(KEY_SUFFIX))
            .collect();
        keys.sort();

        let mut records = Vec::with_capacity(keys.len());
        for key in keys {
            match self.load_key(&key).await? {
                Some(record) => records.push(record),
                None => warn!(key = %key, "Record disappeared while listing"),
            }
        }
        Ok(records)
    }

    async fn modify<F, T>(&self, id: &RoleId, change: F) -> Result<T>
    where
        F: FnOnce(&mut RoleRecord) -> Result<T> + Send,
        T: Send,
    {
        let _guard = self.write_lock.lock().await;
        let key = record_key(id);

        let stored = self.load_key(&key).await?;
        let mut record = stored.clone().unwrap_or_default();
        let result = change(&mut record)?;

        // Refused writes and no-op changes leave the backend untouched.
        if stored.as_ref() == Some(&record) || (stored.is_none() && record.is_empty()) {
            return Ok(result);
        }

        if record.is_empty() {
            self.storage.delete(&key).await?;
            debug!(key = %key, "Record removed");
        } else {
            let bytes = serde_json::to_vec(&record)
                .map_err(|e| StorageError::Serialization(e.to_string()))?;
            self.storage.store(&key, &bytes).await?;
            debug!(key = %key, "Record written");
        }

        Ok(result)
    }
}
