//! Key-value storage backends.
//!
//! A backend stores opaque byte values under flat string keys. The
//! definition store on top of it decides what the keys and values mean.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use roster_core::error::StorageError;
use tokio::sync::RwLock;

/// Byte-level persistence used by [`KvDefinitionStore`](super::KvDefinitionStore).
#[async_trait]
pub trait StorageBackend: Send + Sync + 'static {
    /// Write `data` under `key`, overwriting what was there.
    async fn store(&self, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Read the bytes under `key`, or `StorageError::NotFound`.
    async fn load(&self, key: &str) -> Result<Vec<u8>, StorageError>;

    /// Remove `key`. A missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    async fn exists(&self, key: &str) -> Result<bool, StorageError>;

    /// Every key currently held, in no particular order.
    async fn list(&self) -> Result<Vec<String>, StorageError>;
}

/// File-based storage backend, one file per key.
pub struct FileStorage {
    base_dir: PathBuf,
}

impl FileStorage {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        FileStorage {
            base_dir: base_dir.into(),
        }
    }

    /// Directory the definition files live in.
    pub fn base_dir(&self) -> &std::path::Path {
        &self.base_dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.base_dir.join(key)
    }
}

#[async_trait]
impl StorageBackend for FileStorage {
    async fn store(&self, key: &str, data: &[u8]) -> Result<(), StorageError> {
        let path = self.path_for(key);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Write to a temporary file, sync, then rename over the target so a
        // reader never observes a partially written value.
        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, data).await?;

        let file = tokio::fs::File::open(&temp_path).await?;
        file.sync_all().await?;

        tokio::fs::rename(&temp_path, &path).await?;

        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        match tokio::fs::read(self.path_for(key)).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        match tokio::fs::metadata(self.path_for(key)).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    async fn list(&self) -> Result<Vec<String>, StorageError> {
        let mut dir = match tokio::fs::read_dir(&self.base_dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::Io(e)),
        };

        let mut entries = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            if entry.file_type().await?.is_file() {
                if let Some(file_name) = entry.file_name().to_str() {
                    entries.push(file_name.to_string());
                }
            }
        }

        Ok(entries)
    }
}

/// Process-local backend for tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryStorage {
    data: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    async fn store(&self, key: &str, data: &[u8]) -> Result<(), StorageError> {
        self.data
            .write()
            .await
            .insert(key.to_string(), data.to_vec());
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        self.data
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.data.write().await.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.data.read().await.contains_key(key))
    }

    async fn list(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.data.read().await.keys().cloned().collect())
    }
}
