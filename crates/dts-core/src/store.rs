//! Configuration store
//!
//! A single durable slot holding one serialised [`TestConfiguration`].
//! Saving overwrites unconditionally. Loading never fails: an unreadable or
//! malformed slot is logged and treated as empty.

use crate::error::StoreError;
use dts_model::TestConfiguration;
use parking_lot::Mutex;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Single-slot configuration persistence
///
/// Backends only move the raw JSON blob; encoding and the degrade-on-error
/// policy live in the provided `save`/`load`.
#[async_trait::async_trait]
pub trait ConfigStore: Send + Sync {
    /// Read the raw blob, `None` if the slot is empty
    async fn read(&self) -> Result<Option<String>, StoreError>;

    /// Replace the raw blob
    async fn write(&self, blob: String) -> Result<(), StoreError>;

    /// Persist a configuration, overwriting any previous one
    async fn save(&self, config: &TestConfiguration) -> Result<(), StoreError> {
        let blob = config.to_json()?;
        self.write(blob).await?;
        tracing::debug!(config_type = %config.config_type, "configuration persisted");
        Ok(())
    }

    /// Load the persisted configuration
    ///
    /// Read and parse failures are logged and reported as `None`.
    async fn load(&self) -> Option<TestConfiguration> {
        let blob = match self.read().await {
            Ok(Some(blob)) => blob,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "configuration slot unreadable; treating as empty");
                return None;
            }
        };

        match TestConfiguration::from_json(&blob) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(error = %e, "persisted configuration malformed; treating as empty");
                None
            }
        }
    }
}

/// In-process store
///
/// Keeps the serialised blob rather than the struct so loads go through
/// the same decode path as the file store.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    slot: Mutex<Option<String>>,
}

impl MemoryConfigStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create store holding a raw blob
    #[inline]
    #[must_use]
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(blob.into())),
        }
    }

    /// Current raw blob
    #[must_use]
    pub fn blob(&self) -> Option<String> {
        self.slot.lock().clone()
    }
}

#[async_trait::async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn read(&self) -> Result<Option<String>, StoreError> {
        Ok(self.slot.lock().clone())
    }

    async fn write(&self, blob: String) -> Result<(), StoreError> {
        *self.slot.lock() = Some(blob);
        Ok(())
    }
}

/// File-backed store
///
/// Writes go to a sibling temp file which is then renamed over the slot,
/// so a crash mid-write leaves the previous configuration intact.
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    /// Create store at `path`
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Slot file path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait::async_trait]
impl ConfigStore for FileConfigStore {
    async fn read(&self) -> Result<Option<String>, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io_error(&self.path, e)),
        }
    }

    async fn write(&self, blob: String) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io_error(parent, e))?;
        }

        let temp = self.temp_path();
        tokio::fs::write(&temp, blob)
            .await
            .map_err(|e| StoreError::io_error(&temp, e))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|e| StoreError::io_error(&self.path, e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dts_model::{ConfigType, TrafficProfile, Zone};

    fn config(content: &str) -> TestConfiguration {
        TestConfiguration::new(ConfigType::Sdwan, content)
            .with_zone(Zone::EuCentral)
            .with_traffic(TrafficProfile::Burst100)
    }

    #[tokio::test]
    async fn memory_store_overwrites() {
        let store = MemoryConfigStore::new();
        assert!(store.load().await.is_none());

        let first = config("policy a");
        let second = config("policy b");
        store.save(&first).await.unwrap();
        store.save(&second).await.unwrap();

        assert_eq!(store.load().await, Some(second));
    }

    #[tokio::test]
    async fn malformed_blob_degrades_to_none() {
        let store = MemoryConfigStore::with_blob("{\"configType\": \"warp-drive\"}");
        assert!(store.load().await.is_none());

        let store = MemoryConfigStore::with_blob("");
        assert!(store.load().await.is_none());
    }

    #[tokio::test]
    async fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let saved = config("branch-policy");
        FileConfigStore::new(&path).save(&saved).await.unwrap();

        // A fresh handle on the same path sees the saved slot
        let reopened = FileConfigStore::new(&path);
        assert_eq!(reopened.load().await, Some(saved));
        assert!(!reopened.temp_path().exists());
    }

    #[tokio::test]
    async fn file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileConfigStore::new(dir.path().join("absent.json"));
        assert!(matches!(store.read().await, Ok(None)));
        assert!(store.load().await.is_none());
    }

    #[tokio::test]
    async fn file_store_corrupt_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ truncated").unwrap();

        assert!(FileConfigStore::new(&path).load().await.is_none());
    }

    #[tokio::test]
    async fn file_store_unreadable_path_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be
        let store = FileConfigStore::new(dir.path());
        assert!(store.read().await.is_err());
        assert!(store.load().await.is_none());
    }
}
