use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use super::StoreError;

/// Storage file name in the data directory
const STORAGE_FILE: &str = "storage.json";

/// Durable key/value storage for the session token.
pub trait TokenStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

impl<T: TokenStore + ?Sized> TokenStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

impl<T: TokenStore + ?Sized> TokenStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

// ============================================================================
// File-backed store
// ============================================================================

/// Key/value pairs persisted as a JSON object on disk.
/// Survives restarts the way browser local storage survives reloads.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(STORAGE_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_entries(&self) -> Result<BTreeMap<String, String>, StoreError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    /// Entries to build the next write on, and whether the file must be
    /// rewritten regardless. A file that no longer parses is dropped so that
    /// the write replaces it instead of failing forever.
    fn load_entries_for_write(&self) -> Result<(BTreeMap<String, String>, bool), StoreError> {
        match self.load_entries() {
            Ok(entries) => Ok((entries, false)),
            Err(StoreError::Corrupt(e)) => {
                warn!(error = %e, path = %self.path.display(), "Storage file is corrupt, replacing it");
                Ok((BTreeMap::new(), true))
            }
            Err(e) => Err(e),
        }
    }

    fn save_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.load_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let (mut entries, _) = self.load_entries_for_write()?;
        entries.insert(key.to_string(), value.to_string());
        self.save_entries(&entries)?;
        debug!(key, path = %self.path.display(), "Stored entry");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let (mut entries, corrupt) = self.load_entries_for_write()?;
        if entries.remove(key).is_some() || corrupt {
            self.save_entries(&entries)?;
            debug!(key, path = %self.path.display(), "Removed entry");
        }
        Ok(())
    }
}
