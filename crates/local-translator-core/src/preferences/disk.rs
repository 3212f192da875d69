use sled::Db;
use std::path::Path;
use tracing::debug;

use super::PreferenceStore;
use crate::error::{Error, Result};

/// Disk-backed preference store using sled
pub struct DiskStore {
    db: Db,
}

impl DiskStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::PreferenceOpen(format!(
                    "Failed to create preference directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let db = sled::open(path).map_err(|e| {
            let err_str = e.to_string();
            // Detect lock errors and provide actionable fix
            if err_str.contains("WouldBlock") || err_str.contains("lock") {
                Error::PreferenceOpen(format!(
                    "Preferences locked at {}\n\n\
                    Another local-translator process is running, or a previous instance crashed.\n\
                    Close the other process, or run with --no-persist.",
                    path.display(),
                ))
            } else {
                Error::PreferenceOpen(format!(
                    "Failed to open preferences at {}: {}",
                    path.display(),
                    e
                ))
            }
        })?;

        debug!("Opened preference store at {}", path.display());

        Ok(Self { db })
    }
}

impl PreferenceStore for DiskStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let Some(value) = self
            .db
            .get(key.as_bytes())
            .map_err(|e| Error::PreferenceRead(e.to_string()))?
        else {
            return Ok(None);
        };

        String::from_utf8(value.to_vec())
            .map(Some)
            .map_err(|e| Error::PreferenceRead(format!("'{key}' is not valid UTF-8: {e}")))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.db
            .insert(key.as_bytes(), value.as_bytes())
            .map_err(|e| Error::PreferenceWrite(e.to_string()))?;

        // Flush so the choice survives a crash right after the change
        self.db
            .flush()
            .map_err(|e| Error::PreferenceWrite(format!("Flush failed: {e}")))?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.db
            .remove(key.as_bytes())
            .map_err(|e| Error::PreferenceWrite(e.to_string()))?;
        self.db
            .flush()
            .map_err(|e| Error::PreferenceWrite(format!("Flush failed: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs");

        {
            let store = DiskStore::open(&path).unwrap();
            store.set("output-language", "\"de\"").unwrap();
        }

        let store = DiskStore::open(&path).unwrap();
        assert_eq!(store.get("output-language").unwrap().as_deref(), Some("\"de\""));
    }

    #[test]
    fn test_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskStore::open(dir.path().join("prefs")).unwrap();
        store.set("selected-model", "\"llama3\"").unwrap();
        store.remove("selected-model").unwrap();
        assert!(store.get("selected-model").unwrap().is_none());
    }

    #[test]
    fn test_invalid_utf8_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskStore::open(dir.path().join("prefs")).unwrap();
        store.db.insert("favorite-model", &[0xff, 0xfe][..]).unwrap();
        assert!(matches!(store.get("favorite-model"), Err(Error::PreferenceRead(_))));
    }
}
