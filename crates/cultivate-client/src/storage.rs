//! # Durable Credential Storage
//!
//! The session mirrors its three values (access token, refresh token,
//! serialized user) into a [`CredentialStore`] so that a restarted process
//! picks the session back up. The store is injected, never a global.
//!
//! - [`MemoryStore`] keeps everything in a map. Tests use it.
//! - [`FileStore`] keeps a single JSON object on disk. Every write goes to a
//!   sibling temporary file which is then renamed over the original, so a
//!   crash never leaves a half-written file.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, RwLock};

/// The persisted values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    AccessToken,
    RefreshToken,
    User,
}

impl StorageKey {
    pub const ALL: [StorageKey; 3] = [Self::AccessToken, Self::RefreshToken, Self::User];

    /// Key name in the underlying store.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccessToken => "cultivateco_token",
            Self::RefreshToken => "cultivateco_refresh_token",
            Self::User => "cultivateco_user",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from a credential store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("credential file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to serialize {key}: {source}")]
    Serialize {
        key: StorageKey,
        source: serde_json::Error,
    },
}

/// Small get/set/clear capability over string values.
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: StorageKey) -> Result<Option<String>, StorageError>;

    fn set(&self, key: StorageKey, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: StorageKey) -> Result<(), StorageError>;

    /// Remove every session value.
    fn clear(&self) -> Result<(), StorageError> {
        for key in StorageKey::ALL {
            self.remove(key)?;
        }
        Ok(())
    }
}

// -- In-memory ----------------------------------------------------------------

/// In-memory store. Contents are lost with the process.
#[derive(Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<StorageKey, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of values held. Test helper for "was it cleared" checks.
    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<_> = self.values.read().keys().map(|k| k.as_str()).collect();
        f.debug_struct("MemoryStore").field("keys", &keys).finish()
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, key: StorageKey) -> Result<Option<String>, StorageError> {
        Ok(self.values.read().get(&key).cloned())
    }

    fn set(&self, key: StorageKey, value: &str) -> Result<(), StorageError> {
        self.values.write().insert(key, value.to_string());
        Ok(())
    }

    fn remove(&self, key: StorageKey) -> Result<(), StorageError> {
        self.values.write().remove(&key);
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.values.write().clear();
        Ok(())
    }
}

// -- File-backed --------------------------------------------------------------

/// JSON-file store: `{"cultivateco_token": "...", ...}`.
///
/// A missing file reads as an empty store. The file is created, along with
/// its parent directory, on first write.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(StorageError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn write_all(&self, values: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let io_err = |source| StorageError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(values).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json).map_err(io_err)?;
        restrict_permissions(&tmp).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)
    }

    fn update(&self, f: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<(), StorageError> {
        let _guard = self.lock.lock();
        let mut values = self.read_all()?;
        f(&mut values);
        self.write_all(&values)
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

impl CredentialStore for FileStore {
    fn get(&self, key: StorageKey) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock();
        Ok(self.read_all()?.remove(key.as_str()))
    }

    fn set(&self, key: StorageKey, value: &str) -> Result<(), StorageError> {
        self.update(|values| {
            values.insert(key.as_str().to_string(), value.to_string());
        })
    }

    fn remove(&self, key: StorageKey) -> Result<(), StorageError> {
        self.update(|values| {
            values.remove(key.as_str());
        })
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.update(|values| {
            for key in StorageKey::ALL {
                values.remove(key.as_str());
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_set_get_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get(StorageKey::AccessToken).unwrap(), None);
        store.set(StorageKey::AccessToken, "a1").unwrap();
        assert_eq!(store.get(StorageKey::AccessToken).unwrap().as_deref(), Some("a1"));
        store.remove(StorageKey::AccessToken).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn memory_store_clear_removes_all_three() {
        let store = MemoryStore::new();
        for key in StorageKey::ALL {
            store.set(key, "v").unwrap();
        }
        assert_eq!(store.len(), 3);
        store.clear().unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn memory_store_debug_does_not_print_values() {
        let store = MemoryStore::new();
        store.set(StorageKey::AccessToken, "super-secret").unwrap();
        let rendered = format!("{store:?}");
        assert!(rendered.contains("cultivateco_token"));
        assert!(!rendered.contains("super-secret"));
    }

    #[test]
    fn file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested/session.json"));
        assert_eq!(store.get(StorageKey::User).unwrap(), None);
        store.clear().unwrap();
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        {
            let store = FileStore::new(&path);
            store.set(StorageKey::AccessToken, "a1").unwrap();
            store.set(StorageKey::RefreshToken, "r1").unwrap();
        }
        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get(StorageKey::AccessToken).unwrap().as_deref(), Some("a1"));
        assert_eq!(reopened.get(StorageKey::RefreshToken).unwrap().as_deref(), Some("r1"));

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["cultivateco_token"], "a1");
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn file_store_clear_keeps_unrelated_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, r#"{"theme":"dark","cultivateco_token":"a1"}"#).unwrap();
        let store = FileStore::new(&path);
        store.clear().unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw, serde_json::json!({"theme": "dark"}));
    }

    #[test]
    fn file_store_reports_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = FileStore::new(&path);
        assert!(matches!(
            store.get(StorageKey::AccessToken),
            Err(StorageError::Corrupt { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn file_store_writes_owner_only_file() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        FileStore::new(&path).set(StorageKey::AccessToken, "a1").unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
