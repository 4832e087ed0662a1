//! Local persistent key-value storage.
//!
//! [`FileStorage`] keeps one JSON document per key under the launcher data
//! directory (`$XDG_DATA_HOME/launcher/<key>.json` by default).
//! [`MemoryStorage`] keeps everything in process memory and is meant for tests
//! and throwaway runs.

use std::collections::HashMap;
use std::env;
use std::ffi::OsString;
use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::debug;

const DATA_DIR_NAME: &str = "launcher";

/// Errors for persisted storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No suitable user data directory is available.
    #[error("unable to determine data directory (set XDG_DATA_HOME or HOME)")]
    DataDirUnavailable,
    /// Keys become file names, so only a safe alphabet is allowed.
    #[error("invalid storage key '{0}': use letters, digits, '-' or '_'")]
    InvalidKey(String),
    /// Filesystem I/O failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Serialization/deserialization failed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// String key-value store that survives restarts.
pub trait Storage: Send + Sync + Debug {
    /// Returns the stored value, or `None` when the key is absent.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the backing store cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the backing store cannot be written.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Returns `true` when something was removed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the backing store cannot be modified.
    fn remove_item(&self, key: &str) -> Result<bool, StorageError>;
}

/// File-per-key storage under a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Uses `dir` as the storage root. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Uses the default per-user data directory.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::DataDirUnavailable`] if no usable directory is found.
    pub fn in_default_dir() -> Result<Self, StorageError> {
        Ok(Self::new(default_data_dir()?))
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;
        // Readers only ever see a complete document.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        debug!(key, path = %path.display(), "stored item");
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<bool, StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(error) => Err(error.into()),
        }
    }
}

/// In-memory storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<bool, StorageError> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(items.remove(key).is_some())
    }
}

/// Returns the default data directory for persisted launcher state.
///
/// # Errors
///
/// Returns [`StorageError::DataDirUnavailable`] if no usable directory is found.
pub fn default_data_dir() -> Result<PathBuf, StorageError> {
    resolve_data_dir(
        sanitize_env_path(env::var_os("XDG_DATA_HOME")),
        sanitize_env_path(env::var_os("HOME")),
        sanitize_env_path(env::var_os("APPDATA")),
    )
}

fn sanitize_env_path(value: Option<OsString>) -> Option<PathBuf> {
    let value = value?;
    if value.to_string_lossy().trim().is_empty() {
        return None;
    }

    Some(PathBuf::from(value))
}

fn resolve_data_dir(
    xdg_data_home: Option<PathBuf>,
    home: Option<PathBuf>,
    app_data: Option<PathBuf>,
) -> Result<PathBuf, StorageError> {
    if let Some(xdg) = xdg_data_home {
        return Ok(xdg.join(DATA_DIR_NAME));
    }
    if let Some(home) = home {
        return Ok(home.join(".local").join("share").join(DATA_DIR_NAME));
    }
    if let Some(app_data) = app_data {
        return Ok(app_data.join(DATA_DIR_NAME));
    }

    Err(StorageError::DataDirUnavailable)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_storage_set_get_remove() {
        let temp = TempDir::new().unwrap();
        let storage = FileStorage::new(temp.path().join("nested"));

        assert_eq!(storage.get_item("user").unwrap(), None);
        storage.set_item("user", r#"{"email":"a@b.cd"}"#).unwrap();
        assert_eq!(
            storage.get_item("user").unwrap().as_deref(),
            Some(r#"{"email":"a@b.cd"}"#)
        );
        assert!(storage.remove_item("user").unwrap());
        assert!(!storage.remove_item("user").unwrap());
        assert_eq!(storage.get_item("user").unwrap(), None);
    }

    #[test]
    fn test_file_storage_keys_are_independent() {
        let temp = TempDir::new().unwrap();
        let storage = FileStorage::new(temp.path());
        storage.set_item("user", "1").unwrap();
        storage.set_item("lastLaunch", "2").unwrap();
        storage.remove_item("user").unwrap();
        assert_eq!(storage.get_item("lastLaunch").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_file_storage_rejects_path_like_keys() {
        let temp = TempDir::new().unwrap();
        let storage = FileStorage::new(temp.path());
        assert!(matches!(
            storage.set_item("../escape", "x"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(storage.get_item(""), Err(StorageError::InvalidKey(_))));
    }

    #[test]
    fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::new();
        storage.set_item("k", "v").unwrap();
        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("v"));
        assert!(storage.remove_item("k").unwrap());
        assert_eq!(storage.get_item("k").unwrap(), None);
    }

    #[test]
    fn test_resolve_data_dir_priority() {
        let xdg = PathBuf::from("/xdg");
        let home = PathBuf::from("/home/player");
        assert_eq!(
            resolve_data_dir(Some(xdg), Some(home.clone()), None).unwrap(),
            PathBuf::from("/xdg/launcher")
        );
        assert_eq!(
            resolve_data_dir(None, Some(home), None).unwrap(),
            PathBuf::from("/home/player/.local/share/launcher")
        );
        assert!(matches!(
            resolve_data_dir(None, None, None),
            Err(StorageError::DataDirUnavailable)
        ));
    }

    #[test]
    fn test_sanitize_env_path_ignores_blank() {
        assert_eq!(sanitize_env_path(Some(OsString::from("  "))), None);
        assert_eq!(sanitize_env_path(None), None);
    }
}
