//! Durable local storage for client state.
//!
//! One JSON file per namespace under the configured data directory,
//! written on every mutation so that state survives process restarts.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ApiError, ClientResult};

/// File-backed key/value storage with JSON values.
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory holding the namespace files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, namespace: &str) -> PathBuf {
        self.root.join(format!("{namespace}.json"))
    }

    /// Loads the record stored under `namespace`, or `None` when the
    /// namespace has never been written.
    pub fn load<T: DeserializeOwned>(&self, namespace: &str) -> ClientResult<Option<T>> {
        let path = self.path_for(namespace);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(storage_error(&path, &err)),
        };

        let value = serde_json::from_str(&raw)
            .map_err(|e| ApiError::Storage(format!("{}: {}", path.display(), e)))?;
        Ok(Some(value))
    }

    /// Writes the record for `namespace`, replacing any previous value.
    pub fn save<T: Serialize>(&self, namespace: &str, value: &T) -> ClientResult<()> {
        fs::create_dir_all(&self.root).map_err(|e| storage_error(&self.root, &e))?;

        let path = self.path_for(namespace);
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| ApiError::Storage(format!("{}: {}", path.display(), e)))?;
        fs::write(&path, json).map_err(|e| storage_error(&path, &e))
    }

    /// Removes the record for `namespace`. Removing a namespace that
    /// was never written is not an error.
    pub fn remove(&self, namespace: &str) -> ClientResult<()> {
        let path = self.path_for(namespace);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(storage_error(&path, &err)),
        }
    }
}

fn storage_error(path: &Path, err: &io::Error) -> ApiError {
    ApiError::Storage(format!("{}: {}", path.display(), err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path());

        storage
            .save("prefs", &vec!["a".to_string(), "b".to_string()])
            .unwrap();

        let loaded: Option<Vec<String>> = storage.load("prefs").unwrap();
        assert_eq!(loaded, Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn test_load_missing_namespace_is_none() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path());

        let loaded: Option<String> = storage.load("nothing").unwrap();
        assert_eq!(loaded, None);
    }

    #[test]
    fn test_save_overwrites_previous_record() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path());

        storage.save("counter", &1u32).unwrap();
        storage.save("counter", &2u32).unwrap();

        let loaded: Option<u32> = storage.load("counter").unwrap();
        assert_eq!(loaded, Some(2));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path());

        storage.save("gone", &"x".to_string()).unwrap();
        storage.remove("gone").unwrap();
        storage.remove("gone").unwrap();

        let loaded: Option<String> = storage.load("gone").unwrap();
        assert_eq!(loaded, None);
    }

    #[test]
    fn test_corrupt_record_surfaces_storage_error() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path());

        fs::create_dir_all(dir.path()).unwrap();
        fs::write(dir.path().join("bad.json"), "{not json").unwrap();

        let loaded: ClientResult<Option<u32>> = storage.load("bad");
        assert!(matches!(loaded, Err(ApiError::Storage(_))));
    }
}
