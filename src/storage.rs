use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;

/// Fixed key the task collection is persisted under.
pub const STORAGE_KEY: &str = "todos-v2";

#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(err) => write!(f, "io error: {err}"),
            StorageError::Json(err) => write!(f, "json error: {err}"),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(value: std::io::Error) -> Self {
        StorageError::Io(value)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(value: serde_json::Error) -> Self {
        StorageError::Json(value)
    }
}

/// Key/value blob store the engine persists through. Mirrors the
/// `getItem`/`setItem` surface of a browser local store: a missing key is
/// `None`, never an error.
pub trait BlobStore {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// File-backed store: each key maps to `<key>.json` under a root directory.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn ensure_dirs(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    fn write_atomic(&self, path: PathBuf, value: &str) -> Result<(), StorageError> {
        let temp_path = path.with_extension("tmp");
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(temp_path, path)?;
        Ok(())
    }
}

impl BlobStore for FileStore {
    fn get_item(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.key_path(key)).ok()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.write_atomic(self.key_path(key), value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());
        assert!(store.get_item(STORAGE_KEY).is_none());
    }

    #[test]
    fn set_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());
        store.ensure_dirs().unwrap();
        store.set_item(STORAGE_KEY, r#"[{"id":"a","text":"x"}]"#).unwrap();
        assert_eq!(
            store.get_item(STORAGE_KEY).as_deref(),
            Some(r#"[{"id":"a","text":"x"}]"#)
        );
        assert!(dir.path().join("todos-v2.json").is_file());
    }

    #[test]
    fn set_overwrites_previous_value_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());
        store.set_item("k", "one").unwrap();
        store.set_item("k", "two").unwrap();
        assert_eq!(store.get_item("k").as_deref(), Some("two"));
        assert!(!dir.path().join("k.tmp").exists());
    }

    #[test]
    fn set_item_surfaces_io_errors() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should go makes the rename fail.
        fs::create_dir_all(dir.path().join("k.json")).unwrap();
        let store = FileStore::new(dir.path().to_path_buf());
        assert!(store.set_item("k", "x").is_err());
    }
}
