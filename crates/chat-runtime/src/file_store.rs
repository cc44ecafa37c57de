//! File-backed key-value store
//!
//! One `<key>.json` file per slot inside a directory.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chat_core::{
    error::{ChatError, Result},
    storage::KeyValueStore,
};

/// Key-value store writing each slot to its own file
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(ChatError::Storage(format!("invalid key '{key}'")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)?) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;

        // write-then-rename so a crash never leaves half a transcript
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("history"));

        assert_eq!(store.read("chatMessages").unwrap(), None);
        store.write("chatMessages", "[]").unwrap();
        assert_eq!(store.read("chatMessages").unwrap().as_deref(), Some("[]"));
        assert!(store.dir().join("chatMessages.json").exists());
        assert!(!store.dir().join("chatMessages.json.tmp").exists());

        store.delete("chatMessages").unwrap();
        store.delete("chatMessages").unwrap();
        assert_eq!(store.read("chatMessages").unwrap(), None);
    }

    #[test]
    fn test_write_overwrites_slot() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store.write("chatMessages", "[1]").unwrap();
        store.write("chatMessages", "[2]").unwrap();
        assert_eq!(store.read("chatMessages").unwrap().as_deref(), Some("[2]"));
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert!(store.write("../escape", "x").is_err());
        assert!(store.read("").is_err());
        assert!(!dir.path().join("../escape.json").exists());
    }
}
