//! Transcript Persistence
//!
//! Key-value storage seam (browser localStorage, a directory of files, or
//! memory) plus the helpers that read and write the transcript slot.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::Result;
use crate::message::Transcript;

/// Slot name the transcript is stored under
pub const TRANSCRIPT_KEY: &str = "chatMessages";

/// Key-value store trait for persistence
pub trait KeyValueStore {
    /// Read a value
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Overwrite a value
    fn write(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a value; missing keys are not an error
    fn delete(&self, key: &str) -> Result<()>;
}

/// In-memory store (for development/testing)
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with one entry
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let store = Self::new();
        store.entries.borrow_mut().insert(key.into(), value.into());
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Load the persisted transcript. `Ok(None)` when nothing is stored.
pub fn load_transcript(store: &dyn KeyValueStore, key: &str) -> Result<Option<Transcript>> {
    store
        .read(key)?
        .map(|raw| Transcript::from_json(&raw))
        .transpose()
}

/// Overwrite the transcript slot
pub fn save_transcript(store: &dyn KeyValueStore, key: &str, transcript: &Transcript) -> Result<()> {
    store.write(key, &transcript.to_json()?)
}
