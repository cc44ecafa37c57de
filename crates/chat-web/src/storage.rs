//! localStorage-backed transcript store

use chat_core::{
    error::{ChatError, Result},
    storage::KeyValueStore,
};

/// [`KeyValueStore`] over `window.localStorage`
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStorageStore;

impl LocalStorageStore {
    fn storage() -> Result<web_sys::Storage> {
        web_sys::window()
            .ok_or_else(|| ChatError::Storage("no window".into()))?
            .local_storage()
            .map_err(|e| ChatError::Storage(format!("{e:?}")))?
            .ok_or_else(|| ChatError::Storage("localStorage unavailable".into()))
    }
}

impl KeyValueStore for LocalStorageStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Self::storage()?
            .get_item(key)
            .map_err(|e| ChatError::Storage(format!("{e:?}")))
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        Self::storage()?
            .set_item(key, value)
            .map_err(|e| ChatError::Storage(format!("{e:?}")))
    }

    fn delete(&self, key: &str) -> Result<()> {
        Self::storage()?
            .remove_item(key)
            .map_err(|e| ChatError::Storage(format!("{e:?}")))
    }
}
