//! Durable per-session key-value store, the stand-in for browser local
//! storage. One JSON document per key; every writer rewrites the whole value.
//!
//! A second handle's write does not update an already-loaded cart. That is a
//! documented limitation of the design, not a bug; the explicit opt-in is
//! [`crate::services::cart_service::CartService::reload`].

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::AppResult;

pub const CART_KEY: &str = "cart";
pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";
pub const ORDERS_KEY: &str = "orders";
pub const PRODUCTS_KEY: &str = "products";

pub trait KvStore: Send + Sync {
    fn get_raw(&self, key: &str) -> AppResult<Option<String>>;
    fn put_raw(&self, key: &str, value: String) -> AppResult<()>;
    fn remove(&self, key: &str) -> AppResult<()>;
}

/// Typed access on top of [`KvStore`]. Malformed stored data is treated as
/// absent, never as a fatal error.
pub trait KvStoreExt: KvStore {
    fn read<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        let Some(raw) = self.get_raw(key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                tracing::warn!(key, error = %err, "malformed stored value, treating as empty");
                Ok(None)
            }
        }
    }

    fn write<T: Serialize>(&self, key: &str, value: &T) -> AppResult<()> {
        self.put_raw(key, serde_json::to_string(value)?)
    }
}

impl<S: KvStore + ?Sized> KvStoreExt for S {}

/// File-backed store: `<dir>/<key>.json` per key, written synchronously so a
/// reload observes every completed mutation.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open(dir: impl AsRef<Path>) -> AppResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KvStore for FileStore {
    fn get_raw(&self, key: &str) -> AppResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn put_raw(&self, key: &str, value: String) -> AppResult<()> {
        fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// In-process store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get_raw(&self, key: &str) -> AppResult<Option<String>> {
        let entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn put_raw(&self, key: &str, value: String) -> AppResult<()> {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_value_reads_as_empty() {
        let store = MemoryStore::new();
        store.put_raw(CART_KEY, "not json{{".to_string()).unwrap();
        let lines: Option<Vec<crate::models::CartLine>> = store.read(CART_KEY).unwrap();
        assert!(lines.is_none());
    }

    #[test]
    fn remove_of_absent_key_is_a_no_op() {
        let store = MemoryStore::new();
        store.remove("nothing").unwrap();
    }

    #[test]
    fn file_store_round_trips_a_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.write("answer", &42_u32).unwrap();
        assert_eq!(store.read::<u32>("answer").unwrap(), Some(42));
        store.remove("answer").unwrap();
        assert_eq!(store.read::<u32>("answer").unwrap(), None);
    }
}
