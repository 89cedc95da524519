//! Thread-safe handle around a [`NamingStore`].
//!
//! [`NamingStore`] itself is single-threaded. [`SharedNamingStore`] puts one
//! behind an `Arc<RwLock<_>>` so several threads can merge into and read
//! from the same table. Every operation holds the lock only for the
//! duration of the in-memory merge or lookup.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{NamingError, Result};
use crate::store::NamingStore;
use crate::value::RawValue;

/// A cloneable, lock-guarded naming store.
#[derive(Clone, Debug, Default)]
pub struct SharedNamingStore {
    inner: Arc<RwLock<NamingStore>>,
}

impl SharedNamingStore {
    /// Create a handle around an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, NamingStore>> {
        self.inner
            .read()
            .map_err(|e| NamingError::LockPoisoned(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, NamingStore>> {
        self.inner
            .write()
            .map_err(|e| NamingError::LockPoisoned(e.to_string()))
    }

    /// Insert a single entry, replacing any existing value.
    pub fn insert(&self, name: &str, value: impl Into<RawValue>) -> Result<()> {
        self.write()?.insert(name, value);
        Ok(())
    }

    /// Insert every entry, replacing existing values.
    pub fn insert_all<I, K, V>(&self, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<RawValue>,
    {
        self.write()?.insert_all(entries);
        Ok(())
    }

    /// Add a single entry unless its name is already present.
    pub fn try_add(&self, name: &str, value: impl Into<RawValue>) -> Result<bool> {
        Ok(self.write()?.try_add(name, value))
    }

    /// Add every entry whose name is not already present.
    pub fn try_add_all<I, K, V>(&self, entries: I) -> Result<bool>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<RawValue>,
    {
        Ok(self.write()?.try_add_all(entries))
    }

    pub fn contains_key(&self, name: &str) -> Result<bool> {
        Ok(self.read()?.contains_key(name))
    }

    /// The value stored for `name`, or [`NamingError::KeyNotFound`].
    pub fn get(&self, name: &str) -> Result<String> {
        self.read()?.get(name).map(str::to_string)
    }

    pub fn try_get(&self, name: &str) -> Result<Option<String>> {
        Ok(self.read()?.try_get(name).map(str::to_string))
    }

    /// Copy of the current store contents.
    pub fn snapshot(&self) -> Result<NamingStore> {
        Ok(self.read()?.clone())
    }
}

impl From<NamingStore> for SharedNamingStore {
    fn from(store: NamingStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }
}
