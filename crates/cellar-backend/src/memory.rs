//! In-memory preference register for tests and ephemeral use.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use crate::error::{BackendError, BackendResult};
use crate::register::{PreferenceRegister, RegisterValue};

/// `HashMap`-backed [`PreferenceRegister`].
///
/// Entries live behind a `RwLock` and are lost when the register is
/// dropped. The register can be switched to read-only to exercise the
/// write-failure path of cells.
#[derive(Debug, Default)]
pub struct InMemoryRegister {
    entries: RwLock<HashMap<String, RegisterValue>>,
    read_only: AtomicBool,
}

impl InMemoryRegister {
    /// Create a new empty register.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every subsequent `set`/`remove` with [`BackendError::ReadOnly`].
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only.load(Ordering::SeqCst)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every entry, bypassing the read-only switch.
    pub fn clear(&self) {
        if let Ok(mut map) = self.entries.write() {
            map.clear();
        }
    }

    fn check_writable(&self) -> BackendResult<()> {
        if self.is_read_only() {
            return Err(BackendError::ReadOnly);
        }
        Ok(())
    }
}

impl PreferenceRegister for InMemoryRegister {
    fn get(&self, key: &str) -> BackendResult<Option<RegisterValue>> {
        let map = self.entries.read().map_err(BackendError::poisoned)?;
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: RegisterValue) -> BackendResult<()> {
        self.check_writable()?;
        let mut map = self.entries.write().map_err(BackendError::poisoned)?;
        map.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> BackendResult<bool> {
        self.check_writable()?;
        let mut map = self.entries.write().map_err(BackendError::poisoned)?;
        Ok(map.remove(key).is_some())
    }

    fn keys(&self) -> BackendResult<Vec<String>> {
        let map = self.entries.read().map_err(BackendError::poisoned)?;
        let mut keys: Vec<String> = map.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}
