//! Access-controlled secure registers (keychain-style credential stores).
//!
//! The secure register is the least reliable medium: reads and writes may
//! legitimately fail while the device is locked or when the caller lacks
//! the entitlement for an item. Encryption at rest is the register's own
//! business; cells only hand it bytes.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use crate::error::{BackendError, BackendResult};

/// A secure, access-controlled key/value register scoped to a service.
pub trait SecureRegister: Send + Sync {
    /// The service namespace all keys of this register live in.
    fn service(&self) -> &str;

    /// Read the bytes stored under `key`.
    ///
    /// Returns [`BackendError::NotFound`] when no item exists.
    fn data(&self, key: &str) -> BackendResult<Vec<u8>>;

    /// Insert or replace the item stored under `key`.
    fn set(&self, key: &str, data: &[u8]) -> BackendResult<()>;

    /// Delete the item stored under `key`.
    ///
    /// Returns [`BackendError::NotFound`] when no item exists.
    fn delete(&self, key: &str) -> BackendResult<()>;

    /// Keys of all items this caller may see, sorted.
    fn keys(&self) -> BackendResult<Vec<String>>;

    /// Whether an item exists under `key`.
    fn has_item(&self, key: &str) -> BackendResult<bool> {
        match self.data(key) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// In-memory [`SecureRegister`] that models lock state and per-item denial.
///
/// While locked, every operation fails with [`BackendError::Locked`]. Keys
/// marked with [`deny`](Self::deny) fail with [`BackendError::AccessDenied`]
/// as if the user refused authorization.
pub struct InMemorySecureRegister {
    service: String,
    items: RwLock<HashMap<String, Vec<u8>>>,
    denied: RwLock<HashSet<String>>,
    locked: AtomicBool,
}

impl InMemorySecureRegister {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            items: RwLock::new(HashMap::new()),
            denied: RwLock::new(HashSet::new()),
            locked: AtomicBool::new(false),
        }
    }

    pub fn lock(&self) {
        self.locked.store(true, Ordering::SeqCst);
    }

    pub fn unlock(&self) {
        self.locked.store(false, Ordering::SeqCst);
    }

    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::SeqCst)
    }

    /// Refuse authorization for `key` until [`allow`](Self::allow) is called.
    pub fn deny(&self, key: &str) {
        if let Ok(mut denied) = self.denied.write() {
            denied.insert(key.to_string());
        }
    }

    pub fn allow(&self, key: &str) {
        if let Ok(mut denied) = self.denied.write() {
            denied.remove(key);
        }
    }

    /// Number of stored items, regardless of lock state.
    pub fn len(&self) -> usize {
        self.items.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn authorize(&self, key: &str) -> BackendResult<()> {
        if self.is_locked() {
            return Err(BackendError::Locked {
                service: self.service.clone(),
            });
        }
        let denied = self.denied.read().map_err(BackendError::poisoned)?;
        if denied.contains(key) {
            return Err(BackendError::AccessDenied {
                key: key.to_string(),
                reason: "authorization refused".into(),
            });
        }
        Ok(())
    }
}

impl Default for InMemorySecureRegister {
    fn default() -> Self {
        Self::new("cellar")
    }
}

impl SecureRegister for InMemorySecureRegister {
    fn service(&self) -> &str {
        &self.service
    }

    fn data(&self, key: &str) -> BackendResult<Vec<u8>> {
        self.authorize(key)?;
        let items = self.items.read().map_err(BackendError::poisoned)?;
        items
            .get(key)
            .cloned()
            .ok_or_else(|| BackendError::not_found(key))
    }

    fn set(&self, key: &str, data: &[u8]) -> BackendResult<()> {
        self.authorize(key)?;
        let mut items = self.items.write().map_err(BackendError::poisoned)?;
        items.insert(key.to_string(), data.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> BackendResult<()> {
        self.authorize(key)?;
        let mut items = self.items.write().map_err(BackendError::poisoned)?;
        items
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| BackendError::not_found(key))
    }

    fn keys(&self) -> BackendResult<Vec<String>> {
        if self.is_locked() {
            return Err(BackendError::Locked {
                service: self.service.clone(),
            });
        }
        let items = self.items.read().map_err(BackendError::poisoned)?;
        let denied = self.denied.read().map_err(BackendError::poisoned)?;
        let mut keys: Vec<String> = items
            .keys()
            .filter(|k| !denied.contains(*k))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }
}

impl fmt::Debug for InMemorySecureRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemorySecureRegister")
            .field("service", &self.service)
            .field("item_count", &self.len())
            .field("locked", &self.is_locked())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_read_delete() {
        let reg = InMemorySecureRegister::new("com.example.app");
        assert_eq!(reg.service(), "com.example.app");
        assert!(!reg.has_item("token").unwrap());

        reg.set("token", b"s3cr3t").unwrap();
        assert_eq!(reg.data("token").unwrap(), b"s3cr3t");
        assert!(reg.has_item("token").unwrap());

        reg.delete("token").unwrap();
        assert!(reg.data("token").unwrap_err().is_not_found());
    }

    #[test]
    fn delete_missing_is_not_found() {
        let reg = InMemorySecureRegister::default();
        let err = reg.delete("nothing").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn locked_register_refuses_everything() {
        let reg = InMemorySecureRegister::default();
        reg.set("token", b"abc").unwrap();
        reg.lock();

        assert!(matches!(reg.data("token"), Err(BackendError::Locked { .. })));
        assert!(matches!(reg.set("token", b"x"), Err(BackendError::Locked { .. })));
        assert!(matches!(reg.delete("token"), Err(BackendError::Locked { .. })));
        assert!(matches!(reg.keys(), Err(BackendError::Locked { .. })));
        assert!(reg.has_item("token").is_err());

        reg.unlock();
        assert_eq!(reg.data("token").unwrap(), b"abc");
    }

    #[test]
    fn denied_item_is_hidden() {
        let reg = InMemorySecureRegister::default();
        reg.set("a", b"1").unwrap();
        reg.set("b", b"2").unwrap();
        reg.deny("b");

        assert!(matches!(reg.data("b"), Err(BackendError::AccessDenied { .. })));
        assert_eq!(reg.keys().unwrap(), vec!["a"]);

        reg.allow("b");
        assert_eq!(reg.keys().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn debug_does_not_leak_secrets() {
        let reg = InMemorySecureRegister::new("svc");
        reg.set("pw", b"hunter2").unwrap();
        let out = format!("{reg:?}");
        assert!(out.contains("item_count: 1"));
        assert!(!out.contains("hunter2"));
    }
}
