//! A preference register persisted as a single JSON document.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::{debug, warn};

use crate::atomic::write_atomic;
use crate::error::{BackendError, BackendResult};
use crate::register::{PreferenceRegister, RegisterValue};

/// File-backed [`PreferenceRegister`].
///
/// The whole register is loaded into memory on open and rewritten
/// atomically after every mutation, so the document on disk always matches
/// the last successful `set`/`remove`. A document that cannot be parsed is
/// logged and treated as empty; it is overwritten on the next mutation.
#[derive(Debug)]
pub struct JsonFileRegister {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, RegisterValue>>,
}

impl JsonFileRegister {
    /// Open the register at `path`, creating nothing until the first write.
    pub fn open(path: impl Into<PathBuf>) -> BackendResult<Self> {
        let path = path.into();
        let entries = Self::load(&path)?;
        debug!(path = %path.display(), entries = entries.len(), "register opened");
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Path of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Discard in-memory state and re-read the document from disk.
    pub fn reload(&self) -> BackendResult<()> {
        let fresh = Self::load(&self.path)?;
        *self.entries.write().map_err(BackendError::poisoned)? = fresh;
        Ok(())
    }

    fn load(path: &Path) -> BackendResult<BTreeMap<String, RegisterValue>> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        if bytes.is_empty() {
            return Ok(BTreeMap::new());
        }
        match serde_json::from_slice(&bytes) {
            Ok(map) => Ok(map),
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "unreadable register document; starting empty"
                );
                Ok(BTreeMap::new())
            }
        }
    }

    fn save(&self, entries: &BTreeMap<String, RegisterValue>) -> BackendResult<()> {
        let doc = serde_json::to_vec_pretty(entries)
            .map_err(|e| BackendError::Serialization(e.to_string()))?;
        write_atomic(&self.path, &doc)?;
        Ok(())
    }

    /// Apply `mutate` to a copy of the entries, persist the copy, and only
    /// then swap it in. A failed save leaves memory and disk unchanged.
    fn mutate<R>(
        &self,
        mutate: impl FnOnce(&mut BTreeMap<String, RegisterValue>) -> R,
    ) -> BackendResult<R> {
        let mut guard = self.entries.write().map_err(BackendError::poisoned)?;
        let mut next = guard.clone();
        let out = mutate(&mut next);
        self.save(&next)?;
        *guard = next;
        Ok(out)
    }
}

impl PreferenceRegister for JsonFileRegister {
    fn get(&self, key: &str) -> BackendResult<Option<RegisterValue>> {
        let map = self.entries.read().map_err(BackendError::poisoned)?;
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: RegisterValue) -> BackendResult<()> {
        self.mutate(|map| {
            map.insert(key.to_string(), value);
        })
    }

    fn remove(&self, key: &str) -> BackendResult<bool> {
        {
            let map = self.entries.read().map_err(BackendError::poisoned)?;
            if !map.contains_key(key) {
                return Ok(false);
            }
        }
        self.mutate(|map| map.remove(key).is_some())
    }

    fn keys(&self) -> BackendResult<Vec<String>> {
        let map = self.entries.read().map_err(BackendError::poisoned)?;
        Ok(map.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_register() -> (tempfile::TempDir, JsonFileRegister) {
        let dir = tempfile::tempdir().unwrap();
        let reg = JsonFileRegister::open(dir.path().join("prefs.json")).unwrap();
        (dir, reg)
    }

    #[test]
    fn missing_document_is_empty() {
        let (_dir, reg) = temp_register();
        assert!(reg.keys().unwrap().is_empty());
        assert!(!reg.path().exists());
    }

    #[test]
    fn survives_reopen() {
        let (dir, reg) = temp_register();
        reg.set("muted", RegisterValue::Bool(true)).unwrap();
        reg.set("blob", RegisterValue::Data(b"[1,2]".to_vec())).unwrap();
        drop(reg);

        let reopened = JsonFileRegister::open(dir.path().join("prefs.json")).unwrap();
        assert_eq!(reopened.get("muted").unwrap(), Some(RegisterValue::Bool(true)));
        assert_eq!(
            reopened.get("blob").unwrap(),
            Some(RegisterValue::Data(b"[1,2]".to_vec()))
        );
        assert_eq!(reopened.keys().unwrap(), vec!["blob", "muted"]);
    }

    #[test]
    fn remove_persists() {
        let (dir, reg) = temp_register();
        reg.set("a", RegisterValue::Integer(1)).unwrap();
        assert!(reg.remove("a").unwrap());
        assert!(!reg.remove("a").unwrap());

        let reopened = JsonFileRegister::open(dir.path().join("prefs.json")).unwrap();
        assert_eq!(reopened.get("a").unwrap(), None);
    }

    #[test]
    fn corrupt_document_starts_empty_and_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, b"{not json").unwrap();

        let reg = JsonFileRegister::open(&path).unwrap();
        assert!(reg.keys().unwrap().is_empty());

        reg.set("k", RegisterValue::Text("v".into())).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains(r#""text": "v""#));
    }

    #[test]
    fn reload_picks_up_external_edits() {
        let (_dir, reg) = temp_register();
        reg.set("k", RegisterValue::Integer(1)).unwrap();
        fs::write(reg.path(), br#"{"k":{"integer":5}}"#).unwrap();

        assert_eq!(reg.get("k").unwrap(), Some(RegisterValue::Integer(1)));
        reg.reload().unwrap();
        assert_eq!(reg.get("k").unwrap(), Some(RegisterValue::Integer(5)));
    }

    #[test]
    fn failed_save_keeps_previous_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        let reg = JsonFileRegister::open(&path).unwrap();
        reg.set("k", RegisterValue::Integer(1)).unwrap();

        // Replace the document with a non-empty directory so the rename fails.
        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();
        fs::write(path.join("blocker"), b"x").unwrap();

        assert!(reg.set("k", RegisterValue::Integer(2)).is_err());
        assert_eq!(reg.get("k").unwrap(), Some(RegisterValue::Integer(1)));
    }
}
