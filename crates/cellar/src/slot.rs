use std::fmt;
use std::sync::RwLock;

/// Single-value memo of the last value a cell committed.
///
/// Populated only by successful writes, never by reads; cleared by deletes.
/// A cell without caching simply has no slot.
pub struct CacheSlot<T> {
    value: RwLock<Option<T>>,
}

impl<T: Clone> CacheSlot<T> {
    pub fn new() -> Self {
        Self {
            value: RwLock::new(None),
        }
    }

    /// The memoized value, if any.
    pub fn get(&self) -> Option<T> {
        self.value.read().expect("cache slot lock poisoned").clone()
    }

    pub fn store(&self, value: T) {
        *self.value.write().expect("cache slot lock poisoned") = Some(value);
    }

    pub fn clear(&self) {
        *self.value.write().expect("cache slot lock poisoned") = None;
    }

    pub fn is_populated(&self) -> bool {
        self.value.read().expect("cache slot lock poisoned").is_some()
    }
}

impl<T: Clone> Default for CacheSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for CacheSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let populated = self.value.read().map(|v| v.is_some()).unwrap_or(false);
        f.debug_struct("CacheSlot")
            .field("populated", &populated)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_then_store_then_clear() {
        let slot = CacheSlot::new();
        assert_eq!(slot.get(), None::<u8>);
        assert!(!slot.is_populated());

        slot.store(4);
        assert_eq!(slot.get(), Some(4));
        slot.store(5);
        assert_eq!(slot.get(), Some(5));

        slot.clear();
        assert!(!slot.is_populated());
    }

    #[test]
    fn debug_hides_value() {
        let slot = CacheSlot::new();
        slot.store("password".to_string());
        assert_eq!(format!("{slot:?}"), "CacheSlot { populated: true }");
    }
}
