//! The [`Storage`] contract every cell implements.

use crate::change::Change;
use crate::notifier::ChangeStream;

/// A keyed, typed value persisted in some medium.
///
/// Implementations must satisfy these invariants:
/// - `read` never fails: cached value, then decoded stored value, then the
///   default. Read-side failures are logged and answered with the default.
/// - `write` either commits fully (persist, update cache, notify once) or
///   aborts with no observable effect except a log line.
/// - `subscribe` delivers only values committed after the call.
/// - Reading never notifies.
pub trait Storage<T>: Send + Sync {
    /// The key (or filename) identifying the entry in its medium.
    fn key(&self) -> &str;

    /// The value returned when nothing usable is stored.
    fn default_value(&self) -> &T;

    fn read(&self) -> T;

    fn write(&self, change: Change<T>);

    fn subscribe(&self) -> ChangeStream<T>;

    /// Shorthand for `write(Change::Store(value))`.
    fn set(&self, value: T) {
        self.write(Change::Store(value));
    }

    /// Shorthand for `write(Change::Delete)`.
    fn remove(&self) {
        self.write(Change::Delete);
    }

    /// Read, modify in place, and store the result.
    fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut T),
        Self: Sized,
    {
        let mut value = self.read();
        f(&mut value);
        self.set(value);
    }
}
