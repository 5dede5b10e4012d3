//! Cells persisted in a secure, access-controlled register.

use std::fmt;
use std::sync::Arc;

use cellar_backend::SecureRegister;
use cellar_codec::{Codec, JsonCodec};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::change::Change;
use crate::cell::CellCore;
use crate::error::CellResult;
use crate::notifier::ChangeStream;
use crate::options::CellOptions;
use crate::traits::Storage;

/// A value stored under one key of a [`SecureRegister`].
///
/// The secure register may refuse any operation (locked device, denied
/// authorization). Refused reads answer with the default; refused writes
/// and deletes abort with no effect.
pub struct SecureCell<T> {
    core: CellCore<T>,
    register: Arc<dyn SecureRegister>,
}

impl<T> SecureCell<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    pub fn new(key: impl Into<String>, default: T, register: Arc<dyn SecureRegister>) -> Self {
        Self::with_codec(key, default, register, JsonCodec::new())
    }
}

impl<U> SecureCell<Option<U>>
where
    U: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// A secure cell of an optional value whose default is `None`.
    pub fn new_optional(key: impl Into<String>, register: Arc<dyn SecureRegister>) -> Self {
        Self::new(key, None, register)
    }
}

impl<T> SecureCell<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn with_codec(
        key: impl Into<String>,
        default: T,
        register: Arc<dyn SecureRegister>,
        codec: impl Codec<T> + 'static,
    ) -> Self {
        Self {
            core: CellCore::new(key.into(), default, Arc::new(codec)),
            register,
        }
    }

    pub fn codec(mut self, codec: impl Codec<T> + 'static) -> Self {
        self.core.set_codec(Arc::new(codec));
        self
    }

    /// Apply construction options. Call before subscribing.
    pub fn options(mut self, options: CellOptions) -> Self {
        self.core.configure(&options);
        self
    }

    pub fn cache_value(mut self, enabled: bool) -> Self {
        self.core.set_caching(enabled);
        self
    }

    pub fn is_cached(&self) -> bool {
        self.core.is_cached()
    }

    pub fn subscriber_count(&self) -> usize {
        self.core.subscriber_count()
    }

    pub fn service(&self) -> &str {
        self.register.service()
    }

    fn load(&self) -> CellResult<T> {
        match self.register.data(self.core.key()) {
            Ok(bytes) => self.core.decode(&bytes),
            Err(e) if e.is_not_found() => Err(self.core.absent()),
            Err(e) => Err(self.core.read_failed(e)),
        }
    }

    fn store(&self, value: T) {
        let bytes = match self.core.encode(&value) {
            Ok(bytes) => bytes,
            Err(e) => return self.core.aborted(e),
        };
        match self.register.set(self.core.key(), &bytes) {
            Ok(()) => self.core.committed(value),
            Err(e) => self.core.aborted(self.core.write_failed(e)),
        }
    }

    fn delete(&self) {
        match self.register.delete(self.core.key()) {
            Ok(()) => self.core.deleted(),
            // Already gone: the entry is as absent as a delete would leave it.
            Err(e) if e.is_not_found() => self.core.deleted(),
            Err(e) => self.core.aborted(self.core.delete_failed(e)),
        }
    }
}

impl<T> Storage<T> for SecureCell<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn key(&self) -> &str {
        self.core.key()
    }

    fn default_value(&self) -> &T {
        self.core.default_value()
    }

    fn read(&self) -> T {
        self.core.read_with(|| self.load())
    }

    fn write(&self, change: Change<T>) {
        match change {
            Change::Store(value) => self.store(value),
            Change::Delete => self.delete(),
        }
    }

    fn subscribe(&self) -> ChangeStream<T> {
        self.core.subscribe()
    }
}

impl<T> fmt::Debug for SecureCell<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureCell")
            .field("key", &self.core.key())
            .field("service", &self.register.service())
            .field("codec", &self.core.codec_name())
            .field("caching", &self.core.is_caching())
            .finish()
    }
}
