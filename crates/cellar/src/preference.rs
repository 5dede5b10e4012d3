//! Cells persisted in a flat preference register.

use std::fmt;
use std::sync::Arc;

use cellar_backend::{NativeValue, PreferenceRegister, RegisterValue};
use cellar_codec::{Codec, CodecError, CodecResult, JsonCodec};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::change::Change;
use crate::cell::CellCore;
use crate::error::{CellError, CellResult};
use crate::notifier::ChangeStream;
use crate::options::CellOptions;
use crate::traits::Storage;

/// How a register-native scalar moves in and out of the register.
struct NativeFormat<T> {
    kind: &'static str,
    to_register: fn(&T) -> RegisterValue,
    from_register: fn(&RegisterValue) -> Option<T>,
}

/// A value stored under one key of a [`PreferenceRegister`].
///
/// By default the value goes through a codec and is stored as
/// [`RegisterValue::Data`]. Cells built with [`PreferenceCell::native`]
/// store `bool`, integers, floats and strings as register scalars instead.
///
/// An entry that is missing, empty, of the wrong kind, or undecodable reads
/// as the default value.
pub struct PreferenceCell<T> {
    core: CellCore<T>,
    register: Arc<dyn PreferenceRegister>,
    native: Option<NativeFormat<T>>,
}

impl<T> PreferenceCell<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// A JSON-encoded cell under `key`.
    pub fn new(key: impl Into<String>, default: T, register: Arc<dyn PreferenceRegister>) -> Self {
        Self::with_codec(key, default, register, JsonCodec::new())
    }
}

impl<U> PreferenceCell<Option<U>>
where
    U: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// A cell of an optional value whose default is `None`.
    pub fn new_optional(key: impl Into<String>, register: Arc<dyn PreferenceRegister>) -> Self {
        Self::new(key, None, register)
    }
}

impl<T> PreferenceCell<T>
where
    T: NativeValue,
{
    /// A cell that stores `T` as a register scalar, bypassing any codec.
    pub fn native(
        key: impl Into<String>,
        default: T,
        register: Arc<dyn PreferenceRegister>,
    ) -> Self {
        let native = NativeFormat {
            kind: T::KIND,
            to_register: T::to_register,
            from_register: T::from_register,
        };
        let codec = Arc::new(NativeOnly);
        Self {
            core: CellCore::new(key.into(), default, codec),
            register,
            native: Some(native),
        }
    }
}

impl<T> PreferenceCell<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// A cell under `key` that encodes values with `codec`.
    pub fn with_codec(
        key: impl Into<String>,
        default: T,
        register: Arc<dyn PreferenceRegister>,
        codec: impl Codec<T> + 'static,
    ) -> Self {
        Self {
            core: CellCore::new(key.into(), default, Arc::new(codec)),
            register,
            native: None,
        }
    }

    /// Switch to `codec`; a native cell becomes a codec cell.
    pub fn codec(mut self, codec: impl Codec<T> + 'static) -> Self {
        self.core.set_codec(Arc::new(codec));
        self.native = None;
        self
    }

    /// Apply construction options. Call before subscribing.
    pub fn options(mut self, options: CellOptions) -> Self {
        self.core.configure(&options);
        self
    }

    /// Enable or disable the cache slot.
    pub fn cache_value(mut self, enabled: bool) -> Self {
        self.core.set_caching(enabled);
        self
    }

    /// Whether the cache slot currently holds a value.
    pub fn is_cached(&self) -> bool {
        self.core.is_cached()
    }

    pub fn subscriber_count(&self) -> usize {
        self.core.subscriber_count()
    }

    pub fn register(&self) -> &Arc<dyn PreferenceRegister> {
        &self.register
    }

    fn load(&self) -> CellResult<T> {
        let entry = self
            .register
            .get(self.core.key())
            .map_err(|e| self.core.read_failed(e))?
            .ok_or_else(|| self.core.absent())?;

        if let Some(native) = &self.native {
            return (native.from_register)(&entry).ok_or_else(|| CellError::KindMismatch {
                key: self.core.key().to_string(),
                found: entry.kind(),
                expected: native.kind,
            });
        }
        match entry {
            RegisterValue::Data(bytes) => self.core.decode(&bytes),
            other => Err(CellError::KindMismatch {
                key: self.core.key().to_string(),
                found: other.kind(),
                expected: "data",
            }),
        }
    }

    fn store(&self, value: T) {
        let entry = match &self.native {
            Some(native) => (native.to_register)(&value),
            None => match self.core.encode(&value) {
                // Zero bytes read back as "absent", so store nothing at all.
                Ok(bytes) if bytes.is_empty() => return self.delete(),
                Ok(bytes) => RegisterValue::Data(bytes),
                Err(e) => return self.core.aborted(e),
            },
        };
        match self.register.set(self.core.key(), entry) {
            Ok(()) => self.core.committed(value),
            Err(e) => self.core.aborted(self.core.write_failed(e)),
        }
    }

    fn delete(&self) {
        match self.register.remove(self.core.key()) {
            Ok(_) => self.core.deleted(),
            Err(e) => self.core.aborted(self.core.delete_failed(e)),
        }
    }
}

impl<T> Storage<T> for PreferenceCell<T>
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

impl<T> fmt::Debug for PreferenceCell<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let format = match &self.native {
            Some(native) => native.kind,
            None => self.core.codec_name(),
        };
        f.debug_struct("PreferenceCell")
            .field("key", &self.core.key())
            .field("format", &format)
            .field("caching", &self.core.is_caching())
            .finish()
    }
}

/// Placeholder codec for native cells, which never encode through a codec.
struct NativeOnly;

impl<T> Codec<T> for NativeOnly {
    fn encode(&self, _value: &T) -> CodecResult<Vec<u8>> {
        Err(CodecError::serialization(
            "native",
            "native cells store register scalars",
        ))
    }

    fn decode(&self, _bytes: &[u8]) -> CodecResult<T> {
        Err(CodecError::deserialization(
            "native",
            "native cells store register scalars",
        ))
    }

    fn name(&self) -> &'static str {
        "native"
    }
}
