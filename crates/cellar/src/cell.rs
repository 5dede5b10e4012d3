use std::sync::Arc;

use cellar_backend::BackendError;
use cellar_codec::Codec;
use tracing::{debug, warn};

use crate::error::{CellError, CellResult};
use crate::notifier::{ChangeNotifier, ChangeStream};
use crate::options::CellOptions;
use crate::slot::CacheSlot;

/// State and behaviour shared by every cell: key, default, codec, cache
/// slot, and notifier. Cells add a medium and decide how bytes move.
pub(crate) struct CellCore<T> {
    key: String,
    default: T,
    codec: Arc<dyn Codec<T>>,
    cache: Option<CacheSlot<T>>,
    notifier: ChangeNotifier<T>,
    capacity: usize,
}

impl<T> CellCore<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(key: String, default: T, codec: Arc<dyn Codec<T>>) -> Self {
        let options = CellOptions::default();
        Self {
            key,
            default,
            codec,
            cache: None,
            notifier: ChangeNotifier::new(options.channel_capacity),
            capacity: options.channel_capacity,
        }
    }

    pub(crate) fn configure(&mut self, options: &CellOptions) {
        self.set_caching(options.cache_value);
        if options.channel_capacity != self.capacity {
            self.notifier = ChangeNotifier::new(options.channel_capacity);
            self.capacity = options.channel_capacity;
        }
    }

    pub(crate) fn set_caching(&mut self, enabled: bool) {
        self.cache = enabled.then(CacheSlot::new);
    }

    pub(crate) fn set_codec(&mut self, codec: Arc<dyn Codec<T>>) {
        self.codec = codec;
    }

    pub(crate) fn key(&self) -> &str {
        &self.key
    }

    pub(crate) fn default_value(&self) -> &T {
        &self.default
    }

    pub(crate) fn codec_name(&self) -> &'static str {
        self.codec.name()
    }

    pub(crate) fn is_caching(&self) -> bool {
        self.cache.is_some()
    }

    pub(crate) fn is_cached(&self) -> bool {
        self.cache.as_ref().is_some_and(CacheSlot::is_populated)
    }

    pub(crate) fn subscribe(&self) -> ChangeStream<T> {
        self.notifier.subscribe()
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.notifier.subscriber_count()
    }

    // -- read path ---------------------------------------------------------

    /// Cached value if present, else `load()`, else the default.
    pub(crate) fn read_with(&self, load: impl FnOnce() -> CellResult<T>) -> T {
        if let Some(value) = self.cache.as_ref().and_then(CacheSlot::get) {
            return value;
        }
        match load() {
            Ok(value) => value,
            Err(e) if e.is_absent() => {
                debug!(key = %self.key, "nothing stored; using default");
                self.default.clone()
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "could not read stored value; using default");
                self.default.clone()
            }
        }
    }

    pub(crate) fn decode(&self, bytes: &[u8]) -> CellResult<T> {
        if bytes.is_empty() {
            return Err(CellError::EmptyPayload {
                key: self.key.clone(),
            });
        }
        self.codec.decode(bytes).map_err(|source| CellError::Decode {
            key: self.key.clone(),
            source,
        })
    }

    pub(crate) fn absent(&self) -> CellError {
        CellError::AbsentEntry {
            key: self.key.clone(),
        }
    }

    pub(crate) fn read_failed(&self, source: BackendError) -> CellError {
        CellError::BackendRead {
            key: self.key.clone(),
            source,
        }
    }

    // -- write path --------------------------------------------------------

    pub(crate) fn encode(&self, value: &T) -> CellResult<Vec<u8>> {
        self.codec.encode(value).map_err(|source| CellError::Encode {
            key: self.key.clone(),
            source,
        })
    }

    pub(crate) fn write_failed(&self, source: BackendError) -> CellError {
        CellError::BackendWrite {
            key: self.key.clone(),
            source,
        }
    }

    pub(crate) fn delete_failed(&self, source: BackendError) -> CellError {
        CellError::BackendDelete {
            key: self.key.clone(),
            source,
        }
    }

    /// The medium accepted `value`: memoize it and tell subscribers.
    pub(crate) fn committed(&self, value: T) {
        if let Some(cache) = &self.cache {
            cache.store(value.clone());
        }
        let reached = self.notifier.publish(value);
        debug!(key = %self.key, subscribers = reached, "value committed");
    }

    /// The entry is gone: drop the memo and publish the default, which is
    /// what a read now returns.
    pub(crate) fn deleted(&self) {
        if let Some(cache) = &self.cache {
            cache.clear();
        }
        let reached = self.notifier.publish(self.default.clone());
        debug!(key = %self.key, subscribers = reached, "value deleted");
    }

    pub(crate) fn aborted(&self, error: CellError) {
        warn!(key = %self.key, error = %error, "write aborted");
    }
}
