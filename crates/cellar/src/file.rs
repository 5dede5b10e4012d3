//! Cells persisted as individual files.

use std::fmt;
use std::sync::Arc;

use cellar_backend::{BackendError, Directory, FileStore};
use cellar_codec::{Codec, JsonCodec};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::change::Change;
use crate::cell::CellCore;
use crate::error::CellResult;
use crate::notifier::ChangeStream;
use crate::options::CellOptions;
use crate::traits::Storage;

/// A value stored as the file `{directory}/{filename}` of a [`FileStore`].
///
/// Deleting is idempotent: a missing file, or any other failure to remove
/// it, still counts as a successful delete. Failed stores leave the previous
/// file, the cache, and subscribers untouched.
pub struct FileCell<T> {
    core: CellCore<T>,
    files: Arc<dyn FileStore>,
    directory: Directory,
}

impl<T> FileCell<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// A JSON file named `filename` in [`Directory::Documents`].
    pub fn new(filename: impl Into<String>, default: T, files: Arc<dyn FileStore>) -> Self {
        Self::with_codec(filename, default, files, JsonCodec::new())
    }
}

impl<U> FileCell<Option<U>>
where
    U: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// A file of an optional value whose default is `None`.
    pub fn new_optional(filename: impl Into<String>, files: Arc<dyn FileStore>) -> Self {
        Self::new(filename, None, files)
    }
}

impl<T> FileCell<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn with_codec(
        filename: impl Into<String>,
        default: T,
        files: Arc<dyn FileStore>,
        codec: impl Codec<T> + 'static,
    ) -> Self {
        Self {
            core: CellCore::new(filename.into(), default, Arc::new(codec)),
            files,
            directory: Directory::default(),
        }
    }

    /// Place the file in `directory` instead of [`Directory::Documents`].
    pub fn directory(mut self, directory: Directory) -> Self {
        self.directory = directory;
        self
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

    pub fn filename(&self) -> &str {
        self.core.key()
    }

    pub fn current_directory(&self) -> &Directory {
        &self.directory
    }

    pub fn is_cached(&self) -> bool {
        self.core.is_cached()
    }

    pub fn subscriber_count(&self) -> usize {
        self.core.subscriber_count()
    }

    fn load(&self) -> CellResult<T> {
        let bytes = self
            .files
            .retrieve(&self.directory, self.core.key())
            .map_err(|e| self.core.read_failed(e))?
            .ok_or_else(|| self.core.absent())?;
        self.core.decode(&bytes)
    }

    fn store(&self, value: T) {
        let bytes = match self.core.encode(&value) {
            Ok(bytes) => bytes,
            Err(e) => return self.core.aborted(e),
        };
        match self.files.store(&self.directory, self.core.key(), &bytes) {
            Ok(()) => self.core.committed(value),
            Err(e) => self.core.aborted(self.core.write_failed(e)),
        }
    }

    fn delete(&self) {
        match self.files.remove(&self.directory, self.core.key()) {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                debug!(filename = %self.core.key(), "nothing to delete");
            }
            // A bad name never reached the file system.
            Err(e @ BackendError::InvalidName { .. }) => {
                return self.core.aborted(self.core.delete_failed(e));
            }
            Err(e) => {
                warn!(
                    filename = %self.core.key(),
                    error = %e,
                    "could not delete file; treating as deleted"
                );
            }
        }
        self.core.deleted();
    }
}

impl<T> Storage<T> for FileCell<T>
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

impl<T> fmt::Debug for FileCell<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileCell")
            .field("filename", &self.core.key())
            .field("directory", &self.directory)
            .field("codec", &self.core.codec_name())
            .field("caching", &self.core.is_caching())
            .finish()
    }
}
