use std::path::Path;
use std::sync::Arc;

use cellar_backend::{
    BackendResult, FileStore, FsFileStore, InMemoryRegister, InMemorySecureRegister,
    JsonFileRegister, NativeValue, PreferenceRegister, SecureRegister,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use crate::file::FileCell;
use crate::options::CellOptions;
use crate::preference::PreferenceCell;
use crate::secure::SecureCell;

/// Name of the register document created by [`Cellar::open`].
pub const REGISTER_FILE: &str = "preferences.json";

/// The backend handles and options new cells are built with.
///
/// There is no process-wide default register: an application builds one
/// `Cellar`, shares it, and asks it for cells. Every cell it hands out can
/// still be re-pointed or reconfigured through the cell's own builders.
#[derive(Clone)]
pub struct Cellar {
    register: Arc<dyn PreferenceRegister>,
    secure: Arc<dyn SecureRegister>,
    files: Arc<dyn FileStore>,
    options: CellOptions,
}

impl Cellar {
    pub fn new(
        register: Arc<dyn PreferenceRegister>,
        secure: Arc<dyn SecureRegister>,
        files: Arc<dyn FileStore>,
    ) -> Self {
        Self {
            register,
            secure,
            files,
            options: CellOptions::default(),
        }
    }

    /// Everything in memory except files, which go under `files_root`.
    pub fn in_memory(files_root: impl AsRef<Path>) -> Self {
        Self::new(
            Arc::new(InMemoryRegister::new()),
            Arc::new(InMemorySecureRegister::default()),
            Arc::new(FsFileStore::new(files_root.as_ref())),
        )
    }

    /// Register document and files under `root`; the secure register for
    /// `service` is kept in memory.
    pub fn open(root: impl AsRef<Path>, service: &str) -> BackendResult<Self> {
        let root = root.as_ref();
        let register = JsonFileRegister::open(root.join(REGISTER_FILE))?;
        info!(root = %root.display(), service, "cellar opened");
        Ok(Self::new(
            Arc::new(register),
            Arc::new(InMemorySecureRegister::new(service)),
            Arc::new(FsFileStore::new(root)),
        ))
    }

    /// Options applied to every cell built from now on.
    pub fn with_options(mut self, options: CellOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &CellOptions {
        &self.options
    }

    pub fn register(&self) -> &Arc<dyn PreferenceRegister> {
        &self.register
    }

    pub fn secure_register(&self) -> &Arc<dyn SecureRegister> {
        &self.secure
    }

    pub fn files(&self) -> &Arc<dyn FileStore> {
        &self.files
    }

    pub fn preference<T>(&self, key: impl Into<String>, default: T) -> PreferenceCell<T>
    where
        T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
    {
        PreferenceCell::new(key, default, Arc::clone(&self.register)).options(self.options.clone())
    }

    pub fn native_preference<T>(&self, key: impl Into<String>, default: T) -> PreferenceCell<T>
    where
        T: NativeValue,
    {
        PreferenceCell::native(key, default, Arc::clone(&self.register))
            .options(self.options.clone())
    }

    pub fn file<T>(&self, filename: impl Into<String>, default: T) -> FileCell<T>
    where
        T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
    {
        FileCell::new(filename, default, Arc::clone(&self.files)).options(self.options.clone())
    }

    pub fn secure<T>(&self, key: impl Into<String>, default: T) -> SecureCell<T>
    where
        T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
    {
        SecureCell::new(key, default, Arc::clone(&self.secure)).options(self.options.clone())
    }
}

impl std::fmt::Debug for Cellar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cellar")
            .field("service", &self.secure.service())
            .field("options", &self.options)
            .finish()
    }
}
