//! Directory-scoped file storage.
//!
//! A [`FileStore`] resolves a logical [`Directory`] plus a filename to a
//! concrete path and performs whole-file reads, atomic writes, and deletes.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::atomic::write_atomic;
use crate::error::{BackendError, BackendResult};
use crate::names::{validate_directory, validate_filename};

/// Logical directory a file lives in.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Directory {
    /// User data that must survive restarts.
    #[default]
    Documents,
    /// Application state the user does not manage directly.
    ApplicationSupport,
    /// Data that can be regenerated.
    Caches,
    /// Scratch space.
    Temporary,
    /// A caller-chosen relative directory (e.g. `"exports/2024"`).
    Custom(String),
}

impl Directory {
    /// Relative path of this directory below a store root.
    pub fn relative_path(&self) -> BackendResult<PathBuf> {
        Ok(match self {
            Self::Documents => PathBuf::from("documents"),
            Self::ApplicationSupport => PathBuf::from("support"),
            Self::Caches => PathBuf::from("caches"),
            Self::Temporary => PathBuf::from("tmp"),
            Self::Custom(rel) => {
                validate_directory(rel)?;
                rel.split('/').collect()
            }
        })
    }
}

impl fmt::Display for Directory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Documents => f.write_str("documents"),
            Self::ApplicationSupport => f.write_str("support"),
            Self::Caches => f.write_str("caches"),
            Self::Temporary => f.write_str("tmp"),
            Self::Custom(rel) => f.write_str(rel),
        }
    }
}

/// Whole-file storage addressed by (directory, filename).
pub trait FileStore: Send + Sync {
    /// Absolute path for `filename` inside `directory`.
    fn resolve(&self, directory: &Directory, filename: &str) -> BackendResult<PathBuf>;

    /// Read the whole file. Returns `Ok(None)` if it does not exist.
    fn retrieve(&self, directory: &Directory, filename: &str) -> BackendResult<Option<Vec<u8>>>;

    /// Atomically replace the file with `bytes`, creating the directory
    /// as needed. On error the previous contents are left in place.
    fn store(&self, directory: &Directory, filename: &str, bytes: &[u8]) -> BackendResult<()>;

    /// Delete the file. A missing file yields an error for which
    /// [`BackendError::is_not_found`] holds.
    fn remove(&self, directory: &Directory, filename: &str) -> BackendResult<()>;

    /// Whether the file exists.
    fn exists(&self, directory: &Directory, filename: &str) -> BackendResult<bool> {
        Ok(self.resolve(directory, filename)?.is_file())
    }
}

/// [`FileStore`] rooted at a directory on the local file system.
#[derive(Clone, Debug)]
pub struct FsFileStore {
    root: PathBuf,
}

impl FsFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FileStore for FsFileStore {
    fn resolve(&self, directory: &Directory, filename: &str) -> BackendResult<PathBuf> {
        validate_filename(filename)?;
        Ok(self.root.join(directory.relative_path()?).join(filename))
    }

    fn retrieve(&self, directory: &Directory, filename: &str) -> BackendResult<Option<Vec<u8>>> {
        let path = self.resolve(directory, filename)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn store(&self, directory: &Directory, filename: &str, bytes: &[u8]) -> BackendResult<()> {
        let path = self.resolve(directory, filename)?;
        write_atomic(&path, bytes)?;
        debug!(path = %path.display(), len = bytes.len(), "file stored");
        Ok(())
    }

    fn remove(&self, directory: &Directory, filename: &str) -> BackendResult<()> {
        let path = self.resolve(directory, filename)?;
        fs::remove_file(&path)?;
        debug!(path = %path.display(), "file removed");
        Ok(())
    }
}
