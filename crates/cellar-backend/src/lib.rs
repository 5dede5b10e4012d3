//! Storage media for Cellar cells.
//!
//! Cells never touch a platform store directly; they talk to one of three
//! collaborator traits, each with reference implementations:
//!
//! - [`PreferenceRegister`] -- flat key/value register
//!   ([`InMemoryRegister`], [`JsonFileRegister`])
//! - [`SecureRegister`] -- access-controlled credential register
//!   ([`InMemorySecureRegister`])
//! - [`FileStore`] -- whole files addressed by [`Directory`] and filename
//!   ([`FsFileStore`])
//!
//! Backend handles are shared (`Arc`) between cells; cells with distinct
//! keys never contend on the same entry.

mod atomic;
pub mod error;
pub mod files;
pub mod json_file;
pub mod memory;
pub mod names;
pub mod register;
pub mod secure;

pub use error::{BackendError, BackendResult};
pub use files::{Directory, FileStore, FsFileStore};
pub use json_file::JsonFileRegister;
pub use memory::InMemoryRegister;
pub use names::{validate_directory, validate_filename};
pub use register::{NativeValue, PreferenceRegister, RegisterValue};
pub use secure::{InMemorySecureRegister, SecureRegister};
