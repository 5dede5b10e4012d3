//! Keyed persistence cells.
//!
//! A *cell* binds one key in one storage medium to a typed value with a
//! default. Every cell implements the same [`Storage`] contract:
//!
//! - [`read`](Storage::read) never fails; it answers from the cache slot,
//!   then from the decoded stored bytes, then with the default.
//! - [`write`](Storage::write) takes a [`Change`]: store a value or delete
//!   the entry. A write either commits fully (persist, update cache, notify
//!   subscribers once) or aborts with only a log line.
//! - [`subscribe`](Storage::subscribe) yields a live [`ChangeStream`] of
//!   committed values, with no replay of earlier writes.
//!
//! # Cells
//!
//! - [`PreferenceCell`] -- one key of a flat preference register
//! - [`FileCell`] -- one file in a logical directory
//! - [`SecureCell`] -- one item of a secure credential register
//!
//! [`Observed`] and [`TransitionSubject`] are the in-memory counterparts:
//! no medium, but subscribers start from the current value and, for the
//! subject, see each `(old, current)` pair.
//!
//! # Caching
//!
//! With [`CellOptions::cache_value`] set, a cell keeps the last value it
//! successfully wrote and answers reads from it, even if the medium is
//! changed behind its back. Reads never populate the cache; deletes clear it.
//!
//! # Concurrency
//!
//! Cells are `Send + Sync`, but a write is two observable steps (persist,
//! then cache/notify). Concurrent writers to the same cell may interleave;
//! callers that need ordering must serialize access themselves.

mod cell;

pub mod bundle;
pub mod change;
pub mod error;
pub mod file;
pub mod notifier;
pub mod observed;
pub mod options;
pub mod preference;
pub mod secure;
pub mod slot;
pub mod traits;

pub use bundle::{Cellar, REGISTER_FILE};
pub use change::Change;
pub use error::{CellError, CellResult};
pub use file::FileCell;
pub use notifier::{ChangeNotifier, ChangeStream};
pub use observed::{Observed, Transition, TransitionSubject, ValueStream};
pub use options::CellOptions;
pub use preference::PreferenceCell;
pub use secure::SecureCell;
pub use slot::CacheSlot;
pub use traits::Storage;

pub use cellar_backend::{
    BackendError, Directory, FileStore, FsFileStore, InMemoryRegister, InMemorySecureRegister,
    JsonFileRegister, NativeValue, PreferenceRegister, RegisterValue, SecureRegister,
};
pub use cellar_codec::{BincodeCodec, Codec, CodecError, FnCodec, JsonCodec};
