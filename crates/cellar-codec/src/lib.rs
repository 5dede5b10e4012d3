//! Value codecs for Cellar storage cells.
//!
//! A codec turns a typed value into the raw bytes a storage backend keeps,
//! and back. Cells own one codec each and never look inside the bytes.
//!
//! - [`JsonCodec`] -- `serde_json`, compact or pretty; the default
//! - [`BincodeCodec`] -- compact binary via `bincode`
//! - [`FnCodec`] -- any format expressed as a pair of closures

pub mod binary;
pub mod error;
pub mod func;
pub mod json;
pub mod traits;

pub use binary::BincodeCodec;
pub use error::{CodecError, CodecResult};
pub use func::FnCodec;
pub use json::JsonCodec;
pub use traits::Codec;
