//! The [`Codec`] trait shared by every storage cell.

use std::sync::Arc;

use crate::error::CodecResult;

/// A stateless encoder/decoder pair for values of type `T`.
///
/// Implementations must be pure: encoding the same value twice yields the
/// same bytes, and decoding never mutates the codec. A cell owns exactly one
/// codec for its whole lifetime.
pub trait Codec<T>: Send + Sync {
    /// Encode `value` into the bytes handed to the storage backend.
    fn encode(&self, value: &T) -> CodecResult<Vec<u8>>;

    /// Decode bytes read back from the storage backend.
    fn decode(&self, bytes: &[u8]) -> CodecResult<T>;

    /// Short format name used in diagnostics (e.g. `"json"`).
    fn name(&self) -> &'static str;
}

impl<T, C> Codec<T> for Arc<C>
where
    C: Codec<T> + ?Sized,
{
    fn encode(&self, value: &T) -> CodecResult<Vec<u8>> {
        (**self).encode(value)
    }

    fn decode(&self, bytes: &[u8]) -> CodecResult<T> {
        (**self).decode(bytes)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
