use std::fmt;

use crate::error::CodecResult;
use crate::traits::Codec;

type EncodeFn<T> = Box<dyn Fn(&T) -> CodecResult<Vec<u8>> + Send + Sync>;
type DecodeFn<T> = Box<dyn Fn(&[u8]) -> CodecResult<T> + Send + Sync>;

/// A codec assembled from two closures, for custom text or binary formats
/// that do not go through serde.
pub struct FnCodec<T> {
    name: &'static str,
    encode: EncodeFn<T>,
    decode: DecodeFn<T>,
}

impl<T> FnCodec<T> {
    pub fn new<E, D>(name: &'static str, encode: E, decode: D) -> Self
    where
        E: Fn(&T) -> CodecResult<Vec<u8>> + Send + Sync + 'static,
        D: Fn(&[u8]) -> CodecResult<T> + Send + Sync + 'static,
    {
        Self {
            name,
            encode: Box::new(encode),
            decode: Box::new(decode),
        }
    }
}

impl<T> Codec<T> for FnCodec<T> {
    fn encode(&self, value: &T) -> CodecResult<Vec<u8>> {
        (self.encode)(value)
    }

    fn decode(&self, bytes: &[u8]) -> CodecResult<T> {
        (self.decode)(bytes)
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> fmt::Debug for FnCodec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCodec").field("name", &self.name).finish()
    }
}
