use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CodecError, CodecResult};
use crate::traits::Codec;

/// Compact binary codec backed by `bincode`.
///
/// Smaller and faster than JSON for large payloads, but the output is not
/// self-describing: changing the shape of `T` makes old bytes undecodable,
/// which a cell treats as "absent" and answers with its default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BincodeCodec;

impl<T> Codec<T> for BincodeCodec
where
    T: Serialize + DeserializeOwned,
{
    fn encode(&self, value: &T) -> CodecResult<Vec<u8>> {
        bincode::serialize(value).map_err(|e| CodecError::serialization("bincode", e))
    }

    fn decode(&self, bytes: &[u8]) -> CodecResult<T> {
        bincode::deserialize(bytes).map_err(|e| CodecError::deserialization("bincode", e))
    }

    fn name(&self) -> &'static str {
        "bincode"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Session {
        user: String,
        token: Vec<u8>,
        expires_at: u64,
    }

    #[test]
    fn struct_roundtrip() {
        let session = Session {
            user: "ada".into(),
            token: vec![0xde, 0xad, 0xbe, 0xef],
            expires_at: 1_700_000_000,
        };
        let bytes = BincodeCodec.encode(&session).unwrap();
        let back: Session = BincodeCodec.decode(&bytes).unwrap();
        assert_eq!(back, session);
    }

    #[test]
    fn u64_is_fixed_width() {
        let bytes = BincodeCodec.encode(&7u64).unwrap();
        assert_eq!(bytes, 7u64.to_le_bytes());
    }

    #[test]
    fn truncated_input_fails() {
        let bytes = BincodeCodec.encode(&u64::MAX).unwrap();
        let err = Codec::<u64>::decode(&BincodeCodec, &bytes[..3]).unwrap_err();
        assert!(matches!(
            err,
            CodecError::Deserialization { codec: "bincode", .. }
        ));
    }

    #[test]
    fn name_is_bincode() {
        assert_eq!(Codec::<u8>::name(&BincodeCodec), "bincode");
    }
}
