use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CodecError, CodecResult};
use crate::traits::Codec;

/// JSON codec backed by `serde_json`. This is the default for every cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct JsonCodec {
    pretty: bool,
}

impl JsonCodec {
    /// Compact JSON output.
    pub fn new() -> Self {
        Self { pretty: false }
    }

    /// Indented JSON output, handy for files meant to be read by people.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    pub fn is_pretty(&self) -> bool {
        self.pretty
    }
}

impl<T> Codec<T> for JsonCodec
where
    T: Serialize + DeserializeOwned,
{
    fn encode(&self, value: &T) -> CodecResult<Vec<u8>> {
        let out = if self.pretty {
            serde_json::to_vec_pretty(value)
        } else {
            serde_json::to_vec(value)
        };
        out.map_err(|e| CodecError::serialization("json", e))
    }

    fn decode(&self, bytes: &[u8]) -> CodecResult<T> {
        serde_json::from_slice(bytes).map_err(|e| CodecError::deserialization("json", e))
    }

    fn name(&self) -> &'static str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Settings {
        volume: u8,
        muted: bool,
        name: String,
    }

    fn settings() -> Settings {
        Settings {
            volume: 7,
            muted: false,
            name: "living room".into(),
        }
    }

    #[test]
    fn compact_roundtrip() {
        let codec = JsonCodec::new();
        let bytes = codec.encode(&settings()).unwrap();
        assert_eq!(
            std::str::from_utf8(&bytes).unwrap(),
            r#"{"volume":7,"muted":false,"name":"living room"}"#
        );
        let back: Settings = codec.decode(&bytes).unwrap();
        assert_eq!(back, settings());
    }

    #[test]
    fn pretty_output_is_indented() {
        let codec = JsonCodec::pretty();
        assert!(codec.is_pretty());
        let bytes = Codec::<Settings>::encode(&codec, &settings()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains('\n'));
        assert!(text.contains("  \"volume\": 7"));
    }

    #[test]
    fn scalars_and_options() {
        let codec = JsonCodec::new();
        assert_eq!(codec.encode(&42i64).unwrap(), b"42");
        assert_eq!(codec.encode(&None::<u32>).unwrap(), b"null");
        let back: Option<u32> = codec.decode(b"null").unwrap();
        assert_eq!(back, None);
    }

    #[test]
    fn schema_mismatch_is_deserialization_error() {
        let codec = JsonCodec::new();
        let err = Codec::<Settings>::decode(&codec, br#"{"volume":"loud"}"#).unwrap_err();
        assert!(matches!(err, CodecError::Deserialization { codec: "json", .. }));
    }

    #[test]
    fn empty_bytes_do_not_decode() {
        let codec = JsonCodec::new();
        assert!(Codec::<u32>::decode(&codec, b"").is_err());
    }

    #[test]
    fn non_string_map_keys_fail_to_encode() {
        use std::collections::HashMap;

        let codec = JsonCodec::new();
        let mut map = HashMap::new();
        map.insert((1u8, 2u8), "pair".to_string());
        let err = codec.encode(&map).unwrap_err();
        assert!(matches!(err, CodecError::Serialization { codec: "json", .. }));
    }
}
