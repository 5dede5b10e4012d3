use cellar_backend::BackendError;
use cellar_codec::CodecError;

/// Why a cell could not produce a stored value or commit a write.
///
/// Cells never return these to callers: read-side errors resolve to the
/// cell's default value and write-side errors abort the write. They exist
/// so that every recovered failure is logged with its key and cause.
#[derive(Debug, thiserror::Error)]
pub enum CellError {
    /// No entry exists under the key.
    #[error("no stored value for {key}")]
    AbsentEntry { key: String },

    /// The entry exists but holds zero bytes.
    #[error("stored value for {key} is empty")]
    EmptyPayload { key: String },

    /// The entry does not conform to the codec's schema.
    #[error("cannot decode {key}: {source}")]
    Decode {
        key: String,
        #[source]
        source: CodecError,
    },

    /// The register entry holds a different kind of value than the cell
    /// stores (e.g. a native bool where codec data was expected).
    #[error("entry {key} holds {found}, expected {expected}")]
    KindMismatch {
        key: String,
        found: &'static str,
        expected: &'static str,
    },

    /// The value could not be encoded; nothing was written.
    #[error("cannot encode {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: CodecError,
    },

    /// The medium failed while reading.
    #[error("backend read failed for {key}: {source}")]
    BackendRead {
        key: String,
        #[source]
        source: BackendError,
    },

    /// The medium rejected the write.
    #[error("backend write failed for {key}: {source}")]
    BackendWrite {
        key: String,
        #[source]
        source: BackendError,
    },

    /// The medium rejected the delete.
    #[error("backend delete failed for {key}: {source}")]
    BackendDelete {
        key: String,
        #[source]
        source: BackendError,
    },
}

impl CellError {
    /// `true` for the plain "nothing stored yet" case, which is routine and
    /// not worth a warning.
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::AbsentEntry { .. })
    }

    /// The key or filename the failure concerns.
    pub fn key(&self) -> &str {
        match self {
            Self::AbsentEntry { key }
            | Self::EmptyPayload { key }
            | Self::Decode { key, .. }
            | Self::KindMismatch { key, .. }
            | Self::Encode { key, .. }
            | Self::BackendRead { key, .. }
            | Self::BackendWrite { key, .. }
            | Self::BackendDelete { key, .. } => key,
        }
    }
}

pub type CellResult<T> = Result<T, CellError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_is_the_only_quiet_error() {
        assert!(CellError::AbsentEntry { key: "k".into() }.is_absent());
        assert!(!CellError::EmptyPayload { key: "k".into() }.is_absent());
    }

    #[test]
    fn message_carries_key_and_cause() {
        let err = CellError::BackendWrite {
            key: "theme".into(),
            source: BackendError::ReadOnly,
        };
        assert_eq!(err.key(), "theme");
        assert_eq!(err.to_string(), "backend write failed for theme: store is read-only");
    }
}
