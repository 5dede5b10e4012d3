use thiserror::Error;

/// Errors produced while translating a value to or from stored bytes.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The value could not be turned into bytes.
    #[error("{codec} serialization error: {reason}")]
    Serialization { codec: &'static str, reason: String },

    /// The bytes do not conform to the schema the codec expects.
    #[error("{codec} deserialization error: {reason}")]
    Deserialization { codec: &'static str, reason: String },
}

impl CodecError {
    pub fn serialization(codec: &'static str, reason: impl ToString) -> Self {
        Self::Serialization {
            codec,
            reason: reason.to_string(),
        }
    }

    pub fn deserialization(codec: &'static str, reason: impl ToString) -> Self {
        Self::Deserialization {
            codec,
            reason: reason.to_string(),
        }
    }
}

pub type CodecResult<T> = Result<T, CodecError>;
