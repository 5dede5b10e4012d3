//! Flat key/value preference registers.
//!
//! A register maps string keys to [`RegisterValue`]s. Cells either store
//! codec output as [`RegisterValue::Data`] or, for a handful of scalar
//! types, the scalar itself (see [`NativeValue`]).

use serde::{Deserialize, Serialize};

use crate::error::BackendResult;

/// A single register entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegisterValue {
    /// Opaque codec output.
    Data(Vec<u8>),
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl RegisterValue {
    /// Short name of the variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Data(_) => "data",
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
        }
    }

    /// The payload of a `Data` entry.
    pub fn as_data(&self) -> Option<&[u8]> {
        match self {
            Self::Data(bytes) => Some(bytes),
            _ => None,
        }
    }
}

/// Scalar types a register can hold without going through a codec.
pub trait NativeValue: Clone + Send + Sync + 'static {
    /// The [`RegisterValue::kind`] this type is stored as.
    const KIND: &'static str;

    fn to_register(&self) -> RegisterValue;

    /// Returns `None` when the entry holds a different kind, or a value
    /// out of range for `Self`.
    fn from_register(value: &RegisterValue) -> Option<Self>;
}

impl NativeValue for bool {
    const KIND: &'static str = "bool";

    fn to_register(&self) -> RegisterValue {
        RegisterValue::Bool(*self)
    }

    fn from_register(value: &RegisterValue) -> Option<Self> {
        match value {
            RegisterValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl NativeValue for i64 {
    const KIND: &'static str = "integer";

    fn to_register(&self) -> RegisterValue {
        RegisterValue::Integer(*self)
    }

    fn from_register(value: &RegisterValue) -> Option<Self> {
        match value {
            RegisterValue::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl NativeValue for i32 {
    const KIND: &'static str = "integer";

    fn to_register(&self) -> RegisterValue {
        RegisterValue::Integer(i64::from(*self))
    }

    fn from_register(value: &RegisterValue) -> Option<Self> {
        match value {
            RegisterValue::Integer(i) => i32::try_from(*i).ok(),
            _ => None,
        }
    }
}

impl NativeValue for u32 {
    const KIND: &'static str = "integer";

    fn to_register(&self) -> RegisterValue {
        RegisterValue::Integer(i64::from(*self))
    }

    fn from_register(value: &RegisterValue) -> Option<Self> {
        match value {
            RegisterValue::Integer(i) => u32::try_from(*i).ok(),
            _ => None,
        }
    }
}

impl NativeValue for f64 {
    const KIND: &'static str = "float";

    fn to_register(&self) -> RegisterValue {
        RegisterValue::Float(*self)
    }

    fn from_register(value: &RegisterValue) -> Option<Self> {
        match value {
            RegisterValue::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl NativeValue for String {
    const KIND: &'static str = "text";

    fn to_register(&self) -> RegisterValue {
        RegisterValue::Text(self.clone())
    }

    fn from_register(value: &RegisterValue) -> Option<Self> {
        match value {
            RegisterValue::Text(s) => Some(s.clone()),
            _ => None,
        }
    }
}

/// A flat key/value register, the medium behind preference cells.
///
/// Implementations must be thread-safe. Several cells may share one
/// register as long as their keys differ; equal keys alias silently.
pub trait PreferenceRegister: Send + Sync {
    /// Look up an entry. Returns `Ok(None)` if the key is not present.
    fn get(&self, key: &str) -> BackendResult<Option<RegisterValue>>;

    /// Insert or replace an entry.
    fn set(&self, key: &str, value: RegisterValue) -> BackendResult<()>;

    /// Remove an entry. Returns `true` if it existed; removing a missing
    /// key is not an error.
    fn remove(&self, key: &str) -> BackendResult<bool>;

    /// All keys currently present, sorted.
    fn keys(&self) -> BackendResult<Vec<String>>;

    /// Whether `key` is present.
    fn contains(&self, key: &str) -> BackendResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_shape_is_tagged_by_kind() {
        let json = serde_json::to_string(&RegisterValue::Bool(true)).unwrap();
        assert_eq!(json, r#"{"bool":true}"#);
        let json = serde_json::to_string(&RegisterValue::Data(vec![1, 2])).unwrap();
        assert_eq!(json, r#"{"data":[1,2]}"#);
        let back: RegisterValue = serde_json::from_str(r#"{"text":"hi"}"#).unwrap();
        assert_eq!(back, RegisterValue::Text("hi".into()));
    }

    #[test]
    fn native_conversions_check_kind() {
        assert_eq!(bool::from_register(&true.to_register()), Some(true));
        assert_eq!(bool::from_register(&RegisterValue::Integer(1)), None);
        assert_eq!(String::from_register(&RegisterValue::Text("x".into())), Some("x".into()));
        assert_eq!(f64::from_register(&RegisterValue::Integer(3)), None);
    }

    #[test]
    fn narrow_integers_reject_out_of_range() {
        assert_eq!(i32::from_register(&RegisterValue::Integer(-5)), Some(-5));
        assert_eq!(i32::from_register(&RegisterValue::Integer(i64::MAX)), None);
        assert_eq!(u32::from_register(&RegisterValue::Integer(-1)), None);
        assert_eq!(u32::KIND, RegisterValue::Integer(0).kind());
    }

    #[test]
    fn as_data_only_for_data() {
        assert_eq!(RegisterValue::Data(vec![9]).as_data(), Some(&[9u8][..]));
        assert_eq!(RegisterValue::Float(1.0).as_data(), None);
    }
}
