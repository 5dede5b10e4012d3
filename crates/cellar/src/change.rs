/// The argument of a cell write: store a value, or delete the entry.
///
/// Deleting is an explicit variant rather than a magic "null" value: a cell
/// of `Option<U>` deletes with `Change::Delete` and can still persist an
/// explicit `null` with `Change::Store(None)`. `Option<T>` converts into a
/// `Change<T>` with `None` meaning delete.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Change<T> {
    Store(T),
    Delete,
}

impl<T> Change<T> {
    pub fn is_delete(&self) -> bool {
        matches!(self, Self::Delete)
    }

    /// The value being stored, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Store(v) => Some(v),
            Self::Delete => None,
        }
    }
}

impl<T> From<Option<T>> for Change<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::Store(v),
            None => Self::Delete,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_conversion() {
        assert_eq!(Change::from(Some(3)), Change::Store(3));
        assert_eq!(Change::<i32>::from(None), Change::Delete);
        assert!(Change::<i32>::Delete.is_delete());
        assert_eq!(Change::Store("x").value(), Some(&"x"));
    }
}
