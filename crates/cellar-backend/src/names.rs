//! Validation of filenames and custom directory names.
//!
//! A file cell's filename must name exactly one file inside its directory:
//! - non-empty
//! - no path separators (`/` or `\`) and no NUL
//! - not `.` or `..`
//!
//! Custom directories may be nested (`a/b`) but every component must obey
//! the same rules, so the resolved path never leaves the store root.

use crate::error::{BackendError, BackendResult};

const FORBIDDEN_CHARS: &[char] = &['/', '\\', '\0'];

/// Validate a filename, returning `Ok(())` if it is a single path component.
pub fn validate_filename(name: &str) -> BackendResult<()> {
    if name.is_empty() {
        return Err(invalid(name, "must not be empty"));
    }
    if let Some(ch) = name.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
        return Err(invalid(name, &format!("contains forbidden character: {ch:?}")));
    }
    if name == "." || name == ".." {
        return Err(invalid(name, "must not be '.' or '..'"));
    }
    Ok(())
}

/// Validate a relative directory such as `"exports/2024"`.
pub fn validate_directory(path: &str) -> BackendResult<()> {
    if path.is_empty() {
        return Err(invalid(path, "must not be empty"));
    }
    if path.starts_with('/') || path.ends_with('/') {
        return Err(invalid(path, "must not start or end with '/'"));
    }
    for component in path.split('/') {
        validate_filename(component).map_err(|_| {
            invalid(path, &format!("invalid component {component:?}"))
        })?;
    }
    Ok(())
}

fn invalid(name: &str, reason: &str) -> BackendError {
    BackendError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}
