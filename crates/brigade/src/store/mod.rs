//! Key-path document store collaborator.
//!
//! Records live in one JSON tree addressed by slash-separated paths such as
//! `users/{id}` or `badges/{category}/{subCategory}/{badgeKey}`. A path that does not
//! exist reads as `None`; only transport or shape problems are errors.

mod memory;

pub use memory::MemoryStore;

use serde_json::Value;

/// Storage abstraction so services can be exercised against fixtures.
pub trait DataStore: Send + Sync {
    /// Read the subtree at `path`.
    fn get(&self, path: &str) -> Result<Option<Value>, StoreError>;
    /// Replace the subtree at `path`.
    fn write(&self, path: &str, value: Value) -> Result<(), StoreError>;
    /// Merge the fields of `partial` into the object at `path`.
    fn update(&self, path: &str, partial: Value) -> Result<(), StoreError>;
    /// Remove the subtree at `path`. Removing a missing path succeeds.
    fn delete(&self, path: &str) -> Result<(), StoreError>;
    /// Append `value` under a freshly generated child key and return that key.
    fn push(&self, path: &str, value: Value) -> Result<String, StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid store path '{0}'")]
    InvalidPath(String),
    #[error("cannot merge into '{path}': {reason}")]
    Shape { path: String, reason: String },
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Split a store path into its non-empty segments.
pub(crate) fn segments(path: &str) -> Result<Vec<&str>, StoreError> {
    let parts: Vec<&str> = path
        .split('/')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect();

    if parts.iter().any(|segment| *segment == "." || *segment == "..") {
        return Err(StoreError::InvalidPath(path.to_string()));
    }

    Ok(parts)
}

/// Join path segments, skipping empty ones.
pub fn join_path(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|part| part.trim_matches('/'))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}
