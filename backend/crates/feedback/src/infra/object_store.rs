//! Object Store Contract
//!
//! Whole-object byte storage addressed by slash-separated keys such as
//! `feedback/{id}.json`. Writes replace the entire object.

/// Object store failure
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error on {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Object store request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Object store returned status {status} for {key}")]
    Status { key: String, status: u16 },

    #[error("Corrupt object at {key}: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid object key: {0}")]
    InvalidKey(String),
}

/// Byte-level object store
#[trait_variant::make(ObjectStore: Send)]
pub trait LocalObjectStore {
    /// Write the whole object, replacing any previous one
    async fn write(&self, key: &str, body: Vec<u8>) -> Result<(), StorageError>;

    /// Read the whole object; `None` when absent
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Remove an object (idempotent)
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Reject keys that could escape the store namespace
///
/// Allowed: ASCII alphanumerics and `-_./`, no empty segments, no `..`.
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    let charset_ok = key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/'));
    let segments_ok = key
        .split('/')
        .all(|segment| !segment.is_empty() && segment != "." && segment != "..");
    if key.is_empty() || !charset_ok || !segments_ok {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}
