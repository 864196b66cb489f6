//! Blob Store: durable key → bytes storage for uploaded PDFs and their previews.
//!
//! Keys are `/`-separated relative paths such as `{owner}/{job}/pdfs/{name}.pdf`.
//! Backends create whatever intermediate structure a key implies on `save`.
//! A failed `save` may leave a partial blob behind; callers do not clean up.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub mod fs;
pub mod s3;

pub use fs::FsBlobStore;
pub use s3::S3BlobStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("blob not found: {0}")]
    NotFound(String),

    #[error("invalid blob key: {0:?}")]
    InvalidKey(String),

    #[error("I/O error on blob {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("storage backend error on {key}: {message}")]
    Backend { key: String, message: String },
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }
}

/// Key-addressed byte storage. Implementations are shared across requests
/// as `Arc<dyn BlobStore>` and must tolerate concurrent saves to distinct keys.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn save(&self, key: &str, data: Bytes) -> Result<(), StorageError>;

    /// Returns `StorageError::NotFound` when nothing is stored under `key`.
    async fn read(&self, key: &str) -> Result<Bytes, StorageError>;

    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// All keys matching `prefix` (see [`key_matches_prefix`]), sorted.
    /// A prefix with nothing beneath it lists as empty.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError>;
}

/// Rejects keys that could escape the store root: absolute paths, backslashes,
/// and `.`/`..`/empty segments.
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    let bad = key.is_empty()
        || key.starts_with('/')
        || key.contains('\\')
        || key.contains('\0')
        || key
            .split('/')
            .any(|seg| seg.is_empty() || seg == "." || seg == "..");
    if bad {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Same rules as [`validate_key`], but an empty prefix (the whole store) and a
/// trailing `/` are allowed.
pub(crate) fn validate_prefix(prefix: &str) -> Result<(), StorageError> {
    let trimmed = prefix.trim_end_matches('/');
    if trimmed.is_empty() {
        return Ok(());
    }
    validate_key(trimmed).map_err(|_| StorageError::InvalidKey(prefix.to_string()))
}

/// Prefixes match whole segments: `u1` and `u1/` select `u1` itself and
/// everything below `u1/`, never `u10/...`. The empty prefix selects every key.
pub(crate) fn key_matches_prefix(key: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    prefix.is_empty()
        || key == prefix
        || key
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MemoryBlobStore;

    #[test]
    fn test_accepts_nested_relative_keys() {
        assert!(validate_key("owner/Backend Engineer/pdfs/abc.pdf").is_ok());
        assert!(validate_key("a.pdf").is_ok());
    }

    #[test]
    fn test_rejects_traversal_and_absolute_keys() {
        for key in ["", "/etc/passwd", "a/../b", "../x", "a//b", "a/./b", "a\\b", "a/"] {
            assert!(
                matches!(validate_key(key), Err(StorageError::InvalidKey(_))),
                "{key:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_prefix_allows_root_and_trailing_slash() {
        assert!(validate_prefix("").is_ok());
        assert!(validate_prefix("owner/").is_ok());
        assert!(validate_prefix("../owner").is_err());
    }

    #[test]
    fn test_prefix_matches_whole_segments() {
        assert!(key_matches_prefix("u1/job/a.pdf", "u1"));
        assert!(key_matches_prefix("u1/job/a.pdf", "u1/"));
        assert!(key_matches_prefix("u1/job/a.pdf", "u1/job/a.pdf"));
        assert!(key_matches_prefix("u1/job/a.pdf", ""));
        assert!(!key_matches_prefix("u10/job/a.pdf", "u1"));
        assert!(!key_matches_prefix("u1/job/a.pdf.bak", "u1/job/a.pdf"));
    }

    /// Listing behaviour every backend must share.
    pub(crate) async fn assert_list_contract(store: &dyn BlobStore) {
        for key in ["u1/job/pdfs/a.pdf", "u1/job/images/a.png", "u10/job/pdfs/b.pdf"] {
            store.save(key, Bytes::from_static(b"x")).await.unwrap();
        }

        assert_eq!(
            store.list("u1").await.unwrap(),
            vec!["u1/job/images/a.png", "u1/job/pdfs/a.pdf"]
        );
        assert_eq!(store.list("u1/").await.unwrap(), store.list("u1").await.unwrap());
        assert_eq!(
            store.list("u1/job/pdfs/a.pdf").await.unwrap(),
            vec!["u1/job/pdfs/a.pdf"]
        );
        assert_eq!(store.list("").await.unwrap().len(), 3);
        assert!(store.list("u2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_memory_store_list_contract() {
        assert_list_contract(&MemoryBlobStore::default()).await;
    }
}
