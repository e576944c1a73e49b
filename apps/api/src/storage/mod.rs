//! Storage seams: blob storage for uploaded files and a string key-value
//! store for records.
//!
//! Handlers and the analysis pipeline only see `Arc<dyn BlobStore>` and
//! `Arc<dyn KvStore>`; the S3 and Redis backends are wired in `main`.

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;

#[cfg(test)]
pub mod memory;
pub mod redis_kv;
pub mod s3;

pub use redis_kv::RedisKvStore;
pub use s3::S3BlobStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Blob storage error: {0}")]
    Blob(String),

    #[error("Key-value store error: {0}")]
    Kv(String),
}

/// Handle returned by a successful upload. `path` is the only thing callers
/// keep; it is opaque outside the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredBlob {
    pub path: String,
    pub name: String,
    pub size: u64,
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(
        &self,
        file_name: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<StoredBlob, StorageError>;

    /// `Ok(None)` when nothing is stored at `path`.
    async fn read(&self, path: &str) -> Result<Option<Bytes>, StorageError>;

    async fn delete(&self, path: &str) -> Result<(), StorageError>;

    async fn list(&self) -> Result<Vec<StoredBlob>, StorageError>;
}

#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Keys starting with `prefix`, in no particular order.
    async fn keys(&self, prefix: &str) -> Result<Vec<String>, StorageError>;
}

/// Object key for an uploaded file: a fresh UUID keeps repeated uploads of
/// the same file name apart.
pub fn blob_key(prefix: &str, file_name: &str) -> String {
    format!("{prefix}{}-{}", uuid::Uuid::new_v4(), sanitize_file_name(file_name))
}

fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim_matches(['.', '_']).is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_directories() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\docs\\cv.pdf"), "cv.pdf");
    }

    #[test]
    fn test_sanitize_replaces_spaces_and_unicode() {
        assert_eq!(sanitize_file_name("My Résumé 2024.pdf"), "My_R_sum__2024.pdf");
    }

    #[test]
    fn test_sanitize_empty_name() {
        assert_eq!(sanitize_file_name(".."), "file");
        assert_eq!(sanitize_file_name(""), "file");
    }

    #[test]
    fn test_blob_key_keeps_prefix_and_name() {
        let key = blob_key("uploads/", "cv.pdf");
        assert!(key.starts_with("uploads/"));
        assert!(key.ends_with("-cv.pdf"));
    }
}
