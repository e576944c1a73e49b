//! In-process stores for tests. Failure switches let tests drive the
//! error paths of the analysis pipeline.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;

use super::{blob_key, BlobStore, KvStore, StorageError, StoredBlob};

#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<BTreeMap<String, (String, Bytes)>>,
    /// Number of uploads that succeed before every further upload fails.
    fail_after_uploads: Mutex<Option<usize>>,
    uploads: AtomicUsize,
    pub fail_deletes: AtomicBool,
}

impl MemoryBlobStore {
    pub fn failing_after(successful_uploads: usize) -> Self {
        let store = Self::default();
        *store.fail_after_uploads.lock().unwrap() = Some(successful_uploads);
        store
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.blobs.lock().unwrap().contains_key(path)
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(
        &self,
        file_name: &str,
        _content_type: &str,
        data: Bytes,
    ) -> Result<StoredBlob, StorageError> {
        let attempt = self.uploads.fetch_add(1, Ordering::SeqCst);
        if let Some(limit) = *self.fail_after_uploads.lock().unwrap() {
            if attempt >= limit {
                return Err(StorageError::Blob("upload rejected".into()));
            }
        }
        let path = blob_key("uploads/", file_name);
        let size = data.len() as u64;
        self.blobs
            .lock()
            .unwrap()
            .insert(path.clone(), (file_name.to_string(), data));
        Ok(StoredBlob {
            path,
            name: file_name.to_string(),
            size,
        })
    }

    async fn read(&self, path: &str) -> Result<Option<Bytes>, StorageError> {
        Ok(self.blobs.lock().unwrap().get(path).map(|(_, b)| b.clone()))
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StorageError::Blob("delete rejected".into()));
        }
        self.blobs.lock().unwrap().remove(path);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<StoredBlob>, StorageError> {
        Ok(self
            .blobs
            .lock()
            .unwrap()
            .iter()
            .map(|(path, (name, data))| StoredBlob {
                path: path.clone(),
                name: name.clone(),
                size: data.len() as u64,
            })
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryKvStore {
    entries: Mutex<BTreeMap<String, String>>,
    writes: AtomicUsize,
    /// Number of writes that succeed before every further write fails.
    fail_after_writes: Mutex<Option<usize>>,
}

impl MemoryKvStore {
    pub fn failing_after(successful_writes: usize) -> Self {
        let store = Self::default();
        *store.fail_after_writes.lock().unwrap() = Some(successful_writes);
        store
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.raw(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let attempt = self.writes.fetch_add(1, Ordering::SeqCst);
        if let Some(limit) = *self.fail_after_writes.lock().unwrap() {
            if attempt >= limit {
                return Err(StorageError::Kv("write rejected".into()));
            }
        }
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}
