//! Feedback record store: JSON-serialized `ResumeRecord`s in the key-value
//! store under `resume:{id}`.
//!
//! Single-writer per id: the analysis pipeline writes a record twice
//! (placeholder, then final) and nothing else writes it concurrently.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::models::resume::ResumeRecord;
use crate::storage::{KvStore, StorageError};

pub mod handlers;

pub const RECORD_PREFIX: &str = "resume:";

pub fn record_key(id: &str) -> String {
    format!("{RECORD_PREFIX}{id}")
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Stored record {key} is not valid JSON: {source}")]
    Corrupt {
        key: String,
        source: serde_json::Error,
    },
}

#[derive(Clone)]
pub struct RecordStore {
    kv: Arc<dyn KvStore>,
}

impl RecordStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    pub async fn get(&self, id: &str) -> Result<Option<ResumeRecord>, RecordError> {
        let key = record_key(id);
        let Some(raw) = self.kv.get(&key).await? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| RecordError::Corrupt { key, source })
    }

    /// Writes (or overwrites) the record under its own id.
    pub async fn set(&self, record: &ResumeRecord) -> Result<(), RecordError> {
        let key = record_key(&record.id);
        let value = serde_json::to_string(record)
            .map_err(|source| RecordError::Corrupt { key: key.clone(), source })?;
        self.kv.set(&key, &value).await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<(), RecordError> {
        self.kv.delete(&record_key(id)).await?;
        Ok(())
    }

    /// All readable records, newest first. Undecodable values are skipped.
    pub async fn list(&self) -> Result<Vec<ResumeRecord>, RecordError> {
        let keys = self.kv.keys(RECORD_PREFIX).await?;
        let mut records = Vec::with_capacity(keys.len());
        for key in keys {
            let Some(raw) = self.kv.get(&key).await? else {
                continue;
            };
            match serde_json::from_str::<ResumeRecord>(&raw) {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping unreadable record {key}: {e}"),
            }
        }
        // None sorts before Some, so reversing puts undated records last.
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(records)
    }

    /// Removes every record. Returns how many keys were deleted.
    pub async fn wipe_all(&self) -> Result<usize, RecordError> {
        let keys = self.kv.keys(RECORD_PREFIX).await?;
        for key in &keys {
            self.kv.delete(key).await?;
        }
        info!("Wiped {} resume records", keys.len());
        Ok(keys.len())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::models::resume::AnalysisType;
    use crate::storage::memory::MemoryKvStore;

    fn record(id: &str, day: Option<u32>) -> ResumeRecord {
        ResumeRecord {
            id: id.to_string(),
            resume_path: format!("uploads/{id}.pdf"),
            image_path: format!("uploads/{id}.png"),
            company_name: None,
            job_title: None,
            job_description: None,
            analysis_type: AnalysisType::HrReview,
            feedback: None,
            created_at: day.map(|d| Utc.with_ymd_and_hms(2025, 1, d, 0, 0, 0).unwrap()),
        }
    }

    #[tokio::test]
    async fn test_set_then_get_uses_prefixed_key() {
        let kv = Arc::new(MemoryKvStore::default());
        let store = RecordStore::new(kv.clone());
        store.set(&record("abc", Some(1))).await.unwrap();

        assert!(kv.raw("resume:abc").is_some());
        assert_eq!(store.get("abc").await.unwrap(), Some(record("abc", Some(1))));
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_get_corrupt_record_errors() {
        let kv = Arc::new(MemoryKvStore::default());
        kv.set("resume:bad", "{not json").await.unwrap();
        let store = RecordStore::new(kv);
        assert!(matches!(
            store.get("bad").await,
            Err(RecordError::Corrupt { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_orders_newest_first_and_skips_garbage() {
        let kv = Arc::new(MemoryKvStore::default());
        let store = RecordStore::new(kv.clone());
        store.set(&record("old", Some(1))).await.unwrap();
        store.set(&record("new", Some(9))).await.unwrap();
        store.set(&record("undated", None)).await.unwrap();
        kv.set("resume:garbage", "[]").await.unwrap();
        kv.set("session:other", "{}").await.unwrap();

        let ids: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["new", "old", "undated"]);
    }

    #[tokio::test]
    async fn test_wipe_all_leaves_list_empty() {
        let kv = Arc::new(MemoryKvStore::default());
        let store = RecordStore::new(kv.clone());
        store.set(&record("a", Some(1))).await.unwrap();
        store.set(&record("b", Some(2))).await.unwrap();
        kv.set("session:other", "keep").await.unwrap();

        assert_eq!(store.wipe_all().await.unwrap(), 2);
        assert!(store.list().await.unwrap().is_empty());
        assert_eq!(kv.raw("session:other").as_deref(), Some("keep"));
    }

    #[tokio::test]
    async fn test_delete_removes_record() {
        let kv = Arc::new(MemoryKvStore::default());
        let store = RecordStore::new(kv);
        store.set(&record("a", Some(1))).await.unwrap();
        store.delete("a").await.unwrap();
        assert_eq!(store.get("a").await.unwrap(), None);
    }
}
