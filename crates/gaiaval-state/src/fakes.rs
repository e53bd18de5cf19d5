//! In-memory fakes for storage traits (testing only)
//!
//! Provides `MemoryItemCatalog`, `MemoryResultLedger`, and `MemoryArtifactStore`
//! that satisfy the trait contracts without any external dependencies.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::storage_traits::*;

// ---------------------------------------------------------------------------
// MemoryItemCatalog
// ---------------------------------------------------------------------------

/// Item catalog over a fixed vector of items.
#[derive(Debug, Default)]
pub struct MemoryItemCatalog {
    items: Vec<BenchmarkItem>,
}

impl MemoryItemCatalog {
    pub fn new(items: Vec<BenchmarkItem>) -> Self {
        Self { items }
    }
}

#[async_trait]
impl ItemCatalog for MemoryItemCatalog {
    async fn load_items(&self) -> StorageResult<Vec<BenchmarkItem>> {
        Ok(self.items.clone())
    }
}

// ---------------------------------------------------------------------------
// MemoryResultLedger
// ---------------------------------------------------------------------------

/// In-memory result ledger backed by an append-only `Vec<ResultRecord>`.
#[derive(Debug, Default)]
pub struct MemoryResultLedger {
    records: Mutex<Vec<ResultRecord>>,
}

impl MemoryResultLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResultLedger for MemoryResultLedger {
    async fn append(&self, record: &ResultRecord) -> StorageResult<()> {
        let mut records = self.records.lock().unwrap();
        let duplicate = records.iter().any(|r| {
            r.session_id == record.session_id
                && r.task_id == record.task_id
                && r.attempt_number == record.attempt_number
        });
        if duplicate {
            return Err(StorageError::DuplicateRecord {
                session_id: record.session_id.clone(),
                task_id: record.task_id.clone(),
                attempt_number: record.attempt_number,
            });
        }
        records.push(record.clone());
        Ok(())
    }

    async fn list_for_item(&self, task_id: &str) -> StorageResult<Vec<ResultRecord>> {
        let records = self.records.lock().unwrap();
        let mut matching: Vec<ResultRecord> = records
            .iter()
            .filter(|r| r.task_id == task_id)
            .cloned()
            .collect();
        matching.sort_by_key(|r| r.recorded_at);
        Ok(matching)
    }

    async fn list_all(&self) -> StorageResult<Vec<ResultRecord>> {
        let records = self.records.lock().unwrap();
        let mut all = records.clone();
        all.sort_by_key(|r| r.recorded_at);
        Ok(all)
    }
}

// ---------------------------------------------------------------------------
// MemoryArtifactStore
// ---------------------------------------------------------------------------

/// In-memory artifact store keyed by `(task_id, attempt_number)`.
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    blobs: Mutex<HashMap<(String, u32), Vec<(ContentDigest, Vec<u8>)>>>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArtifactStore for MemoryArtifactStore {
    async fn append_artifact(
        &self,
        task_id: &str,
        attempt_number: u32,
        blob: &[u8],
    ) -> StorageResult<ArtifactRef> {
        let digest = ContentDigest::from_bytes(blob);
        let mut blobs = self.blobs.lock().unwrap();
        let entries = blobs
            .entry((task_id.to_string(), attempt_number))
            .or_default();
        if !entries.iter().any(|(d, _)| *d == digest) {
            entries.push((digest.clone(), blob.to_vec()));
        }
        Ok(ArtifactRef {
            task_id: task_id.to_string(),
            attempt_number,
            digest,
            size_bytes: blob.len() as u64,
        })
    }

    async fn list_artifacts(
        &self,
        task_id: &str,
        attempt_number: u32,
    ) -> StorageResult<Vec<ArtifactRef>> {
        let blobs = self.blobs.lock().unwrap();
        Ok(blobs
            .get(&(task_id.to_string(), attempt_number))
            .map(|entries| {
                entries
                    .iter()
                    .map(|(digest, data)| ArtifactRef {
                        task_id: task_id.to_string(),
                        attempt_number,
                        digest: digest.clone(),
                        size_bytes: data.len() as u64,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn read(&self, artifact: &ArtifactRef) -> StorageResult<Vec<u8>> {
        let blobs = self.blobs.lock().unwrap();
        blobs
            .get(&(artifact.task_id.clone(), artifact.attempt_number))
            .and_then(|entries| entries.iter().find(|(d, _)| *d == artifact.digest))
            .map(|(_, data)| data.clone())
            .ok_or_else(|| StorageError::NotFound {
                what: format!(
                    "artifact {} for {} attempt {}",
                    artifact.digest.short(),
                    artifact.task_id,
                    artifact.attempt_number
                ),
            })
    }
}
