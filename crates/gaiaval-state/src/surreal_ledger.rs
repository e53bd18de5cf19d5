//! SurrealDB-backed ResultLedger and ItemCatalog implementations
//!
//! Uses `schema::ResultRow` and `schema::ItemRow` for persistence,
//! converting to/from `storage_traits` types at the boundary.

use std::collections::HashSet;

use async_trait::async_trait;
use surrealdb::engine::any::Any;
use surrealdb::Surreal;
use tracing::{debug, info};

use crate::error::StorageError;
use crate::handle;
use crate::schema::{ItemRow, ResultRow};
use crate::storage_traits::{
    BenchmarkItem, ItemCatalog, ResultLedger, ResultRecord, StorageResult,
};

const RESULT_KEY_INDEX: &str = "idx_result_key";

/// Whether a SurrealDB error message reports a write rejected by `index`.
fn is_unique_violation(message: &str, index: &str) -> bool {
    message.contains(index) && message.contains("already contains")
}

/// SurrealDB-backed implementation of [`ResultLedger`].
#[derive(Clone)]
pub struct SurrealResultLedger {
    db: Surreal<Any>,
}

impl SurrealResultLedger {
    /// Wrap an already-connected database (schema must be initialized).
    pub fn new(db: Surreal<Any>) -> Self {
        Self { db }
    }

    /// Create an in-memory instance for testing.
    pub async fn in_memory() -> crate::Result<Self> {
        let db = handle::connect_in_memory().await?;
        info!("SurrealResultLedger connected (in-memory)");
        Ok(Self { db })
    }

    /// Create from environment variables. See [`handle::connect_from_env`].
    pub async fn from_env() -> crate::Result<Self> {
        let db = handle::connect_from_env().await?;
        Ok(Self { db })
    }

    async fn exists(&self, record: &ResultRecord) -> StorageResult<bool> {
        let mut res = self
            .db
            .query(
                "SELECT * FROM results WHERE session_id = $sid AND task_id = $tid \
                 AND attempt_number = $n",
            )
            .bind(("sid", record.session_id.clone()))
            .bind(("tid", record.task_id.clone()))
            .bind(("n", record.attempt_number))
            .await?;
        let rows: Vec<ResultRow> = res.take(0)?;
        Ok(!rows.is_empty())
    }

    fn rows_to_records(rows: Vec<ResultRow>) -> StorageResult<Vec<ResultRecord>> {
        rows.into_iter().map(ResultRow::into_record).collect()
    }
}

#[async_trait]
impl ResultLedger for SurrealResultLedger {
    async fn append(&self, record: &ResultRecord) -> StorageResult<()> {
        if self.exists(record).await? {
            return Err(StorageError::DuplicateRecord {
                session_id: record.session_id.clone(),
                task_id: record.task_id.clone(),
                attempt_number: record.attempt_number,
            });
        }

        debug!(
            task_id = %record.task_id,
            attempt = record.attempt_number,
            category = %record.category,
            "appending result"
        );

        // The pre-check can race with another writer; the unique index decides.
        let created: Result<Option<ResultRow>, surrealdb::Error> = self
            .db
            .create("results")
            .content(ResultRow::from_record(record))
            .await;
        match created {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e.to_string(), RESULT_KEY_INDEX) => {
                Err(StorageError::DuplicateRecord {
                    session_id: record.session_id.clone(),
                    task_id: record.task_id.clone(),
                    attempt_number: record.attempt_number,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn list_for_item(&self, task_id: &str) -> StorageResult<Vec<ResultRecord>> {
        let mut res = self
            .db
            .query("SELECT * FROM results WHERE task_id = $tid ORDER BY recorded_at ASC")
            .bind(("tid", task_id.to_string()))
            .await?;
        let rows: Vec<ResultRow> = res.take(0)?;
        Self::rows_to_records(rows)
    }

    async fn list_all(&self) -> StorageResult<Vec<ResultRecord>> {
        let mut res = self
            .db
            .query("SELECT * FROM results ORDER BY recorded_at ASC")
            .await?;
        let rows: Vec<ResultRow> = res.take(0)?;
        Self::rows_to_records(rows)
    }
}

/// SurrealDB-backed implementation of [`ItemCatalog`] over `benchmark_items`.
#[derive(Clone)]
pub struct SurrealItemCatalog {
    db: Surreal<Any>,
}

impl SurrealItemCatalog {
    /// Wrap an already-connected database (schema must be initialized).
    pub fn new(db: Surreal<Any>) -> Self {
        Self { db }
    }

    /// Create an in-memory instance for testing.
    pub async fn in_memory() -> crate::Result<Self> {
        let db = handle::connect_in_memory().await?;
        Ok(Self { db })
    }

    /// Insert items after any already present, preserving their order.
    ///
    /// The batch is all-or-nothing: a task id repeated in `items` or already
    /// in the catalog fails with [`StorageError::DuplicateItem`] and nothing
    /// is written.
    pub async fn insert_items(&self, items: &[BenchmarkItem]) -> StorageResult<()> {
        let mut seen = HashSet::new();
        for item in items {
            if !seen.insert(item.task_id.as_str()) {
                return Err(StorageError::DuplicateItem {
                    task_id: item.task_id.clone(),
                });
            }
        }

        let ids: Vec<String> = items.iter().map(|i| i.task_id.clone()).collect();
        let mut res = self
            .db
            .query("SELECT VALUE task_id FROM benchmark_items WHERE task_id IN $ids")
            .query("SELECT count() AS total FROM benchmark_items GROUP ALL")
            .bind(("ids", ids))
            .await?;
        let existing: Vec<String> = res.take(0)?;
        if let Some(task_id) = existing.into_iter().next() {
            return Err(StorageError::DuplicateItem { task_id });
        }
        let total: Option<u64> = res.take((1, "total"))?;
        let start = total.unwrap_or(0);

        let rows: Vec<ItemRow> = items
            .iter()
            .enumerate()
            .map(|(offset, item)| ItemRow::from_item(start + offset as u64, item))
            .collect();
        self.db
            .query(
                "BEGIN TRANSACTION; \
                 FOR $row IN $rows { CREATE benchmark_items CONTENT $row; }; \
                 COMMIT TRANSACTION;",
            )
            .bind(("rows", rows))
            .await
            .and_then(|res| res.check())?;

        info!(count = items.len(), "inserted benchmark items");
        Ok(())
    }
}

#[async_trait]
impl ItemCatalog for SurrealItemCatalog {
    async fn load_items(&self) -> StorageResult<Vec<BenchmarkItem>> {
        let mut res = self
            .db
            .query("SELECT * FROM benchmark_items ORDER BY position ASC")
            .await
            .map_err(|e| StorageError::DataUnavailable(e.to_string()))?;
        let rows: Vec<ItemRow> = res
            .take(0)
            .map_err(|e| StorageError::DataUnavailable(e.to_string()))?;
        Ok(rows.into_iter().map(ItemRow::into_item).collect())
    }
}
