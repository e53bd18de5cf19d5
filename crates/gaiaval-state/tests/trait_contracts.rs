//! Trait contract tests for ItemCatalog, ResultLedger, and ArtifactStore.
//!
//! Each contract runs against the in-memory fakes and the real backends
//! (SurrealDB `mem://`, filesystem artifacts in a temp dir).

use chrono::{Duration, Utc};
use gaiaval_state::fakes::{MemoryArtifactStore, MemoryItemCatalog, MemoryResultLedger};
use gaiaval_state::storage_traits::*;
use gaiaval_state::{FsArtifactStore, StorageError, SurrealItemCatalog, SurrealResultLedger};

fn record(session: &str, task: &str, attempt: u32, category: ResponseCategory) -> ResultRecord {
    ResultRecord {
        session_id: session.to_string(),
        task_id: task.to_string(),
        attempt_number: attempt,
        model: "gpt-4o".to_string(),
        answer: "Paris".to_string(),
        category,
        error: None,
        recorded_at: Utc::now(),
    }
}

fn item(task: &str, level: &str) -> BenchmarkItem {
    BenchmarkItem {
        task_id: task.to_string(),
        question: format!("question for {task}"),
        final_answer: "42".to_string(),
        level: Some(level.to_string()),
        file_name: None,
        steps: vec!["1. Look it up".to_string(), "2. Report".to_string()],
    }
}

// ===========================================================================
// ResultLedger contract
// ===========================================================================

async fn ledger_append_then_list(ledger: &dyn ResultLedger) {
    let r = record("s1", "t1", 1, ResponseCategory::CorrectAsIs);
    ledger.append(&r).await.unwrap();

    let listed = ledger.list_for_item("t1").await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].category, ResponseCategory::CorrectAsIs);
    assert_eq!(listed[0].session_id, "s1");
    assert!(ledger.list_for_item("other").await.unwrap().is_empty());
}

async fn ledger_rejects_duplicate_key(ledger: &dyn ResultLedger) {
    let r = record("s1", "t1", 2, ResponseCategory::CorrectAfterSteps);
    ledger.append(&r).await.unwrap();

    let err = ledger.append(&r).await.unwrap_err();
    assert!(
        matches!(err, StorageError::DuplicateRecord { attempt_number: 2, .. }),
        "unexpected error: {err:?}"
    );
    assert_eq!(ledger.list_for_item("t1").await.unwrap().len(), 1);
}

async fn ledger_same_item_different_sessions(ledger: &dyn ResultLedger) {
    ledger
        .append(&record("s1", "t1", 1, ResponseCategory::WrongAnswer))
        .await
        .unwrap();
    ledger
        .append(&record("s2", "t1", 1, ResponseCategory::CorrectAsIs))
        .await
        .unwrap();

    assert_eq!(ledger.list_for_item("t1").await.unwrap().len(), 2);
}

async fn ledger_list_all_ordered_by_time(ledger: &dyn ResultLedger) {
    let now = Utc::now();
    let mut late = record("s2", "t2", 1, ResponseCategory::WrongAnswer);
    late.recorded_at = now;
    let mut early = record("s1", "t1", 1, ResponseCategory::CorrectAsIs);
    early.recorded_at = now - Duration::seconds(30);

    ledger.append(&late).await.unwrap();
    ledger.append(&early).await.unwrap();

    let all = ledger.list_all().await.unwrap();
    let tasks: Vec<&str> = all.iter().map(|r| r.task_id.as_str()).collect();
    assert_eq!(tasks, vec!["t1", "t2"]);
}

async fn ledger_keeps_error_detail(ledger: &dyn ResultLedger) {
    let mut r = record("s1", "t9", 1, ResponseCategory::Errored);
    r.answer = String::new();
    r.error = Some("invocation timed out after 120s".to_string());
    ledger.append(&r).await.unwrap();

    let listed = ledger.list_for_item("t9").await.unwrap();
    assert_eq!(listed[0].category, ResponseCategory::Errored);
    assert_eq!(
        listed[0].error.as_deref(),
        Some("invocation timed out after 120s")
    );
}

#[tokio::test]
async fn memory_ledger_contract() {
    ledger_append_then_list(&MemoryResultLedger::new()).await;
    ledger_rejects_duplicate_key(&MemoryResultLedger::new()).await;
    ledger_same_item_different_sessions(&MemoryResultLedger::new()).await;
    ledger_list_all_ordered_by_time(&MemoryResultLedger::new()).await;
    ledger_keeps_error_detail(&MemoryResultLedger::new()).await;
}

#[tokio::test]
async fn surreal_ledger_contract() {
    ledger_append_then_list(&SurrealResultLedger::in_memory().await.unwrap()).await;
    ledger_rejects_duplicate_key(&SurrealResultLedger::in_memory().await.unwrap()).await;
    ledger_same_item_different_sessions(&SurrealResultLedger::in_memory().await.unwrap()).await;
    ledger_list_all_ordered_by_time(&SurrealResultLedger::in_memory().await.unwrap()).await;
    ledger_keeps_error_detail(&SurrealResultLedger::in_memory().await.unwrap()).await;
}

// ===========================================================================
// ItemCatalog contract
// ===========================================================================

#[tokio::test]
async fn memory_catalog_preserves_order() {
    let catalog = MemoryItemCatalog::new(vec![item("b", "2"), item("a", "1")]);
    let ids: Vec<String> = catalog
        .load_items()
        .await
        .unwrap()
        .into_iter()
        .map(|i| i.task_id)
        .collect();
    assert_eq!(ids, vec!["b", "a"]);
}

#[tokio::test]
async fn surreal_catalog_preserves_insert_order() {
    let catalog = SurrealItemCatalog::in_memory().await.unwrap();
    catalog
        .insert_items(&[item("b", "2"), item("a", "1")])
        .await
        .unwrap();
    catalog.insert_items(&[item("c", "3")]).await.unwrap();

    let items = catalog.load_items().await.unwrap();
    let ids: Vec<&str> = items.iter().map(|i| i.task_id.as_str()).collect();
    assert_eq!(ids, vec!["b", "a", "c"]);
    assert_eq!(items[0].steps.len(), 2);
    assert_eq!(items[0].level.as_deref(), Some("2"));
}

#[tokio::test]
async fn surreal_catalog_rejects_duplicate_batch_atomically() {
    let catalog = SurrealItemCatalog::in_memory().await.unwrap();
    catalog.insert_items(&[item("a", "1")]).await.unwrap();

    let err = catalog
        .insert_items(&[item("b", "1"), item("c", "2"), item("b", "3")])
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::DuplicateItem { ref task_id } if task_id == "b"));

    let err = catalog
        .insert_items(&[item("d", "1"), item("a", "2")])
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::DuplicateItem { ref task_id } if task_id == "a"));

    let ids: Vec<String> = catalog
        .load_items()
        .await
        .unwrap()
        .into_iter()
        .map(|i| i.task_id)
        .collect();
    assert_eq!(ids, vec!["a"]);

    catalog.insert_items(&[item("d", "1")]).await.unwrap();
    assert_eq!(catalog.load_items().await.unwrap().len(), 2);
}

#[tokio::test]
async fn surreal_catalog_empty_is_ok() {
    let catalog = SurrealItemCatalog::in_memory().await.unwrap();
    assert!(catalog.load_items().await.unwrap().is_empty());
}

// ===========================================================================
// ArtifactStore contract
// ===========================================================================

async fn artifacts_append_list_read(store: &dyn ArtifactStore) {
    let first = store.append_artifact("t1", 1, b"prompt one").await.unwrap();
    store.append_artifact("t1", 2, b"prompt two").await.unwrap();

    let listed = store.list_artifacts("t1", 1).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].digest, first.digest);
    assert_eq!(store.read(&first).await.unwrap(), b"prompt one");
    assert_eq!(first.size_bytes, 10);
}

async fn artifacts_missing_is_not_found(store: &dyn ArtifactStore) {
    let bogus = ArtifactRef {
        task_id: "t1".to_string(),
        attempt_number: 1,
        digest: ContentDigest::from_bytes(b"never stored"),
        size_bytes: 0,
    };
    let err = store.read(&bogus).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound { .. }));
    assert!(store.list_artifacts("t1", 7).await.unwrap().is_empty());
}

async fn artifacts_identical_blob_stored_once(store: &dyn ArtifactStore) {
    let a = store.append_artifact("t3", 1, b"same").await.unwrap();
    let b = store.append_artifact("t3", 1, b"same").await.unwrap();
    assert_eq!(a.digest, b.digest);
    assert_eq!(store.list_artifacts("t3", 1).await.unwrap().len(), 1);
}

#[tokio::test]
async fn memory_artifact_contract() {
    artifacts_append_list_read(&MemoryArtifactStore::new()).await;
    artifacts_missing_is_not_found(&MemoryArtifactStore::new()).await;
    artifacts_identical_blob_stored_once(&MemoryArtifactStore::new()).await;
}

#[tokio::test]
async fn fs_artifact_contract() {
    let dir = tempfile::tempdir().unwrap();
    artifacts_append_list_read(&FsArtifactStore::new(dir.path().join("a")).unwrap()).await;
    artifacts_missing_is_not_found(&FsArtifactStore::new(dir.path().join("b")).unwrap()).await;
    artifacts_identical_blob_stored_once(&FsArtifactStore::new(dir.path().join("c")).unwrap()).await;
}
