//! Storage trait definitions for GAIA Validator
//!
//! These traits define the storage abstractions the validation workflow
//! depends on:
//! - `ItemCatalog`: read-only source of benchmark items
//! - `ResultLedger`: append-only persistence of result records
//! - `ArtifactStore`: raw per-attempt logs keyed by item and attempt number
//!
//! All traits are async and backend-agnostic. In-memory fakes are provided
//! for testing via the `fakes` module.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::StorageError;

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

// ---------------------------------------------------------------------------
// ItemCatalog — Benchmark Items
// ---------------------------------------------------------------------------

/// One question/answer pair from the evaluation dataset.
///
/// Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkItem {
    /// Unique identifier (GAIA `task_id`)
    pub task_id: String,
    /// Question text sent to the model
    pub question: String,
    /// Predefined (gold) answer
    pub final_answer: String,
    /// Difficulty level ("1", "2", "3"), if known
    pub level: Option<String>,
    /// Name of the attached file, if any
    pub file_name: Option<String>,
    /// Annotator validation steps, in order
    pub steps: Vec<String>,
}

impl BenchmarkItem {
    /// Lowercased extension of the attached file, without the dot.
    pub fn file_extension(&self) -> Option<String> {
        let name = self.file_name.as_deref()?.trim();
        let (stem, ext) = name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

/// Source of benchmark items.
///
/// Guarantees:
/// - `load_items` returns every item the source holds, in source order.
/// - Fails with `StorageError::DataUnavailable` when the source cannot be
///   reached or its content cannot be parsed.
#[async_trait]
pub trait ItemCatalog: Send + Sync {
    /// Load all benchmark items.
    async fn load_items(&self) -> StorageResult<Vec<BenchmarkItem>>;
}

// ---------------------------------------------------------------------------
// ResultLedger — Append-only Result Records
// ---------------------------------------------------------------------------

/// Persisted outcome category of a validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResponseCategory {
    #[serde(rename = "correct as-is")]
    CorrectAsIs,
    #[serde(rename = "correct after steps")]
    CorrectAfterSteps,
    #[serde(rename = "wrong answer")]
    WrongAnswer,
    #[serde(rename = "errored")]
    Errored,
}

impl ResponseCategory {
    /// Stable string stored in the ledger.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CorrectAsIs => "correct as-is",
            Self::CorrectAfterSteps => "correct after steps",
            Self::WrongAnswer => "wrong answer",
            Self::Errored => "errored",
        }
    }

    /// Whether the model's answer was judged correct.
    pub fn is_correct(&self) -> bool {
        matches!(self, Self::CorrectAsIs | Self::CorrectAfterSteps)
    }
}

impl std::fmt::Display for ResponseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for ResponseCategory {
    type Err = StorageError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "correct as-is" => Ok(Self::CorrectAsIs),
            "correct after steps" => Ok(Self::CorrectAfterSteps),
            "wrong answer" => Ok(Self::WrongAnswer),
            "errored" => Ok(Self::Errored),
            other => Err(StorageError::Backend(format!(
                "unknown response category: {other}"
            ))),
        }
    }
}

/// A persisted result row. Never mutated after write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Session that produced this result
    pub session_id: String,
    /// Benchmark item identifier
    pub task_id: String,
    /// Attempt that produced the terminal outcome (1-based)
    pub attempt_number: u32,
    /// Model the question was sent to
    pub model: String,
    /// Raw answer text returned by the model (empty if the call failed)
    pub answer: String,
    /// Outcome category
    pub category: ResponseCategory,
    /// Invocation failure detail, present only for `Errored`
    pub error: Option<String>,
    /// When the outcome was computed
    pub recorded_at: DateTime<Utc>,
}

/// Append-only result ledger.
///
/// Guarantees:
/// - A successful `append` is durable before it returns.
/// - `(session_id, task_id, attempt_number)` is unique; a second append with
///   the same key fails with `StorageError::DuplicateRecord`.
/// - Records are never updated or deleted.
#[async_trait]
pub trait ResultLedger: Send + Sync {
    /// Append a result record.
    async fn append(&self, record: &ResultRecord) -> StorageResult<()>;

    /// All records for one item, oldest first.
    async fn list_for_item(&self, task_id: &str) -> StorageResult<Vec<ResultRecord>>;

    /// All records, oldest first.
    async fn list_all(&self) -> StorageResult<Vec<ResultRecord>>;
}

// ---------------------------------------------------------------------------
// ArtifactStore — Raw Attempt Logs
// ---------------------------------------------------------------------------

/// Content digest (SHA-256 hex string).
///
/// The inner field is private to guarantee the string is always valid
/// lowercase hex produced by `from_bytes` or validated via `TryFrom<String>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDigest(String);

impl ContentDigest {
    /// Compute the SHA-256 digest of the given bytes.
    pub fn from_bytes(data: &[u8]) -> Self {
        use sha2::Digest;
        let mut hasher = Sha256::new();
        hasher.update(data);
        ContentDigest(hex::encode(hasher.finalize()))
    }

    /// Return the full hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form (first 12 hex chars).
    pub fn short(&self) -> &str {
        &self.0[..12.min(self.0.len())]
    }
}

impl TryFrom<String> for ContentDigest {
    type Error = StorageError;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        if s.len() != 64 || !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(StorageError::InvalidDigest { digest: s });
        }
        Ok(ContentDigest(s.to_ascii_lowercase()))
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pointer to a stored artifact blob
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRef {
    pub task_id: String,
    pub attempt_number: u32,
    pub digest: ContentDigest,
    pub size_bytes: u64,
}

/// Artifact (raw log) store keyed by item identifier and attempt number.
///
/// Guarantees:
/// - `append_artifact` is durable before it returns.
/// - Appending identical bytes for the same key twice stores them once.
/// - `read` returns the exact bytes previously appended.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Store a blob for `(task_id, attempt_number)`.
    async fn append_artifact(
        &self,
        task_id: &str,
        attempt_number: u32,
        blob: &[u8],
    ) -> StorageResult<ArtifactRef>;

    /// List artifacts stored for `(task_id, attempt_number)`.
    async fn list_artifacts(
        &self,
        task_id: &str,
        attempt_number: u32,
    ) -> StorageResult<Vec<ArtifactRef>>;

    /// Read an artifact's bytes. Returns `StorageError::NotFound` if absent.
    async fn read(&self, artifact: &ArtifactRef) -> StorageResult<Vec<u8>>;
}
