//! GAIA Validator State: catalogs and durable storage
//!
//! This crate provides the persistence layer for the validation workflow.
//! It handles all I/O with the item sources, the relational result ledger
//! and the artifact store.
//!
//! ## Layer 0 - Data/Persistence
//!
//! Focus: append-only results, durable writes, and readable item sources.
//!
//! ## Key Components
//!
//! - `ItemCatalog`: loads benchmark items (JSONL file, SurrealDB table, memory)
//! - `ResultLedger`: append-only result records (SurrealDB, memory)
//! - `ArtifactStore`: raw per-attempt logs keyed by item and attempt (filesystem, memory)

mod error;
pub mod fakes;
pub mod fs_artifacts;
mod handle;
pub mod jsonl_catalog;
mod migrations;
mod schema;
pub mod storage_traits;
pub mod surreal_ledger;

pub use error::{StateError, StorageError};
pub use fs_artifacts::FsArtifactStore;
pub use handle::{connect_from_env, connect_in_memory, CloudConfig};
pub use jsonl_catalog::JsonlItemCatalog;
pub use storage_traits::{
    ArtifactRef, ArtifactStore, BenchmarkItem, ContentDigest, ItemCatalog, ResponseCategory,
    ResultLedger, ResultRecord, StorageResult,
};
pub use surreal_ledger::{SurrealItemCatalog, SurrealResultLedger};

/// Result type for connection and schema operations
pub type Result<T> = std::result::Result<T, StateError>;
