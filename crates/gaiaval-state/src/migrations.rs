//! SurrealDB schema migrations and initialization
//!
//! Sets up the item catalog and result ledger tables with their
//! constraints and indexes.

use crate::error::StateError;
use crate::Result;
use surrealdb::engine::any::Any;
use surrealdb::Surreal;
use tracing::{debug, info};

/// Initialize all tables in SurrealDB
///
/// Safe to call multiple times (idempotent).
pub async fn init_schema(db: &Surreal<Any>) -> Result<()> {
    info!("Initializing GAIA Validator schema");

    init_items_table(db).await?;
    init_results_table(db).await?;

    info!("Schema initialization complete");
    Ok(())
}

/// Initialize `benchmark_items` table
///
/// Schema:
/// ```text
/// TABLE benchmark_items {
///   position:      INT (source order)
///   task_id:       STRING (unique)
///   question:      STRING
///   final_answer:  STRING
///   level:         STRING?
///   file_name:     STRING?
///   steps:         ARRAY<STRING>
/// }
/// ```
async fn init_items_table(db: &Surreal<Any>) -> Result<()> {
    debug!("Initializing benchmark_items table");

    let sql = r#"
        DEFINE TABLE IF NOT EXISTS benchmark_items AS
            SCHEMALESS
            PERMISSIONS
                FOR create FULL
                FOR read FULL
                FOR update FULL
                FOR delete FULL;

        DEFINE INDEX IF NOT EXISTS idx_item_task_id ON TABLE benchmark_items COLUMNS task_id UNIQUE;
        DEFINE INDEX IF NOT EXISTS idx_item_position ON TABLE benchmark_items COLUMNS position;
        DEFINE INDEX IF NOT EXISTS idx_item_level ON TABLE benchmark_items COLUMNS level;
    "#;

    db.query(sql)
        .await
        .and_then(|res| res.check())
        .map_err(|e| StateError::SchemaSetup(e.to_string()))?;
    info!("✓ benchmark_items table initialized");
    Ok(())
}

/// Initialize `results` table
///
/// Schema:
/// ```text
/// TABLE results {
///   session_id:      STRING
///   task_id:         STRING (indexed)
///   attempt_number:  INT
///   model:           STRING (indexed)
///   answer:          STRING
///   category:        STRING (correct as-is | correct after steps | wrong answer | errored)
///   error:           STRING?
///   recorded_at:     DATETIME (indexed)
/// }
/// ```
///
/// Constraints:
/// - `(session_id, task_id, attempt_number)` is unique
/// - rows are append-only: update and delete are not permitted
async fn init_results_table(db: &Surreal<Any>) -> Result<()> {
    debug!("Initializing results table");

    let sql = r#"
        DEFINE TABLE IF NOT EXISTS results AS
            SCHEMALESS
            PERMISSIONS
                FOR create FULL
                FOR read FULL
                FOR update NONE
                FOR delete NONE;

        DEFINE INDEX IF NOT EXISTS idx_result_key ON TABLE results COLUMNS session_id, task_id, attempt_number UNIQUE;
        DEFINE INDEX IF NOT EXISTS idx_result_task_id ON TABLE results COLUMNS task_id;
        DEFINE INDEX IF NOT EXISTS idx_result_model ON TABLE results COLUMNS model;
        DEFINE INDEX IF NOT EXISTS idx_result_recorded_at ON TABLE results COLUMNS recorded_at;
    "#;

    db.query(sql)
        .await
        .and_then(|res| res.check())
        .map_err(|e| StateError::SchemaSetup(e.to_string()))?;
    info!("✓ results table initialized");
    Ok(())
}
