//! Row definitions for GAIA Validator SurrealDB tables
//!
//! Tables:
//! - benchmark_items: dataset items, ordered by `position`
//! - results: append-only validation results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::storage_traits::{BenchmarkItem, ResponseCategory, ResultRecord};

/// Module for serializing chrono DateTime to SurrealDB datetime format
mod surreal_datetime {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};
    use surrealdb::sql::Datetime as SurrealDatetime;

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let sd = SurrealDatetime::from(*date);
        serde::Serialize::serialize(&sd, serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let sd = SurrealDatetime::deserialize(deserializer)?;
        Ok(DateTime::from(sd))
    }
}

/// Benchmark item row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemRow {
    /// SurrealDB record ID
    pub id: Option<surrealdb::sql::Thing>,
    /// Source order of the item
    pub position: u64,
    pub task_id: String,
    pub question: String,
    pub final_answer: String,
    pub level: Option<String>,
    pub file_name: Option<String>,
    pub steps: Vec<String>,
}

impl ItemRow {
    pub fn from_item(position: u64, item: &BenchmarkItem) -> Self {
        ItemRow {
            id: None,
            position,
            task_id: item.task_id.clone(),
            question: item.question.clone(),
            final_answer: item.final_answer.clone(),
            level: item.level.clone(),
            file_name: item.file_name.clone(),
            steps: item.steps.clone(),
        }
    }

    pub fn into_item(self) -> BenchmarkItem {
        BenchmarkItem {
            task_id: self.task_id,
            question: self.question,
            final_answer: self.final_answer,
            level: self.level,
            file_name: self.file_name,
            steps: self.steps,
        }
    }
}

/// Result row - one terminal outcome of a validation session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultRow {
    /// SurrealDB record ID
    pub id: Option<surrealdb::sql::Thing>,
    pub session_id: String,
    pub task_id: String,
    pub attempt_number: u32,
    pub model: String,
    pub answer: String,
    /// Category wire string: "correct as-is" | "correct after steps" | "wrong answer" | "errored"
    pub category: String,
    pub error: Option<String>,
    #[serde(with = "surreal_datetime")]
    pub recorded_at: DateTime<Utc>,
}

impl ResultRow {
    pub fn from_record(record: &ResultRecord) -> Self {
        ResultRow {
            id: None,
            session_id: record.session_id.clone(),
            task_id: record.task_id.clone(),
            attempt_number: record.attempt_number,
            model: record.model.clone(),
            answer: record.answer.clone(),
            category: record.category.as_str().to_string(),
            error: record.error.clone(),
            recorded_at: record.recorded_at,
        }
    }

    pub fn into_record(self) -> Result<ResultRecord, StorageError> {
        let category: ResponseCategory = self.category.parse()?;
        Ok(ResultRecord {
            session_id: self.session_id,
            task_id: self.task_id,
            attempt_number: self.attempt_number,
            model: self.model,
            answer: self.answer,
            category,
            error: self.error,
            recorded_at: self.recorded_at,
        })
    }
}
