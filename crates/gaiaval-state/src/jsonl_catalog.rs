//! GAIA `metadata.jsonl` item catalog
//!
//! Each line of the file is one JSON object in the dataset's native shape:
//!
//! ```json
//! {"task_id": "...", "Question": "...", "Level": 1, "Final answer": "...",
//!  "file_name": "", "Annotator Metadata": {"Steps": "1. ...\n2. ..."}}
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::StorageError;
use crate::storage_traits::{BenchmarkItem, ItemCatalog, StorageResult};

/// [`ItemCatalog`] that reads a GAIA metadata JSONL file.
#[derive(Debug, Clone)]
pub struct JsonlItemCatalog {
    path: PathBuf,
}

impl JsonlItemCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[derive(Debug, Deserialize)]
struct RawItem {
    task_id: String,
    #[serde(rename = "Question")]
    question: String,
    #[serde(rename = "Final answer", default)]
    final_answer: Option<String>,
    #[serde(rename = "Level", default)]
    level: Option<serde_json::Value>,
    #[serde(default)]
    file_name: Option<String>,
    #[serde(rename = "Annotator Metadata", default)]
    annotator_metadata: Option<AnnotatorMetadata>,
}

#[derive(Debug, Deserialize)]
struct AnnotatorMetadata {
    #[serde(rename = "Steps", default)]
    steps: Option<String>,
}

impl RawItem {
    fn into_item(self) -> BenchmarkItem {
        // The dataset stores Level as a number; some exports use strings.
        let level = match self.level {
            Some(serde_json::Value::String(s)) if !s.trim().is_empty() => {
                Some(s.trim().to_string())
            }
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        let file_name = self
            .file_name
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty());
        let steps = self
            .annotator_metadata
            .and_then(|m| m.steps)
            .map(|s| split_steps(&s))
            .unwrap_or_default();

        BenchmarkItem {
            task_id: self.task_id,
            question: self.question,
            final_answer: self.final_answer.unwrap_or_default(),
            level,
            file_name,
            steps,
        }
    }
}

/// Split an annotator steps blob into one entry per non-empty line.
pub fn split_steps(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

#[async_trait]
impl ItemCatalog for JsonlItemCatalog {
    async fn load_items(&self) -> StorageResult<Vec<BenchmarkItem>> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            StorageError::DataUnavailable(format!(
                "failed to read {}: {e}",
                self.path.display()
            ))
        })?;

        let mut items = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let raw: RawItem = serde_json::from_str(line).map_err(|e| {
                StorageError::DataUnavailable(format!(
                    "{} line {}: {e}",
                    self.path.display(),
                    idx + 1
                ))
            })?;
            items.push(raw.into_item());
        }

        debug!(path = %self.path.display(), "parsed item catalog");
        info!(count = items.len(), "loaded benchmark items");
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file
    }

    #[tokio::test]
    async fn loads_gaia_shaped_lines() {
        let file = write_file(&[
            r#"{"task_id":"a1","Question":"Capital of France?","Level":1,"Final answer":"Paris","file_name":"","Annotator Metadata":{"Steps":"1. Recall geography\n\n2. Answer"}}"#,
            "",
            r#"{"task_id":"b2","Question":"Sum?","Level":"2","Final answer":"42","file_name":"sheet.XLSX","Annotator Metadata":{}}"#,
        ]);
        let catalog = JsonlItemCatalog::new(file.path());
        let items = catalog.load_items().await.unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].task_id, "a1");
        assert_eq!(items[0].final_answer, "Paris");
        assert_eq!(items[0].level.as_deref(), Some("1"));
        assert_eq!(items[0].file_name, None);
        assert_eq!(items[0].steps, vec!["1. Recall geography", "2. Answer"]);

        assert_eq!(items[1].level.as_deref(), Some("2"));
        assert_eq!(items[1].file_extension().as_deref(), Some("xlsx"));
        assert!(items[1].steps.is_empty());
    }

    #[tokio::test]
    async fn malformed_line_is_data_unavailable() {
        let file = write_file(&[
            r#"{"task_id":"a1","Question":"q","Final answer":"a"}"#,
            "{not json",
        ]);
        let err = JsonlItemCatalog::new(file.path())
            .load_items()
            .await
            .unwrap_err();
        match err {
            StorageError::DataUnavailable(msg) => assert!(msg.contains("line 2")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_file_is_data_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = JsonlItemCatalog::new(dir.path().join("absent.jsonl"))
            .load_items()
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::DataUnavailable(_)));
    }

    #[test]
    fn split_steps_drops_blank_lines() {
        assert_eq!(split_steps("  a \n\n b\r\n"), vec!["a", "b"]);
        assert!(split_steps("   ").is_empty());
    }
}
