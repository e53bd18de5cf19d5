//! Item selection helpers: level and attachment-extension filters.

use std::collections::BTreeSet;

use gaiaval_state::BenchmarkItem;

/// Narrow a catalog by difficulty level and/or attachment extension.
///
/// Unset fields do not filter. Extensions compare case-insensitively and
/// accept a leading dot (`".XLSX"` matches `report.xlsx`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    pub level: Option<String>,
    pub extension: Option<String>,
}

impl ItemFilter {
    pub fn matches(&self, item: &BenchmarkItem) -> bool {
        if let Some(level) = &self.level {
            if item.level.as_deref().map(str::trim) != Some(level.trim()) {
                return false;
            }
        }
        if let Some(ext) = &self.extension {
            let wanted = ext.trim().trim_start_matches('.').to_lowercase();
            if item.file_extension().as_deref() != Some(wanted.as_str()) {
                return false;
            }
        }
        true
    }
}

/// Items passing `filter`, in catalog order.
pub fn filter_items(items: &[BenchmarkItem], filter: &ItemFilter) -> Vec<BenchmarkItem> {
    items
        .iter()
        .filter(|item| filter.matches(item))
        .cloned()
        .collect()
}

pub fn find_item<'a>(items: &'a [BenchmarkItem], task_id: &str) -> Option<&'a BenchmarkItem> {
    items.iter().find(|item| item.task_id == task_id)
}

/// Distinct levels present in the catalog, sorted.
pub fn available_levels(items: &[BenchmarkItem]) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| item.level.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Distinct attachment extensions present in the catalog, sorted.
pub fn available_extensions(items: &[BenchmarkItem]) -> Vec<String> {
    items
        .iter()
        .filter_map(BenchmarkItem::file_extension)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(task_id: &str, level: &str, file_name: Option<&str>) -> BenchmarkItem {
        BenchmarkItem {
            task_id: task_id.to_string(),
            question: "q".to_string(),
            final_answer: "a".to_string(),
            level: Some(level.to_string()),
            file_name: file_name.map(String::from),
            steps: Vec::new(),
        }
    }

    fn catalog() -> Vec<BenchmarkItem> {
        vec![
            item("a", "1", None),
            item("b", "2", Some("data.XLSX")),
            item("c", "1", Some("clip.mp3")),
            item("d", "1", Some("sheet.xlsx")),
        ]
    }

    fn ids(items: &[BenchmarkItem]) -> Vec<&str> {
        items.iter().map(|i| i.task_id.as_str()).collect()
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let items = catalog();
        assert_eq!(filter_items(&items, &ItemFilter::default()).len(), 4);
    }

    #[test]
    fn filter_by_level() {
        let items = catalog();
        let filter = ItemFilter {
            level: Some("1".into()),
            extension: None,
        };
        assert_eq!(ids(&filter_items(&items, &filter)), vec!["a", "c", "d"]);
    }

    #[test]
    fn filter_by_extension_ignores_case_and_dot() {
        let items = catalog();
        let filter = ItemFilter {
            level: None,
            extension: Some(".XlSx".into()),
        };
        assert_eq!(ids(&filter_items(&items, &filter)), vec!["b", "d"]);
    }

    #[test]
    fn filter_by_level_and_extension() {
        let items = catalog();
        let filter = ItemFilter {
            level: Some("1".into()),
            extension: Some("xlsx".into()),
        };
        assert_eq!(ids(&filter_items(&items, &filter)), vec!["d"]);
    }

    #[test]
    fn distinct_levels_and_extensions() {
        let items = catalog();
        assert_eq!(available_levels(&items), vec!["1", "2"]);
        assert_eq!(available_extensions(&items), vec!["mp3", "xlsx"]);
        assert_eq!(find_item(&items, "c").map(|i| i.task_id.as_str()), Some("c"));
        assert!(find_item(&items, "zz").is_none());
    }
}
