use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::snapshot::FileInventory;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInventorySummary {
    pub total_count: usize,
    /// Mirrors the inventory keys, including empty categories.
    pub per_category_counts: BTreeMap<String, usize>,
}

impl DocumentInventorySummary {
    /// Categories with at least one document, largest first.
    pub fn populated_categories(&self) -> Vec<(&str, usize)> {
        let mut populated: Vec<_> = self
            .per_category_counts
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(category, count)| (category.as_str(), *count))
            .collect();
        populated.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        populated
    }
}

/// Count discovered documents per category. The category set is open-ended.
pub fn summarize(inventory: &FileInventory) -> DocumentInventorySummary {
    let per_category_counts: BTreeMap<String, usize> = inventory
        .iter()
        .map(|(category, urls)| (category.clone(), urls.len()))
        .collect();
    DocumentInventorySummary {
        total_count: per_category_counts.values().sum(),
        per_category_counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::OsintSnapshot;
    use serde_json::json;

    #[test]
    fn counts_each_category_and_total() {
        let snapshot = OsintSnapshot::builder()
            .file_category("PDF", ["a", "b"])
            .file_category("XLS", ["c"])
            .file_category("DOC", Vec::<String>::new())
            .build();
        let summary = summarize(snapshot.file_inventory());
        assert_eq!(summary.total_count, 3);
        assert_eq!(
            summary.per_category_counts,
            BTreeMap::from([
                ("DOC".to_string(), 0),
                ("PDF".to_string(), 2),
                ("XLS".to_string(), 1),
            ])
        );
    }

    #[test]
    fn unknown_categories_and_malformed_values_are_tolerated() {
        let snapshot = OsintSnapshot::from_json_value(json!({
            "fileInventory": {
                "PPTX": ["https://acme.io/deck.pptx"],
                "PDF": { "unexpected": true },
            }
        }))
        .unwrap();
        let summary = summarize(snapshot.file_inventory());
        assert_eq!(summary.total_count, 1);
        assert_eq!(summary.per_category_counts["PDF"], 0);
        assert_eq!(summary.populated_categories(), vec![("PPTX", 1)]);
    }

    #[test]
    fn empty_inventory_summarizes_to_zero() {
        assert_eq!(
            summarize(&FileInventory::new()),
            DocumentInventorySummary::default()
        );
    }
}
