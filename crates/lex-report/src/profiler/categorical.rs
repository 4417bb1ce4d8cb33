//! Frequency profiling for categorical columns.

use std::collections::HashMap;

use crate::types::{CategoricalProfile, CellKey, CellValue, Column, FrequencyEntry};

/// Counts distinct values of categorical columns.
pub struct CategoricalProfiler;

impl CategoricalProfiler {
    /// Build the frequency profile of `column`, keeping the `top_k` most
    /// frequent values. Ties keep first-seen order. Values are compared the
    /// way [`CellKey`] compares them: typed, and case-sensitive for text.
    pub fn profile(column: &Column, top_k: usize) -> CategoricalProfile {
        // value -> index into `counts`, which preserves first-seen order
        let mut index: HashMap<CellKey<'_>, usize> = HashMap::new();
        let mut counts: Vec<(&CellValue, usize)> = Vec::new();

        for cell in column.non_null() {
            match index.get(&cell.key()) {
                Some(&i) => counts[i].1 += 1,
                None => {
                    index.insert(cell.key(), counts.len());
                    counts.push((cell, 1));
                }
            }
        }

        let non_null_count: usize = counts.iter().map(|(_, c)| c).sum();
        let unique_count = counts.len();

        // stable sort keeps first-seen order among equal counts
        counts.sort_by(|a, b| b.1.cmp(&a.1));

        let top_values: Vec<FrequencyEntry> = counts
            .into_iter()
            .take(top_k)
            .map(|(cell, count)| FrequencyEntry {
                value: cell.display_text().unwrap_or_default(),
                count,
                percentage: count as f64 / non_null_count as f64 * 100.0,
            })
            .collect();

        let (coverage, cardinality_ratio) = if non_null_count == 0 {
            (None, None)
        } else {
            let covered: usize = top_values.iter().map(|e| e.count).sum();
            (
                Some(covered as f64 / non_null_count as f64),
                Some(unique_count as f64 / non_null_count as f64),
            )
        };

        CategoricalProfile {
            column: column.name.clone(),
            unique_count,
            non_null_count,
            top_values,
            coverage,
            cardinality_ratio,
        }
    }
}
