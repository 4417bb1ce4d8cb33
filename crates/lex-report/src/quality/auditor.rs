use std::collections::HashSet;

use tracing::{debug, warn};

use crate::error::{ReportError, Result};
use crate::types::{CellKey, ColumnClassification, ColumnQuality, Dataset, QualityReport, SemanticType};

pub struct QualityAuditor;

impl QualityAuditor {
    /// Fail with [`ReportError::EmptyDataset`] when there is nothing to analyze.
    pub fn ensure_not_empty(dataset: &Dataset) -> Result<()> {
        if dataset.is_empty() {
            return Err(ReportError::EmptyDataset {
                rows: dataset.n_rows(),
                columns: dataset.n_cols(),
            });
        }
        Ok(())
    }

    /// Audit missingness and duplicate rows. Missing cells are `Null` cells,
    /// so missing markers must already be normalized.
    pub fn audit(dataset: &Dataset, classifications: &[ColumnClassification]) -> Result<QualityReport> {
        Self::ensure_not_empty(dataset)?;

        let total_rows = dataset.n_rows();
        let columns: Vec<ColumnQuality> = dataset
            .columns()
            .iter()
            .map(|column| {
                let missing_count = column.null_count();
                ColumnQuality {
                    column: column.name.clone(),
                    missing_count,
                    missing_rate: missing_count as f64 / total_rows as f64,
                }
            })
            .collect();

        let total_cells = total_rows * dataset.n_cols();
        let total_missing: usize = columns.iter().map(|c| c.missing_count).sum();
        let completeness = 1.0 - total_missing as f64 / total_cells as f64;

        let duplicate_rows = Self::count_duplicate_rows(dataset);

        let unresolved_columns: Vec<String> = classifications
            .iter()
            .filter(|c| c.semantic_type == SemanticType::Unknown)
            .map(|c| c.column.clone())
            .collect();

        for column in &unresolved_columns {
            warn!(column = %column, "Column type could not be resolved");
        }
        debug!(
            completeness,
            duplicate_rows,
            total_missing,
            "Quality audit finished"
        );

        Ok(QualityReport {
            total_rows,
            total_columns: dataset.n_cols(),
            total_cells,
            total_missing,
            completeness,
            duplicate_rows,
            unique_rows: total_rows - duplicate_rows,
            columns,
            unresolved_columns,
        })
    }

    /// Rows equal to an earlier row under type-aware comparison. The first
    /// occurrence is not a duplicate; null equals null.
    pub fn count_duplicate_rows(dataset: &Dataset) -> usize {
        let mut seen: HashSet<Vec<CellKey<'_>>> = HashSet::with_capacity(dataset.n_rows());
        (0..dataset.n_rows())
            .filter(|&i| !seen.insert(dataset.row(i).map(|cell| cell.key()).collect()))
            .count()
    }
}
