//! Semantic type inference for dataset columns.

use std::collections::HashSet;

use crate::config::AnalysisConfig;
use crate::error::AnalysisWarning;
use crate::types::{CellValue, Column, ColumnClassification, SemanticType};
use crate::utils::parse_date_string;

/// Infers the semantic type of each column from its non-null values.
pub struct TypeClassifier;

impl TypeClassifier {
    /// Classify one column. Rules are applied in order and the first match wins:
    ///
    /// 1. no non-null values: the loader hint, else `unknown`
    /// 2. numeric share >= `numeric_ratio`: `numeric`
    /// 3. date share >= `numeric_ratio`: `datetime`
    /// 4. unique count <= max(`categorical_max_unique`, fraction of rows): `categorical`
    /// 5. unique/non-null >= `identifier_ratio`: `identifier`
    /// 6. otherwise `unknown`
    ///
    /// Unresolved columns come back with an [`AnalysisWarning::UnresolvedType`].
    pub fn classify(
        column: &Column,
        config: &AnalysisConfig,
    ) -> (ColumnClassification, Option<AnalysisWarning>) {
        let mut non_null_count = 0usize;
        let mut numeric_count = 0usize;
        let mut date_count = 0usize;
        let mut unique = HashSet::new();

        for cell in column.non_null() {
            non_null_count += 1;
            unique.insert(cell.key());
            if cell.as_number().is_some() {
                numeric_count += 1;
            }
            if is_date_cell(cell) {
                date_count += 1;
            }
        }
        let unique_count = unique.len();

        let classification = |semantic_type, from_hint| ColumnClassification {
            column: column.name.clone(),
            semantic_type,
            non_null_count,
            unique_count,
            numeric_count,
            date_count,
            from_hint,
        };

        if non_null_count == 0 {
            return match column.type_hint {
                Some(hint) => (classification(hint, true), None),
                None => (
                    classification(SemanticType::Unknown, false),
                    Some(unresolved(column, "all values are missing")),
                ),
            };
        }

        let non_null = non_null_count as f64;
        if numeric_count as f64 / non_null >= config.numeric_ratio {
            return (classification(SemanticType::Numeric, false), None);
        }

        if date_count as f64 / non_null >= config.numeric_ratio {
            return (classification(SemanticType::Datetime, false), None);
        }

        let fraction_limit = (config.categorical_unique_fraction * column.len() as f64) as usize;
        let categorical_limit = config.categorical_max_unique.max(fraction_limit);
        if unique_count <= categorical_limit {
            return (classification(SemanticType::Categorical, false), None);
        }

        if unique_count as f64 / non_null >= config.identifier_ratio {
            return (classification(SemanticType::Identifier, false), None);
        }

        let reason = format!(
            "{} distinct values in {} non-null cells fit no known type",
            unique_count, non_null_count
        );
        (
            classification(SemanticType::Unknown, false),
            Some(unresolved(column, &reason)),
        )
    }
}

fn is_date_cell(cell: &CellValue) -> bool {
    match cell {
        CellValue::Date(_) => true,
        CellValue::Text(s) => parse_date_string(s).is_some(),
        CellValue::Number(_) | CellValue::Null => false,
    }
}

fn unresolved(column: &Column, reason: &str) -> AnalysisWarning {
    AnalysisWarning::UnresolvedType {
        column: column.name.clone(),
        reason: reason.to_string(),
    }
}
