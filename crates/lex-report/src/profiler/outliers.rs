//! IQR-fence outlier detection.

use crate::error::{AnalysisWarning, DegenerateStatistic};
use crate::types::{Column, OutlierSummary};

use super::statistics::{numeric_values, quantile};

/// Number of outlying values kept as examples for the report.
pub const MAX_OUTLIER_EXAMPLES: usize = 5;

/// Flags values outside `[Q1 - m * IQR, Q3 + m * IQR]`.
pub struct OutlierDetector;

impl OutlierDetector {
    /// Detect outliers in one numeric column with IQR multiplier `multiplier`.
    ///
    /// A zero IQR collapses both fences onto a single value, so every value
    /// that differs from it is flagged; this is recorded as a
    /// [`DegenerateStatistic::ZeroInterquartileRange`] warning.
    pub fn detect(column: &Column, multiplier: f64) -> (OutlierSummary, Option<AnalysisWarning>) {
        let (values, _) = numeric_values(column);

        let mut sorted = values.clone();
        sorted.sort_by(f64::total_cmp);

        let (Some(q1), Some(q3)) = (quantile(&sorted, 0.25), quantile(&sorted, 0.75)) else {
            return (
                OutlierSummary {
                    column: column.name.clone(),
                    count: 0,
                    lower_bound: None,
                    upper_bound: None,
                    outlier_count: 0,
                    examples: Vec::new(),
                },
                None,
            );
        };

        let iqr = q3 - q1;
        let lower = q1 - multiplier * iqr;
        let upper = q3 + multiplier * iqr;

        let mut outlier_count = 0;
        let mut examples = Vec::new();
        for &value in values.iter().filter(|&&v| v < lower || v > upper) {
            outlier_count += 1;
            if examples.len() < MAX_OUTLIER_EXAMPLES {
                examples.push(value);
            }
        }

        let warning = (iqr == 0.0 && values.len() >= 2).then(|| AnalysisWarning::DegenerateStatistic {
            column: column.name.clone(),
            statistic: DegenerateStatistic::ZeroInterquartileRange,
        });

        let summary = OutlierSummary {
            column: column.name.clone(),
            count: values.len(),
            lower_bound: Some(lower),
            upper_bound: Some(upper),
            outlier_count,
            examples,
        };

        (summary, warning)
    }
}
