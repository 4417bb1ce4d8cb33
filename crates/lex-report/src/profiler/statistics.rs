//! Descriptive statistics for numeric columns.

use crate::error::{AnalysisWarning, DegenerateStatistic};
use crate::types::{Column, NumericStats};

/// Computes central tendency, dispersion and quartiles of numeric columns.
pub struct DescriptiveStatsEngine;

impl DescriptiveStatsEngine {
    /// Compute [`NumericStats`] over the parsed non-null values of `column`.
    ///
    /// Outlier fields are left empty; they are filled from the outlier
    /// detector's result when the artifacts are merged.
    pub fn describe(column: &Column) -> (NumericStats, Vec<AnalysisWarning>) {
        let (values, invalid_count) = numeric_values(column);
        let mut warnings = Vec::new();
        let degenerate = |statistic| AnalysisWarning::DegenerateStatistic {
            column: column.name.clone(),
            statistic,
        };

        let mut sorted = values.clone();
        sorted.sort_by(f64::total_cmp);

        let mean = mean(&values);
        let std = sample_std(&values);
        let q1 = quantile(&sorted, 0.25);
        let q3 = quantile(&sorted, 0.75);

        match std {
            None => warnings.push(degenerate(DegenerateStatistic::InsufficientValues)),
            Some(s) if s == 0.0 => warnings.push(degenerate(DegenerateStatistic::ZeroVariance)),
            Some(_) => {}
        }

        let cv = match (mean, std) {
            (Some(m), Some(s)) if m != 0.0 => Some(s / m),
            (Some(_), Some(_)) => {
                warnings.push(degenerate(DegenerateStatistic::UndefinedCoefficientOfVariation));
                None
            }
            _ => None,
        };

        let stats = NumericStats {
            column: column.name.clone(),
            count: values.len(),
            invalid_count,
            mean,
            median: quantile(&sorted, 0.5),
            std,
            min: sorted.first().copied(),
            max: sorted.last().copied(),
            q1,
            q3,
            iqr: q1.zip(q3).map(|(q1, q3)| q3 - q1),
            cv,
            lower_bound: None,
            upper_bound: None,
            outlier_count: 0,
        };

        (stats, warnings)
    }
}

/// Parsed non-null values of a column in row order, plus the number of
/// non-null cells that did not parse.
pub(crate) fn numeric_values(column: &Column) -> (Vec<f64>, usize) {
    let mut values = Vec::with_capacity(column.len());
    let mut invalid = 0;
    for cell in column.non_null() {
        match cell.as_number() {
            Some(v) => values.push(v),
            None => invalid += 1,
        }
    }
    (values, invalid)
}

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1); undefined below two values.
pub(crate) fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    if values.iter().all(|&v| v == values[0]) {
        return Some(0.0);
    }
    let m = mean(values)?;
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

/// Quantile by linear interpolation between order statistics at position
/// `(n - 1) * p`. `sorted` must be ascending.
pub(crate) fn quantile(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let position = (sorted.len() - 1) as f64 * p;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}
