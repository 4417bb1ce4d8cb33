//! Rule-based insight engine.

use std::collections::HashSet;

use tracing::debug;

use super::{Insight, InsightCategory, InsightEngine, InsightRule, Severity};
use crate::config::AnalysisConfig;
use crate::types::{AnalysisArtifacts, SemanticType};
use crate::utils::{format_number, format_ratio_percent};

/// Rules in evaluation order. The position of a rule decides which insight
/// survives deduplication and the order among insights of equal severity.
pub const RULES: [InsightRule; 11] = [
    InsightRule::DatasetOverview,
    InsightRule::LowCompleteness,
    InsightRule::DuplicateRows,
    InsightRule::SparseColumn,
    InsightRule::UnresolvedColumn,
    InsightRule::OutlierRate,
    InsightRule::StrongCorrelation,
    InsightRule::DominantCategory,
    InsightRule::NearIdentifier,
    InsightRule::ConstantColumn,
    InsightRule::HighVariability,
];

/// Insight engine evaluating [`RULES`] with thresholds from the configuration.
pub struct RuleBasedInsightEngine {
    config: AnalysisConfig,
}

impl RuleBasedInsightEngine {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Evaluate a single rule. Each rule emits at most one insight per
    /// subject (the dataset, a column or a column pair).
    pub fn evaluate(&self, rule: InsightRule, artifacts: &AnalysisArtifacts) -> Vec<Insight> {
        let config = &self.config;
        let quality = &artifacts.quality;

        match rule {
            InsightRule::DatasetOverview => {
                let numeric = artifacts.count_of_type(SemanticType::Numeric);
                let categorical = artifacts.count_of_type(SemanticType::Categorical);
                let datetime = artifacts.count_of_type(SemanticType::Datetime);
                let identifier = artifacts.count_of_type(SemanticType::Identifier);
                let unknown = artifacts.count_of_type(SemanticType::Unknown);
                vec![
                    Insight::new(
                        rule,
                        format!(
                            "The dataset has {} records and {} columns: {} numeric, {} categorical, {} datetime, {} identifier, {} unresolved.",
                            quality.total_rows,
                            quality.total_columns,
                            numeric,
                            categorical,
                            datetime,
                            identifier,
                            unknown
                        ),
                    )
                    .with_value("rows", quality.total_rows)
                    .with_value("columns", quality.total_columns)
                    .with_value("numeric_columns", numeric)
                    .with_value("categorical_columns", categorical)
                    .with_value("datetime_columns", datetime)
                    .with_value("identifier_columns", identifier)
                    .with_value("unknown_columns", unknown),
                ]
            }

            InsightRule::LowCompleteness => {
                if quality.completeness >= config.completeness_threshold {
                    return Vec::new();
                }
                vec![
                    Insight::new(
                        rule,
                        format!(
                            "Dataset completeness is {}, below the {} target: {} of {} cells are missing.",
                            format_ratio_percent(quality.completeness),
                            format_ratio_percent(config.completeness_threshold),
                            quality.total_missing,
                            quality.total_cells
                        ),
                    )
                    .with_value("completeness", quality.completeness)
                    .with_value("threshold", config.completeness_threshold)
                    .with_value("total_missing", quality.total_missing),
                ]
            }

            InsightRule::DuplicateRows => {
                if quality.duplicate_rows == 0 {
                    return Vec::new();
                }
                let share = quality.duplicate_rows as f64 / quality.total_rows as f64;
                vec![
                    Insight::new(
                        rule,
                        format!(
                            "Found {} duplicate rows ({} of records); consider removing them before modelling.",
                            quality.duplicate_rows,
                            format_ratio_percent(share)
                        ),
                    )
                    .with_value("duplicate_rows", quality.duplicate_rows)
                    .with_value("unique_rows", quality.unique_rows),
                ]
            }

            InsightRule::SparseColumn => quality
                .columns
                .iter()
                .filter(|c| c.missing_rate > config.sparse_column_threshold)
                .map(|c| {
                    Insight::new(
                        rule,
                        format!(
                            "Column '{}' is missing {} of its values ({} rows).",
                            c.column,
                            format_ratio_percent(c.missing_rate),
                            c.missing_count
                        ),
                    )
                    .with_columns([c.column.as_str()])
                    .with_value("missing_count", c.missing_count)
                    .with_value("missing_rate", c.missing_rate)
                })
                .collect(),

            InsightRule::UnresolvedColumn => quality
                .unresolved_columns
                .iter()
                .map(|column| {
                    Insight::new(
                        rule,
                        format!(
                            "Column '{}' could not be classified and was left out of numeric and categorical analysis.",
                            column
                        ),
                    )
                    .with_columns([column.as_str()])
                })
                .collect(),

            InsightRule::OutlierRate => artifacts
                .outliers
                .iter()
                .filter(|o| o.outlier_count > 0 && o.outlier_rate() > config.outlier_rate_threshold)
                .map(|o| {
                    Insight::new(
                        rule,
                        format!(
                            "Column '{}' has {} outliers ({} of values) outside [{}, {}].",
                            o.column,
                            o.outlier_count,
                            format_ratio_percent(o.outlier_rate()),
                            format_number(o.lower_bound),
                            format_number(o.upper_bound)
                        ),
                    )
                    .with_columns([o.column.as_str()])
                    .with_value("outlier_count", o.outlier_count)
                    .with_value("outlier_rate", o.outlier_rate())
                    .with_value("lower_bound", o.lower_bound)
                    .with_value("upper_bound", o.upper_bound)
                })
                .collect(),

            InsightRule::StrongCorrelation => artifacts
                .correlation
                .pairs()
                .filter(|(_, _, r)| r.abs() > config.correlation_threshold)
                .map(|(a, b, r)| {
                    let direction = if r > 0.0 { "positive" } else { "negative" };
                    Insight::new(
                        rule,
                        format!(
                            "Strong {} correlation between '{}' and '{}' (r = {}).",
                            direction,
                            a,
                            b,
                            format_number(Some(r))
                        ),
                    )
                    .with_columns([a, b])
                    .with_value("r", r)
                })
                .collect(),

            InsightRule::DominantCategory => artifacts
                .categorical_profiles
                .iter()
                .filter_map(|p| {
                    let top = p.top_values.first()?;
                    (top.percentage / 100.0 > config.dominant_category_threshold).then(|| {
                        Insight::new(
                            rule,
                            format!(
                                "Value '{}' dominates column '{}' ({:.2}% of values); the column carries little information.",
                                top.value, p.column, top.percentage
                            ),
                        )
                        .with_columns([p.column.as_str()])
                        .with_value("value", &top.value)
                        .with_value("percentage", top.percentage)
                    })
                })
                .collect(),

            InsightRule::NearIdentifier => artifacts
                .categorical_profiles
                .iter()
                .filter(|p| {
                    p.unique_count >= 2
                        && p.cardinality_ratio
                            .is_some_and(|ratio| ratio >= config.near_identifier_ratio)
                })
                .map(|p| {
                    let ratio = p.cardinality_ratio.unwrap_or_default();
                    Insight::new(
                        rule,
                        format!(
                            "Column '{}' has {} distinct values across {} records ({}); it may be an identifier.",
                            p.column,
                            p.unique_count,
                            p.non_null_count,
                            format_ratio_percent(ratio)
                        ),
                    )
                    .with_columns([p.column.as_str()])
                    .with_value("unique_count", p.unique_count)
                    .with_value("cardinality_ratio", ratio)
                })
                .collect(),

            InsightRule::ConstantColumn => artifacts
                .numeric_stats
                .iter()
                .filter(|s| s.std == Some(0.0))
                .map(|s| {
                    Insight::new(
                        rule,
                        format!(
                            "Column '{}' holds the same value ({}) in every row.",
                            s.column,
                            format_number(s.mean)
                        ),
                    )
                    .with_columns([s.column.as_str()])
                    .with_value("value", s.mean)
                })
                .collect(),

            InsightRule::HighVariability => artifacts
                .numeric_stats
                .iter()
                .filter_map(|s| {
                    let cv = s.cv?;
                    (cv.abs() > config.high_cv_threshold).then(|| {
                        Insight::new(
                            rule,
                            format!(
                                "Column '{}' is highly variable (coefficient of variation {}).",
                                s.column,
                                format_number(Some(cv))
                            ),
                        )
                        .with_columns([s.column.as_str()])
                        .with_value("cv", cv)
                        .with_value("mean", s.mean)
                        .with_value("std", s.std)
                    })
                })
                .collect(),
        }
    }
}

impl InsightEngine for RuleBasedInsightEngine {
    fn synthesize(&self, artifacts: &AnalysisArtifacts) -> Vec<Insight> {
        let raw: Vec<Insight> = RULES
            .iter()
            .flat_map(|&rule| self.evaluate(rule, artifacts))
            .collect();
        debug!(raw = raw.len(), "Evaluated insight rules");
        rank_insights(raw, self.config.max_insights)
    }
}

/// Deduplicate, order by severity and cap.
///
/// Column-scoped insights are unique per (category, sorted column set);
/// dataset-wide insights are unique per rule. The first occurrence wins.
/// A stable sort then moves warnings ahead of infos while preserving rule
/// order within each severity.
pub fn rank_insights(insights: Vec<Insight>, max_insights: usize) -> Vec<Insight> {
    #[derive(PartialEq, Eq, Hash)]
    enum Subject {
        Dataset(InsightRule),
        Columns(InsightCategory, Vec<String>),
    }

    let mut seen = HashSet::new();
    let mut kept: Vec<Insight> = insights
        .into_iter()
        .filter(|insight| {
            let subject = if insight.columns.is_empty() {
                Subject::Dataset(insight.rule)
            } else {
                let mut columns = insight.columns.clone();
                columns.sort();
                Subject::Columns(insight.category, columns)
            };
            seen.insert(subject)
        })
        .collect();

    kept.sort_by_key(|insight| match insight.severity {
        Severity::Warning => 0,
        Severity::Info => 1,
    });
    kept.truncate(max_insights);
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::profiler::DataProfiler;
    use crate::quality::QualityAuditor;
    use crate::types::{CellValue, Column, Dataset};

    fn artifacts_for(dataset: &Dataset, config: &AnalysisConfig) -> AnalysisArtifacts {
        let (classifications, _) = DataProfiler::classify_dataset(dataset, config);
        let quality = QualityAuditor::audit(dataset, &classifications).unwrap();
        let analysis = DataProfiler::analyze_columns(dataset, &classifications, config);
        AnalysisArtifacts {
            classifications,
            quality,
            numeric_stats: analysis.numeric_stats,
            outliers: analysis.outliers,
            categorical_profiles: analysis.categorical_profiles,
            correlation: analysis.correlation,
        }
    }

    fn synthesize(dataset: &Dataset) -> Vec<Insight> {
        let config = AnalysisConfig::default();
        let artifacts = artifacts_for(dataset, &config);
        RuleBasedInsightEngine::new(config).synthesize(&artifacts)
    }

    fn rules(insights: &[Insight]) -> Vec<InsightRule> {
        insights.iter().map(|i| i.rule).collect()
    }

    // ==================== rule tests ====================

    #[test]
    fn test_overview_always_present() {
        let dataset = Dataset::new(vec![Column::new("x", [1.0, 2.0, 4.0])]).unwrap();
        let insights = synthesize(&dataset);
        assert_eq!(insights[0].rule, InsightRule::DatasetOverview);
        assert_eq!(insights[0].values["rows"], serde_json::json!(3));
    }

    #[test]
    fn test_negative_correlation_insight() {
        let dataset = Dataset::new(vec![
            Column::new("a", [1.0, 2.0, 3.0]),
            Column::new("b", [3.0, 2.0, 1.0]),
        ])
        .unwrap();
        let insights = synthesize(&dataset);

        let correlation = insights
            .iter()
            .find(|i| i.rule == InsightRule::StrongCorrelation)
            .expect("correlation insight");
        assert_eq!(correlation.columns, vec!["a", "b"]);
        assert_eq!(correlation.values["r"], serde_json::json!(-1.0));
        assert!(correlation.text.contains("negative"));
        assert!(correlation.text.contains("-1.00"));
    }

    #[test]
    fn test_outlier_rate_insight() {
        let dataset = Dataset::new(vec![Column::new("score", [10.0, 20.0, 30.0, 40.0, 1000.0])]).unwrap();
        let insights = synthesize(&dataset);

        let outlier = insights
            .iter()
            .find(|i| i.rule == InsightRule::OutlierRate)
            .expect("outlier insight");
        assert_eq!(outlier.severity, Severity::Warning);
        assert!(outlier.text.contains("70.00"));
    }

    #[test]
    fn test_quality_warnings() {
        let dataset = Dataset::new(vec![
            Column::new("a", [CellValue::Number(1.0), CellValue::Number(1.0), CellValue::Null, CellValue::Null]),
            Column::new("b", ["x", "x", "y", "z"]),
        ])
        .unwrap();
        let found = rules(&synthesize(&dataset));

        assert!(found.contains(&InsightRule::LowCompleteness));
        assert!(found.contains(&InsightRule::DuplicateRows));
        assert!(found.contains(&InsightRule::SparseColumn));
    }

    #[test]
    fn test_dominant_category_and_constant_column() {
        let mut status = vec!["ok"; 19];
        status.push("failed");
        let dataset = Dataset::new(vec![
            Column::new("status", status),
            Column::new("flat", vec![7.0; 20]),
        ])
        .unwrap();
        let found = rules(&synthesize(&dataset));

        assert!(found.contains(&InsightRule::DominantCategory));
        assert!(found.contains(&InsightRule::ConstantColumn));
    }

    #[test]
    fn test_high_variability() {
        let dataset = Dataset::new(vec![Column::new("income", [1.0, 1.0, 2.0, 1.0, 95.0, 2.0])]).unwrap();
        let found = rules(&synthesize(&dataset));
        assert!(found.contains(&InsightRule::HighVariability));
    }

    #[test]
    fn test_unresolved_column_is_deduplicated_against_sparse() {
        let dataset = Dataset::new(vec![
            Column::new("x", [1.0, 2.0, 3.0]),
            Column::new("empty", [CellValue::Null, CellValue::Null, CellValue::Null]),
        ])
        .unwrap();
        let insights = synthesize(&dataset);

        let about_empty: Vec<InsightRule> = insights
            .iter()
            .filter(|i| i.columns == vec!["empty"])
            .map(|i| i.rule)
            .collect();
        assert_eq!(about_empty, vec![InsightRule::SparseColumn]);
    }

    // ==================== ranking tests ====================

    #[test]
    fn test_rank_puts_warnings_first_and_keeps_rule_order() {
        let insights = vec![
            Insight::new(InsightRule::DatasetOverview, "overview"),
            Insight::new(InsightRule::StrongCorrelation, "corr").with_columns(["a", "b"]),
            Insight::new(InsightRule::DuplicateRows, "dupes"),
            Insight::new(InsightRule::OutlierRate, "outliers").with_columns(["a"]),
        ];
        let ranked = rank_insights(insights, 10);

        assert_eq!(
            rules(&ranked),
            vec![
                InsightRule::DuplicateRows,
                InsightRule::OutlierRate,
                InsightRule::DatasetOverview,
                InsightRule::StrongCorrelation,
            ]
        );
    }

    #[test]
    fn test_rank_deduplicates_by_sorted_columns() {
        let insights = vec![
            Insight::new(InsightRule::StrongCorrelation, "first").with_columns(["a", "b"]),
            Insight::new(InsightRule::StrongCorrelation, "second").with_columns(["b", "a"]),
        ];
        let ranked = rank_insights(insights, 10);

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].text, "first");
    }

    #[test]
    fn test_rank_truncates() {
        let insights = (0..20)
            .map(|i| Insight::new(InsightRule::SparseColumn, format!("c{i}")).with_columns([format!("c{i}")]))
            .collect();
        assert_eq!(rank_insights(insights, 15).len(), 15);
    }

    #[test]
    fn test_max_insights_from_config() {
        let dataset = Dataset::new(vec![
            Column::new("a", [1.0, 2.0, 3.0]),
            Column::new("b", [3.0, 2.0, 1.0]),
        ])
        .unwrap();
        let config = AnalysisConfig::builder().max_insights(1).build().unwrap();
        let artifacts = artifacts_for(&dataset, &config);
        let insights = RuleBasedInsightEngine::new(config).synthesize(&artifacts);

        assert_eq!(insights.len(), 1);
    }

    #[test]
    fn test_synthesis_is_deterministic() {
        let dataset = Dataset::new(vec![
            Column::new("a", [1.0, 2.0, 3.0, 50.0]),
            Column::new("b", ["x", "y", "x", "x"]),
        ])
        .unwrap();
        assert_eq!(synthesize(&dataset), synthesize(&dataset));
    }
}
