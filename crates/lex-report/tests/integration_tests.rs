//! Integration tests for the analysis pipeline.
//!
//! These tests verify end-to-end behavior of the pipeline using various datasets.

use lex_report::reporting::SECTION_ORDER;
use lex_report::{
    AnalysisConfig, AnalysisReport, AnalysisStage, AnalysisWarning, CellValue, ChartKind, Column,
    Dataset, DegenerateStatistic, InsightRule, Pipeline, ReportGenerator, ReportStatus,
    SemanticType, Severity, ingest,
};
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_fixture(filename: &str) -> Dataset {
    ingest::load_dataset(fixtures_path().join(filename)).expect("Failed to load fixture")
}

fn analyze(dataset: &Dataset) -> AnalysisReport {
    Pipeline::builder()
        .build()
        .unwrap()
        .analyze(dataset)
        .expect("Analysis should complete")
}

fn semantic_type(report: &AnalysisReport, column: &str) -> SemanticType {
    report
        .artifacts
        .classification(column)
        .unwrap_or_else(|| panic!("no classification for {}", column))
        .semantic_type
}

// ============================================================================
// Full Pipeline Tests
// ============================================================================

#[test]
fn test_full_pipeline_sales() {
    let report = analyze(&load_fixture("sales.csv"));

    assert_eq!(semantic_type(&report, "order_id"), SemanticType::Identifier);
    assert_eq!(semantic_type(&report, "region"), SemanticType::Categorical);
    assert_eq!(semantic_type(&report, "status"), SemanticType::Categorical);
    assert_eq!(semantic_type(&report, "quantity"), SemanticType::Numeric);
    assert_eq!(semantic_type(&report, "amount"), SemanticType::Numeric);
    assert_eq!(semantic_type(&report, "order_date"), SemanticType::Datetime);

    let quality = &report.artifacts.quality;
    assert_eq!(quality.total_rows, 25);
    assert_eq!(quality.total_columns, 6);
    assert_eq!(quality.total_missing, 1);
    assert_eq!(quality.duplicate_rows, 0);
    assert!((quality.completeness - (1.0 - 1.0 / 150.0)).abs() < 1e-12);

    assert_eq!(report.status(), ReportStatus::Completed);
}

#[test]
fn test_sections_in_fixed_order() {
    let report = analyze(&load_fixture("sales.csv"));

    let titles: Vec<&str> = report
        .document
        .sections
        .iter()
        .map(|s| s.title.as_str())
        .collect();
    assert_eq!(titles, SECTION_ORDER.to_vec());
    assert_eq!(report.document.title, "Data Analysis Report");
    assert_eq!(report.document.author, "Data Analyst");
}

#[test]
fn test_sales_correlation_and_dominant_category() {
    let report = analyze(&load_fixture("sales.csv"));

    let r = report
        .artifacts
        .correlation
        .get("quantity", "amount")
        .expect("correlation defined");
    assert!(r > 0.999);

    let correlation = report
        .insights
        .iter()
        .find(|i| i.rule == InsightRule::StrongCorrelation)
        .expect("correlation insight");
    assert!(correlation.columns.contains(&"quantity".to_string()));
    assert!(correlation.columns.contains(&"amount".to_string()));
    assert!(correlation.text.contains("positive"));

    let dominant = report
        .insights
        .iter()
        .find(|i| i.rule == InsightRule::DominantCategory)
        .expect("dominant category insight");
    assert_eq!(dominant.columns, vec!["status".to_string()]);
    assert!(dominant.text.contains("'completed'"));
}

#[test]
fn test_categorical_percentages_sum_to_100() {
    let report = analyze(&load_fixture("sales.csv"));

    let region = report
        .artifacts
        .categorical_profiles
        .iter()
        .find(|p| p.column == "region")
        .expect("region profile");
    assert_eq!(region.unique_count, 4);
    assert_eq!(region.top_values[0].value, "North");
    assert_eq!(region.top_values[0].count, 7);

    let total: f64 = region.top_values.iter().map(|f| f.percentage).sum();
    assert!((total - 100.0).abs() < 1e-9);
}

#[test]
fn test_chart_specs_reference_data() {
    let report = analyze(&load_fixture("sales.csv"));

    let kinds: Vec<ChartKind> = report.document.charts().map(|c| c.kind).collect();
    assert!(kinds.contains(&ChartKind::Histogram));
    assert!(kinds.contains(&ChartKind::Bar));
    assert!(kinds.contains(&ChartKind::Heatmap));

    let json = serde_json::to_string(&report.document).unwrap();
    assert!(json.contains("\"kind\":\"heatmap\""));
    assert!(json.contains("\"source\":\"correlation_matrix\""));
}

// ============================================================================
// Statistics and Outliers
// ============================================================================

#[test]
fn test_score_outlier() {
    let report = analyze(&load_fixture("scores.csv"));

    let stats = report
        .artifacts
        .numeric_stats
        .iter()
        .find(|s| s.column == "score")
        .expect("score stats");
    assert_eq!(stats.mean, Some(220.0));
    assert_eq!(stats.median, Some(30.0));
    assert_eq!(stats.q1, Some(20.0));
    assert_eq!(stats.q3, Some(40.0));
    assert_eq!(stats.iqr, Some(20.0));
    assert_eq!(stats.lower_bound, Some(-10.0));
    assert_eq!(stats.upper_bound, Some(70.0));
    assert_eq!(stats.outlier_count, 1);

    let outliers = &report.artifacts.outliers[0];
    assert_eq!(outliers.examples, vec![1000.0]);

    let insight = report
        .insights
        .iter()
        .find(|i| i.rule == InsightRule::OutlierRate)
        .expect("outlier insight");
    assert_eq!(insight.severity, Severity::Warning);
    assert_eq!(report.insights[0].severity, Severity::Warning);
}

#[test]
fn test_quartile_ordering_holds() {
    let report = analyze(&load_fixture("sales.csv"));

    for stats in &report.artifacts.numeric_stats {
        let (q1, median, q3) = (stats.q1.unwrap(), stats.median.unwrap(), stats.q3.unwrap());
        assert!(q1 <= median && median <= q3, "{}", stats.column);
        assert!(stats.lower_bound.unwrap() <= q1);
        assert!(stats.upper_bound.unwrap() >= q3);
    }
}

#[test]
fn test_fractional_constant_columns() {
    let dataset = Dataset::new(vec![
        Column::new("price", vec![19.99; 10]),
        Column::new("rate", vec![0.7; 10]),
        Column::new("qty", (0..10).map(|i| i as f64).collect::<Vec<_>>()),
    ])
    .unwrap();
    let report = analyze(&dataset);

    let matrix = &report.artifacts.correlation;
    assert_eq!(matrix.get("price", "rate"), None);
    assert_eq!(matrix.get("price", "qty"), None);
    assert!(!report.insights.iter().any(|i| i.rule == InsightRule::StrongCorrelation));

    let constant: Vec<&str> = report
        .insights
        .iter()
        .filter(|i| i.rule == InsightRule::ConstantColumn)
        .map(|i| i.columns[0].as_str())
        .collect();
    assert_eq!(constant, vec!["price", "rate"]);

    for column in ["price", "rate"] {
        assert!(report.warnings.contains(&AnalysisWarning::DegenerateStatistic {
            column: column.to_string(),
            statistic: DegenerateStatistic::ZeroVariance,
        }));
    }
}

#[test]
fn test_non_finite_numbers_are_missing() {
    let dataset = Dataset::new(vec![
        Column::new(
            "x",
            vec![
                CellValue::Number(1.0),
                CellValue::Number(f64::NAN),
                CellValue::Number(3.0),
                CellValue::Number(f64::INFINITY),
                CellValue::Number(5.0),
                CellValue::Number(6.0),
            ],
        ),
        Column::new("y", [2.0, 4.0, 6.0, 8.0, 10.0, 12.0]),
    ])
    .unwrap();
    let report = analyze(&dataset);

    assert_eq!(report.artifacts.quality.total_missing, 2);
    let r = report.artifacts.correlation.get("x", "y").expect("defined on complete rows");
    assert!(r.is_finite());
    assert!((r - 1.0).abs() < 1e-12);

    let x = report
        .artifacts
        .numeric_stats
        .iter()
        .find(|s| s.column == "x")
        .expect("x stats");
    assert_eq!(x.count, 4);
    assert_eq!(x.mean, Some(3.75));
}

#[test]
fn test_anti_correlated_columns() {
    let dataset = Dataset::new(vec![
        Column::new("x", [1.0, 2.0, 3.0]),
        Column::new("y", [3.0, 2.0, 1.0]),
    ])
    .unwrap();
    let report = analyze(&dataset);

    let matrix = &report.artifacts.correlation;
    assert_eq!(matrix.get("x", "y"), Some(-1.0));
    assert_eq!(matrix.get("y", "x"), Some(-1.0));
    assert_eq!(matrix.get("x", "x"), Some(1.0));

    let insight = report
        .insights
        .iter()
        .find(|i| i.rule == InsightRule::StrongCorrelation)
        .expect("correlation insight");
    assert!(insight.text.contains("negative"));
}

// ============================================================================
// Quality Audit Tests
// ============================================================================

#[test]
fn test_duplicate_rows_counted_with_nulls() {
    let report = analyze(&load_fixture("duplicates.csv"));

    let quality = &report.artifacts.quality;
    assert_eq!(quality.total_rows, 6);
    assert_eq!(quality.duplicate_rows, 3);
    assert_eq!(quality.unique_rows, 3);

    let insight = report
        .insights
        .iter()
        .find(|i| i.rule == InsightRule::DuplicateRows)
        .expect("duplicate insight");
    assert!(insight.columns.is_empty());
}

#[test]
fn test_missing_markers_in_csv() {
    let report = analyze(&load_fixture("missing_markers.csv"));

    let quality = &report.artifacts.quality;
    assert_eq!(quality.total_missing, 4);
    assert!((quality.completeness - 8.0 / 12.0).abs() < 1e-12);

    assert_eq!(semantic_type(&report, "price"), SemanticType::Numeric);
    let price = report
        .artifacts
        .numeric_stats
        .iter()
        .find(|s| s.column == "price")
        .unwrap();
    assert_eq!(price.count, 2);

    assert!(report.insights.iter().any(|i| i.rule == InsightRule::LowCompleteness));
    assert!(report.insights.iter().any(|i| i.rule == InsightRule::SparseColumn));
}

#[test]
fn test_single_row_of_nulls() {
    let dataset = Dataset::new(vec![
        Column::new("amount", [CellValue::Null]).with_type_hint(SemanticType::Numeric),
        Column::new("note", [CellValue::Null]),
    ])
    .unwrap();
    let report = analyze(&dataset);

    assert_eq!(report.artifacts.quality.completeness, 0.0);
    assert_eq!(semantic_type(&report, "amount"), SemanticType::Numeric);
    assert_eq!(semantic_type(&report, "note"), SemanticType::Unknown);

    let stats = &report.artifacts.numeric_stats[0];
    assert_eq!(stats.count, 0);
    assert_eq!(stats.mean, None);
    assert_eq!(stats.median, None);
    assert_eq!(stats.std, None);
    assert_eq!(stats.q1, None);
    assert_eq!(stats.q3, None);
    assert_eq!(stats.cv, None);

    assert_eq!(report.status(), ReportStatus::CompletedWithWarnings);
    assert!(report.warnings.contains(&AnalysisWarning::DegenerateStatistic {
        column: "amount".to_string(),
        statistic: DegenerateStatistic::InsufficientValues,
    }));
    assert!(
        report
            .warnings
            .iter()
            .any(|w| matches!(w, AnalysisWarning::UnresolvedType { column, .. } if column == "note"))
    );
}

#[test]
fn test_zero_rows_is_empty_dataset() {
    let dataset = Dataset::new(vec![
        Column::new("a", Vec::<f64>::new()),
        Column::new("b", Vec::<f64>::new()),
    ])
    .unwrap();

    let err = Pipeline::builder()
        .build()
        .unwrap()
        .analyze(&dataset)
        .unwrap_err();
    assert!(err.is_empty_dataset());
}

#[test]
fn test_zero_columns_is_empty_dataset() {
    let dataset = Dataset::new(Vec::new()).unwrap();
    let err = Pipeline::builder()
        .build()
        .unwrap()
        .analyze(&dataset)
        .unwrap_err();
    assert_eq!(err.error_code(), "EMPTY_DATASET");
}

// ============================================================================
// Determinism and Configuration
// ============================================================================

#[test]
fn test_document_is_deterministic() {
    let dataset = load_fixture("sales.csv");
    let first = analyze(&dataset);
    let second = analyze(&dataset);

    assert_eq!(
        serde_json::to_string(&first.document).unwrap(),
        serde_json::to_string(&second.document).unwrap()
    );
    assert_eq!(first.insights, second.insights);
}

#[test]
fn test_sampling_is_deterministic() {
    let dataset = load_fixture("sales.csv");
    let config = AnalysisConfig::builder()
        .sampling_threshold(10)
        .sampling_seed(7)
        .build()
        .unwrap();
    let pipeline = Pipeline::builder().config(config).build().unwrap();

    let first = pipeline.analyze(&dataset).unwrap();
    let second = pipeline.analyze(&dataset).unwrap();

    let sampling = first.sampling.as_ref().unwrap();
    assert_eq!(sampling.original_rows, 25);
    assert_eq!(sampling.sampled_rows, 10);
    assert_eq!(first.artifacts.quality.total_rows, 10);
    assert_eq!(first.document, second.document);
}

#[test]
fn test_max_insights_caps_output() {
    let config = AnalysisConfig::builder().max_insights(1).build().unwrap();
    let report = Pipeline::builder()
        .config(config)
        .build()
        .unwrap()
        .analyze(&load_fixture("scores.csv"))
        .unwrap();

    assert_eq!(report.insights.len(), 1);
    assert_eq!(report.insights[0].severity, Severity::Warning);
}

#[test]
fn test_custom_title_and_author() {
    let config = AnalysisConfig::builder()
        .report_title("Quarterly Sales")
        .author("Finance")
        .build()
        .unwrap();
    let report = Pipeline::builder()
        .config(config)
        .build()
        .unwrap()
        .analyze(&load_fixture("sales.csv"))
        .unwrap();

    assert_eq!(report.document.title, "Quarterly Sales");
    assert_eq!(report.document.author, "Finance");
}

// ============================================================================
// Progress Reporting Tests
// ============================================================================

#[test]
fn test_progress_reporting_invoked() {
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = calls.clone();

    Pipeline::builder()
        .on_progress(move |_| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        })
        .build()
        .unwrap()
        .analyze(&load_fixture("scores.csv"))
        .unwrap();

    assert!(calls.load(Ordering::SeqCst) >= 7);
}

#[test]
fn test_progress_is_monotonic() {
    let progress = Arc::new(Mutex::new(Vec::new()));
    let progress_clone = progress.clone();

    Pipeline::builder()
        .on_progress(move |update| {
            progress_clone.lock().unwrap().push((update.stage, update.progress));
        })
        .build()
        .unwrap()
        .analyze(&load_fixture("sales.csv"))
        .unwrap();

    let progress = progress.lock().unwrap();
    assert!(progress.windows(2).all(|w| w[0].1 <= w[1].1));
    assert_eq!(progress.last().map(|p| p.0), Some(AnalysisStage::Complete));
}

// ============================================================================
// Report Output Tests
// ============================================================================

#[test]
fn test_report_written_to_file() {
    let report = analyze(&load_fixture("scores.csv"));
    let output_dir = std::env::temp_dir().join("lex_report_integration_output");
    let generator = ReportGenerator::new(output_dir.clone());

    let path = generator.write_report_to_file(&report, "scores").unwrap();
    assert_eq!(path, output_dir.join("scores_report.json"));

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written["document"]["title"], "Data Analysis Report");
    assert!(written["generated_at"].is_string());
}
