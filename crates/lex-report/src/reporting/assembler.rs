//! Composition of analysis artifacts into a [`ReportDocument`].

use crate::config::AnalysisConfig;
use crate::insights::{Insight, InsightRule};
use crate::types::{AnalysisArtifacts, SamplingInfo, SemanticType};
use crate::utils::{format_number, format_ratio_percent};

use super::document::{ChartKind, ChartSpec, DataRef, ReportDocument, Section, Table};

pub const OVERVIEW: &str = "Overview";
pub const DATA_QUALITY: &str = "Data Quality";
pub const NUMERICAL_ANALYSIS: &str = "Numerical Analysis";
pub const CATEGORICAL_ANALYSIS: &str = "Categorical Analysis";
pub const CORRELATION_ANALYSIS: &str = "Correlation Analysis";
pub const INSIGHTS: &str = "Insights & Recommendations";

/// Section titles in document order.
pub const SECTION_ORDER: [&str; 6] = [
    OVERVIEW,
    DATA_QUALITY,
    NUMERICAL_ANALYSIS,
    CATEGORICAL_ANALYSIS,
    CORRELATION_ANALYSIS,
    INSIGHTS,
];

/// Inputs of [`ReportAssembler::assemble`].
pub struct AssemblyParams<'a> {
    pub artifacts: &'a AnalysisArtifacts,
    pub insights: &'a [Insight],
    pub sampling: Option<&'a SamplingInfo>,
    pub config: &'a AnalysisConfig,
}

/// Builds the report document. Formatting only: inputs are never changed
/// and the same inputs always produce the same document.
pub struct ReportAssembler;

impl ReportAssembler {
    pub fn assemble(params: AssemblyParams<'_>) -> ReportDocument {
        ReportDocument {
            title: params.config.report_title.clone(),
            author: params.config.author.clone(),
            sections: vec![
                Self::overview(&params),
                Self::data_quality(&params),
                Self::numerical_analysis(&params),
                Self::categorical_analysis(&params),
                Self::correlation_analysis(&params),
                Self::insights(&params),
            ],
        }
    }

    fn overview(params: &AssemblyParams<'_>) -> Section {
        let AssemblyParams { artifacts, sampling, config, .. } = params;
        let quality = &artifacts.quality;
        let mut section = Section::new(OVERVIEW);

        section.narrative(format!(
            "{} prepared by {}. This report summarizes the structure, quality, distributions and relationships found in the dataset.",
            config.report_title, config.author
        ));

        let total_records = sampling.map_or(quality.total_rows, |s| s.original_rows);
        let mut metadata = Table::new("dataset_overview", ["Metric", "Value"]);
        metadata.push_row(vec!["Total Records".to_string(), total_records.to_string()]);
        metadata.push_row(vec!["Total Columns".to_string(), quality.total_columns.to_string()]);
        metadata.push_row(vec!["Analyzed Rows".to_string(), quality.total_rows.to_string()]);
        if let Some(s) = sampling {
            metadata.push_row(vec![
                "Sampling".to_string(),
                format!(
                    "uniform random sample of {} of {} rows (seed {})",
                    s.sampled_rows, s.original_rows, s.seed
                ),
            ]);
        }
        section.table(metadata);

        let mut types = Table::new("column_types", ["Column", "Type", "Non-Null Count"]);
        for c in &artifacts.classifications {
            types.push_row(vec![
                c.column.clone(),
                c.semantic_type.to_string(),
                c.non_null_count.to_string(),
            ]);
        }
        section.table(types);

        section
    }

    fn data_quality(params: &AssemblyParams<'_>) -> Section {
        let quality = &params.artifacts.quality;
        let mut section = Section::new(DATA_QUALITY);

        section.narrative(format!(
            "Overall completeness is {} ({} of {} cells missing). {} duplicate rows were found; {} rows are unique.",
            format_ratio_percent(quality.completeness),
            quality.total_missing,
            quality.total_cells,
            quality.duplicate_rows,
            quality.unique_rows
        ));

        let mut missing = Table::new("missing_values", ["Column", "Missing Count", "Missing %"]);
        for c in &quality.columns {
            missing.push_row(vec![
                c.column.clone(),
                c.missing_count.to_string(),
                format_ratio_percent(c.missing_rate),
            ]);
        }
        section.table(missing);

        if quality.total_missing > 0 {
            section.chart(
                ChartSpec::new(
                    ChartKind::Bar,
                    "Missing Values by Column",
                    DataRef::Table {
                        table_id: "missing_values".to_string(),
                        label_column: "Column".to_string(),
                        value_column: "Missing Count".to_string(),
                    },
                )
                .labels("Column", "Missing Count"),
            );
        }

        if !quality.unresolved_columns.is_empty() {
            section.narrative(format!(
                "The following columns could not be classified and were excluded from numeric and categorical analysis: {}.",
                quality.unresolved_columns.join(", ")
            ));
        }

        section
    }

    fn numerical_analysis(params: &AssemblyParams<'_>) -> Section {
        let AssemblyParams { artifacts, config, .. } = params;
        let mut section = Section::new(NUMERICAL_ANALYSIS);

        if artifacts.numeric_stats.is_empty() {
            section.narrative("No numeric columns were found in the dataset.");
            return section;
        }

        let mut stats = Table::new(
            "numeric_stats",
            ["Column", "Count", "Mean", "Median", "Std Dev", "Min", "Max", "Q1", "Q3", "CV"],
        );
        for s in &artifacts.numeric_stats {
            stats.push_row(vec![
                s.column.clone(),
                s.count.to_string(),
                format_number(s.mean),
                format_number(s.median),
                format_number(s.std),
                format_number(s.min),
                format_number(s.max),
                format_number(s.q1),
                format_number(s.q3),
                format_number(s.cv),
            ]);
        }
        section.table(stats);

        let mut outliers = Table::new("outliers", ["Column", "Lower Bound", "Upper Bound", "Outliers"]);
        for o in &artifacts.outliers {
            outliers.push_row(vec![
                o.column.clone(),
                format_number(o.lower_bound),
                format_number(o.upper_bound),
                o.outlier_count.to_string(),
            ]);
        }
        section.table(outliers);

        for s in artifacts.numeric_stats.iter().take(config.max_charts_per_section) {
            section.chart(
                ChartSpec::new(
                    ChartKind::Histogram,
                    format!("Distribution of {}", s.column),
                    DataRef::Column { column: s.column.clone() },
                )
                .labels(s.column.clone(), "Frequency"),
            );
        }

        section.chart(
            ChartSpec::new(
                ChartKind::Boxplot,
                "Spread of Numeric Columns",
                DataRef::Columns {
                    columns: artifacts.numeric_stats.iter().map(|s| s.column.clone()).collect(),
                },
            )
            .labels("Column", "Value"),
        );

        section
    }

    fn categorical_analysis(params: &AssemblyParams<'_>) -> Section {
        let AssemblyParams { artifacts, config, .. } = params;
        let mut section = Section::new(CATEGORICAL_ANALYSIS);

        if artifacts.categorical_profiles.is_empty() {
            section.narrative("No categorical columns were found in the dataset.");
            return section;
        }

        let mut charts = 0;
        for profile in &artifacts.categorical_profiles {
            section.narrative(format!(
                "Column '{}' has {} distinct values; the top {} cover {} of non-null values.",
                profile.column,
                profile.unique_count,
                profile.top_values.len(),
                profile
                    .coverage
                    .map_or_else(|| format_number(None), format_ratio_percent)
            ));

            let table_id = format!("frequency_{}", profile.column);
            let mut table = Table::new(table_id.clone(), ["Value", "Count", "Percentage"]);
            for entry in &profile.top_values {
                table.push_row(vec![
                    entry.value.clone(),
                    entry.count.to_string(),
                    format!("{:.2}%", entry.percentage),
                ]);
            }
            section.table(table);

            if profile.unique_count <= config.categorical_max_unique
                && !profile.top_values.is_empty()
                && charts < config.max_charts_per_section
            {
                charts += 1;
                section.chart(
                    ChartSpec::new(
                        ChartKind::Bar,
                        format!("Top Values of {}", profile.column),
                        DataRef::Table {
                            table_id,
                            label_column: "Value".to_string(),
                            value_column: "Count".to_string(),
                        },
                    )
                    .labels(profile.column.clone(), "Count"),
                );
            }
        }

        section
    }

    fn correlation_analysis(params: &AssemblyParams<'_>) -> Section {
        let matrix = &params.artifacts.correlation;
        let mut section = Section::new(CORRELATION_ANALYSIS);

        if matrix.len() < 2 {
            section.narrative("At least two numeric columns are required for correlation analysis.");
            return section;
        }

        let header = std::iter::once("Column".to_string()).chain(matrix.columns.iter().cloned());
        let mut table = Table::new("correlation_matrix", header);
        for (name, row) in matrix.columns.iter().zip(&matrix.values) {
            let mut cells = vec![name.clone()];
            cells.extend(row.iter().map(|r| format_number(*r)));
            table.push_row(cells);
        }
        section.table(table);

        section.chart(ChartSpec::new(
            ChartKind::Heatmap,
            "Correlation Matrix of Numerical Variables",
            DataRef::CorrelationMatrix {
                columns: matrix.columns.clone(),
            },
        ));

        let strong = params
            .insights
            .iter()
            .filter(|i| i.rule == InsightRule::StrongCorrelation)
            .count();
        let numeric = params.artifacts.count_of_type(SemanticType::Numeric);
        section.narrative(format!(
            "Pearson correlations were computed over {} numeric columns using pairwise-complete rows; {} strong relationships are listed among the insights.",
            numeric, strong
        ));

        section
    }

    fn insights(params: &AssemblyParams<'_>) -> Section {
        let mut section = Section::new(INSIGHTS);

        if params.insights.is_empty() {
            section.narrative("No notable findings.");
            return section;
        }

        for insight in params.insights {
            section.narrative(format!("[{}] {}", insight.severity.label(), insight.text));
        }

        section
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::{InsightEngine, RuleBasedInsightEngine};
    use crate::profiler::DataProfiler;
    use crate::quality::QualityAuditor;
    use crate::types::{Column, Dataset};
    use pretty_assertions::assert_eq;

    fn assemble(dataset: &Dataset, config: &AnalysisConfig) -> ReportDocument {
        let (classifications, _) = DataProfiler::classify_dataset(dataset, config);
        let quality = QualityAuditor::audit(dataset, &classifications).unwrap();
        let analysis = DataProfiler::analyze_columns(dataset, &classifications, config);
        let artifacts = AnalysisArtifacts {
            classifications,
            quality,
            numeric_stats: analysis.numeric_stats,
            outliers: analysis.outliers,
            categorical_profiles: analysis.categorical_profiles,
            correlation: analysis.correlation,
        };
        let insights = RuleBasedInsightEngine::new(config.clone()).synthesize(&artifacts);
        ReportAssembler::assemble(AssemblyParams {
            artifacts: &artifacts,
            insights: &insights,
            sampling: None,
            config,
        })
    }

    fn sales() -> Dataset {
        Dataset::new(vec![
            Column::new("price", [10.0, 12.5, 11.0, 9.5, 30.0]),
            Column::new("quantity", [5.0, 4.0, 6.0, 5.0, 1.0]),
            Column::new("region", ["north", "south", "north", "east", "north"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_section_order() {
        let document = assemble(&sales(), &AnalysisConfig::default());
        let titles: Vec<&str> = document.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, SECTION_ORDER.to_vec());
        assert_eq!(document.title, "Data Analysis Report");
        assert_eq!(document.author, "Data Analyst");
    }

    #[test]
    fn test_numeric_stats_table_layout() {
        let document = assemble(&sales(), &AnalysisConfig::default());
        let table = document.tables().find(|t| t.id == "numeric_stats").unwrap();

        assert_eq!(
            table.columns,
            vec!["Column", "Count", "Mean", "Median", "Std Dev", "Min", "Max", "Q1", "Q3", "CV"]
        );
        assert_eq!(table.rows[0][0], "price");
        assert_eq!(table.rows[0][2], "14.60");
    }

    #[test]
    fn test_charts_reference_data() {
        let document = assemble(&sales(), &AnalysisConfig::default());
        let kinds: Vec<ChartKind> = document.charts().map(|c| c.kind).collect();

        assert_eq!(
            kinds,
            vec![
                ChartKind::Histogram,
                ChartKind::Histogram,
                ChartKind::Boxplot,
                ChartKind::Bar,
                ChartKind::Heatmap,
            ]
        );
    }

    #[test]
    fn test_histograms_capped() {
        let columns = (0..6)
            .map(|i| Column::new(format!("n{i}"), [1.0 + i as f64, 2.0, 3.0, 5.0]))
            .collect();
        let dataset = Dataset::new(columns).unwrap();
        let document = assemble(&dataset, &AnalysisConfig::default());

        let histograms = document.charts().filter(|c| c.kind == ChartKind::Histogram).count();
        assert_eq!(histograms, 4);
    }

    #[test]
    fn test_single_numeric_column_has_correlation_note() {
        let dataset = Dataset::new(vec![Column::new("x", [1.0, 2.0, 3.0])]).unwrap();
        let document = assemble(&dataset, &AnalysisConfig::default());

        let section = document.section(CORRELATION_ANALYSIS).unwrap();
        assert_eq!(section.tables().count(), 0);
        assert_eq!(section.charts().count(), 0);
        assert_eq!(section.narratives().count(), 1);
    }

    #[test]
    fn test_insights_are_prefixed_by_severity() {
        let document = assemble(&sales(), &AnalysisConfig::default());
        let section = document.section(INSIGHTS).unwrap();
        assert!(section.narratives().all(|t| t.starts_with("[WARNING]") || t.starts_with("[INFO]")));
    }

    #[test]
    fn test_null_values_render_as_na() {
        let dataset = Dataset::new(vec![Column::new("x", [5.0])]).unwrap();
        let document = assemble(&dataset, &AnalysisConfig::default());
        let table = document.tables().find(|t| t.id == "numeric_stats").unwrap();

        // std and cv are undefined for a single value
        assert_eq!(table.rows[0][4], "N/A");
        assert_eq!(table.rows[0][9], "N/A");
    }

    #[test]
    fn test_custom_title_and_author() {
        let config = AnalysisConfig::builder()
            .report_title("Quarterly Sales")
            .author("Finance Team")
            .build()
            .unwrap();
        let document = assemble(&sales(), &config);

        assert_eq!(document.title, "Quarterly Sales");
        let overview = document.section(OVERVIEW).unwrap();
        assert!(overview.narratives().next().unwrap().contains("Finance Team"));
    }
}
