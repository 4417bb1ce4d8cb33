//! CLI entry point for the dataset analysis report generator.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use lex_report::{
    AnalysisConfig, AnalysisConfigBuilder, AnalysisReport, Pipeline, ReportGenerator,
    ReportStatus, SemanticType, ingest,
};
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    author = "Lex Machina Team",
    version,
    about = "Automated Dataset Analysis and Report Generator",
    long_about = "Profiles a CSV or spreadsheet dataset and assembles a structured analysis report.\n\n\
                  EXAMPLES:\n  \
                  # Human-readable summary\n  \
                  lex-report -i data.csv\n\n  \
                  # Full report as JSON on stdout\n  \
                  lex-report -i data.csv --json | jq '.document.sections[].title'\n\n  \
                  # Save the report next to other outputs\n  \
                  lex-report -i data.csv -o results/ --emit-report\n\n  \
                  # Sample large files deterministically\n  \
                  lex-report -i big.csv --sample-rows 50000 --seed 7"
)]
struct Args {
    /// Path to the CSV or workbook (.xlsx, .xls, .ods) to analyze
    #[arg(short, long)]
    input: String,

    /// Output directory for the emitted report
    #[arg(short, long, default_value = "./outputs")]
    output: String,

    /// Report title
    #[arg(long)]
    title: Option<String>,

    /// Report author
    #[arg(long)]
    author: Option<String>,

    /// Number of most frequent values kept per categorical column
    #[arg(long)]
    top_k: Option<usize>,

    /// IQR multiplier for outlier fences
    #[arg(long)]
    iqr_multiplier: Option<f64>,

    /// Absolute correlation at or above which a pair is reported (0.0 - 1.0)
    #[arg(long)]
    correlation_threshold: Option<f64>,

    /// Maximum number of insights in the report
    #[arg(long)]
    max_insights: Option<usize>,

    /// Analyze a seeded random sample of this many rows when the dataset is larger
    #[arg(long)]
    sample_rows: Option<usize>,

    /// Seed for row sampling
    #[arg(long)]
    seed: Option<u64>,

    /// JSON file holding a full analysis configuration
    ///
    /// Command-line flags override values from the file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,

    /// Output JSON to stdout instead of human-readable summary
    ///
    /// Disables all progress logs; only outputs the final JSON report.
    /// Useful for piping to other tools: `... --json | jq .insights`
    #[arg(long)]
    json: bool,

    /// Write the full JSON report to the output directory
    ///
    /// The report will be saved as <input_name>_report.json
    #[arg(short = 'r', long)]
    emit_report: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    if !Path::new(&args.input).exists() {
        return Err(anyhow!("Input file not found: {}", args.input));
    }

    let config = build_config(&args)?;
    let dataset = ingest::load_dataset(&args.input)?;

    let mut builder = Pipeline::builder().config(config);
    if !args.quiet && !args.json {
        builder = builder.on_progress(|update| {
            info!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        });
    }
    let pipeline = builder.build()?;

    let report = match pipeline.analyze(&dataset) {
        Ok(report) => report,
        Err(e) => {
            error!("Analysis failed: {}", e);
            return Err(anyhow!("Analysis failed: {}", e));
        }
    };

    handle_output(&report, &args)
}

/// Merge the optional config file with command-line overrides.
fn build_config(args: &Args) -> Result<AnalysisConfig> {
    let base = match &args.config {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Reading config file {}", path.display()))?;
            serde_json::from_str::<AnalysisConfig>(&content)
                .with_context(|| format!("Parsing config file {}", path.display()))?
        }
        None => AnalysisConfig::default(),
    };

    let mut builder = AnalysisConfigBuilder::from_config(base);
    if let Some(ref title) = args.title {
        builder = builder.report_title(title);
    }
    if let Some(ref author) = args.author {
        builder = builder.author(author);
    }
    if let Some(k) = args.top_k {
        builder = builder.top_k(k);
    }
    if let Some(multiplier) = args.iqr_multiplier {
        builder = builder.iqr_multiplier(multiplier);
    }
    if let Some(threshold) = args.correlation_threshold {
        builder = builder.correlation_threshold(threshold);
    }
    if let Some(max) = args.max_insights {
        builder = builder.max_insights(max);
    }
    if let Some(rows) = args.sample_rows {
        builder = builder.sampling_threshold(rows);
    }
    if let Some(seed) = args.seed {
        builder = builder.sampling_seed(seed);
    }

    Ok(builder.build()?)
}

/// Handle pipeline output based on CLI flags.
///
/// Output behavior:
/// - Default: Print human-readable summary to stdout
/// - `--json`: Print JSON to stdout only (no logs)
/// - `--emit-report`: Write JSON report to file
fn handle_output(report: &AnalysisReport, args: &Args) -> Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    if args.emit_report {
        let input_stem = extract_file_stem(&args.input);
        let generator = ReportGenerator::new(PathBuf::from(&args.output));
        let report_path = generator.write_report_to_file(report, &input_stem)?;
        info!("Report written to: {}", report_path.display());
    }

    print_human_readable_summary(report, args);

    Ok(())
}

/// Extract the file stem (name without extension) from a path.
fn extract_file_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output")
        .to_string()
}

/// Truncate a string to max length with ellipsis
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Print a human-readable summary of the analysis.
fn print_human_readable_summary(report: &AnalysisReport, args: &Args) {
    let artifacts = &report.artifacts;
    let quality = &artifacts.quality;

    println!();
    println!("{}", "=".repeat(80));
    match report.status() {
        ReportStatus::Completed => println!("ANALYSIS COMPLETE"),
        ReportStatus::CompletedWithWarnings => println!("ANALYSIS COMPLETE (WITH WARNINGS)"),
    }
    println!("{}", "=".repeat(80));
    println!();

    println!("Report: {} by {}", report.document.title, report.document.author);
    println!(
        "Input:  {} ({} rows x {} columns)",
        args.input, quality.total_rows, quality.total_columns
    );
    if let Some(ref sampling) = report.sampling {
        println!(
            "Sample: {} of {} rows (seed {})",
            sampling.sampled_rows, sampling.original_rows, sampling.seed
        );
    }
    println!("Duration: {}ms", report.duration_ms);
    println!();

    println!("Column Types:");
    for semantic_type in [
        SemanticType::Numeric,
        SemanticType::Categorical,
        SemanticType::Datetime,
        SemanticType::Identifier,
        SemanticType::Unknown,
    ] {
        let count = artifacts.count_of_type(semantic_type);
        if count > 0 {
            println!("  {:<12} {}", semantic_type.as_str(), count);
        }
    }
    println!();

    println!("Data Quality:");
    println!("  Completeness: {:.1}%", quality.completeness * 100.0);
    println!("  Missing cells: {}", quality.total_missing);
    println!("  Duplicate rows: {}", quality.duplicate_rows);
    println!();

    if !artifacts.numeric_stats.is_empty() {
        println!(
            "{:<20} {:>12} {:>12} {:>12} {:>9}",
            "Column", "Mean", "Median", "Std", "Outliers"
        );
        println!("{}", "-".repeat(70));
        for stats in &artifacts.numeric_stats {
            println!(
                "{:<20} {:>12} {:>12} {:>12} {:>9}",
                truncate_str(&stats.column, 19),
                lex_report::utils::format_number(stats.mean),
                lex_report::utils::format_number(stats.median),
                lex_report::utils::format_number(stats.std),
                stats.outlier_count
            );
        }
        println!();
    }

    if !report.insights.is_empty() {
        println!("Key Insights:");
        for insight in &report.insights {
            println!("  [{}] {}", insight.severity.label(), insight.text);
        }
        println!();
    }

    if !report.warnings.is_empty() {
        println!("Warnings:");
        for warning in &report.warnings {
            println!("  ! {}", warning);
        }
        println!();
    }

    println!(
        "Sections: {}",
        report
            .document
            .sections
            .iter()
            .map(|s| s.title.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!();
    println!("Use --json for machine-readable output");
    println!("Use --emit-report to save the full JSON report");
    println!("{}", "=".repeat(80));
}
