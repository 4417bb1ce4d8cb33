//! Main analysis pipeline module.
//!
//! This module provides the core `Pipeline` struct and builder for
//! orchestrating the staged analysis: validation, normalization, optional
//! sampling, classification, quality audit, concurrent column analysis,
//! insight synthesis and report assembly.

use crate::config::{AnalysisConfig, ConfigValidationError};
use crate::error::Result;
use crate::insights::{InsightEngine, RuleBasedInsightEngine};
use crate::pipeline::progress::{
    AnalysisStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate,
};
use crate::pipeline::sampling::sample_dataset;
use crate::profiler::DataProfiler;
use crate::quality::QualityAuditor;
use crate::reporting::{AssemblyParams, ReportAssembler};
use crate::types::{AnalysisArtifacts, AnalysisReport, Dataset};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// The main analysis pipeline.
///
/// Use [`Pipeline::builder()`] to create a new pipeline with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use lex_report::{AnalysisConfig, Pipeline};
///
/// let report = Pipeline::builder()
///     .config(AnalysisConfig::builder().top_k(5).build()?)
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .analyze(&dataset)?;
///
/// println!("{}", serde_json::to_string_pretty(&report.document)?);
/// ```
pub struct Pipeline {
    config: AnalysisConfig,
    insight_engine: Arc<dyn InsightEngine>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

// Shared across threads by callers that analyze several datasets at once
static_assertions::assert_impl_all!(Pipeline: Send, Sync);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze a dataset and assemble its report.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::EmptyDataset`](crate::ReportError::EmptyDataset)
    /// when the dataset has no rows or no columns. Column-level problems
    /// never fail the run; they are collected as warnings on the report.
    pub fn analyze(&self, dataset: &Dataset) -> Result<AnalysisReport> {
        match self.analyze_internal(dataset) {
            Ok(report) => {
                self.report_progress(ProgressUpdate::complete("Analysis completed successfully"));
                Ok(report)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn analyze_internal(&self, dataset: &Dataset) -> Result<AnalysisReport> {
        let start_time = Instant::now();
        let config = &self.config;

        info!(
            rows = dataset.n_rows(),
            columns = dataset.n_cols(),
            "Starting analysis pipeline..."
        );
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Initializing,
            0.0,
            "Validating dataset...",
        ));

        QualityAuditor::ensure_not_empty(dataset)?;
        let normalized = dataset.normalized(config);

        // Stage: sampling
        let sampled = sample_dataset(&normalized, config.sampling_threshold, config.sampling_seed);
        let (data, sampling) = match sampled {
            Some((subset, info)) => {
                info!(
                    "Sampled {} of {} rows (seed {})",
                    info.sampled_rows, info.original_rows, info.seed
                );
                self.report_progress(ProgressUpdate::new(
                    AnalysisStage::Sampling,
                    1.0,
                    format!("Sampled {} of {} rows", info.sampled_rows, info.original_rows),
                ));
                (subset, Some(info))
            }
            None => (normalized, None),
        };

        // Stage: classification
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Classification,
            0.0,
            "Classifying columns...",
        ));
        let (classifications, mut warnings) = DataProfiler::classify_dataset(&data, config);
        for warning in &warnings {
            warn!("{}", warning);
        }

        // Stage: quality audit
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::QualityAudit,
            0.0,
            "Auditing data quality...",
        ));
        let quality = QualityAuditor::audit(&data, &classifications)?;
        info!(
            "Completeness {:.4}, {} duplicate rows",
            quality.completeness, quality.duplicate_rows
        );

        // Stage: column analysis
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Analysis,
            0.0,
            "Computing statistics, outliers, frequencies and correlations...",
        ));
        let analysis = DataProfiler::analyze_columns(&data, &classifications, config);
        for warning in &analysis.warnings {
            warn!("{}", warning);
        }
        warnings.extend(analysis.warnings);

        let artifacts = AnalysisArtifacts {
            classifications,
            quality,
            numeric_stats: analysis.numeric_stats,
            outliers: analysis.outliers,
            categorical_profiles: analysis.categorical_profiles,
            correlation: analysis.correlation,
        };

        // Stage: insights
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::InsightSynthesis,
            0.0,
            "Synthesizing insights...",
        ));
        let insights = self.insight_engine.synthesize(&artifacts);
        debug!("Kept {} insights", insights.len());

        // Stage: report assembly
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::ReportAssembly,
            0.0,
            "Assembling report...",
        ));
        let document = ReportAssembler::assemble(AssemblyParams {
            artifacts: &artifacts,
            insights: &insights,
            sampling: sampling.as_ref(),
            config,
        });

        let duration_ms = start_time.elapsed().as_millis() as u64;
        info!(
            "Analysis finished in {}ms: {} sections, {} insights, {} warnings",
            duration_ms,
            document.sections.len(),
            insights.len(),
            warnings.len()
        );

        Ok(AnalysisReport {
            document,
            artifacts,
            insights,
            warnings,
            sampling,
            generated_at: Utc::now(),
            duration_ms,
        })
    }
}

/// Builder for creating a [`Pipeline`] with custom configuration.
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<AnalysisConfig>,
    insight_engine: Option<Arc<dyn InsightEngine>>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

impl PipelineBuilder {
    /// Set the analysis configuration.
    pub fn config(mut self, config: AnalysisConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Replace the default rule-based insight engine.
    pub fn insight_engine(mut self, engine: Arc<dyn InsightEngine>) -> Self {
        self.insight_engine = Some(engine);
        self
    }

    /// Set a progress reporter for receiving updates during analysis.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// This is a convenience method for simple progress handling.
    /// For more complex scenarios, use [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Pipeline, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let insight_engine = self
            .insight_engine
            .unwrap_or_else(|| Arc::new(RuleBasedInsightEngine::new(config.clone())));

        Ok(Pipeline {
            config,
            insight_engine,
            progress_reporter: self.progress_reporter,
        })
    }
}
