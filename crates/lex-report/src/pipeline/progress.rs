//! Progress reporting for the analysis pipeline.
//!
//! The pipeline emits a [`ProgressUpdate`] at every stage boundary. Callers
//! plug in a [`ProgressReporter`] (or a closure) to forward those updates to
//! a terminal, a log or a UI running on another thread.
//!
//! # Example
//!
//! ```rust,ignore
//! use lex_report::Pipeline;
//!
//! let report = Pipeline::builder()
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .analyze(&dataset)?;
//! ```

use serde::{Deserialize, Serialize};

/// Stages of the analysis pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStage {
    /// Validating the dataset and normalizing missing markers
    Initializing,
    /// Drawing a row sample from a large dataset
    Sampling,
    /// Inferring semantic column types
    Classification,
    /// Counting missing cells and duplicate rows
    QualityAudit,
    /// Statistics, outliers, categorical profiles and correlations
    Analysis,
    /// Evaluating insight rules
    InsightSynthesis,
    /// Building the report document
    ReportAssembly,
    /// Pipeline completed successfully
    Complete,
    /// Pipeline failed with an error
    Failed,
}

impl AnalysisStage {
    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Initializing => "Initializing",
            Self::Sampling => "Sampling Rows",
            Self::Classification => "Classifying Columns",
            Self::QualityAudit => "Auditing Quality",
            Self::Analysis => "Analyzing Columns",
            Self::InsightSynthesis => "Synthesizing Insights",
            Self::ReportAssembly => "Assembling Report",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Returns the typical weight of this stage in the overall pipeline (0.0 - 1.0).
    ///
    /// Weights of the working stages sum to ~1.0; terminal states weigh nothing.
    pub fn weight(&self) -> f32 {
        match self {
            Self::Initializing => 0.05,
            Self::Sampling => 0.05,
            Self::Classification => 0.15,
            Self::QualityAudit => 0.15,
            Self::Analysis => 0.40,
            Self::InsightSynthesis => 0.05,
            Self::ReportAssembly => 0.15,
            Self::Complete => 0.0,
            Self::Failed => 0.0,
        }
    }

    /// Returns the cumulative progress at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Initializing => 0.0,
            Self::Sampling => 0.05,
            Self::Classification => 0.10,
            Self::QualityAudit => 0.25,
            Self::Analysis => 0.40,
            Self::InsightSynthesis => 0.80,
            Self::ReportAssembly => 0.85,
            Self::Complete => 1.0,
            Self::Failed => 0.0,
        }
    }
}

/// Progress update emitted at a stage boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Current pipeline stage
    pub stage: AnalysisStage,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    /// Progress within current stage (0.0 - 1.0)
    pub stage_progress: f32,

    /// Human-readable message describing current activity
    pub message: String,
}

impl ProgressUpdate {
    /// Creates a new progress update for a stage.
    pub fn new(stage: AnalysisStage, stage_progress: f32, message: impl Into<String>) -> Self {
        let progress = stage.base_progress() + (stage.weight() * stage_progress);
        Self {
            stage,
            progress: progress.clamp(0.0, 1.0),
            stage_progress: stage_progress.clamp(0.0, 1.0),
            message: message.into(),
        }
    }

    /// Creates a completion progress update.
    pub fn complete(message: impl Into<String>) -> Self {
        Self {
            stage: AnalysisStage::Complete,
            progress: 1.0,
            stage_progress: 1.0,
            message: message.into(),
        }
    }

    /// Creates a failed progress update.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            stage: AnalysisStage::Failed,
            progress: 0.0,
            stage_progress: 0.0,
            message: message.into(),
        }
    }
}

/// Trait for receiving progress updates during analysis.
///
/// Implementations must be `Send + Sync`: the analysis stages run on the
/// rayon pool and the pipeline itself may live on a background thread.
///
/// # Example
///
/// ```rust,ignore
/// use lex_report::{ProgressReporter, ProgressUpdate};
///
/// struct LogReporter;
///
/// impl ProgressReporter for LogReporter {
///     fn report(&self, update: ProgressUpdate) {
///         tracing::info!(stage = ?update.stage, "{}", update.message);
///     }
/// }
/// ```
pub trait ProgressReporter: Send + Sync {
    /// Called once per stage boundary. Implementations should not block.
    fn report(&self, update: ProgressUpdate);
}

/// Wrapper that implements [`ProgressReporter`] using a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    /// Creates a new closure-based progress reporter.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_progress_update_new() {
        let update = ProgressUpdate::new(AnalysisStage::Analysis, 0.5, "Analyzing...");
        assert_eq!(update.stage, AnalysisStage::Analysis);
        assert_eq!(update.stage_progress, 0.5);
        assert!((update.progress - 0.60).abs() < 1e-6);
        assert_eq!(update.message, "Analyzing...");
    }

    #[test]
    fn test_progress_update_complete_and_failed() {
        let update = ProgressUpdate::complete("Done!");
        assert_eq!(update.stage, AnalysisStage::Complete);
        assert_eq!(update.progress, 1.0);

        let update = ProgressUpdate::failed("Dataset is empty");
        assert_eq!(update.stage, AnalysisStage::Failed);
        assert_eq!(update.progress, 0.0);
    }

    #[test]
    fn test_closure_progress_reporter() {
        let call_count = Arc::new(AtomicUsize::new(0));
        let call_count_clone = call_count.clone();

        let reporter = ClosureProgressReporter::new(move |_update| {
            call_count_clone.fetch_add(1, Ordering::SeqCst);
        });

        reporter.report(ProgressUpdate::new(AnalysisStage::Classification, 0.0, "Test"));
        reporter.report(ProgressUpdate::complete("Done"));

        assert_eq!(call_count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_analysis_stage_weights_sum() {
        let stages = [
            AnalysisStage::Initializing,
            AnalysisStage::Sampling,
            AnalysisStage::Classification,
            AnalysisStage::QualityAudit,
            AnalysisStage::Analysis,
            AnalysisStage::InsightSynthesis,
            AnalysisStage::ReportAssembly,
        ];

        let total_weight: f32 = stages.iter().map(|s| s.weight()).sum();
        assert!((total_weight - 1.0).abs() < 0.01, "Weights should sum to ~1.0");

        // Each stage starts where the previous one ends
        for pair in stages.windows(2) {
            let end = pair[0].base_progress() + pair[0].weight();
            assert!((end - pair[1].base_progress()).abs() < 1e-6);
        }
    }

    #[test]
    fn test_analysis_stage_json_values() {
        let stage_expectations = [
            (AnalysisStage::Initializing, "\"initializing\""),
            (AnalysisStage::Sampling, "\"sampling\""),
            (AnalysisStage::Classification, "\"classification\""),
            (AnalysisStage::QualityAudit, "\"quality_audit\""),
            (AnalysisStage::Analysis, "\"analysis\""),
            (AnalysisStage::InsightSynthesis, "\"insight_synthesis\""),
            (AnalysisStage::ReportAssembly, "\"report_assembly\""),
            (AnalysisStage::Complete, "\"complete\""),
            (AnalysisStage::Failed, "\"failed\""),
        ];

        for (stage, expected_json) in stage_expectations {
            let json = serde_json::to_string(&stage).expect("Should serialize");
            assert_eq!(json, expected_json, "AnalysisStage::{:?} should serialize to {}", stage, expected_json);
        }
    }

    #[test]
    fn test_progress_reporter_across_threads() {
        let call_count = Arc::new(AtomicUsize::new(0));
        let call_count_clone = call_count.clone();

        let reporter = Arc::new(ClosureProgressReporter::new(move |_update| {
            call_count_clone.fetch_add(1, Ordering::SeqCst);
        }));

        let reporter_clone = reporter.clone();
        let handle = std::thread::spawn(move || {
            reporter_clone.report(ProgressUpdate::new(
                AnalysisStage::Analysis,
                0.5,
                "Test from background thread",
            ));
        });

        handle.join().expect("Thread should not panic");
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }
}
