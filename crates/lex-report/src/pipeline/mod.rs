//! Pipeline module.
//!
//! This module provides the main analysis pipeline and related components.

mod builder;
pub mod progress;
pub mod sampling;

pub use builder::{Pipeline, PipelineBuilder};
pub use progress::{AnalysisStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate};
pub use sampling::{sample_dataset, sample_indices};
