//! Report assembly and output.
//!
//! [`ReportAssembler`] turns analysis artifacts into a render-agnostic
//! [`ReportDocument`]: an ordered tree of sections holding narrative text,
//! tables and chart specifications. [`ReportGenerator`] persists a finished
//! [`AnalysisReport`](crate::AnalysisReport) as JSON.
//!
//! # Example
//!
//! ```rust,ignore
//! use lex_report::reporting::ReportGenerator;
//!
//! let report = pipeline.analyze(&dataset)?;
//! println!("{}", serde_json::to_string_pretty(&report.document)?);
//!
//! let generator = ReportGenerator::new(PathBuf::from("outputs"));
//! generator.write_report_to_file(&report, "sales")?;
//! ```

mod assembler;
mod document;
mod generator;

pub use assembler::{
    AssemblyParams, CATEGORICAL_ANALYSIS, CORRELATION_ANALYSIS, DATA_QUALITY, INSIGHTS,
    NUMERICAL_ANALYSIS, OVERVIEW, ReportAssembler, SECTION_ORDER,
};
pub use document::{Block, ChartKind, ChartSpec, DataRef, ReportDocument, Section, Table};
pub use generator::ReportGenerator;
