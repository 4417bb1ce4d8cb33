//! Writing finished reports to disk.

use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;

use tracing::info;

use crate::error::{ReportError, Result};
use crate::types::AnalysisReport;

/// Writes reports as pretty-printed JSON into an output directory.
pub struct ReportGenerator {
    output_dir: PathBuf,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./outputs"),
        }
    }
}

impl ReportGenerator {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    pub fn output_dir(&self) -> &PathBuf {
        &self.output_dir
    }

    /// Write a report to a JSON file.
    ///
    /// For example, if `report_base_name` is "sales", the file will be
    /// "sales_report.json" inside the output directory.
    pub fn write_report_to_file(
        &self,
        report: &AnalysisReport,
        report_base_name: &str,
    ) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir).map_err(|e| {
            ReportError::from(e).with_context(format!("Creating {}", self.output_dir.display()))
        })?;

        let report_path = self
            .output_dir
            .join(format!("{}_report.json", report_base_name));
        let mut file = File::create(&report_path)?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;

        info!("Report saved: {}", report_path.display());

        Ok(report_path)
    }
}
