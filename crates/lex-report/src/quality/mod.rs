//! Data quality auditing.
//!
//! This module measures missingness, duplicate rows and dataset-wide
//! completeness. It is also where the single fatal input precondition
//! (an empty dataset) is enforced.

mod auditor;

pub use auditor::QualityAuditor;
