//! Insight synthesis over analysis artifacts.
//!
//! An insight is a short, ranked finding derived from the artifacts of the
//! earlier stages. Engines are pure: the same artifacts always yield the
//! same insights in the same order.

mod rule_engine;

pub use rule_engine::{RULES, RuleBasedInsightEngine, rank_insights};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::AnalysisArtifacts;

/// Trait for insight engines.
pub trait InsightEngine: Send + Sync {
    /// Produce ranked, deduplicated insights from the artifacts.
    fn synthesize(&self, artifacts: &AnalysisArtifacts) -> Vec<Insight>;
}

/// What an insight is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightCategory {
    Quality,
    Distribution,
    Correlation,
    Outlier,
    Summary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
        }
    }
}

/// Insight rules, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightRule {
    DatasetOverview,
    LowCompleteness,
    DuplicateRows,
    SparseColumn,
    UnresolvedColumn,
    OutlierRate,
    StrongCorrelation,
    DominantCategory,
    NearIdentifier,
    ConstantColumn,
    HighVariability,
}

impl InsightRule {
    pub fn category(&self) -> InsightCategory {
        match self {
            Self::DatasetOverview => InsightCategory::Summary,
            Self::LowCompleteness
            | Self::DuplicateRows
            | Self::SparseColumn
            | Self::UnresolvedColumn => InsightCategory::Quality,
            Self::OutlierRate => InsightCategory::Outlier,
            Self::StrongCorrelation => InsightCategory::Correlation,
            Self::DominantCategory
            | Self::NearIdentifier
            | Self::ConstantColumn
            | Self::HighVariability => InsightCategory::Distribution,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::LowCompleteness | Self::DuplicateRows | Self::SparseColumn | Self::OutlierRate => {
                Severity::Warning
            }
            _ => Severity::Info,
        }
    }
}

/// A single finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub rule: InsightRule,
    pub category: InsightCategory,
    pub severity: Severity,
    pub text: String,
    /// Columns the finding concerns; empty for dataset-wide findings.
    pub columns: Vec<String>,
    /// Values the text was derived from.
    pub values: BTreeMap<String, serde_json::Value>,
}

impl Insight {
    pub fn new(rule: InsightRule, text: impl Into<String>) -> Self {
        Self {
            rule,
            category: rule.category(),
            severity: rule.severity(),
            text: text.into(),
            columns: Vec::new(),
            values: BTreeMap::new(),
        }
    }

    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_value(mut self, key: &str, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or(serde_json::Value::Null);
        self.values.insert(key.to_string(), value);
        self
    }
}
