//! Shared utilities for the analysis pipeline.
//!
//! This module contains the lenient value parsers used by classification and
//! statistics, the fixed display formatting used by the report, and dtype
//! helpers used by the CSV loader.

use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use polars::prelude::DataType;
use regex::Regex;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is a date or datetime type.
#[inline]
pub fn is_datetime_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Datetime(_, _) | DataType::Date)
}

// =============================================================================
// String Parsing Utilities
// =============================================================================

/// Characters commonly used in numeric formatting that should be stripped.
pub const NUMERIC_FORMAT_CHARS: [char; 7] = [',', '$', '%', '€', '£', '¥', ' '];

/// Clean a string for numeric parsing by removing formatting characters.
///
/// # Example
///
/// ```rust,ignore
/// use lex_report::utils::clean_numeric_string;
///
/// assert_eq!(clean_numeric_string("$1,234.56"), "1234.56");
/// assert_eq!(clean_numeric_string("  42%  "), "42");
/// ```
pub fn clean_numeric_string(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| !NUMERIC_FORMAT_CHARS.contains(c))
        .collect()
}

/// Try to parse a string as a finite numeric value.
///
/// Handles common formatting like currency symbols, percentages, and thousands separators.
pub fn parse_numeric_string(s: &str) -> Option<f64> {
    let cleaned = clean_numeric_string(s);
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Accepted date layouts: a shape check followed by the chrono format that
/// validates the actual calendar value.
static DATE_PATTERNS: Lazy<Vec<(Regex, &'static str, bool)>> = Lazy::new(|| {
    [
        (r"^\d{4}-\d{2}-\d{2}$", "%Y-%m-%d", false),
        (r"^\d{4}/\d{2}/\d{2}$", "%Y/%m/%d", false),
        (r"^\d{2}/\d{2}/\d{4}$", "%m/%d/%Y", false),
        (r"^\d{2}-\d{2}-\d{4}$", "%d-%m-%Y", false),
        (r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}$", "%Y-%m-%d %H:%M:%S", true),
        (r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}$", "%Y-%m-%dT%H:%M:%S", true),
    ]
    .into_iter()
    .filter_map(|(pattern, format, has_time)| {
        Regex::new(pattern).ok().map(|re| (re, format, has_time))
    })
    .collect()
});

/// Try to parse a string as a date in one of the accepted layouts.
///
/// # Example
///
/// ```rust,ignore
/// use lex_report::utils::parse_date_string;
///
/// assert!(parse_date_string("2024-03-01").is_some());
/// assert!(parse_date_string("03/01/2024").is_some());
/// assert!(parse_date_string("2024-13-01").is_none());
/// ```
pub fn parse_date_string(s: &str) -> Option<NaiveDateTime> {
    let trimmed = s.trim();
    DATE_PATTERNS
        .iter()
        .filter(|(re, _, _)| re.is_match(trimmed))
        .find_map(|(_, format, has_time)| {
            if *has_time {
                NaiveDateTime::parse_from_str(trimmed, format).ok()
            } else {
                NaiveDate::parse_from_str(trimmed, format)
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            }
        })
}

// =============================================================================
// Display Formatting
// =============================================================================

/// Placeholder for values that are missing or undefined.
pub const NOT_AVAILABLE: &str = "N/A";

/// Two-decimal rendering; `None` renders as `N/A`.
pub fn format_number(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Percentage rendering of a 0-1 ratio.
pub fn format_ratio_percent(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

/// Date rendering; the time part is omitted at midnight.
pub fn format_date(value: &NaiveDateTime) -> String {
    if value.time() == chrono::NaiveTime::MIN {
        value.format("%Y-%m-%d").to_string()
    } else {
        value.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

// =============================================================================
// Tests
// =============================================================================
