//! CSV and spreadsheet loading into the [`Dataset`] model.
//!
//! Polars parses CSV and calamine reads workbooks; the analysis core only
//! ever sees [`CellValue`]s. Columns polars typed as numeric or temporal
//! carry a type hint so an all-null column still classifies sensibly.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use calamine::{Data, Reader, open_workbook_auto};
use chrono::DateTime;
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use tracing::{debug, info};

use crate::error::{ReportError, Result, ResultExt};
use crate::types::{CellValue, Column as DataColumn, Dataset, SemanticType};
use crate::utils::{is_datetime_dtype, is_numeric_dtype};

/// Load a dataset from a file, dispatching on its extension.
///
/// # Errors
///
/// Returns [`ReportError::UnsupportedFormat`] for anything but `.csv`,
/// `.xlsx`, `.xlsm`, `.xls` or `.ods`, and I/O, polars or spreadsheet errors
/// when the file cannot be read.
pub fn load_dataset(path: impl AsRef<Path>) -> Result<Dataset> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("csv") => {
            info!("Loading dataset from: {}", path.display());
            let df = load_csv_with_fallbacks(path)?;
            info!("Dataset loaded successfully: {:?}", df.shape());
            dataset_from_dataframe(&df)
        }
        Some("xlsx" | "xlsm" | "xls" | "ods") => {
            info!("Loading workbook from: {}", path.display());
            load_spreadsheet(path)
        }
        _ => Err(ReportError::UnsupportedFormat(path.display().to_string())),
    }
}

/// Load a CSV with progressively more lenient strategies.
pub fn load_csv_with_fallbacks(path: &Path) -> Result<DataFrame> {
    // Strategy 1: standard loading with quote handling
    match CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))
        .and_then(|reader| reader.finish())
    {
        Ok(df) => return Ok(df),
        Err(e) => debug!("Standard loading failed: {}", e),
    }

    // Strategy 2: pre-clean content
    let content = std::fs::read_to_string(path)
        .map_err(|e| ReportError::from(e).with_context(format!("Reading {}", path.display())))?;
    let cleaned = clean_csv_content(&content);

    CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .into_reader_with_file_handle(Cursor::new(cleaned))
        .finish()
        .context(format!("Parsing {}", path.display()))
}

/// Collapse doubled quotes and drop blank lines.
pub fn clean_csv_content(content: &str) -> String {
    content
        .replace("\"\"\"", "\"")
        .replace("\"\"", "\"")
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Read the first worksheet of a workbook. The first row holds the headers.
pub fn load_spreadsheet(path: &Path) -> Result<Dataset> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| ReportError::from(e).with_context(format!("Opening {}", path.display())))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(calamine::Error::Msg("workbook has no worksheets"))??;
    let (rows, cols) = range.get_size();
    info!("Worksheet loaded successfully: ({}, {})", rows.saturating_sub(1), cols);

    dataset_from_sheet_rows(range.rows())
}

/// Build a [`Dataset`] from worksheet rows, the first being the header row.
///
/// Blank headers become `column_<n>` (1-based). Short rows are padded with
/// nulls.
pub fn dataset_from_sheet_rows<'a>(mut rows: impl Iterator<Item = &'a [Data]>) -> Result<Dataset> {
    let Some(header) = rows.next() else {
        return Dataset::new(Vec::new());
    };

    let names: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, cell)| match cell.to_string().trim() {
            "" => format!("column_{}", i + 1),
            name => name.to_string(),
        })
        .collect();

    let mut cells: Vec<Vec<CellValue>> = vec![Vec::new(); names.len()];
    for row in rows {
        for (i, column) in cells.iter_mut().enumerate() {
            column.push(row.get(i).map_or(CellValue::Null, cell_from_sheet));
        }
    }

    let columns = names
        .into_iter()
        .zip(cells)
        .map(|(name, cells)| DataColumn::new(name, cells))
        .collect();
    Dataset::new(columns)
}

fn cell_from_sheet(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::number(*f),
        Data::String(s) => CellValue::text(s.as_str()),
        Data::Bool(b) => CellValue::text(if *b { "true" } else { "false" }),
        Data::DateTime(dt) => dt.as_datetime().map_or(CellValue::Null, CellValue::Date),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::text(s.as_str()),
        Data::Error(_) | Data::Empty => CellValue::Null,
    }
}

/// Convert a polars DataFrame into a [`Dataset`].
pub fn dataset_from_dataframe(df: &DataFrame) -> Result<Dataset> {
    let columns = df
        .get_columns()
        .iter()
        .map(convert_column)
        .collect::<Result<Vec<_>>>()?;
    Dataset::new(columns)
}

fn convert_column(col: &Column) -> Result<DataColumn> {
    let name = col.name().to_string();
    let series = col.as_materialized_series();
    let dtype = series.dtype();

    let converted = if is_numeric_dtype(dtype) {
        let floats = series.cast(&DataType::Float64).context(format!("Casting '{}'", name))?;
        let cells: Vec<CellValue> = floats.f64()?.into_iter().map(CellValue::from).collect();
        DataColumn::new(name, cells).with_type_hint(SemanticType::Numeric)
    } else if is_datetime_dtype(dtype) {
        let millis = series
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
            .and_then(|s| s.cast(&DataType::Int64))
            .context(format!("Casting '{}'", name))?;
        let cells: Vec<CellValue> = millis
            .i64()?
            .into_iter()
            .map(|ms| {
                ms.and_then(DateTime::from_timestamp_millis)
                    .map(|dt| CellValue::Date(dt.naive_utc()))
                    .unwrap_or(CellValue::Null)
            })
            .collect();
        DataColumn::new(name, cells).with_type_hint(SemanticType::Datetime)
    } else if matches!(dtype, DataType::Boolean) {
        let cells: Vec<CellValue> = series
            .bool()?
            .into_iter()
            .map(|b| b.map(|b| if b { "true" } else { "false" }).into())
            .collect();
        DataColumn::new(name, cells)
    } else {
        let strings = series.cast(&DataType::String).context(format!("Casting '{}'", name))?;
        let cells: Vec<CellValue> = strings.str()?.into_iter().map(CellValue::from).collect();
        DataColumn::new(name, cells)
    };

    debug!(
        "Converted column '{}' ({}, {} nulls)",
        converted.name,
        dtype,
        converted.null_count()
    );
    Ok(converted)
}
