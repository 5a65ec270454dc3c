//! CSV serialization of result tables.
//!
//! Every result type implements [`ToTable`], which renders it as a
//! [`ResultTable`]: a header row plus rows of already-formatted cells.
//! [`write_csv`] writes that table without any synthetic index column.
//!
//! Floats are written in shortest round-trip form and NaN is written as an
//! empty cell, so a table read back with [`read_csv`] parses to the same
//! values.
//!
//! ```
//! use survey_stats::output::{format_float, ResultTable};
//!
//! let mut table = ResultTable::new(vec!["Column".into(), "p-value".into()]);
//! table.push_row(vec!["tempo".into(), format_float(0.25)]).unwrap();
//! assert_eq!(table.to_csv_string(b','), "Column,p-value\ntempo,0.25\n");
//! ```

use crate::csv_parser::{CsvParser, RawTable};
use crate::error::{Result, SurveyError};
use std::fs;
use std::path::Path;
use tracing::info;

/// A rendered table ready to be written.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ResultTable {
    /// Creates an empty table with the given header.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Appends a row; its width must match the header.
    pub fn push_row(&mut self, row: Vec<String>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(SurveyError::DimensionMismatch {
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Returns the header.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the rows.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Returns the number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Row storage for renderers that build rows of the header's width.
    pub(crate) fn rows_mut(&mut self) -> &mut Vec<Vec<String>> {
        &mut self.rows
    }

    /// Returns the cell at (`row`, `column`) parsed as a float.
    ///
    /// Empty cells read as NaN.
    pub fn float_at(&self, row: usize, column: &str) -> Option<f64> {
        let col = self.columns.iter().position(|c| c == column)?;
        let cell = self.rows.get(row)?.get(col)?;
        if cell.is_empty() {
            Some(f64::NAN)
        } else {
            cell.parse().ok()
        }
    }

    /// Renders the table as CSV text.
    pub fn to_csv_string(&self, delimiter: u8) -> String {
        let mut out = String::new();
        push_line(&mut out, &self.columns, delimiter);
        for row in &self.rows {
            push_line(&mut out, row, delimiter);
        }
        out
    }
}

impl From<RawTable> for ResultTable {
    fn from(table: RawTable) -> Self {
        let (columns, rows) = table.into_parts();
        Self { columns, rows }
    }
}

/// Anything that can be rendered as a [`ResultTable`].
pub trait ToTable {
    /// Renders `self` as a header plus formatted rows.
    fn to_table(&self) -> ResultTable;
}

impl ToTable for ResultTable {
    fn to_table(&self) -> ResultTable {
        self.clone()
    }
}

/// Formats a float for CSV output: shortest round-trip form, NaN as empty.
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        format!("{value:?}")
    }
}

/// Writes `table` to `path`, creating or truncating the file.
///
/// The parent directory must already exist.
pub fn write_csv(table: &ResultTable, path: &Path) -> Result<()> {
    fs::write(path, table.to_csv_string(b',')).map_err(|e| SurveyError::io(path, e))?;
    info!(
        path = %path.display(),
        rows = table.row_count(),
        "wrote result table"
    );
    Ok(())
}

/// Renders any [`ToTable`] result and writes it to `path`.
pub fn write_result<T: ToTable + ?Sized>(result: &T, path: &Path) -> Result<()> {
    write_csv(&result.to_table(), path)
}

/// Reads a CSV file written by [`write_csv`] back into a table.
pub fn read_csv(path: &Path) -> Result<ResultTable> {
    CsvParser::new().read_records(path).map(ResultTable::from)
}

// ── Helpers ───────────────────────────────────────────────────────────

fn push_line(out: &mut String, cells: &[String], delimiter: u8) {
    let delim = delimiter as char;
    // A bare empty line would read back as a blank line.
    if let [only] = cells {
        if only.is_empty() {
            out.push_str("\"\"\n");
            return;
        }
    }
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            out.push(delim);
        }
        push_cell(out, cell, delim);
    }
    out.push('\n');
}

/// Quotes cells containing the delimiter, a quote, or a line break.
fn push_cell(out: &mut String, cell: &str, delim: char) {
    let needs_quotes = cell
        .chars()
        .any(|c| c == delim || c == '"' || c == '\n' || c == '\r');
    if needs_quotes {
        out.push('"');
        out.push_str(&cell.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(cell);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────
