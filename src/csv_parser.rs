//! CSV reader with numeric type inference.
//!
//! Reads delimited text either as raw string records ([`RawTable`]) or as a
//! typed [`DataFrame`](crate::dataframe::DataFrame) where every column whose
//! present cells all parse as numbers becomes [`DataType::Numeric`].
//!
//! # Features
//!
//! - RFC 4180 quoting (quoted fields, escaped quotes, delimiters and newlines in fields)
//! - Null markers recognized: empty, `NA`, `N/A`, `null`, `NULL`, `None`, `NaN`, ...
//! - Blank lines are skipped
//! - UTF-8 BOM and CRLF line endings handled
//! - Configurable delimiter and null markers
//!
//! # Example
//!
//! ```
//! use survey_stats::csv_parser::CsvParser;
//! use survey_stats::dataframe::DataType;
//!
//! let csv = "Nome,idade,nota\nAna,31,8.5\nBruno,27,NA\n";
//! let df = CsvParser::new().parse_str(csv).unwrap();
//! assert_eq!(df.row_count(), 2);
//! assert_eq!(df.column(0).unwrap().data_type(), DataType::Text);
//! assert_eq!(df.column(2).unwrap().data_type(), DataType::Numeric);
//! assert_eq!(df.column(2).unwrap().null_count(), 1);
//! ```

use crate::dataframe::{Column, DataFrame, DataType, ValidityBitmap};
use crate::error::{Result, SurveyError};
use std::path::Path;

/// Null markers recognized by default.
const DEFAULT_NULL_MARKERS: &[&str] = &[
    "", "NA", "N/A", "na", "n/a", "null", "NULL", "None", "none", "NaN", "nan", "NAN", "#N/A",
    "#NA", "<NA>",
];

/// A table of raw string cells, exactly as read.
///
/// Used where cells must be written back untouched, such as the
/// questionnaire that gets a category column appended.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Returns the header names.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Returns the data rows.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Returns the number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns the position of the header called `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Splits the table into headers and rows.
    pub fn into_parts(self) -> (Vec<String>, Vec<Vec<String>>) {
        (self.headers, self.rows)
    }
}

/// One parsed record and the line it started on.
struct Record {
    line: usize,
    fields: Vec<String>,
}

/// CSV parser configuration and entry point.
///
/// ```
/// use survey_stats::csv_parser::CsvParser;
///
/// let table = CsvParser::new().delimiter(b';').parse_records("a;b\n1;2\n").unwrap();
/// assert_eq!(table.headers(), &["a", "b"]);
/// assert_eq!(table.rows(), &[vec!["1".to_string(), "2".to_string()]]);
/// ```
#[derive(Debug, Clone)]
pub struct CsvParser {
    delimiter: u8,
    null_markers: Vec<String>,
}

impl CsvParser {
    /// Creates a parser with default settings (comma delimiter, standard null markers).
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            null_markers: DEFAULT_NULL_MARKERS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }

    /// Sets the field delimiter (default: comma).
    pub fn delimiter(mut self, delim: u8) -> Self {
        self.delimiter = delim;
        self
    }

    /// Sets the field delimiter from a character.
    ///
    /// # Errors
    ///
    /// [`SurveyError::Config`] unless `delim` is an ASCII character other
    /// than a quote or a line break.
    pub fn delimiter_char(self, delim: char) -> Result<Self> {
        if !delim.is_ascii() || matches!(delim, '"' | '\n' | '\r') {
            return Err(SurveyError::Config(format!("unsupported delimiter {delim:?}")));
        }
        Ok(self.delimiter(delim as u8))
    }

    /// Replaces the null markers.
    pub fn null_markers(mut self, markers: Vec<String>) -> Self {
        self.null_markers = markers;
        self
    }

    /// Parses CSV text into raw string records.
    ///
    /// The first record is the header. Every data row must have as many
    /// fields as the header.
    pub fn parse_records(&self, input: &str) -> Result<RawTable> {
        let input = input.strip_prefix('\u{feff}').unwrap_or(input);
        let mut records = self.parse_raw(input)?.into_iter();

        let headers = match records.next() {
            Some(header) => header.fields,
            None => return Ok(RawTable::default()),
        };

        let rows = records
            .map(|record| {
                if record.fields.len() == headers.len() {
                    Ok(record.fields)
                } else {
                    Err(SurveyError::CsvParse {
                        line: record.line,
                        message: format!(
                            "expected {} fields, got {}",
                            headers.len(),
                            record.fields.len()
                        ),
                    })
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(RawTable { headers, rows })
    }

    /// Reads a CSV file from disk as raw string records.
    pub fn read_records(&self, path: &Path) -> Result<RawTable> {
        let content = std::fs::read_to_string(path).map_err(|e| SurveyError::io(path, e))?;
        self.parse_records(&content)
    }

    /// Parses CSV text into a typed DataFrame.
    pub fn parse_str(&self, input: &str) -> Result<DataFrame> {
        let table = self.parse_records(input)?;
        let (headers, rows) = table.into_parts();

        let mut df = DataFrame::new();
        for (col_idx, name) in headers.into_iter().enumerate() {
            let raw: Vec<&str> = rows.iter().map(|row| row[col_idx].as_str()).collect();
            df.add_column(name, self.build_column(&raw))?;
        }
        Ok(df)
    }

    /// Parses a CSV file from disk into a typed DataFrame.
    pub fn parse_file(&self, path: &Path) -> Result<DataFrame> {
        let content = std::fs::read_to_string(path).map_err(|e| SurveyError::io(path, e))?;
        self.parse_str(&content)
    }

    // ── Internal parsing ─────────────────────────────────────────

    /// Splits raw text into records of string fields.
    fn parse_raw(&self, input: &str) -> Result<Vec<Record>> {
        let delim = self.delimiter as char;
        let mut records = Vec::new();
        let mut fields: Vec<String> = Vec::new();
        let mut field = String::new();
        let mut in_quotes = false;
        let mut row_quoted = false;
        let mut line = 1;
        let mut row_line = 1;
        let mut chars = input.chars().peekable();

        while let Some(c) = chars.next() {
            if in_quotes {
                match c {
                    '"' if chars.peek() == Some(&'"') => {
                        chars.next();
                        field.push('"');
                    }
                    '"' => in_quotes = false,
                    '\n' => {
                        line += 1;
                        field.push(c);
                    }
                    _ => field.push(c),
                }
                continue;
            }

            match c {
                '"' if field.is_empty() => {
                    in_quotes = true;
                    row_quoted = true;
                }
                c if c == delim => fields.push(std::mem::take(&mut field)),
                // \r\n: the \n ends the record
                '\r' if chars.peek() == Some(&'\n') => {}
                '\n' | '\r' => {
                    fields.push(std::mem::take(&mut field));
                    push_record(&mut records, &mut fields, row_quoted, row_line);
                    row_quoted = false;
                    line += 1;
                    row_line = line;
                }
                _ => field.push(c),
            }
        }

        if in_quotes {
            return Err(SurveyError::CsvParse {
                line: row_line,
                message: "unterminated quoted field".to_string(),
            });
        }

        if !field.is_empty() || !fields.is_empty() || row_quoted {
            fields.push(field);
            push_record(&mut records, &mut fields, row_quoted, row_line);
        }

        Ok(records)
    }

    /// Checks if a trimmed value is a null marker.
    fn is_null(&self, value: &str) -> bool {
        self.null_markers.iter().any(|m| m == value)
    }

    /// Infers the column type and builds a typed column.
    fn build_column(&self, raw_values: &[&str]) -> Column {
        let trimmed: Vec<&str> = raw_values.iter().map(|s| s.trim()).collect();
        let null_flags: Vec<bool> = trimmed.iter().map(|s| self.is_null(s)).collect();

        match infer_type(&trimmed, &null_flags) {
            DataType::Numeric => build_numeric_column(&trimmed, &null_flags),
            DataType::Text => build_text_column(&trimmed, &null_flags),
        }
    }
}

impl Default for CsvParser {
    fn default() -> Self {
        Self::new()
    }
}

// ── Helper functions ──────────────────────────────────────────────────

/// Appends `fields` as a record unless it is a blank line.
fn push_record(records: &mut Vec<Record>, fields: &mut Vec<String>, quoted: bool, line: usize) {
    let blank = !quoted && fields.len() == 1 && fields[0].is_empty();
    let fields = std::mem::take(fields);
    if !blank {
        records.push(Record { line, fields });
    }
}

/// Numeric when every present value parses as `f64`; an all-missing
/// column counts as numeric.
fn infer_type(values: &[&str], null_flags: &[bool]) -> DataType {
    let numeric = values
        .iter()
        .zip(null_flags)
        .filter(|(_, &is_null)| !is_null)
        .all(|(v, _)| v.parse::<f64>().is_ok());
    if numeric {
        DataType::Numeric
    } else {
        DataType::Text
    }
}

fn build_numeric_column(values: &[&str], null_flags: &[bool]) -> Column {
    let mut nums = Vec::with_capacity(values.len());
    let mut validity = ValidityBitmap::empty();

    for (val, &is_null) in values.iter().zip(null_flags) {
        match val.parse::<f64>() {
            Ok(v) if !is_null => {
                nums.push(v);
                validity.push(true);
            }
            _ => {
                nums.push(0.0);
                validity.push(false);
            }
        }
    }

    Column::numeric(nums, validity)
}

fn build_text_column(values: &[&str], null_flags: &[bool]) -> Column {
    let mut texts = Vec::with_capacity(values.len());
    let mut validity = ValidityBitmap::empty();

    for (val, &is_null) in values.iter().zip(null_flags) {
        if is_null {
            texts.push(String::new());
        } else {
            texts.push((*val).to_string());
        }
        validity.push(!is_null);
    }

    Column::text(texts, validity)
}

// ── Tests ─────────────────────────────────────────────────────────────
