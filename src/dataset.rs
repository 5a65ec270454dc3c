//! Numeric survey datasets.
//!
//! A [`Dataset`] is a [`DataFrame`] whose identifier column (the
//! respondent's name) has been removed and whose remaining columns are all
//! numeric. Missing cells are allowed and are skipped by every statistic.
//!
//! ```
//! use survey_stats::dataset::Dataset;
//!
//! let csv = "Nome,tempo,erros\nAna,12.5,1\nBia,10.0,0\nCaio,14.2,3\n";
//! let ds = Dataset::parse(csv, "Nome").unwrap();
//! assert_eq!(ds.column_names(), &["tempo", "erros"]);
//! assert_eq!(ds.values("erros").unwrap(), vec![1.0, 0.0, 3.0]);
//! ```

use crate::csv_parser::CsvParser;
use crate::dataframe::{Column, DataFrame, DataType};
use crate::error::{Result, SurveyError};
use std::path::Path;
use tracing::debug;

/// Ordered collection of named numeric columns with equal row count.
#[derive(Debug, Clone)]
pub struct Dataset {
    frame: DataFrame,
}

impl Dataset {
    /// Wraps a frame, checking that every column is numeric.
    pub fn from_frame(frame: DataFrame) -> Result<Self> {
        if let Some((name, _)) = frame
            .schema()
            .into_iter()
            .find(|(_, dtype)| *dtype != DataType::Numeric)
        {
            return Err(SurveyError::NonNumericColumn {
                column: name.to_string(),
            });
        }
        Ok(Self { frame })
    }

    /// Parses CSV text and drops the `identifier` column.
    pub fn parse(input: &str, identifier: &str) -> Result<Self> {
        let frame = CsvParser::new().parse_str(input)?;
        Self::without_identifier(frame, identifier)
    }

    fn without_identifier(mut frame: DataFrame, identifier: &str) -> Result<Self> {
        frame.drop_column(identifier)?;
        Self::from_frame(frame)
    }

    /// Returns column names in file order.
    pub fn column_names(&self) -> &[String] {
        self.frame.column_names()
    }

    /// Returns the number of columns.
    pub fn column_count(&self) -> usize {
        self.frame.column_count()
    }

    /// Returns the number of rows (missing cells included).
    pub fn row_count(&self) -> usize {
        self.frame.row_count()
    }

    /// Returns the column called `name`.
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.frame
            .column_by_name(name)
            .ok_or_else(|| SurveyError::ColumnNotFound {
                name: name.to_string(),
            })
    }

    /// Returns the present values of column `name`.
    pub fn values(&self, name: &str) -> Result<Vec<f64>> {
        let column = self.column(name)?;
        column
            .valid_numeric_values()
            .ok_or_else(|| SurveyError::NonNumericColumn {
                column: name.to_string(),
            })
    }

    /// Returns an iterator over (name, column) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.frame.iter()
    }
}

/// Reads the CSV file at `path` with `parser` and drops the `identifier`
/// column.
///
/// # Errors
///
/// - [`SurveyError::Io`] if the file is missing or unreadable
/// - [`SurveyError::CsvParse`] if a row has the wrong number of fields
/// - [`SurveyError::ColumnNotFound`] if there is no `identifier` header
/// - [`SurveyError::NonNumericColumn`] if another column holds text
pub fn load_dataset(parser: &CsvParser, path: &Path, identifier: &str) -> Result<Dataset> {
    let frame = parser.parse_file(path)?;
    let dataset = Dataset::without_identifier(frame, identifier)?;
    debug!(
        path = %path.display(),
        rows = dataset.row_count(),
        columns = dataset.column_count(),
        "loaded dataset"
    );
    Ok(dataset)
}
