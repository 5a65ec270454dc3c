//! Error types for survey-stats.

use std::path::Path;
use thiserror::Error;

/// All errors produced by survey-stats operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SurveyError {
    /// CSV parsing failed.
    #[error("CSV parse error at line {line}: {message}")]
    CsvParse { line: usize, message: String },
    /// Column not found in a table or dataset.
    #[error("column '{name}' not found")]
    ColumnNotFound { name: String },
    /// Column is not numeric where numeric data is required.
    #[error("column '{column}' is not numeric")]
    NonNumericColumn { column: String },
    /// Insufficient data for the requested operation.
    #[error("need at least {min_required} values, got {actual}")]
    InsufficientData { min_required: usize, actual: usize },
    /// A row or column has the wrong number of elements.
    #[error("expected {expected} elements, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    /// I/O error while reading or writing a file.
    #[error("I/O error: {0}")]
    Io(String),
    /// Configuration could not be parsed or is inconsistent.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl SurveyError {
    /// Wraps an I/O error with the path it occurred on.
    pub fn io(path: &Path, err: std::io::Error) -> Self {
        Self::Io(format!("{}: {err}", path.display()))
    }
}

impl From<std::io::Error> for SurveyError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, SurveyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = SurveyError::ColumnNotFound {
            name: "Nome".into(),
        };
        assert_eq!(err.to_string(), "column 'Nome' not found");

        let err = SurveyError::CsvParse {
            line: 3,
            message: "expected 2 fields, got 1".into(),
        };
        assert_eq!(
            err.to_string(),
            "CSV parse error at line 3: expected 2 fields, got 1"
        );

        let err = SurveyError::InsufficientData {
            min_required: 1,
            actual: 0,
        };
        assert_eq!(err.to_string(), "need at least 1 values, got 0");
    }

    #[test]
    fn io_error_carries_path() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = SurveyError::io(Path::new("data/missing.csv"), io);
        assert_eq!(err.to_string(), "I/O error: data/missing.csv: no such file");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}
        assert_send::<SurveyError>();
        assert_sync::<SurveyError>();
    }
}
