//! Column-major DataFrame for survey tables.
//!
//! The [`DataFrame`] stores named columns of equal length. Each column
//! carries a [`ValidityBitmap`] so that empty cells and null markers
//! (`NA`, `NaN`, ...) are tracked separately from the values themselves.
//!
//! | Type | Storage | Use case |
//! |------|---------|----------|
//! | [`Numeric`](Column::Numeric) | `Vec<f64>` + bitmap | Measurements, scores, answers on a scale |
//! | [`Text`](Column::Text) | `Vec<String>` + bitmap | Names, free-form answers |
//!
//! # Example
//!
//! ```
//! use survey_stats::dataframe::{Column, DataFrame, ValidityBitmap};
//!
//! let mut df = DataFrame::new();
//! df.add_column(
//!     "score".to_string(),
//!     Column::numeric(vec![7.0, 8.5, 6.0], ValidityBitmap::all_valid(3)),
//! ).unwrap();
//! assert_eq!(df.row_count(), 3);
//! assert_eq!(df.column_count(), 1);
//! ```

use crate::error::{Result, SurveyError};

// ── ValidityBitmap ────────────────────────────────────────────────────

/// Bit-packed validity flags, one bit per row (1 = present, 0 = missing).
#[derive(Debug, Clone, PartialEq)]
pub struct ValidityBitmap {
    bits: Vec<u64>,
    len: usize,
}

impl ValidityBitmap {
    /// Creates a bitmap where all `len` positions are valid.
    pub fn all_valid(len: usize) -> Self {
        let mut bitmap = Self::all_invalid(len);
        for word in bitmap.bits.iter_mut() {
            *word = u64::MAX;
        }
        let trailing = len % 64;
        if let (Some(last), true) = (bitmap.bits.last_mut(), trailing != 0) {
            *last = (1u64 << trailing) - 1;
        }
        bitmap
    }

    /// Creates a bitmap where all `len` positions are missing.
    pub fn all_invalid(len: usize) -> Self {
        Self {
            bits: vec![0u64; len.div_ceil(64)],
            len,
        }
    }

    /// Creates an empty bitmap with no rows.
    pub fn empty() -> Self {
        Self {
            bits: Vec::new(),
            len: 0,
        }
    }

    /// Returns `true` if the value at `idx` is present.
    #[inline]
    pub fn is_valid(&self, idx: usize) -> bool {
        debug_assert!(idx < self.len, "index {idx} out of bounds (len={})", self.len);
        (self.bits[idx / 64] >> (idx % 64)) & 1 == 1
    }

    /// Appends a new position.
    pub fn push(&mut self, valid: bool) {
        let idx = self.len;
        self.len += 1;
        if idx / 64 >= self.bits.len() {
            self.bits.push(0);
        }
        if valid {
            self.bits[idx / 64] |= 1u64 << (idx % 64);
        }
    }

    /// Returns the number of tracked positions.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the bitmap tracks zero positions.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Counts the present positions.
    pub fn valid_count(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Counts the missing positions.
    pub fn null_count(&self) -> usize {
        self.len - self.valid_count()
    }

    /// Returns an iterator over indices of present positions.
    pub fn valid_indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).filter(move |&i| self.is_valid(i))
    }
}

// ── DataType ──────────────────────────────────────────────────────────

/// Data type inferred for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// Every present cell parses as a number (stored as `f64`).
    Numeric,
    /// Anything else.
    Text,
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Numeric => write!(f, "Numeric"),
            Self::Text => write!(f, "Text"),
        }
    }
}

// ── Column ────────────────────────────────────────────────────────────

/// A typed column with a validity bitmap.
///
/// Missing positions hold a placeholder (`0.0` or an empty string) that
/// must be ignored.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Dense `f64` values.
    Numeric {
        values: Vec<f64>,
        validity: ValidityBitmap,
    },
    /// Text values.
    Text {
        values: Vec<String>,
        validity: ValidityBitmap,
    },
}

impl Column {
    /// Creates a numeric column.
    pub fn numeric(values: Vec<f64>, validity: ValidityBitmap) -> Self {
        Self::Numeric { values, validity }
    }

    /// Creates a text column.
    pub fn text(values: Vec<String>, validity: ValidityBitmap) -> Self {
        Self::Text { values, validity }
    }

    /// Creates a fully-populated numeric column.
    pub fn from_values(values: Vec<f64>) -> Self {
        let validity = ValidityBitmap::all_valid(values.len());
        Self::Numeric { values, validity }
    }

    /// Returns the data type of this column.
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Numeric { .. } => DataType::Numeric,
            Self::Text { .. } => DataType::Text,
        }
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.validity().len()
    }

    /// Returns `true` if the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the validity bitmap.
    pub fn validity(&self) -> &ValidityBitmap {
        match self {
            Self::Numeric { validity, .. } | Self::Text { validity, .. } => validity,
        }
    }

    /// Returns the number of missing values.
    pub fn null_count(&self) -> usize {
        self.validity().null_count()
    }

    /// Returns `true` if the value at `idx` is present.
    pub fn is_valid(&self, idx: usize) -> bool {
        self.validity().is_valid(idx)
    }

    /// Returns the numeric value at `idx`, or `None` if missing or not numeric.
    pub fn numeric_at(&self, idx: usize) -> Option<f64> {
        match self {
            Self::Numeric { values, validity } if validity.is_valid(idx) => Some(values[idx]),
            _ => None,
        }
    }

    /// Returns the present numeric values (missing excluded).
    pub fn valid_numeric_values(&self) -> Option<Vec<f64>> {
        match self {
            Self::Numeric { values, validity } => {
                Some(validity.valid_indices().map(|i| values[i]).collect())
            }
            Self::Text { .. } => None,
        }
    }
}

// ── DataFrame ─────────────────────────────────────────────────────────

/// Column-major table of named, equal-length columns.
#[derive(Debug, Clone, Default)]
pub struct DataFrame {
    names: Vec<String>,
    columns: Vec<Column>,
    row_count: usize,
}

impl DataFrame {
    /// Creates an empty DataFrame with no columns or rows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a named column.
    ///
    /// Returns an error if the column length doesn't match the existing
    /// row count (unless this is the first column).
    pub fn add_column(&mut self, name: String, column: Column) -> Result<()> {
        let col_len = column.len();
        if self.columns.is_empty() {
            self.row_count = col_len;
        } else if col_len != self.row_count {
            return Err(SurveyError::DimensionMismatch {
                expected: self.row_count,
                actual: col_len,
            });
        }
        self.names.push(name);
        self.columns.push(column);
        Ok(())
    }

    /// Removes the column called `name` and returns it.
    pub fn drop_column(&mut self, name: &str) -> Result<Column> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| SurveyError::ColumnNotFound {
                name: name.to_string(),
            })?;
        self.names.remove(idx);
        Ok(self.columns.remove(idx))
    }

    /// Returns the number of rows.
    #[inline]
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Returns the number of columns.
    #[inline]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if the DataFrame has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns column names in order.
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// Returns the column at `index`.
    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// Returns the column called `name`.
    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.column_index(name).map(|i| &self.columns[i])
    }

    /// Returns the index of the column called `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Returns an iterator over (name, column) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.names.iter().map(|s| s.as_str()).zip(self.columns.iter())
    }

    /// Returns (name, type) for every column.
    pub fn schema(&self) -> Vec<(&str, DataType)> {
        self.iter().map(|(name, col)| (name, col.data_type())).collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── ValidityBitmap ───────────────────────────────────────────

    #[test]
    fn bitmap_all_valid() {
        let bm = ValidityBitmap::all_valid(100);
        assert_eq!(bm.len(), 100);
        assert_eq!(bm.null_count(), 0);
        assert!((0..100).all(|i| bm.is_valid(i)));
    }

    #[test]
    fn bitmap_all_invalid() {
        let bm = ValidityBitmap::all_invalid(70);
        assert_eq!(bm.null_count(), 70);
        assert_eq!(bm.valid_count(), 0);
        assert!(!bm.is_valid(69));
        assert_eq!(bm.valid_indices().count(), 0);
    }

    #[test]
    fn bitmap_word_boundary() {
        let bm = ValidityBitmap::all_valid(64);
        assert_eq!(bm.bits.len(), 1);
        assert_eq!(bm.valid_count(), 64);

        let bm = ValidityBitmap::all_valid(65);
        assert_eq!(bm.bits.len(), 2);
        assert_eq!(bm.valid_count(), 65);
        assert!(bm.is_valid(64));
    }

    #[test]
    fn bitmap_push_and_indices() {
        let mut bm = ValidityBitmap::empty();
        for i in 0..130 {
            bm.push(i % 4 != 0);
        }
        assert_eq!(bm.len(), 130);
        assert_eq!(bm.null_count(), (0..130).filter(|i| i % 4 == 0).count());
        assert_eq!(bm.valid_indices().take(3).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    // ── Column ───────────────────────────────────────────────────

    #[test]
    fn numeric_column_with_nulls() {
        let mut validity = ValidityBitmap::empty();
        for valid in [true, false, true, true] {
            validity.push(valid);
        }
        let col = Column::numeric(vec![1.0, 0.0, 3.0, 4.0], validity);
        assert_eq!(col.data_type(), DataType::Numeric);
        assert_eq!(col.null_count(), 1);
        assert_eq!(col.numeric_at(0), Some(1.0));
        assert_eq!(col.numeric_at(1), None);
        assert_eq!(col.valid_numeric_values(), Some(vec![1.0, 3.0, 4.0]));
    }

    #[test]
    fn text_column() {
        let mut validity = ValidityBitmap::empty();
        validity.push(false);
        validity.push(true);
        let col = Column::text(vec![String::new(), "Ana".into()], validity);
        assert_eq!(col.data_type(), DataType::Text);
        assert!(!col.is_valid(0));
        assert!(col.is_valid(1));
        assert!(col.valid_numeric_values().is_none());
        assert_eq!(col.numeric_at(1), None);
    }

    // ── DataFrame ────────────────────────────────────────────────

    #[test]
    fn add_columns_and_lookup() {
        let mut df = DataFrame::new();
        df.add_column("x".into(), Column::from_values(vec![1.0, 2.0]))
            .unwrap();
        df.add_column("y".into(), Column::from_values(vec![3.0, 4.0]))
            .unwrap();
        assert_eq!(df.row_count(), 2);
        assert_eq!(df.column_names(), &["x", "y"]);
        assert_eq!(df.column_index("y"), Some(1));
        assert!(df.column_by_name("z").is_none());
        assert_eq!(
            df.schema(),
            vec![("x", DataType::Numeric), ("y", DataType::Numeric)]
        );
    }

    #[test]
    fn column_length_mismatch() {
        let mut df = DataFrame::new();
        df.add_column("x".into(), Column::from_values(vec![1.0, 2.0]))
            .unwrap();
        let err = df
            .add_column("y".into(), Column::from_values(vec![1.0]))
            .unwrap_err();
        assert_eq!(
            err,
            SurveyError::DimensionMismatch {
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn drop_column_removes_name_and_data() {
        let mut df = DataFrame::new();
        df.add_column(
            "Nome".into(),
            Column::text(vec!["Ana".into()], ValidityBitmap::all_valid(1)),
        )
        .unwrap();
        df.add_column("x".into(), Column::from_values(vec![1.0]))
            .unwrap();

        let dropped = df.drop_column("Nome").unwrap();
        assert_eq!(dropped.data_type(), DataType::Text);
        assert_eq!(df.column_names(), &["x"]);
        assert_eq!(df.row_count(), 1);
    }

    #[test]
    fn drop_missing_column_fails() {
        let mut df = DataFrame::new();
        let err = df.drop_column("Nome").unwrap_err();
        assert!(matches!(err, SurveyError::ColumnNotFound { name } if name == "Nome"));
    }
}
