//! Column-level descriptive statistics.
//!
//! For each column of a [`Dataset`] the profile reports the mean, the
//! median, the sample standard deviation and the coefficient of variation
//! (`std × 100 / mean`). Statistics are computed over present values only.
//!
//! Undefined results (the mean of an all-missing column, the standard
//! deviation of a single value, a coefficient of variation over a zero mean)
//! are replaced by `0` in one pass over the whole table by
//! [`fill_undefined`]. Infinite means, medians and deviations are kept.
//!
//! # Example
//!
//! ```
//! use survey_stats::dataset::Dataset;
//! use survey_stats::profiling::describe;
//!
//! let csv = "Nome,x,y\nAna,2,5\nBia,4,5\nCaio,6,NA\n";
//! let ds = Dataset::parse(csv, "Nome").unwrap();
//! let rows = describe(&ds);
//!
//! assert_eq!(rows.len(), 2);
//! assert_eq!(rows[0].mean, 4.0);
//! assert_eq!(rows[0].std, 2.0);
//! assert_eq!(rows[0].var_coeff, 50.0);
//! assert_eq!(rows[1].std, 0.0);
//! ```

use crate::dataset::Dataset;
use crate::output::{format_float, ResultTable, ToTable};

/// Descriptive statistics of one column.
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticsRow {
    /// Column name.
    pub column: String,
    /// Arithmetic mean.
    pub mean: f64,
    /// Median (50th percentile).
    pub median: f64,
    /// Sample standard deviation (N − 1 denominator).
    pub std: f64,
    /// Coefficient of variation in percent: `std × 100 / mean`.
    pub var_coeff: f64,
}

impl StatisticsRow {
    /// Computes the raw statistics of `values`; undefined results are NaN.
    pub fn from_values(column: &str, values: &[f64]) -> Self {
        let mean = u_numflow::stats::mean(values).unwrap_or(f64::NAN);
        let std = u_numflow::stats::std_dev(values).unwrap_or(f64::NAN);
        let median = u_numflow::stats::median(values).unwrap_or(f64::NAN);

        Self {
            column: column.to_string(),
            mean,
            median,
            std,
            var_coeff: std * 100.0 / mean,
        }
    }
}

/// Computes one [`StatisticsRow`] per dataset column, in column order,
/// with undefined values replaced by `0`.
pub fn describe(dataset: &Dataset) -> Vec<StatisticsRow> {
    let mut rows: Vec<StatisticsRow> = dataset
        .iter()
        .map(|(name, column)| {
            let values = column.valid_numeric_values().unwrap_or_default();
            StatisticsRow::from_values(name, &values)
        })
        .collect();
    fill_undefined(&mut rows);
    rows
}

/// Replaces every undefined statistic in the table by `0`.
///
/// A coefficient of variation over a zero mean is infinite rather than NaN
/// when the deviation is non-zero; it is zeroed too. An infinite mean,
/// median or deviation comes from infinite input and is kept.
pub fn fill_undefined(rows: &mut [StatisticsRow]) {
    for row in rows.iter_mut() {
        for value in [&mut row.mean, &mut row.median, &mut row.std] {
            *value = zero_if_nan(*value);
        }
        if !row.var_coeff.is_finite() {
            row.var_coeff = 0.0;
        }
    }
}

/// `0` for NaN, the value otherwise.
pub(crate) fn zero_if_nan(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value
    }
}

impl ToTable for [StatisticsRow] {
    fn to_table(&self) -> ResultTable {
        let mut table = ResultTable::new(
            ["mean", "median", "std", "var_coeff"]
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        );
        for row in self {
            table.rows_mut().push(vec![
                format_float(row.mean),
                format_float(row.median),
                format_float(row.std),
                format_float(row.var_coeff),
            ]);
        }
        table
    }
}

// ── Tests ─────────────────────────────────────────────────────────────
