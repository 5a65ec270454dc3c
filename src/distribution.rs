//! Normality testing.
//!
//! Runs the Shapiro-Wilk test on every column of a [`Dataset`]. The W
//! statistic and its p-value come from `u_analytics` (Royston's AS R94).
//!
//! # Example
//!
//! ```
//! use survey_stats::distribution::shapiro_wilk;
//!
//! let heights = [148.0, 154.0, 158.0, 160.0, 161.0, 162.0, 166.0, 170.0, 182.0, 195.0, 236.0];
//! let result = shapiro_wilk(&heights).unwrap();
//! assert!((result.statistic - 0.789).abs() < 1e-3);
//! assert!(result.p_value < 0.01);
//! ```

use crate::dataset::Dataset;
use crate::output::{format_float, ResultTable, ToTable};
use tracing::{info, warn};

/// Smallest sample the test is defined for.
const MIN_SAMPLE: usize = 3;

/// Outcome of one Shapiro-Wilk test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalityTestResult {
    /// The W statistic, in (0, 1].
    pub statistic: f64,
    /// P-value of the null hypothesis that the sample is normal.
    pub p_value: f64,
}

/// Shapiro-Wilk result for one dataset column.
///
/// Both numbers are NaN when the test is undefined for the column.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalityResult {
    /// Column name.
    pub column: String,
    /// The W statistic.
    pub statistic: f64,
    /// P-value.
    pub p_value: f64,
}

impl NormalityResult {
    /// Returns `true` if the test produced a result.
    pub fn is_defined(&self) -> bool {
        !self.statistic.is_nan()
    }
}

/// Runs the Shapiro-Wilk test.
///
/// Returns `None` if there are fewer than 3 values, any value is not
/// finite, or all values are equal.
pub fn shapiro_wilk(data: &[f64]) -> Option<NormalityTestResult> {
    if data.len() < MIN_SAMPLE || data.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let range = u_numflow::stats::max(data)? - u_numflow::stats::min(data)?;
    if range <= 0.0 {
        return None;
    }

    u_analytics::testing::shapiro_wilk_test(data).map(|r| NormalityTestResult {
        statistic: r.w.min(1.0),
        p_value: r.p_value.clamp(0.0, 1.0),
    })
}

/// Runs the Shapiro-Wilk test on every column, in column order.
///
/// Missing cells are skipped. Columns with fewer than 3 values or no
/// spread yield an undefined (NaN) result. Each outcome is logged.
pub fn normality_tests(dataset: &Dataset) -> Vec<NormalityResult> {
    dataset
        .iter()
        .map(|(name, column)| {
            let values = column.valid_numeric_values().unwrap_or_default();
            match shapiro_wilk(&values) {
                Some(r) => {
                    info!(
                        column = name,
                        statistic = r.statistic,
                        p_value = r.p_value,
                        "Shapiro-Wilk"
                    );
                    NormalityResult {
                        column: name.to_string(),
                        statistic: r.statistic,
                        p_value: r.p_value,
                    }
                }
                None => {
                    warn!(
                        column = name,
                        n = values.len(),
                        "Shapiro-Wilk undefined (needs at least 3 distinct finite values)"
                    );
                    NormalityResult {
                        column: name.to_string(),
                        statistic: f64::NAN,
                        p_value: f64::NAN,
                    }
                }
            }
        })
        .collect()
}

impl ToTable for [NormalityResult] {
    fn to_table(&self) -> ResultTable {
        let mut table = ResultTable::new(vec![
            "Column".to_string(),
            "Statistic".to_string(),
            "p-value".to_string(),
        ]);
        for r in self {
            table.rows_mut().push(vec![
                r.column.clone(),
                format_float(r.statistic),
                format_float(r.p_value),
            ]);
        }
        table
    }
}

// ── Tests ─────────────────────────────────────────────────────────────
