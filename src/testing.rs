//! Two-sample rank-sum testing.
//!
//! Compares the same columns of two datasets with the two-sided
//! Mann-Whitney U test. The exact null distribution of U is used when one
//! sample is small and there are no ties; otherwise the normal
//! approximation with tie and continuity corrections.
//!
//! # Example
//!
//! ```
//! use survey_stats::testing::{mann_whitney_u, MannWhitneyMethod};
//!
//! let r = mann_whitney_u(&[19.0, 22.0, 16.0, 29.0, 24.0], &[20.0, 11.0, 17.0, 12.0]).unwrap();
//! assert_eq!(r.u_statistic, 17.0);
//! assert_eq!(r.method, MannWhitneyMethod::Exact);
//! assert!((r.p_value - 0.1111).abs() < 1e-4);
//! ```

use crate::dataset::Dataset;
use crate::error::{Result, SurveyError};
use crate::output::{format_float, ResultTable, ToTable};
use statrs::distribution::{ContinuousCDF, Normal};
use std::fmt;
use tracing::info;

/// Largest sample size for which the exact distribution is used.
const EXACT_MAX_SIZE: usize = 8;

/// How the p-value was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MannWhitneyMethod {
    /// Exact null distribution of U.
    Exact,
    /// Normal approximation with tie and continuity corrections.
    Asymptotic,
}

impl fmt::Display for MannWhitneyMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::Asymptotic => write!(f, "asymptotic"),
        }
    }
}

/// Outcome of one Mann-Whitney U test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MannWhitneyResult {
    /// U of the first sample: `R₁ − n₁(n₁ + 1)/2`.
    pub u_statistic: f64,
    /// Two-sided p-value, in [0, 1].
    pub p_value: f64,
    /// Method used for the p-value.
    pub method: MannWhitneyMethod,
}

/// Mann-Whitney result for one compared column.
#[derive(Debug, Clone, PartialEq)]
pub struct RankSumResult {
    /// Column name.
    pub column: String,
    /// U of the first dataset's sample.
    pub u_statistic: f64,
    /// Two-sided p-value.
    pub p_value: f64,
}

/// Two-sided Mann-Whitney U test of `x` against `y`.
///
/// Infinite values are ranked like any other value. Returns `None` if
/// either sample is empty or holds a NaN.
pub fn mann_whitney_u(x: &[f64], y: &[f64]) -> Option<MannWhitneyResult> {
    let (n1, n2) = (x.len(), y.len());
    if n1 == 0 || n2 == 0 || x.iter().chain(y).any(|v| v.is_nan()) {
        return None;
    }

    let pooled: Vec<f64> = x.iter().chain(y).copied().collect();
    let (ranks, tie_sizes) = midranks(&pooled);

    let r1: f64 = ranks[..n1].iter().sum();
    let n1f = n1 as f64;
    let n2f = n2 as f64;
    let u1 = r1 - n1f * (n1f + 1.0) / 2.0;
    let u = u1.max(n1f * n2f - u1);

    let has_ties = tie_sizes.iter().any(|&t| t > 1);
    let (p_value, method) = if n1.min(n2) <= EXACT_MAX_SIZE && !has_ties {
        (exact_p_value(u, n1, n2), MannWhitneyMethod::Exact)
    } else {
        (
            asymptotic_p_value(u, n1, n2, &tie_sizes),
            MannWhitneyMethod::Asymptotic,
        )
    };

    Some(MannWhitneyResult {
        u_statistic: u1,
        p_value: p_value.clamp(0.0, 1.0),
        method,
    })
}

/// 1-based ranks with ties averaged, plus the size of every tie group.
fn midranks(values: &[f64]) -> (Vec<f64>, Vec<usize>) {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut tie_sizes = Vec::new();
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        let rank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = rank;
        }
        tie_sizes.push(j - i + 1);
        i = j + 1;
    }
    (ranks, tie_sizes)
}

/// `2 · P(U ≥ u)` under the exact null distribution.
///
/// `u` is the larger of U₁ and U₂, so the tail is summed from the small end
/// as `P(U ≤ n₁n₂ − u)`.
fn exact_p_value(u: f64, n1: usize, n2: usize) -> f64 {
    let counts = u_distribution(n1, n2);
    let lower_end = (n1 * n2).saturating_sub(u.round() as usize);
    let tail: f64 = counts[..=lower_end].iter().sum();
    2.0 * tail / arrangements(n1, n2)
}

/// C(n₁ + n₂, n₁), the number of ways to interleave the two samples.
fn arrangements(n1: usize, n2: usize) -> f64 {
    let (m, n) = (n1.min(n2), n1.max(n2));
    (1..=m).fold(1.0, |acc, i| acc * (n + i) as f64 / i as f64)
}

/// Number of arrangements giving each U value, for U in 0..=n1·n2.
///
/// Expands the generating function ∏ᵢ (1 − q^(n+i)) / (1 − q^i) for
/// i = 1..=m, where m is the smaller sample size and n the larger.
fn u_distribution(n1: usize, n2: usize) -> Vec<f64> {
    let (m, n) = (n1.min(n2), n1.max(n2));
    let size = m * n + 1;
    let mut c = vec![0.0; size];
    c[0] = 1.0;
    for i in 1..=m {
        let s = n + i;
        for k in (s..size).rev() {
            c[k] -= c[k - s];
        }
        for k in i..size {
            c[k] += c[k - i];
        }
    }
    c
}

/// Normal approximation of the two-sided p-value.
fn asymptotic_p_value(u: f64, n1: usize, n2: usize, tie_sizes: &[usize]) -> f64 {
    let n1f = n1 as f64;
    let n2f = n2 as f64;
    let n = n1f + n2f;
    let tie_term: f64 = tie_sizes
        .iter()
        .map(|&t| {
            let t = t as f64;
            t * t * t - t
        })
        .sum();

    let variance = n1f * n2f / 12.0 * ((n + 1.0) - tie_term / (n * (n - 1.0)));
    let sigma = variance.sqrt();
    if sigma.is_nan() || sigma <= 0.0 {
        return 1.0;
    }

    let z = (u - n1f * n2f / 2.0 - 0.5) / sigma;
    2.0 * Normal::standard().sf(z)
}

/// Tests every named column of `first` against the same column of `second`.
///
/// Results come back in `columns` order. Missing cells are skipped.
///
/// # Errors
///
/// - [`SurveyError::ColumnNotFound`] if a column is absent from either dataset
/// - [`SurveyError::InsufficientData`] if a column has no values on one side
pub fn compare_groups(
    first: &Dataset,
    second: &Dataset,
    columns: &[String],
) -> Result<Vec<RankSumResult>> {
    columns
        .iter()
        .map(|name| {
            let x = first.values(name)?;
            let y = second.values(name)?;
            let r = mann_whitney_u(&x, &y).ok_or(SurveyError::InsufficientData {
                min_required: 1,
                actual: x.len().min(y.len()),
            })?;
            info!(
                column = %name,
                u_statistic = r.u_statistic,
                p_value = r.p_value,
                method = %r.method,
                "Mann-Whitney U"
            );
            Ok(RankSumResult {
                column: name.clone(),
                u_statistic: r.u_statistic,
                p_value: r.p_value,
            })
        })
        .collect()
}

impl ToTable for [RankSumResult] {
    fn to_table(&self) -> ResultTable {
        let mut table = ResultTable::new(vec![
            "Column".to_string(),
            "U-Statistic".to_string(),
            "p-value".to_string(),
        ]);
        for r in self {
            table.rows_mut().push(vec![
                r.column.clone(),
                format_float(r.u_statistic),
                format_float(r.p_value),
            ]);
        }
        table
    }
}

// ── Tests ─────────────────────────────────────────────────────────────
