//! Pearson correlation across dataset columns.
//!
//! Each pair of columns is correlated over the rows where both cells are
//! present (pairwise-complete observations). A pair with fewer than two such
//! rows, or with zero variance on either side, has no defined coefficient;
//! those entries are set to `0` in a final pass over the whole matrix, so a
//! constant column also gets `0` on the diagonal.
//!
//! # Example
//!
//! ```
//! use survey_stats::analysis::correlation_matrix;
//! use survey_stats::dataset::Dataset;
//!
//! let csv = "Nome,x,y,z\nAna,1,2,5\nBia,2,4,4\nCaio,3,6,3\nDani,4,8,2\n";
//! let ds = Dataset::parse(csv, "Nome").unwrap();
//! let corr = correlation_matrix(&ds);
//!
//! assert_eq!(corr.size(), 3);
//! assert!((corr.get(0, 1) - 1.0).abs() < 1e-12);
//! assert!((corr.get(0, 2) + 1.0).abs() < 1e-12);
//! assert_eq!(corr.get(2, 2), 1.0);
//! ```

use crate::dataframe::Column;
use crate::dataset::Dataset;
use crate::output::{format_float, ResultTable, ToTable};
use crate::profiling::zero_if_nan;

/// Square correlation matrix indexed by column name on both axes.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    names: Vec<String>,
    /// Row-major, `names.len()²` entries.
    values: Vec<f64>,
}

impl CorrelationMatrix {
    /// Returns the number of rows (and columns).
    pub fn size(&self) -> usize {
        self.names.len()
    }

    /// Returns the column names labelling both axes.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Returns r(i, j).
    ///
    /// # Panics
    ///
    /// Panics if `i` or `j` is out of range.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        let n = self.size();
        assert!(i < n && j < n, "index ({i}, {j}) out of range for {n}×{n}");
        self.values[i * n + j]
    }

    /// Returns r(a, b) by column name.
    pub fn get_by_name(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.names.iter().position(|n| n == a)?;
        let j = self.names.iter().position(|n| n == b)?;
        Some(self.get(i, j))
    }

    /// Returns row `i`.
    pub fn row(&self, i: usize) -> &[f64] {
        let n = self.size();
        &self.values[i * n..(i + 1) * n]
    }
}

/// Computes the Pearson correlation of every pair of dataset columns,
/// self-pairs included.
///
/// The result is symmetric with entries in [-1, 1]; undefined entries are `0`.
pub fn correlation_matrix(dataset: &Dataset) -> CorrelationMatrix {
    let columns: Vec<&Column> = dataset.iter().map(|(_, col)| col).collect();
    let n = columns.len();
    let mut values = vec![f64::NAN; n * n];

    for i in 0..n {
        for j in i..n {
            let (x, y) = complete_pairs(columns[i], columns[j]);
            let r = pearson(&x, &y).unwrap_or(f64::NAN);
            values[i * n + j] = r;
            values[j * n + i] = r;
        }
    }

    for v in values.iter_mut() {
        *v = zero_if_nan(*v);
    }

    CorrelationMatrix {
        names: dataset.column_names().to_vec(),
        values,
    }
}

/// Pearson product-moment correlation of two equal-length samples.
///
/// Returns `None` when fewer than two pairs are given, the lengths differ,
/// or either sample has zero variance.
///
/// ```
/// use survey_stats::analysis::pearson;
///
/// let r = pearson(&[1.0, 2.0, 3.0, 4.0], &[2.0, 1.0, 4.0, 3.0]).unwrap();
/// assert!((r - 0.6).abs() < 1e-10);
/// assert!(pearson(&[1.0, 2.0, 3.0], &[5.0, 5.0, 5.0]).is_none());
/// ```
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    if x == y {
        return has_spread(x).then_some(1.0);
    }
    u_analytics::correlation::pearson(x, y)
        .map(|pr| pr.r)
        .filter(|r| r.is_finite())
        .map(|r| r.clamp(-1.0, 1.0))
}

/// `true` if the sample holds at least two distinct values.
fn has_spread(x: &[f64]) -> bool {
    x.iter().any(|&v| v != x[0])
}

/// Values of `a` and `b` on rows where both are present.
fn complete_pairs(a: &Column, b: &Column) -> (Vec<f64>, Vec<f64>) {
    (0..a.len().min(b.len()))
        .filter_map(|row| Some((a.numeric_at(row)?, b.numeric_at(row)?)))
        .unzip()
}

impl ToTable for CorrelationMatrix {
    fn to_table(&self) -> ResultTable {
        let mut table = ResultTable::new(self.names.clone());
        for i in 0..self.size() {
            table
                .rows_mut()
                .push(self.row(i).iter().map(|&r| format_float(r)).collect());
        }
        table
    }
}

// ── Tests ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(csv: &str) -> Dataset {
        Dataset::parse(csv, "Nome").unwrap()
    }

    #[test]
    fn perfect_positive_and_negative() {
        let ds = dataset("Nome,x,y,z\nA,1,2,5\nB,2,4,4\nC,3,6,3\nD,4,8,2\nE,5,10,1\n");
        let corr = correlation_matrix(&ds);
        assert!((corr.get_by_name("x", "y").unwrap() - 1.0).abs() < 1e-12);
        assert!((corr.get_by_name("x", "z").unwrap() + 1.0).abs() < 1e-12);
        assert_eq!(corr.names(), &["x", "y", "z"]);
    }

    #[test]
    fn known_coefficient() {
        // r = 0.6 for these samples
        let r = pearson(&[1.0, 2.0, 3.0, 4.0], &[2.0, 1.0, 4.0, 3.0]).unwrap();
        assert!((r - 0.6).abs() < 1e-10);
    }

    #[test]
    fn self_pair_is_exactly_one() {
        let x = [0.1, 0.7, 0.2, 0.9];
        assert_eq!(pearson(&x, &x), Some(1.0));
        assert_eq!(pearson(&[3.0, 3.0, 3.0], &[3.0, 3.0, 3.0]), None);
    }

    #[test]
    fn mismatched_lengths() {
        assert_eq!(pearson(&[1.0, 2.0, 3.0], &[1.0, 2.0]), None);
        assert_eq!(pearson(&[1.0], &[1.0]), None);
    }

    #[test]
    fn constant_column_is_zero_everywhere() {
        let ds = dataset("Nome,x,k\nA,1,7\nB,2,7\nC,3,7\n");
        let corr = correlation_matrix(&ds);
        assert_eq!(corr.get(0, 0), 1.0);
        assert_eq!(corr.get(1, 1), 0.0);
        assert_eq!(corr.get(0, 1), 0.0);
        assert_eq!(corr.get(1, 0), 0.0);
    }

    #[test]
    fn pairwise_complete_rows() {
        // The row with a missing y is ignored for (x, y) only.
        let ds = dataset("Nome,x,y\nA,1,1\nB,2,NA\nC,3,3\nD,4,4\n");
        let corr = correlation_matrix(&ds);
        assert!((corr.get(0, 1) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn too_few_complete_pairs() {
        let ds = dataset("Nome,x,y\nA,1,NA\nB,2,5\nC,NA,6\n");
        let corr = correlation_matrix(&ds);
        assert_eq!(corr.get(0, 1), 0.0);
        assert_eq!(corr.get(0, 0), 1.0);
    }

    #[test]
    fn empty_dataset() {
        let ds = dataset("Nome\nA\nB\n");
        let corr = correlation_matrix(&ds);
        assert_eq!(corr.size(), 0);
        assert_eq!(corr.to_table().row_count(), 0);
    }

    #[test]
    fn table_is_square_with_names_as_header() {
        let ds = dataset("Nome,a,b\nA,1,3\nB,2,1\nC,3,2\n");
        let table = correlation_matrix(&ds).to_table();
        assert_eq!(table.columns(), &["a", "b"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows()[0][0], "1.0");
        assert_eq!(table.rows()[0][1], table.rows()[1][0]);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::dataframe::DataFrame;
    use proptest::prelude::*;

    fn columns() -> impl Strategy<Value = Vec<Vec<f64>>> {
        (1usize..5, 0usize..12).prop_flat_map(|(n_cols, n_rows)| {
            proptest::collection::vec(
                proptest::collection::vec(
                    prop_oneof![(-100i32..100).prop_map(f64::from), -1e3f64..1e3],
                    n_rows,
                ),
                n_cols,
            )
        })
    }

    fn to_dataset(cols: Vec<Vec<f64>>) -> Dataset {
        let mut frame = DataFrame::new();
        for (i, col) in cols.into_iter().enumerate() {
            frame
                .add_column(format!("c{i}"), Column::from_values(col))
                .unwrap();
        }
        Dataset::from_frame(frame).unwrap()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(300))]

        #[test]
        fn symmetric_bounded_unit_or_zero_diagonal(cols in columns()) {
            let corr = correlation_matrix(&to_dataset(cols));
            let n = corr.size();
            for i in 0..n {
                let d = corr.get(i, i);
                prop_assert!(d == 1.0 || d == 0.0, "diagonal {} = {}", i, d);
                for j in 0..n {
                    prop_assert_eq!(corr.get(i, j), corr.get(j, i));
                    prop_assert!((-1.0..=1.0).contains(&corr.get(i, j)));
                }
            }
        }
    }
}
