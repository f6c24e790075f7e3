//! Least-squares solution of rectangular systems through the SVD pseudo-inverse.

use nalgebra::{DMatrix, DVector};

/// Default cutoff below which a singular value is treated as zero.
pub const SINGULAR_TOLERANCE: f64 = 1e-10;

/// Solves `a · x ≈ b` as `x = V · Σ⁺ · Uᵀ · b`, where `Σ⁺` inverts the singular values of `a` that are
/// at least `tolerance` and zeroes the rest.
///
/// Rank-deficient systems do not fail: the degenerate directions contribute nothing to `x`, which
/// yields the minimum-norm least-squares solution.
pub fn solve(a: &DMatrix<f64>, b: &[f64], tolerance: f64) -> Vec<f64> {
    assert_eq!(
        a.nrows(),
        b.len(),
        "{} right-hand side values supplied for a {}x{} system",
        b.len(),
        a.nrows(),
        a.ncols()
    );
    let cols = a.ncols();
    if a.nrows() == 0 || cols == 0 {
        return vec![0.0; cols];
    }

    let svd = a.clone().svd(true, true);
    let (Some(u), Some(v_t)) = (svd.u, svd.v_t) else {
        unreachable!("both singular vector sets were requested")
    };
    let projected = u.transpose() * DVector::from_column_slice(b);
    let scaled = DVector::from_iterator(
        projected.len(),
        projected
            .iter()
            .zip(svd.singular_values.iter())
            .map(|(&component, &singular)| {
                if singular < tolerance {
                    0.0
                } else {
                    component / singular
                }
            }),
    );
    let x = v_t.transpose() * scaled;
    x.iter().copied().collect()
}

#[cfg(test)]
mod tests {
    use crate::testing::assert_slice_f64_absolute;

    use super::*;

    fn matrix(rows: usize, cols: usize, data: &[f64]) -> DMatrix<f64> {
        DMatrix::from_row_slice(rows, cols, data)
    }

    #[test]
    fn square_full_rank() {
        // 2x + y = 5, x - y = 1
        let a = matrix(2, 2, &[2.0, 1.0, 1.0, -1.0]);
        let x = solve(&a, &[5.0, 1.0], SINGULAR_TOLERANCE);
        assert_slice_f64_absolute(&[2.0, 1.0], &x, 1e-9);
    }

    #[test]
    fn overdetermined_least_squares() {
        // fit y = c through 1, 2, 3, 6 -> c = mean = 3
        let a = matrix(4, 1, &[1.0, 1.0, 1.0, 1.0]);
        let x = solve(&a, &[1.0, 2.0, 3.0, 6.0], SINGULAR_TOLERANCE);
        assert_slice_f64_absolute(&[3.0], &x, 1e-9);
    }

    #[test]
    fn rank_deficient_yields_minimum_norm() {
        // x + y = 4, twice; the null direction (1, -1) is discarded
        let a = matrix(2, 2, &[1.0, 1.0, 1.0, 1.0]);
        let x = solve(&a, &[4.0, 4.0], SINGULAR_TOLERANCE);
        assert_slice_f64_absolute(&[2.0, 2.0], &x, 1e-9);
    }

    #[test]
    fn underdetermined() {
        // single equation x - y = 6
        let a = matrix(1, 2, &[1.0, -1.0]);
        let x = solve(&a, &[6.0], SINGULAR_TOLERANCE);
        assert_slice_f64_absolute(&[3.0, -3.0], &x, 1e-9);
    }

    #[test]
    fn empty_system() {
        let a = DMatrix::zeros(0, 3);
        assert_eq!(vec![0.0; 3], solve(&a, &[], SINGULAR_TOLERANCE));
    }
}
