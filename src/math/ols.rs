//! Least squares solver.
//!
//! The bundled seasonal model is linear in its coefficients once the design
//! columns (trend, Fourier terms, holiday counts) are fixed:
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! Implementation choices:
//! - SVD rather than normal equations, so rank-deficient designs (e.g. a
//!   Fourier pair that aliases at a coarse cadence, or fewer rows than
//!   columns on short training windows) still produce the minimum-norm solution.
//! - The parameter dimension is tiny (≤ 7 columns), so SVD cost is negligible.

use nalgebra::{DMatrix, DVector};

/// Assemble a design matrix from equally sized rows.
///
/// Returns `None` for an empty or ragged row set.
pub fn design_matrix(rows: &[Vec<f64>]) -> Option<DMatrix<f64>> {
    let ncols = rows.first()?.len();
    if ncols == 0 || rows.iter().any(|r| r.len() != ncols) {
        return None;
    }
    Some(DMatrix::from_fn(rows.len(), ncols, |i, j| rows[i][j]))
}

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    if x.nrows() != y.len() || x.nrows() == 0 {
        return None;
    }
    let svd = x.clone().svd(true, true);

    // Singular values below `tol` are treated as zero, which is what turns an
    // aliased column into a zero coefficient instead of a huge one.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Residual standard deviation with a degrees-of-freedom correction.
///
/// Falls back to the plain RMS when there are no spare degrees of freedom.
pub fn residual_std(residuals: &[f64], n_params: usize) -> f64 {
    if residuals.is_empty() {
        return 0.0;
    }
    let sse: f64 = residuals.iter().map(|r| r * r).sum();
    let dof = residuals.len().saturating_sub(n_params);
    let denom = if dof > 0 { dof } else { residuals.len() };
    (sse / denom as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = design_matrix(&[vec![1.0, 0.0], vec![1.0, 1.0], vec![1.0, 2.0]]).unwrap();
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn zero_column_gets_zero_coefficient() {
        let x = design_matrix(&[vec![1.0, 0.0], vec![1.0, 0.0], vec![1.0, 0.0]]).unwrap();
        let y = DVector::from_row_slice(&[4.0, 5.0, 6.0]);
        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 5.0).abs() < 1e-10);
        assert!(beta[1].abs() < 1e-10);
    }

    #[test]
    fn underdetermined_system_interpolates() {
        let x = design_matrix(&[vec![1.0, 0.0, 0.5], vec![1.0, 1.0, -0.5]]).unwrap();
        let y = DVector::from_row_slice(&[1.0, 3.0]);
        let beta = solve_least_squares(&x, &y).unwrap();
        let fitted = &x * &beta;
        assert!((fitted[0] - 1.0).abs() < 1e-9);
        assert!((fitted[1] - 3.0).abs() < 1e-9);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        assert!(design_matrix(&[vec![1.0], vec![1.0, 2.0]]).is_none());
        assert!(design_matrix(&[]).is_none());
    }

    #[test]
    fn residual_std_uses_dof_when_available() {
        let r = [1.0, -1.0, 1.0, -1.0];
        assert!((residual_std(&r, 2) - 2.0_f64.sqrt()).abs() < 1e-12);
        assert!((residual_std(&r, 4) - 1.0).abs() < 1e-12);
    }
}
