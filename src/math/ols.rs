//! Least squares solver.
//!
//! In this project we repeatedly solve small linear regression problems: the
//! 4PL model is linear in the asymptote pair `(A, D)` once the slope and EC50
//! are fixed, so the seed grid search solves `(A, D)` many times, once per
//! candidate `(B, C)` tuple.
//!
//! Implementation choices:
//! - SVD solves the least-squares problem robustly even when the design
//!   matrix is tall (more rows than columns). (Nalgebra's `QR::solve` is
//!   intended for square systems and will panic for non-square matrices.)
//! - The parameter dimension is tiny (2 columns), so SVD performance is a
//!   non-issue even across thousands of grid candidates.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    // Near-saturated sigmoid candidates produce nearly collinear design
    // columns, so try progressively looser tolerances before giving up.
    let svd = x.clone().svd(true, true);

    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 1 + 4x on x = [0, 1, 2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[1.0, 5.0, 9.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 1.0).abs() < 1e-10);
        assert!((beta[1] - 4.0).abs() < 1e-10);
    }

    #[test]
    fn least_squares_handles_tall_systems() {
        // Overdetermined but consistent: y = 2g + 7(1 - g).
        let g = [0.9, 0.7, 0.5, 0.3, 0.1];
        let mut rows = Vec::new();
        let mut obs = Vec::new();
        for &gi in &g {
            rows.extend_from_slice(&[gi, 1.0 - gi]);
            obs.push(2.0 * gi + 7.0 * (1.0 - gi));
        }
        let x = DMatrix::from_row_slice(5, 2, &rows);
        let y = DVector::from_row_slice(&obs);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-9);
        assert!((beta[1] - 7.0).abs() < 1e-9);
    }
}
