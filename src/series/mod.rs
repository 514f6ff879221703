//! Serial dilution series generation.
//!
//! A reference standard is prepared by successive division of a starting
//! concentration by a fixed factor. The generator is a pure function: each
//! call allocates and returns a fresh sequence, so results of separate runs
//! can never leak into each other.

use crate::error::AppError;

/// Generate `count` concentrations starting at `start`, each subsequent value
/// divided by `factor`.
///
/// `factor == 1` produces a constant series; that is semantically degenerate
/// but accepted (the caller decides whether it is meaningful).
pub fn generate_series(count: usize, factor: f64, start: f64) -> Result<Vec<f64>, AppError> {
    if count == 0 {
        return Err(AppError::invalid_argument(
            "Series point count must be >= 1.",
        ));
    }
    if !(factor.is_finite() && factor > 0.0) {
        return Err(AppError::invalid_argument(format!(
            "Invalid dilution factor: {factor} (must be finite and > 0)."
        )));
    }
    if !(start.is_finite() && start > 0.0) {
        return Err(AppError::invalid_argument(format!(
            "Invalid starting concentration: {start} (must be finite and > 0)."
        )));
    }

    let mut out = Vec::with_capacity(count);
    let mut value = start;
    for _ in 0..count {
        out.push(value);
        value /= factor;
    }
    Ok(out)
}
