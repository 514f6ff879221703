//! Seed grid generation for the 4PL fit.
//!
//! The nonlinear parameters (slope B, EC50 C) are seeded by a deterministic
//! grid search before Levenberg-Marquardt refinement.
//!
//! Why a grid?
//! - It avoids the local-minima sensitivity of a single heuristic starting
//!   point (sigmoid fits are notoriously brittle to bad seeds).
//! - It is deterministic given the same inputs/flags.
//! - With two nonlinear parameters, a modest grid is fast enough to be
//!   negligible next to the refinement step.

use crate::error::AppError;

/// Generate `steps` log-spaced points between `min` and `max` (inclusive).
pub fn log_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, AppError> {
    if !(min.is_finite() && max.is_finite() && min > 0.0 && max > 0.0 && max > min) {
        return Err(AppError::invalid_argument(format!(
            "Invalid grid range: min={min}, max={max} (must be finite, >0, and max>min)."
        )));
    }
    if steps < 2 {
        return Err(AppError::invalid_argument("Grid steps must be >= 2."));
    }

    let ln_min = min.ln();
    let ln_max = max.ln();
    let step = (ln_max - ln_min) / (steps as f64 - 1.0);

    let mut out = Vec::with_capacity(steps);
    for i in 0..steps {
        out.push((ln_min + step * i as f64).exp());
    }
    Ok(out)
}

/// Slope (B) candidates: log-spaced magnitudes between `min_abs` and
/// `max_abs`, each with both signs.
///
/// Ascending assays (reading grows with concentration) want `B > 0`;
/// competitive assays produce descending curves and want `B < 0`. Both are
/// always tried so the caller never has to declare the curve direction.
pub fn slope_grid(min_abs: f64, max_abs: f64, steps: usize) -> Result<Vec<f64>, AppError> {
    let magnitudes = log_space(min_abs, max_abs, steps)?;
    let mut out = Vec::with_capacity(magnitudes.len() * 2);
    for &m in &magnitudes {
        out.push(m);
    }
    for &m in &magnitudes {
        out.push(-m);
    }
    Ok(out)
}

/// EC50 (C) candidates: log-spaced across the observed concentration range.
///
/// The inflection of a usable standard curve lies inside the measured range;
/// a seed outside it would start refinement on a flat stretch of the curve.
pub fn ec50_grid(conc_min: f64, conc_max: f64, steps: usize) -> Result<Vec<f64>, AppError> {
    log_space(conc_min, conc_max, steps)
}
