//! Goodness-of-fit statistics for a fitted 4PL curve.

use crate::domain::{FitParams, FitQuality};
use crate::error::AppError;
use crate::models::curve;

/// Sum of squared residuals of the curve against observed `(x, y)` data.
pub fn sum_squared_error(x: &[f64], y: &[f64], params: &FitParams) -> f64 {
    x.iter()
        .zip(y.iter())
        .map(|(&xi, &yi)| {
            let r = yi - curve(xi, params);
            r * r
        })
        .sum()
}

/// Coefficient of determination: `R^2 = 1 - SS_res / SS_tot`.
///
/// When all readings are identical, `SS_tot` is zero and the statistic is
/// undefined; that is surfaced as a typed error instead of a silent NaN.
pub fn r_squared(x: &[f64], y: &[f64], params: &FitParams) -> Result<f64, AppError> {
    if x.len() != y.len() || y.is_empty() {
        return Err(AppError::invalid_argument(
            "R-squared requires equal-length, non-empty x and y.",
        ));
    }
    let mean = y.iter().sum::<f64>() / y.len() as f64;
    let ss_tot: f64 = y.iter().map(|&v| (v - mean) * (v - mean)).sum();
    if ss_tot == 0.0 {
        return Err(AppError::degenerate(
            "All readings are identical; R-squared is undefined.",
        ));
    }
    let ss_res = sum_squared_error(x, y, params);
    Ok(1.0 - ss_res / ss_tot)
}

/// Full quality diagnostics for a fit.
pub fn fit_quality(x: &[f64], y: &[f64], params: &FitParams) -> Result<FitQuality, AppError> {
    let r2 = r_squared(x, y, params)?;
    let sse = sum_squared_error(x, y, params);
    let n = x.len();
    Ok(FitQuality {
        sse,
        rmse: (sse / n as f64).sqrt(),
        r_squared: r2,
        n,
    })
}
