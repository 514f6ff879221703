//! 4PL model evaluation.
//!
//! The fitter and plotting code rely on two primitive operations:
//! - forward evaluation `y(x)` given parameters (for residuals/curves)
//! - inverse evaluation `x(y)` (for interpolating unknown samples)
//!
//! `curve` is the unchecked evaluation used in optimizer inner loops and on
//! plotting grids; `evaluate_forward`/`evaluate_inverse` add the domain
//! checks callers outside the fitter should go through.

use crate::domain::{DatasetStats, FitParams, Prediction};
use crate::error::AppError;

/// Evaluate `y = (A - D) / (1 + (x / C)^B) + D` with no domain checks.
pub fn curve(x: f64, p: &FitParams) -> f64 {
    (p.a - p.d) / (1.0 + (x / p.c).powf(p.b)) + p.d
}

/// Forward evaluation with domain checks.
///
/// A fractional power of a non-positive base is undefined, so `x <= 0` is
/// rejected whenever the slope is non-integer. Non-finite results (e.g., from
/// extreme parameters) are also surfaced as errors rather than returned.
pub fn evaluate_forward(x: f64, p: &FitParams) -> Result<f64, AppError> {
    if x <= 0.0 && p.b.fract() != 0.0 {
        return Err(AppError::domain(format!(
            "Cannot evaluate the curve at x = {x}: non-positive concentration with fractional slope B = {}.",
            p.b
        )));
    }
    let y = curve(x, p);
    if y.is_finite() {
        Ok(y)
    } else {
        Err(AppError::domain(format!(
            "Curve evaluation at x = {x} is not finite."
        )))
    }
}

/// Inverse evaluation: `x = C * ((y - A) / (D - y))^(1/B)`.
///
/// Defined only for readings strictly between the two asymptotes (in
/// whichever order A and D fall); outside that range the ratio is negative
/// and the fractional power is undefined.
pub fn evaluate_inverse(y: f64, p: &FitParams) -> Result<f64, AppError> {
    if p.b == 0.0 {
        return Err(AppError::domain(
            "Inverse evaluation undefined for slope B = 0.",
        ));
    }
    let denom = p.d - y;
    if denom == 0.0 {
        return Err(AppError::domain(format!(
            "Reading {y} equals the asymptote D = {}; inverse is undefined.",
            p.d
        )));
    }
    let ratio = (y - p.a) / denom;
    if !(ratio.is_finite() && ratio > 0.0) {
        return Err(AppError::domain(format!(
            "Reading {y} is not strictly between the fitted asymptotes ({} and {}).",
            p.a, p.d
        )));
    }
    let x = p.c * ratio.powf(1.0 / p.b);
    if x.is_finite() {
        Ok(x)
    } else {
        Err(AppError::domain(format!(
            "Inverse evaluation for reading {y} is not finite."
        )))
    }
}

/// Interpolate an unknown sample concentration from its reading.
///
/// On top of the model's own domain check, readings outside the reference
/// standard's observed reading range are rejected: extrapolation beyond the
/// measured calibration range is unreliable, so only `reading_min < reading
/// < reading_max` (strict) is accepted.
pub fn predict_concentration(
    reading: f64,
    params: &FitParams,
    stats: &DatasetStats,
) -> Result<Prediction, AppError> {
    if !reading.is_finite() {
        return Err(AppError::invalid_argument(format!(
            "Sample reading must be a finite number (got {reading})."
        )));
    }
    if !(stats.reading_min < reading && reading < stats.reading_max) {
        return Err(AppError::domain(format!(
            "Reading {reading} is outside the reference standard range ({} to {}); values outside the observed minimum and maximum readings are invalid for prediction.",
            stats.reading_min, stats.reading_max
        )));
    }
    let concentration = evaluate_inverse(reading, params)?;
    Ok(Prediction {
        reading,
        concentration,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn params() -> FitParams {
        FitParams {
            a: 0.2,
            b: 1.5,
            c: 300.0,
            d: 2.6,
        }
    }

    #[test]
    fn forward_hits_asymptote_midpoint_at_ec50() {
        let p = params();
        let y = evaluate_forward(p.c, &p).unwrap();
        assert!((y - (p.a + p.d) / 2.0).abs() < 1e-12);
    }

    #[test]
    fn inverse_round_trips_forward() {
        let p = params();
        for &x in &[10.0, 62.5, 125.0, 250.0, 500.0, 1000.0] {
            let y = evaluate_forward(x, &p).unwrap();
            let back = evaluate_inverse(y, &p).unwrap();
            assert!(
                ((back - x) / x).abs() < 1e-6,
                "round trip failed: x={x}, back={back}"
            );
        }
    }

    #[test]
    fn inverse_rejects_readings_outside_asymptotes() {
        let p = params();
        for &y in &[0.1, 0.2, 2.6, 3.0] {
            let err = evaluate_inverse(y, &p).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Domain, "y={y} should be rejected");
        }
    }

    #[test]
    fn inverse_handles_descending_curves() {
        // Negative slope flips the asymptote order (D is the low end).
        let p = FitParams {
            a: 2.6,
            b: -1.5,
            c: 300.0,
            d: 0.2,
        };
        let y = evaluate_forward(150.0, &p).unwrap();
        let back = evaluate_inverse(y, &p).unwrap();
        assert!(((back - 150.0) / 150.0).abs() < 1e-6);
    }

    #[test]
    fn forward_rejects_non_positive_x_with_fractional_slope() {
        let err = evaluate_forward(-1.0, &params()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Domain);
        assert_eq!(evaluate_forward(0.0, &params()).unwrap_err().kind(), ErrorKind::Domain);
    }

    #[test]
    fn prediction_enforces_observed_reading_range() {
        let p = params();
        let stats = DatasetStats {
            n_points: 5,
            conc_min: 62.5,
            conc_max: 1000.0,
            reading_min: 1.115,
            reading_max: 2.372,
        };
        let ok = predict_concentration(1.8, &p, &stats).unwrap();
        assert!(ok.concentration > 0.0);

        // Strict bounds: the endpoints themselves are rejected.
        for &r in &[1.0, 1.115, 2.372, 2.5] {
            let err = predict_concentration(r, &p, &stats).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Domain, "reading {r} should be rejected");
        }
    }
}
