//! Synthetic reference-standard generation.
//!
//! `elisa demo` runs the full pipeline without lab data: standards are
//! sampled from a known 4PL curve with seeded Gaussian read noise, so demo
//! output is reproducible for a given seed.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{FitParams, StandardPoint};
use crate::error::AppError;
use crate::models::curve;
use crate::series::generate_series;

/// True parameters behind the synthetic standards.
///
/// Chosen to resemble a typical sandwich-ELISA absorbance curve: blank wells
/// read near 0.2 OD, saturated wells near 2.5 OD, inflection mid-range.
pub const DEMO_TRUTH: FitParams = FitParams {
    a: 0.2,
    b: 1.3,
    c: 180.0,
    d: 2.5,
};

/// Generate `count` synthetic standards along a serial dilution from `start`
/// by `factor`, with Gaussian noise of standard deviation `noise_sd` on the
/// readings.
pub fn generate_standards(
    count: usize,
    factor: f64,
    start: f64,
    noise_sd: f64,
    seed: u64,
) -> Result<Vec<StandardPoint>, AppError> {
    if !(noise_sd.is_finite() && noise_sd >= 0.0) {
        return Err(AppError::invalid_argument(format!(
            "Noise standard deviation must be finite and >= 0 (got {noise_sd})."
        )));
    }

    let concentrations = generate_series(count, factor, start)?;

    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::invalid_argument(format!("Noise distribution error: {e}")))?;

    let points = concentrations
        .into_iter()
        .map(|concentration| {
            let noise = normal.sample(&mut rng) * noise_sd;
            StandardPoint {
                concentration,
                reading: curve(concentration, &DEMO_TRUTH) + noise,
            }
        })
        .collect();

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_requested_count() {
        let points = generate_standards(8, 2.0, 1000.0, 0.03, 42).unwrap();
        assert_eq!(points.len(), 8);
        assert!(points.iter().all(|p| p.reading.is_finite()));
        assert!(points.windows(2).all(|w| w[1].concentration < w[0].concentration));
    }

    #[test]
    fn same_seed_same_data() {
        let a = generate_standards(6, 2.0, 500.0, 0.05, 7).unwrap();
        let b = generate_standards(6, 2.0, 500.0, 0.05, 7).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn zero_noise_lies_on_the_true_curve() {
        let points = generate_standards(5, 2.0, 1000.0, 0.0, 1).unwrap();
        for p in &points {
            assert!((p.reading - curve(p.concentration, &DEMO_TRUTH)).abs() < 1e-12);
        }
    }

    #[test]
    fn rejects_negative_noise() {
        assert!(generate_standards(5, 2.0, 1000.0, -0.1, 1).is_err());
    }
}
