//! Residual computation and formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use crate::domain::{DatasetStats, FitParams, FitResult, Prediction, StandardPoint, StandardResidual};
use crate::error::AppError;
use crate::models::curve;

/// A sample reading the prediction layer rejected, with the reason.
#[derive(Debug, Clone)]
pub struct RejectedReading {
    pub reading: f64,
    pub reason: String,
}

/// Compute fitted values and residuals for each standard.
pub fn compute_residuals(
    points: &[StandardPoint],
    params: &FitParams,
) -> Result<Vec<StandardResidual>, AppError> {
    let mut out = Vec::with_capacity(points.len());
    for p in points {
        let fitted = curve(p.concentration, params);
        if !fitted.is_finite() {
            return Err(AppError::domain(
                "Non-finite model value during residual computation.",
            ));
        }
        out.push(StandardResidual {
            point: *p,
            fitted,
            residual: p.reading - fitted,
        });
    }
    Ok(out)
}

/// Format the full run summary (dataset stats + fit diagnostics).
pub fn format_run_summary(stats: &DatasetStats, fit: &FitResult) -> String {
    let mut out = String::new();

    out.push_str("=== elisa - 4PL Standard Curve Fit ===\n");
    out.push_str(&format!(
        "Standards: n={} | concentration=[{:.4}, {:.4}] | reading=[{:.4}, {:.4}]\n",
        stats.n_points, stats.conc_min, stats.conc_max, stats.reading_min, stats.reading_max
    ));

    let p = &fit.params;
    out.push_str(&format!(
        "4PL parameters: A = {:.4}, B = {:.4}, C = {:.4}, D = {:.4}\n",
        p.a, p.b, p.c, p.d
    ));
    out.push_str(&format!(
        "R-squared: {:.4} | RMSE: {:.4} | SSE: {:.4}\n",
        fit.quality.r_squared, fit.quality.rmse, fit.quality.sse
    ));

    out
}

/// Format the standards table with fitted values and residuals.
pub fn format_standards_table(residuals: &[StandardResidual]) -> String {
    let mut out = String::new();
    out.push_str("Reference standard results:\n");
    out.push_str(&format!(
        "{:>14} {:>10} {:>10} {:>10}\n",
        "concentration", "reading", "fitted", "residual"
    ));
    out.push_str(&format!(
        "{:->14} {:->10} {:->10} {:->10}\n",
        "", "", "", ""
    ));
    for r in residuals {
        out.push_str(&format!(
            "{:>14.4} {:>10.4} {:>10.4} {:>10.4}\n",
            r.point.concentration, r.point.reading, r.fitted, r.residual
        ));
    }
    out
}

/// Format the sample prediction table, including rejected readings.
pub fn format_predictions_table(
    predictions: &[Prediction],
    rejected: &[RejectedReading],
) -> String {
    let mut out = String::new();
    out.push_str("Sample results:\n");

    if predictions.is_empty() && rejected.is_empty() {
        out.push_str("(no sample readings supplied)\n");
        return out;
    }

    if !predictions.is_empty() {
        out.push_str(&format!("{:>14} {:>14}\n", "sample reading", "concentration"));
        out.push_str(&format!("{:->14} {:->14}\n", "", ""));
        for p in predictions {
            out.push_str(&format!("{:>14.4} {:>14.3}\n", p.reading, p.concentration));
        }
    }

    for r in rejected {
        out.push_str(&format!("(rejected {:.4}) {}\n", r.reading, r.reason));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FitQuality;

    fn params() -> FitParams {
        FitParams {
            a: 0.2,
            b: 1.5,
            c: 300.0,
            d: 2.6,
        }
    }

    #[test]
    fn residuals_vanish_on_exact_data() {
        let points: Vec<StandardPoint> = [62.5, 250.0, 1000.0]
            .iter()
            .map(|&concentration| StandardPoint {
                concentration,
                reading: curve(concentration, &params()),
            })
            .collect();

        let residuals = compute_residuals(&points, &params()).unwrap();
        assert_eq!(residuals.len(), 3);
        for r in &residuals {
            assert!(r.residual.abs() < 1e-12);
        }
    }

    #[test]
    fn summary_prints_parameters_to_four_decimals() {
        let stats = DatasetStats {
            n_points: 5,
            conc_min: 62.5,
            conc_max: 1000.0,
            reading_min: 1.115,
            reading_max: 2.372,
        };
        let fit = FitResult {
            params: params(),
            quality: FitQuality {
                sse: 0.0012,
                rmse: 0.0155,
                r_squared: 0.9981,
                n: 5,
            },
        };
        let out = format_run_summary(&stats, &fit);
        assert!(out.contains("A = 0.2000, B = 1.5000, C = 300.0000, D = 2.6000"));
        assert!(out.contains("R-squared: 0.9981"));
    }

    #[test]
    fn predictions_table_lists_rejections() {
        let predictions = [Prediction {
            reading: 1.8,
            concentration: 312.456,
        }];
        let rejected = [RejectedReading {
            reading: 3.0,
            reason: "outside the reference standard range".to_string(),
        }];
        let out = format_predictions_table(&predictions, &rejected);
        assert!(out.contains("312.456"));
        assert!(out.contains("(rejected 3.0000)"));
    }

    #[test]
    fn empty_predictions_say_so() {
        let out = format_predictions_table(&[], &[]);
        assert!(out.contains("no sample readings"));
    }
}
