//! Shared fit-pipeline logic used by every subcommand front-end.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! standards -> fit -> residuals -> sample predictions
//!
//! The CLI handlers then focus on presentation (printing and file exports).

use crate::data::generate_standards;
use crate::domain::{
    DatasetStats, FitConfig, FitResult, InputSource, Prediction, StandardPoint, StandardResidual,
};
use crate::error::AppError;
use crate::fit::{FitOptions, fit_standard_curve};
use crate::io::ingest::{IngestedStandards, load_standards};
use crate::models::predict_concentration;
use crate::report::{RejectedReading, compute_residuals};
use crate::series::generate_series;

/// All computed outputs of a single fit run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub points: Vec<StandardPoint>,
    pub stats: DatasetStats,
    pub fit: FitResult,
    pub residuals: Vec<StandardResidual>,
    pub predictions: Vec<Prediction>,
    pub rejected: Vec<RejectedReading>,
    /// CSV row-level diagnostics, when the input came from a file.
    pub row_errors: Vec<crate::io::ingest::RowError>,
}

/// Resolve the configured input source into reference standards.
pub fn resolve_standards(
    source: &InputSource,
) -> Result<(Vec<StandardPoint>, Vec<crate::io::ingest::RowError>), AppError> {
    match source {
        InputSource::Csv(path) => {
            let IngestedStandards {
                points, row_errors, ..
            } = load_standards(path)?;
            Ok((points, row_errors))
        }
        InputSource::Series {
            start,
            factor,
            readings,
        } => {
            let concentrations = generate_series(readings.len(), *factor, *start)?;
            let points = concentrations
                .into_iter()
                .zip(readings.iter())
                .map(|(concentration, &reading)| StandardPoint {
                    concentration,
                    reading,
                })
                .collect();
            Ok((points, Vec::new()))
        }
        InputSource::Demo {
            count,
            start,
            factor,
            noise_sd,
            seed,
        } => {
            let points = generate_standards(*count, *factor, *start, *noise_sd, *seed)?;
            Ok((points, Vec::new()))
        }
    }
}

/// Execute the full fitting pipeline and return the computed outputs.
pub fn run_fit(config: &FitConfig) -> Result<RunOutput, AppError> {
    let (points, row_errors) = resolve_standards(&config.input)?;
    run_fit_on_points(points, row_errors, config)
}

/// Fit already-resolved standards. Split out from [`run_fit`] so a caller
/// that resolved the points itself still has them when the fit fails and can
/// fall back to showing the raw data.
pub fn run_fit_on_points(
    points: Vec<StandardPoint>,
    row_errors: Vec<crate::io::ingest::RowError>,
    config: &FitConfig,
) -> Result<RunOutput, AppError> {
    let stats = DatasetStats::from_points(&points)?;

    let x: Vec<f64> = points.iter().map(|p| p.concentration).collect();
    let y: Vec<f64> = points.iter().map(|p| p.reading).collect();

    let opts = FitOptions {
        max_iterations: config.max_iterations,
        max_attempts: config.max_attempts,
        slope_steps: config.slope_steps,
        ec50_steps: config.ec50_steps,
        seed: config.seed,
    };
    let fit = fit_standard_curve(&x, &y, &opts)?;
    let residuals = compute_residuals(&points, &fit.params)?;

    // Each sample prediction is independent: a rejected reading is reported
    // but never aborts the run.
    let mut predictions = Vec::new();
    let mut rejected = Vec::new();
    for &reading in &config.predict_readings {
        match predict_concentration(reading, &fit.params, &stats) {
            Ok(p) => predictions.push(p),
            Err(e) => rejected.push(RejectedReading {
                reading,
                reason: e.to_string(),
            }),
        }
    }

    Ok(RunOutput {
        points,
        stats,
        fit,
        residuals,
        predictions,
        rejected,
        row_errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config(input: InputSource) -> FitConfig {
        FitConfig {
            input,
            predict_readings: Vec::new(),
            max_iterations: 200,
            max_attempts: 3,
            slope_steps: 12,
            ec50_steps: 25,
            seed: 42,
            plot: false,
            plot_width: 80,
            plot_height: 20,
            export_results: None,
            export_curve: None,
            chart: None,
            report: None,
        }
    }

    #[test]
    fn series_input_runs_end_to_end() {
        let mut config = base_config(InputSource::Series {
            start: 1000.0,
            factor: 2.0,
            readings: vec![2.372, 2.335, 2.227, 1.637, 1.115],
        });
        config.predict_readings = vec![1.8, 9.0];

        let run = run_fit(&config).unwrap();
        assert_eq!(run.points.len(), 5);
        assert!((run.points[0].concentration - 1000.0).abs() < 1e-12);
        assert!((run.points[4].concentration - 62.5).abs() < 1e-12);
        assert!(run.fit.quality.r_squared > 0.95);

        // 1.8 is inside the observed reading range, 9.0 is not.
        assert_eq!(run.predictions.len(), 1);
        assert_eq!(run.rejected.len(), 1);
        assert!((run.rejected[0].reading - 9.0).abs() < 1e-12);
        let p = run.predictions[0];
        assert!(p.concentration > 62.5 && p.concentration < 1000.0);
    }

    #[test]
    fn demo_input_recovers_the_truth_closely() {
        let config = base_config(InputSource::Demo {
            count: 8,
            start: 1000.0,
            factor: 2.0,
            noise_sd: 0.0,
            seed: 1,
        });
        let run = run_fit(&config).unwrap();
        assert!(run.fit.quality.r_squared > 0.999999);
    }

    #[test]
    fn convergence_failure_leaves_points_for_a_raw_plot() {
        // factor 1 keeps every concentration at 1000, which no sigmoid can
        // fit; the resolved standards must still come back intact so the
        // caller can show the raw data.
        let config = base_config(InputSource::Series {
            start: 1000.0,
            factor: 1.0,
            readings: vec![2.372, 2.335, 2.227, 1.637, 1.115],
        });
        let (points, row_errors) = resolve_standards(&config.input).unwrap();
        let err = run_fit_on_points(points.clone(), row_errors, &config).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Convergence);
        assert_eq!(points.len(), 5);
    }

    #[test]
    fn series_and_readings_lengths_must_match_count() {
        // Series input derives the count from the readings, so a short list
        // hits the minimum-standards check rather than a length mismatch.
        let config = base_config(InputSource::Series {
            start: 1000.0,
            factor: 2.0,
            readings: vec![2.372, 2.335],
        });
        let err = run_fit(&config).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidArgument);
    }
}
