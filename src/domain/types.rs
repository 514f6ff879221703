//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting and prediction
//! - exported to JSON/CSV/HTML
//! - reloaded later for plotting or re-prediction

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// One calibration point of the reference standard: a known concentration
/// paired with its measured reading (e.g., absorbance).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandardPoint {
    pub concentration: f64,
    pub reading: f64,
}

/// Fitted 4PL parameters.
///
/// The model is `y = (A - D) / (1 + (x / C)^B) + D`:
///
/// - `a`: lower asymptote ("bottom", the reading as `x → 0` for `B > 0`)
/// - `b`: Hill slope (steepness; sign controls curve direction)
/// - `c`: inflection point (EC50, the `x` halfway between the asymptotes)
/// - `d`: upper asymptote ("top")
///
/// Parameters exist only as the output of a successful fit and are never
/// mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitParams {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

/// Fit quality diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitQuality {
    pub sse: f64,
    pub rmse: f64,
    pub r_squared: f64,
    pub n: usize,
}

/// Fit output: parameters plus quality over the dataset they were fit on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitResult {
    pub params: FitParams,
    pub quality: FitQuality,
}

/// A per-standard fitted result (used for tables, plots, and exports).
#[derive(Debug, Clone)]
pub struct StandardResidual {
    pub point: StandardPoint,
    pub fitted: f64,
    pub residual: f64,
}

/// One interpolated unknown: a measured reading mapped back through the
/// fitted curve to a concentration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Prediction {
    pub reading: f64,
    pub concentration: f64,
}

/// Summary stats about the standards actually used for fitting.
///
/// `reading_min`/`reading_max` bound the interpolation range: sample readings
/// outside them are rejected rather than extrapolated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetStats {
    pub n_points: usize,
    pub conc_min: f64,
    pub conc_max: f64,
    pub reading_min: f64,
    pub reading_max: f64,
}

impl DatasetStats {
    pub fn from_points(points: &[StandardPoint]) -> Result<Self, AppError> {
        if points.is_empty() {
            return Err(AppError::invalid_argument("No standard points provided."));
        }
        let mut conc_min = f64::INFINITY;
        let mut conc_max = f64::NEG_INFINITY;
        let mut reading_min = f64::INFINITY;
        let mut reading_max = f64::NEG_INFINITY;
        for p in points {
            if !(p.concentration.is_finite() && p.reading.is_finite()) {
                return Err(AppError::invalid_argument(format!(
                    "Non-finite standard point: concentration={}, reading={}.",
                    p.concentration, p.reading
                )));
            }
            conc_min = conc_min.min(p.concentration);
            conc_max = conc_max.max(p.concentration);
            reading_min = reading_min.min(p.reading);
            reading_max = reading_max.max(p.reading);
        }
        Ok(Self {
            n_points: points.len(),
            conc_min,
            conc_max,
            reading_min,
            reading_max,
        })
    }
}

/// A saved curve file (JSON).
///
/// This is the portable representation of a fitted standard curve:
/// parameters, quality, the stats of the dataset it was fit on (needed to
/// bound later predictions), and a precomputed grid for quick plotting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveFile {
    pub tool: String,
    pub created: NaiveDate,
    pub params: FitParams,
    pub quality: FitQuality,
    pub stats: DatasetStats,
    pub grid: CurveGrid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveGrid {
    pub concentration: Vec<f64>,
    pub reading: Vec<f64>,
}

/// Where the reference standards for a run come from.
#[derive(Debug, Clone)]
pub enum InputSource {
    /// A two-column `concentration,reading` CSV file.
    Csv(PathBuf),
    /// A serial dilution described inline: the series is generated from
    /// `start`/`factor` and paired with `readings` in order.
    Series {
        start: f64,
        factor: f64,
        readings: Vec<f64>,
    },
    /// Synthetic standards sampled from a known 4PL curve plus noise.
    Demo {
        count: usize,
        start: f64,
        factor: f64,
        noise_sd: f64,
        seed: u64,
    },
}

/// Resolved run configuration (CLI args after validation/defaulting).
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub input: InputSource,
    /// Sample readings to interpolate after fitting.
    pub predict_readings: Vec<f64>,

    // Fit knobs.
    pub max_iterations: usize,
    pub max_attempts: usize,
    pub slope_steps: usize,
    pub ec50_steps: usize,
    pub seed: u64,

    // Presentation / exports.
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub export_results: Option<PathBuf>,
    pub export_curve: Option<PathBuf>,
    pub chart: Option<PathBuf>,
    pub report: Option<PathBuf>,
}
