//! Read/write curve JSON files.
//!
//! Curve JSON is the "portable" representation of a fitted standard curve:
//! - the 4PL parameters and fit quality
//! - the stats of the dataset it was fit on (needed to bound later
//!   predictions to the observed reading range)
//! - a precomputed fitted grid for quick plotting
//!
//! The schema is defined by `domain::CurveFile`.

use std::fs::File;
use std::path::Path;

use crate::domain::{CurveFile, CurveGrid, DatasetStats, FitParams, FitResult};
use crate::error::AppError;
use crate::models::curve;

/// Points in the precomputed plotting grid.
const GRID_POINTS: usize = 101;

/// Write a curve JSON file.
pub fn write_curve_json(
    path: &Path,
    fit: &FitResult,
    stats: &DatasetStats,
) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::io(format!(
            "Failed to create curve JSON '{}': {e}",
            path.display()
        ))
    })?;

    let (concentration, reading) =
        build_grid(&fit.params, stats.conc_min, stats.conc_max, GRID_POINTS);

    let curve_file = CurveFile {
        tool: "elisa".to_string(),
        created: chrono::Local::now().date_naive(),
        params: fit.params,
        quality: fit.quality.clone(),
        stats: stats.clone(),
        grid: CurveGrid {
            concentration,
            reading,
        },
    };

    serde_json::to_writer_pretty(file, &curve_file)
        .map_err(|e| AppError::io(format!("Failed to write curve JSON: {e}")))?;

    Ok(())
}

/// Read a curve JSON file.
pub fn read_curve_json(path: &Path) -> Result<CurveFile, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::io(format!(
            "Failed to open curve JSON '{}': {e}",
            path.display()
        ))
    })?;
    let curve_file: CurveFile = serde_json::from_reader(file)
        .map_err(|e| AppError::io(format!("Invalid curve JSON: {e}")))?;
    Ok(curve_file)
}

/// Evaluate the fitted curve on an evenly spaced grid across the measured
/// concentration range.
pub fn build_grid(params: &FitParams, conc_min: f64, conc_max: f64, n: usize) -> (Vec<f64>, Vec<f64>) {
    let n = n.max(2);
    let mut x0 = conc_min;
    let mut x1 = conc_max;
    if !(x0.is_finite() && x1.is_finite()) || x1 <= x0 {
        x0 = 1.0;
        x1 = 1000.0;
    }

    let mut concentration = Vec::with_capacity(n);
    let mut reading = Vec::with_capacity(n);
    for i in 0..n {
        let u = i as f64 / (n as f64 - 1.0);
        let x = x0 + u * (x1 - x0);
        concentration.push(x);
        reading.push(curve(x, params));
    }
    (concentration, reading)
}
