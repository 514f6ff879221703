//! Export run results to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream
//! scripts: one row per reference standard (with fitted value and residual)
//! followed by one row per predicted sample.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{Prediction, StandardResidual};
use crate::error::AppError;

/// Write per-standard and per-sample results to a CSV file.
pub fn write_results_csv(
    path: &Path,
    residuals: &[StandardResidual],
    predictions: &[Prediction],
) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::io(format!(
            "Failed to create export CSV '{}': {e}",
            path.display()
        ))
    })?;

    writeln!(file, "kind,concentration,reading,fitted_reading,residual")
        .map_err(|e| AppError::io(format!("Failed to write export CSV header: {e}")))?;

    for r in residuals {
        writeln!(
            file,
            "standard,{:.6},{:.6},{:.6},{:.6}",
            r.point.concentration, r.point.reading, r.fitted, r.residual
        )
        .map_err(|e| AppError::io(format!("Failed to write export CSV row: {e}")))?;
    }

    for p in predictions {
        writeln!(file, "sample,{:.6},{:.6},,", p.concentration, p.reading)
            .map_err(|e| AppError::io(format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}
