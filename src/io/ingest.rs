//! CSV ingest and validation for reference standards.
//!
//! This module turns a `concentration,reading` CSV into clean
//! `StandardPoint`s that are safe to fit.
//!
//! Design goals:
//! - **Strict schema** for the two required columns (clear errors)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Separation of concerns**: no fitting logic here

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;

use crate::domain::StandardPoint;
use crate::error::AppError;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: validated points plus per-row diagnostics.
#[derive(Debug, Clone)]
pub struct IngestedStandards {
    pub points: Vec<StandardPoint>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Load and validate a standards CSV.
pub fn load_standards(path: &Path) -> Result<IngestedStandards, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open CSV '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::io(format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    for required in ["concentration", "reading"] {
        if !header_map.contains_key(required) {
            return Err(AppError::invalid_argument(format!(
                "Missing required column: `{required}`"
            )));
        }
    }

    let mut points = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts on the line after the header and CSV line
        // numbers are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &header_map) {
            Ok(point) => points.push(point),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    if points.is_empty() {
        return Err(AppError::invalid_argument(format!(
            "No valid standards in '{}'.",
            path.display()
        )));
    }

    Ok(IngestedStandards {
        points,
        row_errors,
        rows_read,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. Strip it so schema validation doesn't report the column
    // as missing.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<StandardPoint, String> {
    let concentration = parse_f64(get_required(record, header_map, "concentration")?)?;
    let reading = parse_f64(get_required(record, header_map, "reading")?)?;

    if concentration <= 0.0 {
        return Err(format!(
            "Concentration must be > 0 (got {concentration})."
        ));
    }

    Ok(StandardPoint {
        concentration,
        reading,
    })
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn parse_f64(s: &str) -> Result<f64, String> {
    let v = s
        .parse::<f64>()
        .map_err(|_| format!("Invalid number '{s}'."))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(format!("Non-finite number '{s}'."))
    }
}
