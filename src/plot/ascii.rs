//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! The x-axis is logarithmic: serial dilutions are exponentially spaced, so a
//! linear axis would crush all but the top dilution into the left margin.
//!
//! Plot elements:
//! - reference standards: `o`
//! - fitted curve: `-` line
//! - predicted samples: `*`

use crate::domain::{CurveFile, FitParams, Prediction, StandardPoint, StandardResidual};
use crate::error::AppError;
use crate::models::curve;

/// Render a plot for an in-memory fit result.
pub fn render_ascii_plot(
    residuals: &[StandardResidual],
    params: &FitParams,
    predictions: &[Prediction],
    width: usize,
    height: usize,
) -> Result<String, AppError> {
    let points: Vec<StandardPoint> = residuals.iter().map(|r| r.point).collect();
    let (x_min, x_max) = conc_range(points.iter().map(|p| p.concentration))
        .ok_or_else(|| AppError::invalid_argument("Nothing to plot: no valid standards."))?;
    let curve_points = sample_curve(params, x_min, x_max, width.max(2));
    Ok(render_plot(
        &points,
        Some(&curve_points),
        predictions,
        x_min,
        x_max,
        width,
        height,
    ))
}

/// Render the raw standards alone, with no fitted curve. Used when the fit
/// fails to converge so the caller can still show what the data looks like.
pub fn render_ascii_points(
    points: &[StandardPoint],
    width: usize,
    height: usize,
) -> Result<String, AppError> {
    let (x_min, x_max) = conc_range(points.iter().map(|p| p.concentration))
        .ok_or_else(|| AppError::invalid_argument("Nothing to plot: no valid standards."))?;
    Ok(render_plot(points, None, &[], x_min, x_max, width, height))
}

/// Render a plot from a saved curve JSON file (curve only, no overlays).
pub fn render_ascii_plot_from_curve_file(
    curve_file: &CurveFile,
    width: usize,
    height: usize,
) -> Result<String, AppError> {
    let (x_min, x_max) = conc_range(curve_file.grid.concentration.iter().copied())
        .ok_or_else(|| AppError::invalid_argument("Curve file grid has no plottable range."))?;
    let curve_points: Vec<(f64, f64)> = curve_file
        .grid
        .concentration
        .iter()
        .zip(curve_file.grid.reading.iter())
        .map(|(&x, &y)| (x, y))
        .collect();

    Ok(render_plot(
        &[],
        Some(&curve_points),
        &[],
        x_min,
        x_max,
        width,
        height,
    ))
}

fn render_plot(
    points: &[StandardPoint],
    curve_points: Option<&[(f64, f64)]>,
    predictions: &[Prediction],
    x_min: f64,
    x_max: f64,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (y_min, y_max) = y_range(points, curve_points, predictions).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Draw curve first (so points can overlay).
    if let Some(points) = curve_points {
        draw_curve(&mut grid, points, x_min, x_max, y_min, y_max);
    }

    for p in points {
        let x = map_x(p.concentration, x_min, x_max, width);
        let y = map_y(p.reading, y_min, y_max, height);
        grid[y][x] = 'o';
    }

    for p in predictions {
        let x = map_x(p.concentration, x_min, x_max, width);
        let y = map_y(p.reading, y_min, y_max, height);
        grid[y][x] = '*';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: concentration=[{x_min:.3}, {x_max:.3}] (log axis) | reading=[{y_min:.3}, {y_max:.3}]\n"
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

fn conc_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    for v in values {
        if v.is_finite() && v > 0.0 {
            min_x = min_x.min(v);
            max_x = max_x.max(v);
        }
    }
    if min_x.is_finite() && max_x.is_finite() && max_x > min_x {
        Some((min_x, max_x))
    } else {
        None
    }
}

/// Sample the fitted curve log-uniformly so the drawn line is smooth on the
/// log axis.
fn sample_curve(params: &FitParams, x_min: f64, x_max: f64, n: usize) -> Vec<(f64, f64)> {
    let n = n.max(2);
    let ln0 = x_min.ln();
    let ln1 = x_max.ln();
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let u = i as f64 / (n as f64 - 1.0);
        let x = (ln0 + u * (ln1 - ln0)).exp();
        out.push((x, curve(x, params)));
    }
    out
}

fn y_range(
    points: &[StandardPoint],
    curve_points: Option<&[(f64, f64)]>,
    predictions: &[Prediction],
) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for p in points {
        min_y = min_y.min(p.reading);
        max_y = max_y.max(p.reading);
    }
    if let Some(points) = curve_points {
        for &(_, y) in points {
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
    }
    for p in predictions {
        min_y = min_y.min(p.reading);
        max_y = max_y.max(p.reading);
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

/// Map a concentration onto a column via log scaling.
fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let ln0 = x_min.ln();
    let ln1 = x_max.ln();
    let u = ((x.max(f64::MIN_POSITIVE).ln() - ln0) / (ln1 - ln0)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y = max maps to row 0.
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(
    grid: &mut [Vec<char>],
    points: &[(f64, f64)],
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
) {
    if points.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in points {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        if let Some((c0, r0)) = prev {
            draw_line(grid, c0, r0, col, row, '-');
        } else {
            grid[row][col] = '-';
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StandardPoint;

    fn residuals() -> Vec<StandardResidual> {
        [
            (1000.0, 2.372),
            (250.0, 2.227),
            (62.5, 1.115),
        ]
        .into_iter()
        .map(|(concentration, reading)| StandardResidual {
            point: StandardPoint {
                concentration,
                reading,
            },
            fitted: reading,
            residual: 0.0,
        })
        .collect()
    }

    fn params() -> FitParams {
        FitParams {
            a: 0.2,
            b: 1.5,
            c: 300.0,
            d: 2.6,
        }
    }

    #[test]
    fn plot_has_expected_dimensions_and_markers() {
        let txt = render_ascii_plot(&residuals(), &params(), &[], 40, 12).unwrap();
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines.len(), 13); // header + height rows
        assert!(lines[0].starts_with("Plot: concentration=[62.500, 1000.000]"));
        assert!(lines.iter().skip(1).all(|l| l.chars().count() == 40));
        let flat: String = lines[1..].concat();
        assert_eq!(flat.matches('o').count(), 3);
        assert!(flat.contains('-'));
    }

    #[test]
    fn predictions_show_as_stars() {
        let predictions = [Prediction {
            reading: 1.8,
            concentration: 300.0,
        }];
        let txt = render_ascii_plot(&residuals(), &params(), &predictions, 40, 12).unwrap();
        assert!(txt.contains('*'));
    }

    #[test]
    fn points_only_plot_has_markers_but_no_curve() {
        let points: Vec<StandardPoint> = residuals().iter().map(|r| r.point).collect();
        let txt = render_ascii_points(&points, 40, 12).unwrap();
        let flat: String = txt.lines().skip(1).collect();
        assert_eq!(flat.matches('o').count(), 3);
        assert!(!flat.contains('-'));
        assert!(!flat.contains('*'));
    }

    #[test]
    fn log_mapping_centers_geometric_midpoint() {
        // 250 is the geometric midpoint of [62.5, 1000], so on a log axis it
        // lands in the middle column.
        let col = map_x(250.0, 62.5, 1000.0, 41);
        assert_eq!(col, 20);
    }

    #[test]
    fn plot_from_curve_file_renders_curve() {
        let (concentration, reading) =
            crate::io::build_grid(&params(), 62.5, 1000.0, 101);
        let curve_file = CurveFile {
            tool: "elisa".to_string(),
            created: chrono::NaiveDate::from_ymd_opt(2026, 8, 28).unwrap(),
            params: params(),
            quality: crate::domain::FitQuality {
                sse: 0.0,
                rmse: 0.0,
                r_squared: 1.0,
                n: 5,
            },
            stats: crate::domain::DatasetStats {
                n_points: 5,
                conc_min: 62.5,
                conc_max: 1000.0,
                reading_min: 1.115,
                reading_max: 2.372,
            },
            grid: crate::domain::CurveGrid {
                concentration,
                reading,
            },
        };
        let txt = render_ascii_plot_from_curve_file(&curve_file, 40, 10).unwrap();
        // Inspect the grid rows only; the header line contains letters.
        let flat: String = txt.lines().skip(1).collect();
        assert!(flat.contains('-'));
        assert!(!flat.contains('o'));
    }
}
