//! SVG standard-curve chart via Plotters.
//!
//! SVG (rather than a bitmap backend) keeps the dependency surface small: no
//! native font or rasterizer libraries are needed, and the markup can be
//! inlined directly into the HTML report.

use plotters::prelude::*;

use crate::domain::{FitParams, Prediction, StandardResidual};
use crate::error::AppError;
use crate::models::curve;

const CHART_SIZE: (u32, u32) = (800, 600);
const CURVE_SAMPLES: usize = 200;

/// Render the standard curve chart and return the SVG markup.
pub fn render_svg_chart(
    residuals: &[StandardResidual],
    params: &FitParams,
    predictions: &[Prediction],
) -> Result<String, AppError> {
    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for r in residuals {
        x_min = x_min.min(r.point.concentration);
        x_max = x_max.max(r.point.concentration);
        y_min = y_min.min(r.point.reading);
        y_max = y_max.max(r.point.reading);
    }
    if !(x_min.is_finite() && x_max.is_finite() && x_max > x_min && x_min > 0.0) {
        return Err(AppError::invalid_argument(
            "Nothing to chart: standards do not span a positive concentration range.",
        ));
    }

    // Curve sampled log-uniformly for a smooth line on the log axis.
    let ln0 = x_min.ln();
    let ln1 = x_max.ln();
    let curve_points: Vec<(f64, f64)> = (0..CURVE_SAMPLES)
        .map(|i| {
            let u = i as f64 / (CURVE_SAMPLES as f64 - 1.0);
            let x = (ln0 + u * (ln1 - ln0)).exp();
            (x, curve(x, params))
        })
        .collect();
    for &(_, y) in &curve_points {
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    let pad = ((y_max - y_min).abs() * 0.05).max(1e-9);
    let (y_min, y_max) = (y_min - pad, y_max + pad);

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| AppError::io(format!("Chart rendering failed: {e}")))?;

        let mut chart = ChartBuilder::on(&root)
            .caption("Standard Curve", ("sans-serif", 28))
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d((x_min..x_max).log_scale(), y_min..y_max)
            .map_err(|e| AppError::io(format!("Chart rendering failed: {e}")))?;

        chart
            .configure_mesh()
            .x_desc("Concentration")
            .y_desc("Reading")
            .draw()
            .map_err(|e| AppError::io(format!("Chart rendering failed: {e}")))?;

        chart
            .draw_series(LineSeries::new(curve_points.iter().copied(), &BLUE))
            .map_err(|e| AppError::io(format!("Chart rendering failed: {e}")))?
            .label("Reference Standard")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

        chart
            .draw_series(
                residuals
                    .iter()
                    .map(|r| Circle::new((r.point.concentration, r.point.reading), 4, BLUE.filled())),
            )
            .map_err(|e| AppError::io(format!("Chart rendering failed: {e}")))?;

        if !predictions.is_empty() {
            chart
                .draw_series(
                    predictions
                        .iter()
                        .map(|p| Circle::new((p.concentration, p.reading), 4, RED.filled())),
                )
                .map_err(|e| AppError::io(format!("Chart rendering failed: {e}")))?
                .label("Samples")
                .legend(|(x, y)| Circle::new((x + 10, y), 4, RED.filled()));
        }

        chart
            .configure_series_labels()
            .border_style(BLACK)
            .background_style(WHITE.mix(0.8))
            .draw()
            .map_err(|e| AppError::io(format!("Chart rendering failed: {e}")))?;

        root.present()
            .map_err(|e| AppError::io(format!("Chart rendering failed: {e}")))?;
    }
    Ok(svg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StandardPoint;

    fn residuals() -> Vec<StandardResidual> {
        [
            (1000.0, 2.372),
            (500.0, 2.335),
            (250.0, 2.227),
            (125.0, 1.637),
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

    #[test]
    fn renders_svg_with_series() {
        let params = FitParams {
            a: 0.2,
            b: 1.5,
            c: 300.0,
            d: 2.6,
        };
        let svg = render_svg_chart(&residuals(), &params, &[]).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Standard Curve"));
        assert!(svg.contains("</svg>"));
    }

    #[test]
    fn rejects_degenerate_concentration_range() {
        let params = FitParams {
            a: 0.2,
            b: 1.5,
            c: 300.0,
            d: 2.6,
        };
        let one = vec![StandardResidual {
            point: StandardPoint {
                concentration: 100.0,
                reading: 1.0,
            },
            fitted: 1.0,
            residual: 0.0,
        }];
        assert!(render_svg_chart(&one, &params, &[]).is_err());
    }
}
