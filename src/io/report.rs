//! HTML run-report generation.
//!
//! The report is a single self-contained page: a date stamp (good laboratory
//! practice wants results traceable to a run date), the fitted parameters and
//! R-squared, the standard curve chart (inlined SVG, so the file has no
//! external assets), and the standards/samples tables.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{DatasetStats, FitResult, Prediction, StandardResidual};
use crate::error::AppError;

/// Everything the report needs, already computed by the pipeline.
pub struct ReportInput<'a> {
    pub fit: &'a FitResult,
    pub stats: &'a DatasetStats,
    pub residuals: &'a [StandardResidual],
    pub predictions: &'a [Prediction],
    /// Inline SVG markup for the standard curve, if a chart was rendered.
    pub chart_svg: Option<&'a str>,
}

/// Render the report page.
pub fn render_report_html(input: &ReportInput<'_>) -> String {
    let mut out = String::new();
    let now = chrono::Local::now();

    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str("<title>ELISA Result Summary</title>\n");
    out.push_str(
        "<style>body{font-family:sans-serif;margin:2em;}table{border-collapse:collapse;}\
         th,td{border:1px solid #999;padding:0.3em 0.8em;text-align:right;}\
         th{background:#eee;}</style>\n",
    );
    out.push_str("</head>\n<body>\n");

    out.push_str("<h1 style=\"text-align:center;\">Result Summary</h1>\n");
    out.push_str(&format!(
        "<p>Report created on: {}</p>\n",
        now.format("%d %b %Y %H:%M:%S")
    ));

    let p = &input.fit.params;
    out.push_str("<h2>4PL Fit</h2>\n");
    out.push_str(&format!(
        "<p>A = {:.4}, B = {:.4}, C = {:.4}, D = {:.4}</p>\n",
        p.a, p.b, p.c, p.d
    ));
    out.push_str(&format!(
        "<p>R-squared: {:.4} (n = {})</p>\n",
        input.fit.quality.r_squared, input.fit.quality.n
    ));

    if let Some(svg) = input.chart_svg {
        out.push_str("<h2>Standard Curve</h2>\n");
        out.push_str(svg);
        out.push('\n');
    }

    out.push_str("<h2>Reference Standard Results</h2>\n");
    out.push_str("<table>\n<tr><th>concentration</th><th>reading</th><th>fitted</th><th>residual</th></tr>\n");
    for r in input.residuals {
        out.push_str(&format!(
            "<tr><td>{:.4}</td><td>{:.4}</td><td>{:.4}</td><td>{:.4}</td></tr>\n",
            r.point.concentration, r.point.reading, r.fitted, r.residual
        ));
    }
    out.push_str("</table>\n");

    if !input.predictions.is_empty() {
        out.push_str("<h2>Sample Results</h2>\n");
        out.push_str("<table>\n<tr><th>sample reading</th><th>concentration</th></tr>\n");
        for s in input.predictions {
            out.push_str(&format!(
                "<tr><td>{:.4}</td><td>{:.3}</td></tr>\n",
                s.reading, s.concentration
            ));
        }
        out.push_str("</table>\n");
    }

    out.push_str(&format!(
        "<p>Standards: n = {}, concentration range [{:.4}, {:.4}], reading range [{:.4}, {:.4}]</p>\n",
        input.stats.n_points,
        input.stats.conc_min,
        input.stats.conc_max,
        input.stats.reading_min,
        input.stats.reading_max
    ));

    out.push_str("</body>\n</html>\n");
    out
}

/// Render and write the report to disk.
pub fn write_report_html(path: &Path, input: &ReportInput<'_>) -> Result<(), AppError> {
    let html = render_report_html(input);
    let mut file = File::create(path).map_err(|e| {
        AppError::io(format!(
            "Failed to create report '{}': {e}",
            path.display()
        ))
    })?;
    file.write_all(html.as_bytes())
        .map_err(|e| AppError::io(format!("Failed to write report: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FitParams, FitQuality, StandardPoint};

    fn input_fixture() -> (FitResult, DatasetStats, Vec<StandardResidual>, Vec<Prediction>) {
        let fit = FitResult {
            params: FitParams {
                a: 0.2,
                b: 1.5,
                c: 300.0,
                d: 2.6,
            },
            quality: FitQuality {
                sse: 0.001,
                rmse: 0.014,
                r_squared: 0.9981,
                n: 5,
            },
        };
        let stats = DatasetStats {
            n_points: 5,
            conc_min: 62.5,
            conc_max: 1000.0,
            reading_min: 1.115,
            reading_max: 2.372,
        };
        let residuals = vec![StandardResidual {
            point: StandardPoint {
                concentration: 1000.0,
                reading: 2.372,
            },
            fitted: 2.37,
            residual: 0.002,
        }];
        let predictions = vec![Prediction {
            reading: 1.8,
            concentration: 312.5,
        }];
        (fit, stats, residuals, predictions)
    }

    #[test]
    fn report_contains_all_sections() {
        let (fit, stats, residuals, predictions) = input_fixture();
        let html = render_report_html(&ReportInput {
            fit: &fit,
            stats: &stats,
            residuals: &residuals,
            predictions: &predictions,
            chart_svg: Some("<svg></svg>"),
        });

        assert!(html.contains("Result Summary"));
        assert!(html.contains("Report created on:"));
        assert!(html.contains("R-squared: 0.9981"));
        assert!(html.contains("<svg></svg>"));
        assert!(html.contains("Reference Standard Results"));
        assert!(html.contains("Sample Results"));
        assert!(html.contains("312.500"));
    }

    #[test]
    fn samples_section_is_omitted_when_empty() {
        let (fit, stats, residuals, _) = input_fixture();
        let html = render_report_html(&ReportInput {
            fit: &fit,
            stats: &stats,
            residuals: &residuals,
            predictions: &[],
            chart_svg: None,
        });
        assert!(!html.contains("Sample Results"));
        assert!(!html.contains("<svg"));
    }
}
