//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - resolves reference standards (CSV, inline series, or synthetic demo)
//! - runs the fit pipeline
//! - prints reports/plots
//! - writes optional exports
//!
//! All user-facing printing happens here: the core modules only return data
//! and typed errors.

use clap::Parser;

use crate::cli::{Cli, Command, DemoArgs, FitArgs, FitKnobs, OutputArgs, PlotArgs, PredictArgs};
use crate::domain::{FitConfig, InputSource};
use crate::error::{AppError, ErrorKind};
use crate::io::report::ReportInput;
use crate::report::RejectedReading;

pub mod pipeline;

/// Entry point for the `elisa` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Demo(args) => handle_demo(args),
        Command::Predict(args) => handle_predict(args),
        Command::Plot(args) => handle_plot(args),
    }
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let input = resolve_fit_input(&args)?;
    let config = fit_config(input, &args.knobs, &args.output);
    run_and_emit(&config)
}

fn handle_demo(args: DemoArgs) -> Result<(), AppError> {
    let input = InputSource::Demo {
        count: args.count,
        start: args.start,
        factor: args.factor,
        noise_sd: args.noise,
        seed: args.knobs.seed,
    };
    let config = fit_config(input, &args.knobs, &args.output);
    run_and_emit(&config)
}

/// Resolve standards, fit, and print/export. When the fit cannot converge the
/// raw standards are still plotted (no curve) so the data can be eyeballed
/// before the error surfaces.
fn run_and_emit(config: &FitConfig) -> Result<(), AppError> {
    let (points, row_errors) = pipeline::resolve_standards(&config.input)?;
    match pipeline::run_fit_on_points(points.clone(), row_errors, config) {
        Ok(run) => emit_outputs(&run, config),
        Err(err) if err.kind() == ErrorKind::Convergence && config.plot => {
            // Best-effort: if the points themselves are unplottable, the
            // convergence error is still the one to report.
            if let Ok(plot) =
                crate::plot::render_ascii_points(&points, config.plot_width, config.plot_height)
            {
                println!("No usable curve; showing raw standards only.");
                println!("{plot}");
            }
            Err(err)
        }
        Err(err) => Err(err),
    }
}

fn handle_predict(args: PredictArgs) -> Result<(), AppError> {
    let curve_file = crate::io::curve::read_curve_json(&args.curve)?;

    let mut predictions = Vec::new();
    let mut rejected = Vec::new();
    for &reading in &args.readings {
        match crate::models::predict_concentration(reading, &curve_file.params, &curve_file.stats) {
            Ok(p) => predictions.push(p),
            Err(e) => rejected.push(RejectedReading {
                reading,
                reason: e.to_string(),
            }),
        }
    }

    print!(
        "{}",
        crate::report::format_predictions_table(&predictions, &rejected)
    );
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let curve_file = crate::io::curve::read_curve_json(&args.curve)?;
    let plot = crate::plot::render_ascii_plot_from_curve_file(&curve_file, args.width, args.height)?;
    println!("{plot}");
    Ok(())
}

fn resolve_fit_input(args: &FitArgs) -> Result<InputSource, AppError> {
    if let Some(path) = &args.csv {
        return Ok(InputSource::Csv(path.clone()));
    }
    match (args.start, args.factor) {
        (Some(start), Some(factor)) if !args.readings.is_empty() => Ok(InputSource::Series {
            start,
            factor,
            readings: args.readings.clone(),
        }),
        _ => Err(AppError::invalid_argument(
            "Provide either --csv, or --start/--factor with --readings.",
        )),
    }
}

fn fit_config(input: InputSource, knobs: &FitKnobs, output: &OutputArgs) -> FitConfig {
    FitConfig {
        input,
        predict_readings: output.predict.clone(),
        max_iterations: knobs.max_iterations,
        max_attempts: knobs.max_attempts,
        slope_steps: knobs.slope_steps,
        ec50_steps: knobs.ec50_steps,
        seed: knobs.seed,
        plot: !output.no_plot,
        plot_width: output.width,
        plot_height: output.height,
        export_results: output.export.clone(),
        export_curve: output.export_curve.clone(),
        chart: output.chart.clone(),
        report: output.report.clone(),
    }
}

/// Print terminal output and write the configured exports.
fn emit_outputs(run: &pipeline::RunOutput, config: &FitConfig) -> Result<(), AppError> {
    for e in &run.row_errors {
        eprintln!("warning: CSV line {}: {}", e.line, e.message);
    }

    println!("{}", crate::report::format_run_summary(&run.stats, &run.fit));
    println!("{}", crate::report::format_standards_table(&run.residuals));
    println!(
        "{}",
        crate::report::format_predictions_table(&run.predictions, &run.rejected)
    );

    if config.plot {
        let plot = crate::plot::render_ascii_plot(
            &run.residuals,
            &run.fit.params,
            &run.predictions,
            config.plot_width,
            config.plot_height,
        )?;
        println!("{plot}");
    }

    if let Some(path) = &config.export_results {
        crate::io::export::write_results_csv(path, &run.residuals, &run.predictions)?;
    }
    if let Some(path) = &config.export_curve {
        crate::io::curve::write_curve_json(path, &run.fit, &run.stats)?;
    }

    // The chart is rendered once and reused by the HTML report when both are
    // requested.
    let chart_svg = if config.chart.is_some() || config.report.is_some() {
        Some(crate::plot::render_svg_chart(
            &run.residuals,
            &run.fit.params,
            &run.predictions,
        )?)
    } else {
        None
    };

    if let (Some(path), Some(svg)) = (&config.chart, chart_svg.as_deref()) {
        std::fs::write(path, svg).map_err(|e| {
            AppError::io(format!("Failed to write chart '{}': {e}", path.display()))
        })?;
    }

    if let Some(path) = &config.report {
        crate::io::report::write_report_html(
            path,
            &ReportInput {
                fit: &run.fit,
                stats: &run.stats,
                residuals: &run.residuals,
                predictions: &run.predictions,
                chart_svg: chart_svg.as_deref(),
            },
        )?;
    }

    Ok(())
}
