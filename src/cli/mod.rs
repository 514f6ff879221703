//! Command-line parsing for the ELISA standard-curve fitter.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the modeling/math code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "elisa", version, about = "ELISA 4PL standard-curve fitter")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit a standard curve, print diagnostics, and optionally predict/plot/export.
    Fit(FitArgs),
    /// Fit synthetic standards (known truth plus noise) through the same pipeline.
    Demo(DemoArgs),
    /// Interpolate sample concentrations from a saved curve JSON.
    Predict(PredictArgs),
    /// Plot a previously exported curve JSON.
    Plot(PlotArgs),
}

/// Options for fitting real standards.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Standards CSV with `concentration,reading` columns.
    #[arg(long, value_name = "CSV", conflicts_with_all = ["start", "factor", "readings"])]
    pub csv: Option<PathBuf>,

    /// Starting concentration of the reference standard (with --factor/--readings).
    #[arg(long, requires_all = ["factor", "readings"])]
    pub start: Option<f64>,

    /// Serial dilution factor.
    #[arg(long)]
    pub factor: Option<f64>,

    /// Comma-separated readings, one per generated concentration (min 5).
    #[arg(long, value_delimiter = ',')]
    pub readings: Vec<f64>,

    #[command(flatten)]
    pub knobs: FitKnobs,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Options for the synthetic demo run.
#[derive(Debug, Parser, Clone)]
pub struct DemoArgs {
    /// Number of synthetic standards to generate.
    #[arg(short = 'n', long, default_value_t = 8)]
    pub count: usize,

    /// Starting concentration of the synthetic dilution.
    #[arg(long, default_value_t = 1000.0)]
    pub start: f64,

    /// Serial dilution factor.
    #[arg(long, default_value_t = 2.0)]
    pub factor: f64,

    /// Standard deviation of the Gaussian read noise.
    #[arg(long, default_value_t = 0.03)]
    pub noise: f64,

    #[command(flatten)]
    pub knobs: FitKnobs,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Fit-engine knobs shared by `fit` and `demo`.
#[derive(Debug, Args, Clone)]
pub struct FitKnobs {
    /// Maximum optimizer iterations per attempt.
    #[arg(long, default_value_t = 200)]
    pub max_iterations: usize,

    /// Fit attempts (first from the grid seed, the rest perturbed).
    #[arg(long, default_value_t = 3)]
    pub max_attempts: usize,

    /// Slope grid steps per sign.
    #[arg(long, default_value_t = 12)]
    pub slope_steps: usize,

    /// EC50 grid steps.
    #[arg(long, default_value_t = 25)]
    pub ec50_steps: usize,

    /// Random seed (demo noise and perturbed retries).
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

/// Prediction/presentation/export options shared by `fit` and `demo`.
#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    /// Sample readings to interpolate after fitting (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub predict: Vec<f64>,

    /// Disable the terminal plot (enabled by default).
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export per-standard and per-sample results to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the fitted curve (params + quality + grid) to JSON.
    #[arg(long = "export-curve")]
    pub export_curve: Option<PathBuf>,

    /// Write the standard curve chart as SVG.
    #[arg(long)]
    pub chart: Option<PathBuf>,

    /// Write a date-stamped HTML report.
    #[arg(long)]
    pub report: Option<PathBuf>,
}

/// Options for predicting from a saved curve.
#[derive(Debug, Parser)]
pub struct PredictArgs {
    /// Curve JSON file produced by `elisa fit --export-curve`.
    #[arg(long, value_name = "JSON")]
    pub curve: PathBuf,

    /// Sample readings to interpolate.
    #[arg(required = true, value_name = "READING")]
    pub readings: Vec<f64>,
}

/// Options for plotting a saved curve.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Curve JSON file produced by `elisa fit --export-curve`.
    #[arg(long, value_name = "JSON")]
    pub curve: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fit_with_inline_series() {
        let cli = Cli::try_parse_from([
            "elisa",
            "fit",
            "--start",
            "1000",
            "--factor",
            "2",
            "--readings",
            "2.372,2.335,2.227,1.637,1.115",
            "--predict",
            "1.8,2.0",
        ])
        .unwrap();

        let Command::Fit(args) = cli.command else {
            panic!("expected fit subcommand");
        };
        assert_eq!(args.start, Some(1000.0));
        assert_eq!(args.readings.len(), 5);
        assert_eq!(args.output.predict, vec![1.8, 2.0]);
        assert_eq!(args.knobs.max_attempts, 3);
    }

    #[test]
    fn csv_conflicts_with_inline_series() {
        let result = Cli::try_parse_from([
            "elisa",
            "fit",
            "--csv",
            "standards.csv",
            "--start",
            "1000",
            "--factor",
            "2",
            "--readings",
            "1,2,3,4,5",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn plot_is_on_unless_no_plot_is_passed() {
        let base = ["elisa", "fit", "--csv", "standards.csv"];
        let cli = Cli::try_parse_from(base).unwrap();
        let Command::Fit(args) = cli.command else {
            panic!("expected fit subcommand");
        };
        assert!(!args.output.no_plot);

        let mut argv = base.to_vec();
        argv.push("--no-plot");
        let cli = Cli::try_parse_from(argv).unwrap();
        let Command::Fit(args) = cli.command else {
            panic!("expected fit subcommand");
        };
        assert!(args.output.no_plot);
    }

    #[test]
    fn predict_requires_readings() {
        assert!(Cli::try_parse_from(["elisa", "predict", "--curve", "c.json"]).is_err());
        let cli =
            Cli::try_parse_from(["elisa", "predict", "--curve", "c.json", "1.8", "2.1"]).unwrap();
        let Command::Predict(args) = cli.command else {
            panic!("expected predict subcommand");
        };
        assert_eq!(args.readings, vec![1.8, 2.1]);
    }
}
