//! Command-line parsing for the scaled transit fitter.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the fitting/math code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "tsfit", version, about = "Scaled transit depth fit with noise inflation")]
pub struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error).
    #[arg(long, global = true, env = "TSFIT_LOG", default_value = "info")]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit the depth scale and noise inflation of a light curve.
    Fit(FitArgs),
    /// Write a synthetic light curve from a model template.
    Simulate(SimulateArgs),
}

/// Options for fitting.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Light curve CSV (`time`, `flux`, optional `flux_err`, `model`).
    #[arg(short, long, value_name = "CSV")]
    pub input: PathBuf,

    /// Model template CSV (`time`, `model`) evaluated on the input times.
    ///
    /// Without a template the input's `model` column is used.
    #[arg(short, long, value_name = "CSV")]
    pub template: Option<PathBuf>,

    /// Uniform nominal uncertainty (overrides the input's `flux_err` column).
    #[arg(long)]
    pub sigma: Option<f64>,

    /// Centre of the fit window.
    #[arg(long, requires = "half_width")]
    pub t0: Option<f64>,

    /// Half-width of the fit window around `--t0`.
    #[arg(long, requires = "t0")]
    pub half_width: Option<f64>,

    /// Nominal depth of the model, for reporting the fitted depth in ppm.
    ///
    /// Defaults to the template's depth when a template is given.
    #[arg(long)]
    pub depth: Option<f64>,

    /// Show the N largest normalized residuals.
    #[arg(long, default_value_t = 10)]
    pub top: usize,

    /// Worker threads for large inputs (0 = rayon default).
    #[arg(long, default_value_t = 0)]
    pub threads: usize,

    /// Export the fit report to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,

    /// Export per-point residuals to CSV.
    #[arg(long = "export-residuals", value_name = "CSV")]
    pub export_residuals: Option<PathBuf>,
}

/// Options for writing a synthetic light curve.
#[derive(Debug, Parser, Clone)]
pub struct SimulateArgs {
    /// Model template CSV (`time`, `model`).
    #[arg(short, long, value_name = "CSV")]
    pub template: PathBuf,

    /// Output light curve CSV.
    #[arg(short, long, value_name = "CSV")]
    pub out: PathBuf,

    /// Number of points on the uniform time grid.
    #[arg(short = 'n', long, default_value_t = 1000)]
    pub points: usize,

    /// Grid start time.
    #[arg(long, default_value_t = -0.2, allow_hyphen_values = true)]
    pub start: f64,

    /// Grid end time.
    #[arg(long, default_value_t = 0.2, allow_hyphen_values = true)]
    pub end: f64,

    /// True depth-scale factor.
    #[arg(long, default_value_t = 1.0)]
    pub depth_scale: f64,

    /// Nominal per-point uncertainty written to `flux_err`.
    #[arg(long, default_value_t = 5e-4)]
    pub sigma: f64,

    /// True noise-inflation factor.
    #[arg(long, default_value_t = 1.0)]
    pub inflation: f64,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}
