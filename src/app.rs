//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - initializes logging
//! - runs the fit or simulation pipeline
//! - prints reports
//! - writes optional exports

use clap::Parser;
use tracing::info;

use crate::cli::{Cli, Command, FitArgs, SimulateArgs};
use crate::domain::{FitConfig, FitWindow, SimulateConfig};
use crate::error::AppError;
use crate::fit::ScaledTransitFit;

pub mod pipeline;

/// Entry point for the `tsfit` binary.
pub fn run() -> Result<(), AppError> {
    // A `.env` next to the data may set `TSFIT_LOG`; a missing file is fine.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Simulate(args) => handle_simulate(args),
    }
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    if args.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(args.threads)
            .build_global()
            .map_err(|e| AppError::new(4, format!("Failed to configure thread pool: {e}")))?;
    }

    let config = fit_config_from_args(&args);
    let run = pipeline::run_fit(&config, &ScaledTransitFit::default())?;

    println!(
        "{}",
        crate::report::format_run_summary(
            &run.report,
            run.ingest.rows_read,
            run.ingest.row_errors.len()
        )
    );

    if args.top > 0 {
        let top = crate::report::largest_residuals(&run.residuals, args.top);
        println!("{}", crate::report::format_residual_table(&top));
    }

    // Optional exports.
    if let Some(path) = &config.export_json {
        crate::io::write_report_json(path, &run.report)?;
        info!(path = %path.display(), "report written");
    }
    if let Some(path) = &config.export_residuals {
        crate::io::write_residuals_csv(path, &run.residuals)?;
        info!(path = %path.display(), "residuals written");
    }

    Ok(())
}

fn handle_simulate(args: SimulateArgs) -> Result<(), AppError> {
    let config = simulate_config_from_args(&args);
    let curve = pipeline::run_simulate(&config)?;
    println!("Wrote {} points to {}", curve.len(), config.out.display());
    Ok(())
}

pub fn fit_config_from_args(args: &FitArgs) -> FitConfig {
    let window = match (args.t0, args.half_width) {
        (Some(t0), Some(half_width)) => Some(FitWindow { t0, half_width }),
        _ => None,
    };
    FitConfig {
        input: args.input.clone(),
        template: args.template.clone(),
        sigma: args.sigma,
        window,
        nominal_depth: args.depth,
        export_json: args.export_json.clone(),
        export_residuals: args.export_residuals.clone(),
    }
}

pub fn simulate_config_from_args(args: &SimulateArgs) -> SimulateConfig {
    SimulateConfig {
        template: args.template.clone(),
        out: args.out.clone(),
        points: args.points,
        start: args.start,
        end: args.end,
        depth_scale: args.depth_scale,
        sigma: args.sigma,
        inflation: args.inflation,
        seed: args.seed,
    }
}
