//! Shared "fit pipeline" logic behind the CLI commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! ingest -> window -> nominal model -> scaled fit -> residuals -> report
//!
//! The CLI can then focus on presentation (printing and exports).

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::data::{NoiseSpec, simulate_light_curve};
use crate::domain::{
    DepthSummary, FitConfig, FitReport, LightCurve, PointResidual, ScaledFit, SimulateConfig,
};
use crate::error::AppError;
use crate::fit::{ScaledTransitFit, curve_sigma, model_on_grid};
use crate::io::{IngestedCurve, load_light_curve, load_template, write_light_curve_csv};

/// All computed outputs of a single `tsfit fit` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedCurve,
    /// The points that entered the fit (after windowing).
    pub curve: LightCurve,
    pub model: Vec<f64>,
    pub fit: ScaledFit,
    pub residuals: Vec<PointResidual>,
    pub report: FitReport,
}

/// Execute the full fitting pipeline and return the computed outputs.
pub fn run_fit(config: &FitConfig, fitter: &ScaledTransitFit) -> Result<RunOutput, AppError> {
    // 1) Load the light curve.
    let ingest = load_light_curve(&config.input)?;
    info!(
        path = %config.input.display(),
        rows = ingest.rows_read,
        used = ingest.rows_used(),
        "light curve loaded"
    );
    for e in &ingest.row_errors {
        warn!(line = e.line, "skipped row: {}", e.message);
    }

    // 2) Restrict to the window, if any.
    let curve = match config.window {
        Some(w) => {
            let windowed = ingest.curve.window(w.t0, w.half_width);
            debug!(t0 = w.t0, half_width = w.half_width, kept = windowed.len(), "window applied");
            windowed
        }
        None => ingest.curve.clone(),
    };
    if curve.is_empty() {
        return Err(AppError::new(2, "No points inside the fit window."));
    }

    // 3) Nominal model: template evaluated on the grid, else the model column.
    let (model, template_depth) = match &config.template {
        Some(path) => {
            let template = load_template(path)?;
            debug!(path = %path.display(), samples = template.len(), "template loaded");
            (model_on_grid(&curve, &template)?, Some(template.depth()))
        }
        None => {
            let column = curve.model.clone().ok_or_else(|| {
                AppError::new(2, "No model: pass --template or provide a `model` column.")
            })?;
            (column, None)
        }
    };

    // 4) Fit.
    let sigma = curve_sigma(&curve, config.sigma)?;
    let fit = fitter.fit(&curve.flux, sigma, &model)?;
    info!(
        s = fit.s,
        sigma_s = fit.sigma_s,
        b = fit.b,
        sigma_b = fit.sigma_b,
        n = fit.n,
        "fit complete"
    );

    // 5) Residuals and report.
    let residuals = crate::report::compute_residuals(&curve.time, &curve.flux, &model, sigma, &fit)?;

    let depth = config.nominal_depth.or(template_depth).map(|nominal| {
        let (depth, depth_err) = fit.depth(nominal);
        DepthSummary {
            nominal,
            depth,
            depth_err,
            noise_ppm: fit.depth_noise_ppm(nominal),
        }
    });

    let report = FitReport {
        tool: "tsfit".to_string(),
        generated: Utc::now(),
        input: config.input.display().to_string(),
        points_used: curve.len(),
        window: config.window,
        fit,
        depth,
    };

    Ok(RunOutput {
        ingest,
        curve,
        model,
        fit,
        residuals,
        report,
    })
}

/// Simulate a light curve from a template and write it to CSV.
pub fn run_simulate(config: &SimulateConfig) -> Result<LightCurve, AppError> {
    let template = load_template(&config.template)?;
    let spec = NoiseSpec {
        depth_scale: config.depth_scale,
        sigma: config.sigma,
        inflation: config.inflation,
        seed: config.seed,
    };
    let curve = simulate_light_curve(&template, config.start, config.end, config.points, &spec)?;
    write_light_curve_csv(&config.out, &curve)?;
    info!(
        path = %config.out.display(),
        points = curve.len(),
        seed = config.seed,
        "synthetic light curve written"
    );
    Ok(curve)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FitWindow;
    use crate::io::{read_report_json, write_report_json};
    use std::path::PathBuf;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tsfit-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_template(dir: &std::path::Path) -> PathBuf {
        let path = dir.join("template.csv");
        let mut text = String::from("time,model\n");
        for i in 0..=200 {
            let t = -0.1 + 0.001 * i as f64;
            let x = t / 0.05;
            let m = if x.abs() < 1.0 { 1.0 - 1e-3 * (1.0 - x * x) } else { 1.0 };
            text.push_str(&format!("{t},{m}\n"));
        }
        std::fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn simulate_then_fit_end_to_end() {
        let dir = scratch_dir("e2e");
        let template = write_template(&dir);
        let lc_path = dir.join("lc.csv");

        let sim = SimulateConfig {
            template: template.clone(),
            out: lc_path.clone(),
            points: 3_000,
            start: -0.15,
            end: 0.15,
            depth_scale: 0.7,
            sigma: 1e-4,
            inflation: 1.3,
            seed: 21,
        };
        run_simulate(&sim).unwrap();

        let config = FitConfig {
            input: lc_path,
            template: Some(template),
            sigma: None,
            window: Some(FitWindow {
                t0: 0.0,
                half_width: 0.1,
            }),
            nominal_depth: None,
            export_json: None,
            export_residuals: None,
        };
        let run = run_fit(&config, &ScaledTransitFit::default()).unwrap();

        assert!(run.curve.len() < run.ingest.rows_used());
        assert!((run.fit.s - 0.7).abs() < 4.0 * run.fit.sigma_s, "s = {}", run.fit.s);
        assert!((run.fit.b - 1.3).abs() < 4.0 * run.fit.sigma_b, "b = {}", run.fit.b);
        assert_eq!(run.residuals.len(), run.curve.len());

        let depth = run.report.depth.unwrap();
        assert!((depth.nominal - 1e-3).abs() < 1e-9);

        let json = dir.join("report.json");
        write_report_json(&json, &run.report).unwrap();
        assert_eq!(read_report_json(&json).unwrap(), run.report);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn fit_without_model_is_a_config_error() {
        let dir = scratch_dir("nomodel");
        let lc_path = dir.join("lc.csv");
        std::fs::write(&lc_path, "time,flux,flux_err\n0,1,0.001\n1,0.99,0.001\n").unwrap();

        let config = FitConfig {
            input: lc_path,
            template: None,
            sigma: None,
            window: None,
            nominal_depth: None,
            export_json: None,
            export_residuals: None,
        };
        let err = run_fit(&config, &ScaledTransitFit::default()).unwrap_err();
        assert_eq!(err.exit_code(), 2);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn flat_model_column_reports_degenerate_exit_code() {
        let dir = scratch_dir("flat");
        let lc_path = dir.join("lc.csv");
        std::fs::write(&lc_path, "time,flux,model\n0,1.001,1\n1,0.999,1\n2,1.0,1\n").unwrap();

        let config = FitConfig {
            input: lc_path,
            template: None,
            sigma: Some(1e-3),
            window: None,
            nominal_depth: None,
            export_json: None,
            export_residuals: None,
        };
        let err = run_fit(&config, &ScaledTransitFit::default()).unwrap_err();
        assert_eq!(err.exit_code(), 3);

        std::fs::remove_dir_all(&dir).ok();
    }
}
