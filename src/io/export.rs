//! CSV exports: light curves and per-point residuals.
//!
//! The exports are meant to be easy to consume in spreadsheets or downstream
//! scripts, and light-curve exports load back through `ingest`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::{LightCurve, PointResidual};
use crate::error::AppError;

/// Write a light curve to a CSV file.
pub fn write_light_curve_csv(path: &Path, curve: &LightCurve) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create light curve CSV '{}': {e}", path.display()))
    })?;
    let mut out = BufWriter::new(file);
    write_light_curve(&mut out, curve)?;
    out.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush light curve CSV: {e}")))
}

/// Write a light curve as CSV. Optional columns are emitted only when present.
pub fn write_light_curve<W: Write>(out: &mut W, curve: &LightCurve) -> Result<(), AppError> {
    let mut header = String::from("time,flux");
    if curve.flux_err.is_some() {
        header.push_str(",flux_err");
    }
    if curve.model.is_some() {
        header.push_str(",model");
    }
    writeln!(out, "{header}")
        .map_err(|e| AppError::new(2, format!("Failed to write light curve CSV header: {e}")))?;

    for i in 0..curve.len() {
        let mut row = format!("{},{}", curve.time[i], curve.flux[i]);
        if let Some(err) = &curve.flux_err {
            row.push_str(&format!(",{}", err[i]));
        }
        if let Some(model) = &curve.model {
            row.push_str(&format!(",{}", model[i]));
        }
        writeln!(out, "{row}")
            .map_err(|e| AppError::new(2, format!("Failed to write light curve CSV row: {e}")))?;
    }
    Ok(())
}

/// Write per-point residuals to a CSV file.
pub fn write_residuals_csv(path: &Path, residuals: &[PointResidual]) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create residual CSV '{}': {e}", path.display()))
    })?;
    let mut out = BufWriter::new(file);

    writeln!(out, "time,flux,model,scaled_model,residual,normalized_residual")
        .map_err(|e| AppError::new(2, format!("Failed to write residual CSV header: {e}")))?;

    for r in residuals {
        writeln!(
            out,
            "{},{},{},{},{:.6e},{:.6}",
            r.time, r.flux, r.model, r.scaled_model, r.residual, r.normalized,
        )
        .map_err(|e| AppError::new(2, format!("Failed to write residual CSV row: {e}")))?;
    }

    out.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush residual CSV: {e}")))
}
