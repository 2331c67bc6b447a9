//! Reporting utilities: residuals and formatted terminal output.

pub mod format;

pub use format::*;

use crate::domain::{PointResidual, ScaledFit, Sigma};
use crate::error::AppError;

/// Compute the scaled model and residuals for each point.
///
/// `sigma` must be aligned with `flux` when per-point.
pub fn compute_residuals(
    time: &[f64],
    flux: &[f64],
    model: &[f64],
    sigma: Sigma<'_>,
    fit: &ScaledFit,
) -> Result<Vec<PointResidual>, AppError> {
    if time.len() != flux.len() || model.len() != flux.len() {
        return Err(AppError::new(4, "Residual inputs have mismatched lengths."));
    }
    if sigma.explicit_len().is_some_and(|n| n != flux.len()) {
        return Err(AppError::new(4, "Residual uncertainties have mismatched length."));
    }

    let scaled = fit.scaled_model(model);
    Ok((0..flux.len())
        .map(|i| {
            let residual = flux[i] - scaled[i];
            PointResidual {
                time: time[i],
                flux: flux[i],
                model: model[i],
                scaled_model: scaled[i],
                residual,
                normalized: residual / (fit.b * sigma.at(i)),
            }
        })
        .collect())
}

/// The `top_n` points with the largest normalized residuals (by magnitude), largest first.
pub fn largest_residuals(residuals: &[PointResidual], top_n: usize) -> Vec<PointResidual> {
    let mut sorted = residuals.to_vec();
    sorted.sort_by(|a, b| {
        b.normalized
            .abs()
            .partial_cmp(&a.normalized.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    sorted.truncate(top_n);
    sorted
}
