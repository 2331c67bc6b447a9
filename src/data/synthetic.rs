//! Synthetic light curves for demonstrations and tests.
//!
//! A nominal model is rescaled in depth and white Gaussian noise is added:
//!
//! `f_i = 1 + s0 (m0_i − 1) + b0 σ z_i`,  `z_i ~ N(0, 1)`
//!
//! The generator is seeded, so the same `NoiseSpec` always produces the same curve.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use crate::domain::LightCurve;
use crate::error::AppError;
use crate::models::LightCurveModel;

/// Noise injection settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseSpec {
    /// True depth-scale factor `s0`.
    pub depth_scale: f64,
    /// Nominal per-point uncertainty `σ`.
    pub sigma: f64,
    /// True noise-inflation factor `b0` (0 gives noiseless data).
    pub inflation: f64,
    pub seed: u64,
}

impl NoiseSpec {
    fn validate(&self) -> Result<(), AppError> {
        if !self.depth_scale.is_finite() {
            return Err(AppError::new(2, "Depth scale must be finite."));
        }
        if !(self.sigma.is_finite() && self.sigma > 0.0) {
            return Err(AppError::new(2, "Nominal sigma must be positive."));
        }
        if !(self.inflation.is_finite() && self.inflation >= 0.0) {
            return Err(AppError::new(2, "Noise inflation must be non-negative."));
        }
        Ok(())
    }
}

/// Rescale `model` and add noise.
pub fn simulate_flux(model: &[f64], spec: &NoiseSpec) -> Result<Vec<f64>, AppError> {
    spec.validate()?;

    let mut rng = StdRng::seed_from_u64(spec.seed);
    let normal = Normal::new(0.0, spec.inflation * spec.sigma)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    Ok(model
        .iter()
        .map(|&m| 1.0 + spec.depth_scale * (m - 1.0) + normal.sample(&mut rng))
        .collect())
}

/// Evaluate `model` on a uniform grid over `[start, end]` and simulate flux on it.
///
/// The returned curve carries `flux_err = σ` and the noiseless template in its model column.
pub fn simulate_light_curve(
    model: &dyn LightCurveModel,
    start: f64,
    end: f64,
    points: usize,
    spec: &NoiseSpec,
) -> Result<LightCurve, AppError> {
    if points < 2 {
        return Err(AppError::new(2, "Need at least 2 points to simulate a light curve."));
    }
    if !(start.is_finite() && end.is_finite() && end > start) {
        return Err(AppError::new(2, "Invalid time range for simulation."));
    }

    let step = (end - start) / (points as f64 - 1.0);
    let time: Vec<f64> = (0..points).map(|i| start + step * i as f64).collect();

    let template = model.evaluate(&time);
    if template.len() != time.len() {
        return Err(AppError::new(
            4,
            format!(
                "Model returned {} values for {} time points.",
                template.len(),
                time.len()
            ),
        ));
    }

    let flux = simulate_flux(&template, spec)?;
    Ok(LightCurve {
        flux_err: Some(vec![spec.sigma; time.len()]),
        model: Some(template),
        time,
        flux,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(seed: u64) -> NoiseSpec {
        NoiseSpec {
            depth_scale: 0.5,
            sigma: 1e-3,
            inflation: 2.0,
            seed,
        }
    }

    #[test]
    fn same_seed_same_flux() {
        let model = vec![1.0, 0.99, 0.98, 0.99, 1.0];
        let a = simulate_flux(&model, &spec(1)).unwrap();
        let b = simulate_flux(&model, &spec(1)).unwrap();
        let c = simulate_flux(&model, &spec(2)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn zero_inflation_is_noiseless() {
        let model = vec![1.0, 0.99, 0.98];
        let spec = NoiseSpec {
            inflation: 0.0,
            ..spec(3)
        };
        let flux = simulate_flux(&model, &spec).unwrap();
        assert_eq!(flux, vec![1.0, 1.0 + 0.5 * (0.99 - 1.0), 1.0 + 0.5 * (0.98 - 1.0)]);
    }

    #[test]
    fn noise_has_requested_spread() {
        let model = vec![1.0; 50_000];
        let flux = simulate_flux(&model, &spec(4)).unwrap();
        let n = flux.len() as f64;
        let var = flux.iter().map(|f| (f - 1.0).powi(2)).sum::<f64>() / n;
        assert!((var.sqrt() - 2e-3).abs() < 5e-5, "std = {}", var.sqrt());
    }

    #[test]
    fn rejects_bad_settings() {
        let model = vec![1.0, 0.99];
        for bad in [
            NoiseSpec { sigma: 0.0, ..spec(0) },
            NoiseSpec { inflation: -1.0, ..spec(0) },
            NoiseSpec { depth_scale: f64::NAN, ..spec(0) },
        ] {
            assert_eq!(simulate_flux(&model, &bad).unwrap_err().exit_code(), 2);
        }
    }

    #[test]
    fn light_curve_grid_and_columns() {
        let dip = |t: f64| if t.abs() < 0.1 { 0.99 } else { 1.0 };
        let lc = simulate_light_curve(&dip, -0.5, 0.5, 11, &spec(5)).unwrap();
        assert_eq!(lc.len(), 11);
        assert!((lc.time[0] + 0.5).abs() < 1e-12);
        assert!((lc.time[10] - 0.5).abs() < 1e-12);
        assert_eq!(lc.flux_err.as_ref().map(Vec::len), Some(11));
        assert_eq!(lc.model.as_ref().map(|m| m[5]), Some(0.99));
    }
}
