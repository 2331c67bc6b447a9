//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON/CSV
//! - reloaded later for comparisons

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Nominal flux uncertainties.
///
/// A scalar is broadcast to every point; a slice must be aligned with the flux.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sigma<'a> {
    Uniform(f64),
    PerPoint(&'a [f64]),
}

impl Sigma<'_> {
    /// Uncertainty of point `i`.
    ///
    /// # Panics
    /// Panics if `i` is out of bounds for a per-point sigma.
    pub fn at(&self, i: usize) -> f64 {
        match self {
            Sigma::Uniform(s) => *s,
            Sigma::PerPoint(values) => values[i],
        }
    }

    /// Number of explicit values (`None` for a broadcast scalar).
    pub fn explicit_len(&self) -> Option<usize> {
        match self {
            Sigma::Uniform(_) => None,
            Sigma::PerPoint(values) => Some(values.len()),
        }
    }
}

impl From<f64> for Sigma<'_> {
    fn from(value: f64) -> Self {
        Sigma::Uniform(value)
    }
}

impl<'a> From<&'a [f64]> for Sigma<'a> {
    fn from(values: &'a [f64]) -> Self {
        Sigma::PerPoint(values)
    }
}

impl<'a> From<&'a Vec<f64>> for Sigma<'a> {
    fn from(values: &'a Vec<f64>) -> Self {
        Sigma::PerPoint(values.as_slice())
    }
}

impl<'a, const N: usize> From<&'a [f64; N]> for Sigma<'a> {
    fn from(values: &'a [f64; N]) -> Self {
        Sigma::PerPoint(values.as_slice())
    }
}

/// Point estimates of the scaled fit, before the curvature of the noise term is evaluated.
///
/// A perfect fit (`b = 0`) is a legal estimate here even though its `sigma_b`
/// is undefined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleEstimate {
    /// Depth-scale factor.
    pub s: f64,
    /// Noise-inflation factor.
    pub b: f64,
    /// Standard error of `s` for the nominal uncertainties (`1/sqrt(A)`).
    pub sigma_s_raw: f64,
    /// Standard error of `s` after noise inflation (`b/sqrt(A)`).
    pub sigma_s: f64,
    /// Weighted chi-square of the residuals at `s`.
    pub chi2: f64,
    pub n: usize,
}

/// Result of the scaled transit fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaledFit {
    /// Depth-scale factor.
    pub s: f64,
    /// Noise-inflation factor.
    pub b: f64,
    /// Standard error of `s`.
    pub sigma_s: f64,
    /// Standard error of `b`.
    pub sigma_b: f64,
    /// Weighted chi-square at the best fit (nominal uncertainties).
    pub chi2: f64,
    pub n: usize,
    /// Gaussian log-likelihood at the maximum.
    pub ln_like: f64,
}

impl ScaledFit {
    /// `(s, b, sigma_s, sigma_b)`.
    pub fn as_tuple(&self) -> (f64, f64, f64, f64) {
        (self.s, self.b, self.sigma_s, self.sigma_b)
    }

    /// The best-fit model `1 + s·(m0 − 1)`.
    pub fn scaled_model(&self, model: &[f64]) -> Vec<f64> {
        model.iter().map(|&m| 1.0 + self.s * (m - 1.0)).collect()
    }

    /// Depth and its standard error for a template of nominal depth `nominal_depth`.
    pub fn depth(&self, nominal_depth: f64) -> (f64, f64) {
        (self.s * nominal_depth, self.sigma_s * nominal_depth)
    }

    /// Depth uncertainty in parts per million.
    pub fn depth_noise_ppm(&self, nominal_depth: f64) -> f64 {
        1e6 * self.sigma_s * nominal_depth
    }
}

/// A normalized light curve.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LightCurve {
    pub time: Vec<f64>,
    pub flux: Vec<f64>,
    /// Nominal per-point standard errors, if the source provided them.
    pub flux_err: Option<Vec<f64>>,
    /// Nominal model evaluated on `time`, if the source provided it.
    pub model: Option<Vec<f64>>,
}

impl LightCurve {
    pub fn len(&self) -> usize {
        self.flux.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flux.is_empty()
    }

    /// Keep only points with `|t - t0| <= half_width`.
    ///
    /// Optional columns are filtered with the same mask.
    pub fn window(&self, t0: f64, half_width: f64) -> LightCurve {
        let keep: Vec<usize> = self
            .time
            .iter()
            .enumerate()
            .filter_map(|(i, &t)| ((t - t0).abs() <= half_width).then_some(i))
            .collect();

        let pick = |values: &[f64]| keep.iter().map(|&i| values[i]).collect::<Vec<f64>>();

        LightCurve {
            time: pick(&self.time),
            flux: pick(&self.flux),
            flux_err: self.flux_err.as_deref().map(pick),
            model: self.model.as_deref().map(pick),
        }
    }
}

/// Time window used to select the points that enter a fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitWindow {
    pub t0: f64,
    pub half_width: f64,
}

/// A full `tsfit fit` run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub input: PathBuf,
    /// Template to evaluate on the input time grid; if absent the input's `model` column is used.
    pub template: Option<PathBuf>,
    /// Uniform nominal uncertainty overriding the input's `flux_err` column.
    pub sigma: Option<f64>,
    pub window: Option<FitWindow>,
    /// Depth of the nominal model, used to report a physical depth.
    pub nominal_depth: Option<f64>,
    pub export_json: Option<PathBuf>,
    pub export_residuals: Option<PathBuf>,
}

/// Configuration of `tsfit simulate`.
#[derive(Debug, Clone)]
pub struct SimulateConfig {
    pub template: PathBuf,
    pub out: PathBuf,
    pub points: usize,
    pub start: f64,
    pub end: f64,
    pub depth_scale: f64,
    pub sigma: f64,
    pub inflation: f64,
    pub seed: u64,
}

/// Derived depth figures for a report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthSummary {
    pub nominal: f64,
    pub depth: f64,
    pub depth_err: f64,
    pub noise_ppm: f64,
}

/// A saved fit report (JSON).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitReport {
    pub tool: String,
    pub generated: DateTime<Utc>,
    pub input: String,
    pub points_used: usize,
    pub window: Option<FitWindow>,
    pub fit: ScaledFit,
    pub depth: Option<DepthSummary>,
}

/// A per-point fitted result (used for residual exports).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointResidual {
    pub time: f64,
    pub flux: f64,
    pub model: f64,
    pub scaled_model: f64,
    pub residual: f64,
    /// Residual in units of the inflated uncertainty `b·σ`.
    pub normalized: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_filters_optional_columns_with_the_same_mask() {
        let lc = LightCurve {
            time: vec![-2.0, -1.0, 0.0, 1.0, 2.0],
            flux: vec![1.0, 0.99, 0.98, 0.99, 1.0],
            flux_err: Some(vec![0.1, 0.2, 0.3, 0.4, 0.5]),
            model: None,
        };
        let w = lc.window(0.0, 1.0);
        assert_eq!(w.time, vec![-1.0, 0.0, 1.0]);
        assert_eq!(w.flux, vec![0.99, 0.98, 0.99]);
        assert_eq!(w.flux_err, Some(vec![0.2, 0.3, 0.4]));
        assert!(w.model.is_none());
    }

    #[test]
    fn sigma_broadcasts_scalars() {
        let s = Sigma::from(0.5);
        assert_eq!(s.at(10), 0.5);
        assert_eq!(s.explicit_len(), None);

        let v = vec![1.0, 2.0];
        let s = Sigma::from(&v);
        assert_eq!(s.at(1), 2.0);
        assert_eq!(s.explicit_len(), Some(2));
    }

    #[test]
    fn derived_depth_figures() {
        let fit = ScaledFit {
            s: 0.8,
            b: 1.1,
            sigma_s: 0.05,
            sigma_b: 0.01,
            chi2: 100.0,
            n: 100,
            ln_like: 0.0,
        };
        let (d, e) = fit.depth(0.001);
        assert!((d - 0.0008).abs() < 1e-15);
        assert!((e - 0.00005).abs() < 1e-15);
        assert!((fit.depth_noise_ppm(0.001) - 50.0).abs() < 1e-9);
        assert_eq!(fit.scaled_model(&[1.0, 0.99]), vec![1.0, 1.0 + 0.8 * (0.99 - 1.0)]);
    }
}
