//! Maximum-likelihood depth scaling of a nominal transit model.
//!
//! The data are modelled as
//!
//! ```text
//! f_i = 1 + s (m0_i − 1) + e_i,   e_i ~ N(0, (b σ_i)²)
//! ```
//!
//! and the log-likelihood is maximised jointly in `s` and `b`. Both maxima are
//! available in closed form:
//!
//! ```text
//! s       = Σ w r g / Σ w g²           (w = 1/σ², g = m0 − 1, r = f − 1)
//! b       = sqrt(chi2 / N)
//! sigma_s = b / sqrt(Σ w g²)
//! sigma_b = (3 chi2 / b⁴ − N / b²)^(−1/2)
//! ```
//!
//! so there is no optimizer, no starting point and no convergence test.

use crate::domain::{ScaleEstimate, ScaledFit, Sigma};
use crate::error::{FitError, Result};
use crate::math::{Moments, Terms};

/// Number of points from which the reductions run on the rayon pool.
pub const DEFAULT_PARALLEL_MIN_LEN: usize = 1 << 16;

/// Residuals whose rms falls below this fraction of the weighted signal are
/// rounding noise from `r − s g`, and the chi-square is taken as exactly zero.
const PERFECT_FIT_RTOL: f64 = 1e-12;

/// The analytic scaled transit fit.
#[derive(Debug, Clone, Copy)]
pub struct ScaledTransitFit {
    parallel_min_len: usize,
}

impl Default for ScaledTransitFit {
    fn default() -> Self {
        Self {
            parallel_min_len: DEFAULT_PARALLEL_MIN_LEN,
        }
    }
}

impl ScaledTransitFit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reduce on the rayon pool when the input has at least `n` points.
    pub fn with_parallel_min_len(mut self, n: usize) -> Self {
        self.parallel_min_len = n.max(1);
        self
    }

    /// Point estimates `s`, `b`, `sigma_s` (steps that do not need the curvature in `b`).
    pub fn estimate<'a>(
        &self,
        flux: &[f64],
        sigma: impl Into<Sigma<'a>>,
        model: &[f64],
    ) -> Result<ScaleEstimate> {
        let sigma = sigma.into();
        self.estimate_inner(flux, sigma, model).map(|(est, _)| est)
    }

    /// Full fit: `(s, b, sigma_s, sigma_b)` plus diagnostics.
    pub fn fit<'a>(
        &self,
        flux: &[f64],
        sigma: impl Into<Sigma<'a>>,
        model: &[f64],
    ) -> Result<ScaledFit> {
        let sigma = sigma.into();
        let (est, moments) = self.estimate_inner(flux, sigma, model)?;

        let n = est.n as f64;
        let b = est.b;
        if b == 0.0 {
            return Err(FitError::DegenerateFit(
                "residuals vanish (b = 0); the noise-inflation curvature is undefined".into(),
            ));
        }

        // 3 chi2/b⁴ − N/b², factored so that b⁴ is never formed.
        let curvature = (3.0 * est.chi2 / (b * b) - n) / (b * b);
        if !(curvature > 0.0 && curvature.is_finite()) {
            return Err(FitError::DegenerateFit(format!(
                "non-positive curvature for the noise-inflation factor ({curvature})"
            )));
        }
        let sigma_b = 1.0 / curvature.sqrt();

        // At the maximum chi2 / b² = N.
        let ln_like = -0.5 * n * (1.0 + (2.0 * std::f64::consts::PI).ln())
            - n * b.ln()
            - moments.ln_sigma;

        Ok(ScaledFit {
            s: est.s,
            b,
            sigma_s: est.sigma_s,
            sigma_b,
            chi2: est.chi2,
            n: est.n,
            ln_like,
        })
    }

    fn estimate_inner(
        &self,
        flux: &[f64],
        sigma: Sigma<'_>,
        model: &[f64],
    ) -> Result<(ScaleEstimate, Moments)> {
        validate(flux, sigma, model)?;

        let terms = Terms::new(flux, sigma, model);
        let parallel = terms.len() >= self.parallel_min_len;

        let moments = if parallel {
            terms.par_moments()
        } else {
            terms.moments()
        };
        if !(moments.a.is_finite() && moments.b.is_finite() && moments.r2.is_finite()) {
            return Err(FitError::InvalidInput(
                "weighted sums overflow; rescale flux and uncertainties".into(),
            ));
        }
        let a = moments.a;
        if a <= 0.0 {
            return Err(FitError::DegenerateFit(format!(
                "model has no depth to scale (sum of weighted squared departures = {a})"
            )));
        }

        let s = moments.b / a;
        let sigma_s_raw = 1.0 / a.sqrt();

        let mut chi2 = if parallel { terms.par_chi2(s) } else { terms.chi2(s) };
        if chi2 <= PERFECT_FIT_RTOL * PERFECT_FIT_RTOL * moments.r2 {
            chi2 = 0.0;
        }

        let n = terms.len();
        let b = (chi2 / n as f64).sqrt();

        let est = ScaleEstimate {
            s,
            b,
            sigma_s_raw,
            sigma_s: b * sigma_s_raw,
            chi2,
            n,
        };
        Ok((est, moments))
    }
}

/// Scaled transit fit with default settings.
///
/// `sigma` is a scalar (broadcast) or one value per flux point.
pub fn scaled_transit_fit<'a>(
    flux: &[f64],
    sigma: impl Into<Sigma<'a>>,
    model: &[f64],
) -> Result<ScaledFit> {
    ScaledTransitFit::default().fit(flux, sigma, model)
}

/// Point estimates with default settings.
pub fn estimate_scale<'a>(
    flux: &[f64],
    sigma: impl Into<Sigma<'a>>,
    model: &[f64],
) -> Result<ScaleEstimate> {
    ScaledTransitFit::default().estimate(flux, sigma, model)
}

fn validate(flux: &[f64], sigma: Sigma<'_>, model: &[f64]) -> Result<()> {
    let n = flux.len();
    if n == 0 {
        return Err(FitError::InvalidInput("no flux points".into()));
    }
    if model.len() != n {
        return Err(FitError::InvalidInput(format!(
            "model has {} points, flux has {n}",
            model.len()
        )));
    }
    if let Some(len) = sigma.explicit_len() {
        if len != n {
            return Err(FitError::InvalidInput(format!(
                "sigma has {len} values, flux has {n}"
            )));
        }
    }

    match sigma {
        Sigma::Uniform(s) => check_sigma(s, None)?,
        Sigma::PerPoint(values) => {
            for (i, &s) in values.iter().enumerate() {
                check_sigma(s, Some(i))?;
            }
        }
    }

    if let Some(i) = flux.iter().position(|v| !v.is_finite()) {
        return Err(FitError::InvalidInput(format!("non-finite flux at index {i}")));
    }
    if let Some(i) = model.iter().position(|v| !v.is_finite()) {
        return Err(FitError::InvalidInput(format!("non-finite model at index {i}")));
    }
    Ok(())
}

fn check_sigma(s: f64, index: Option<usize>) -> Result<()> {
    let at = || index.map(|i| format!(" at index {i}")).unwrap_or_default();
    if !(s > 0.0 && s.is_finite()) {
        return Err(FitError::InvalidInput(format!(
            "uncertainties must be positive and finite, got {s}{}",
            at()
        )));
    }
    // The weight 1/σ² must itself be a normal, finite number.
    let w = 1.0 / (s * s);
    if !(w.is_finite() && w > 0.0) {
        return Err(FitError::InvalidInput(format!(
            "uncertainty {s}{} is out of range: its weight 1/σ² is {w}",
            at()
        )));
    }
    Ok(())
}
