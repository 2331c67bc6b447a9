//! Weighted reductions for the scaled transit fit.
//!
//! With weights `w_i = 1/σ_i²`, model departures `g_i = m0_i − 1` and data
//! departures `r_i = f_i − 1`, the fit needs:
//!
//! ```text
//! A    = Σ w_i g_i²
//! B    = Σ w_i r_i g_i
//! R    = Σ w_i r_i²
//! chi2 = Σ w_i (r_i − s g_i)²
//! ```
//!
//! The vectors are built once. Each sum can be reduced serially (nalgebra dot
//! products) or across the rayon pool; both give the same value up to rounding.

use nalgebra::DVector;
use rayon::prelude::*;

use crate::domain::Sigma;

/// First-pass moments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments {
    /// `Σ w g²`
    pub a: f64,
    /// `Σ w r g`
    pub b: f64,
    /// `Σ w r²`
    pub r2: f64,
    /// `Σ ln σ`
    pub ln_sigma: f64,
}

/// Per-point terms of the fit.
#[derive(Debug, Clone)]
pub(crate) struct Terms {
    w: DVector<f64>,
    g: DVector<f64>,
    r: DVector<f64>,
    ln_sigma: f64,
}

impl Terms {
    /// Build the term vectors.
    ///
    /// # Panics
    /// Panics if `model` or a per-point `sigma` is shorter than `flux`. Callers
    /// validate lengths first.
    pub fn new(flux: &[f64], sigma: Sigma<'_>, model: &[f64]) -> Self {
        let n = flux.len();
        let w = DVector::from_iterator(n, (0..n).map(|i| 1.0 / (sigma.at(i) * sigma.at(i))));
        let g = DVector::from_iterator(n, model[..n].iter().map(|&m| m - 1.0));
        let r = DVector::from_iterator(n, flux.iter().map(|&f| f - 1.0));
        let ln_sigma = match sigma {
            Sigma::Uniform(s) => n as f64 * s.ln(),
            Sigma::PerPoint(values) => values[..n].iter().map(|s| s.ln()).sum(),
        };
        Self { w, g, r, ln_sigma }
    }

    pub fn len(&self) -> usize {
        self.w.len()
    }

    pub fn moments(&self) -> Moments {
        let wg = self.w.component_mul(&self.g);
        Moments {
            a: wg.dot(&self.g),
            b: wg.dot(&self.r),
            r2: self.w.component_mul(&self.r).dot(&self.r),
            ln_sigma: self.ln_sigma,
        }
    }

    pub fn par_moments(&self) -> Moments {
        let (a, b, r2) = self
            .w
            .as_slice()
            .par_iter()
            .zip(self.g.as_slice().par_iter())
            .zip(self.r.as_slice().par_iter())
            .map(|((&w, &g), &r)| (w * g * g, w * r * g, w * r * r))
            .reduce(|| (0.0, 0.0, 0.0), |x, y| (x.0 + y.0, x.1 + y.1, x.2 + y.2));
        Moments {
            a,
            b,
            r2,
            ln_sigma: self.ln_sigma,
        }
    }

    /// `Σ w (r − s g)²`
    pub fn chi2(&self, s: f64) -> f64 {
        let resid = &self.r - &self.g * s;
        self.w.component_mul(&resid).dot(&resid)
    }

    pub fn par_chi2(&self, s: f64) -> f64 {
        self.w
            .as_slice()
            .par_iter()
            .zip(self.g.as_slice().par_iter())
            .zip(self.r.as_slice().par_iter())
            .map(|((&w, &g), &r)| {
                let e = r - s * g;
                w * e * e
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn moments_match_hand_computation() {
        // w = [1, 4], g = [-0.5, -1], r = [-0.25, -0.5]
        let flux = [0.75, 0.5];
        let model = [0.5, 0.0];
        let sigma = [1.0, 0.5];
        let t = Terms::new(&flux, Sigma::from(&sigma), &model);
        let m = t.moments();

        assert_relative_eq!(m.a, 0.25 + 4.0, epsilon = 1e-15);
        assert_relative_eq!(m.b, 0.125 + 2.0, epsilon = 1e-15);
        assert_relative_eq!(m.r2, 0.0625 + 1.0, epsilon = 1e-15);
        assert_relative_eq!(m.ln_sigma, 0.5f64.ln(), epsilon = 1e-15);
        assert_relative_eq!(t.chi2(0.5), 0.0, epsilon = 1e-15);
        assert_relative_eq!(t.chi2(0.0), m.r2, epsilon = 1e-15);
    }

    #[test]
    fn parallel_reductions_agree_with_serial() {
        let n = 10_000;
        let model: Vec<f64> = (0..n)
            .map(|i| if (4_000..6_000).contains(&i) { 0.999 } else { 1.0 })
            .collect();
        let flux: Vec<f64> = (0..n)
            .map(|i| 1.0 + 0.7 * (model[i] - 1.0) + 1e-4 * ((i as f64) * 0.37).sin())
            .collect();
        let t = Terms::new(&flux, Sigma::Uniform(2e-4), &model);

        let serial = t.moments();
        let parallel = t.par_moments();
        assert_relative_eq!(serial.a, parallel.a, max_relative = 1e-12);
        assert_relative_eq!(serial.b, parallel.b, max_relative = 1e-12);
        assert_relative_eq!(serial.r2, parallel.r2, max_relative = 1e-12);

        let s = serial.b / serial.a;
        assert_relative_eq!(t.chi2(s), t.par_chi2(s), max_relative = 1e-10);
    }
}
