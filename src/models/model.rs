//! Model evaluation interface.
//!
//! The fit never computes transit shapes itself. It consumes a nominal model
//! sampled on the same time grid as the flux, produced by whatever implements
//! [`LightCurveModel`]:
//! - any `Fn(f64) -> f64` (a closure or function over time)
//! - [`TabulatedModel`], a sampled template interpolated onto the grid

use crate::error::{FitError, Result};

/// Produces a normalized light curve (out-of-transit = 1.0) on a time grid.
pub trait LightCurveModel {
    fn evaluate(&self, time: &[f64]) -> Vec<f64>;
}

impl<F> LightCurveModel for F
where
    F: Fn(f64) -> f64,
{
    fn evaluate(&self, time: &[f64]) -> Vec<f64> {
        time.iter().map(|&t| self(t)).collect()
    }
}

/// A sampled template, linearly interpolated between samples.
///
/// Outside the sampled range the template is at baseline (1.0).
#[derive(Debug, Clone, PartialEq)]
pub struct TabulatedModel {
    time: Vec<f64>,
    flux: Vec<f64>,
}

impl TabulatedModel {
    pub fn new(time: Vec<f64>, flux: Vec<f64>) -> Result<Self> {
        if time.len() != flux.len() {
            return Err(FitError::InvalidInput(format!(
                "template has {} times and {} flux values",
                time.len(),
                flux.len()
            )));
        }
        if time.len() < 2 {
            return Err(FitError::InvalidInput("template needs at least 2 samples".into()));
        }
        if time.iter().chain(flux.iter()).any(|v| !v.is_finite()) {
            return Err(FitError::InvalidInput("template contains non-finite values".into()));
        }
        if time.windows(2).any(|w| w[1] <= w[0]) {
            return Err(FitError::InvalidInput(
                "template times must be strictly increasing".into(),
            ));
        }
        Ok(Self { time, flux })
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Largest departure below baseline, `1 − min(flux)`.
    pub fn depth(&self) -> f64 {
        1.0 - self.flux.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn value_at(&self, t: f64) -> f64 {
        let last = self.time.len() - 1;
        if !(t >= self.time[0] && t <= self.time[last]) {
            return 1.0;
        }
        // First sample strictly after t; t == time[last] maps onto the last segment.
        let hi = self.time.partition_point(|&x| x <= t).min(last).max(1);
        linear_interp(
            (self.time[hi - 1], self.flux[hi - 1]),
            (self.time[hi], self.flux[hi]),
            t,
        )
    }
}

impl LightCurveModel for TabulatedModel {
    fn evaluate(&self, time: &[f64]) -> Vec<f64> {
        time.iter().map(|&t| self.value_at(t)).collect()
    }
}

fn linear_interp(a: (f64, f64), b: (f64, f64), x: f64) -> f64 {
    let (x0, y0) = a;
    let (x1, y1) = b;
    let u = (x - x0) / (x1 - x0);
    y0 + u * (y1 - y0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> TabulatedModel {
        TabulatedModel::new(vec![-1.0, 0.0, 1.0], vec![1.0, 0.99, 1.0]).unwrap()
    }

    #[test]
    fn interpolates_inside_and_defaults_to_baseline_outside() {
        let m = template();
        let values = m.evaluate(&[-2.0, -1.0, -0.5, 0.0, 0.5, 1.0, 1.5]);
        let expected = [1.0, 1.0, 0.995, 0.99, 0.995, 1.0, 1.0];
        for (v, e) in values.iter().zip(expected) {
            assert!((v - e).abs() < 1e-12, "{v} vs {e}");
        }
        assert!((m.depth() - 0.01).abs() < 1e-12);
    }

    #[test]
    fn closures_are_models() {
        let dip = |t: f64| if t.abs() < 0.5 { 0.98 } else { 1.0 };
        assert_eq!(dip.evaluate(&[-1.0, 0.0, 1.0]), vec![1.0, 0.98, 1.0]);
    }

    #[test]
    fn rejects_malformed_templates() {
        assert!(TabulatedModel::new(vec![0.0], vec![1.0]).is_err());
        assert!(TabulatedModel::new(vec![0.0, 1.0], vec![1.0]).is_err());
        assert!(TabulatedModel::new(vec![0.0, 0.0], vec![1.0, 1.0]).is_err());
        assert!(TabulatedModel::new(vec![0.0, f64::NAN], vec![1.0, 1.0]).is_err());
    }
}
