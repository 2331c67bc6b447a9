//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - estimator inputs and outputs (`Sigma`, `ScaleEstimate`, `ScaledFit`)
//! - light-curve data (`LightCurve`, `FitWindow`, `PointResidual`)
//! - run configuration and saved reports (`FitConfig`, `SimulateConfig`, `FitReport`)

pub mod types;

pub use types::*;
