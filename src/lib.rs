//! `transit-scale` library crate.
//!
//! Closed-form maximum-likelihood rescaling of a nominal transit model:
//! given normalized flux, nominal uncertainties and a nominal model, find the
//! depth-scale factor `s` and the noise-inflation factor `b` (with standard
//! errors). See [`fit::scaled_transit_fit`].
//!
//! The binary (`tsfit`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the estimator can be called directly from other code

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod report;

pub use domain::{ScaleEstimate, ScaledFit, Sigma};
pub use error::FitError;
pub use fit::{ScaledTransitFit, estimate_scale, scaled_transit_fit};
