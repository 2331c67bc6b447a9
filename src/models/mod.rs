//! Nominal light-curve models.
//!
//! Transit shapes come from outside the crate; this module only defines the
//! interface the fit consumes and a tabulated-template adapter.

pub mod model;

pub use model::*;
