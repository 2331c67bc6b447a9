//! Mathematical utilities: weighted reductions over the fit terms.

pub mod terms;

pub use terms::*;
