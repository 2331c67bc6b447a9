//! Input/output helpers.
//!
//! - CSV ingest of light curves and templates (`ingest`)
//! - CSV exports of light curves and residuals (`export`)
//! - fit report JSON read/write (`report`)

pub mod export;
pub mod ingest;
pub mod report;

pub use export::*;
pub use ingest::*;
pub use report::*;
