//! Scaled transit fitting.
//!
//! Responsibilities:
//!
//! - closed-form depth scale and noise inflation for a nominal model (`scaled`)
//! - fitting a light curve against an injected model (`light_curve`)

pub mod light_curve;
pub mod scaled;

pub use light_curve::*;
pub use scaled::*;
