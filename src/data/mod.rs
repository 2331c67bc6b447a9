//! Demo data: seeded synthetic light curves.

pub mod synthetic;

pub use synthetic::*;
