//! Error types.
//!
//! - `FitError`: returned by the estimator and the model adapters.
//! - `AppError`: what the `tsfit` binary surfaces (message + process exit code).

use thiserror::Error;

/// Failure of the scaled transit fit.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FitError {
    /// Mismatched lengths, empty input, non-positive or non-finite values.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The data cannot constrain the estimate (flat model, zero curvature).
    #[error("degenerate fit: {0}")]
    DegenerateFit(String),
}

pub type Result<T> = std::result::Result<T, FitError>;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<FitError> for AppError {
    fn from(err: FitError) -> Self {
        let exit_code = match err {
            FitError::InvalidInput(_) => 2,
            FitError::DegenerateFit(_) => 3,
        };
        AppError::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_errors_map_to_distinct_exit_codes() {
        let invalid: AppError = FitError::InvalidInput("length mismatch".into()).into();
        let degenerate: AppError = FitError::DegenerateFit("flat model".into()).into();
        assert_eq!(invalid.exit_code(), 2);
        assert_eq!(degenerate.exit_code(), 3);
        assert_eq!(degenerate.to_string(), "degenerate fit: flat model");
    }
}
