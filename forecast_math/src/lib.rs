//! # Forecast Math
//!
//! Numerical kernels behind the sales forecasting crate. Each module is a
//! self-contained capability with a plain `fit`/`predict` surface over
//! `f64` slices, so the domain crate can treat them as black boxes.
//!
//! - [`linear`]: ordinary least squares with intercept
//! - [`tree`]: regression trees, random forests and gradient boosting
//! - [`arima`]: ARIMA(p,d,q) estimation with prediction intervals
//! - [`lstm`]: a single-layer LSTM regressor trained with Adam
//! - [`scaling`] and [`stats`]: small shared helpers

use thiserror::Error;

pub mod linear;
pub mod scaling;
pub mod stats;
pub mod tree;

#[cfg(feature = "arima")]
pub mod arima;
#[cfg(feature = "neural")]
pub mod lstm;

/// Errors that can occur in numerical routines
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),

    #[error("Model has not been fitted")]
    NotFitted,
}

/// Result type for numerical operations
pub type Result<T> = std::result::Result<T, MathError>;

/// Check that a feature matrix is rectangular and matches the target length.
pub(crate) fn check_design(x: &[Vec<f64>], y: &[f64]) -> Result<usize> {
    if x.is_empty() {
        return Err(MathError::InsufficientData(
            "Feature matrix has no rows".to_string(),
        ));
    }
    if x.len() != y.len() {
        return Err(MathError::InvalidInput(format!(
            "Feature rows ({}) don't match target length ({})",
            x.len(),
            y.len()
        )));
    }
    let width = x[0].len();
    if x.iter().any(|row| row.len() != width) {
        return Err(MathError::InvalidInput(
            "Feature rows have inconsistent widths".to_string(),
        ));
    }
    Ok(width)
}
