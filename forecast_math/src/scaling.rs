//! Feature scaling

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Min-max scaler mapping the observed range onto `[0, 1]`.
///
/// A constant series has no range; it is shifted by its minimum and left
/// unscaled, so every value maps to `0.0` and inverts back exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinMaxScaler {
    min: f64,
    scale: f64,
}

impl MinMaxScaler {
    /// Learn the range of `values`.
    pub fn fit(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(MathError::InsufficientData(
                "Cannot fit a scaler on an empty series".to_string(),
            ));
        }
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        if !min.is_finite() || !max.is_finite() {
            return Err(MathError::InvalidInput(
                "Series contains non-finite values".to_string(),
            ));
        }
        let range = max - min;
        let scale = if range > 0.0 { range } else { 1.0 };
        Ok(Self { min, scale })
    }

    pub fn transform(&self, value: f64) -> f64 {
        (value - self.min) / self.scale
    }

    pub fn inverse_transform(&self, value: f64) -> f64 {
        value * self.scale + self.min
    }

    pub fn transform_all(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|&v| self.transform(v)).collect()
    }

    pub fn inverse_transform_all(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|&v| self.inverse_transform(v)).collect()
    }
}
