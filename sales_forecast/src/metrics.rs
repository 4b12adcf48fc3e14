//! Accuracy metrics for holdout evaluation

use crate::error::{ForecastError, Result};
use forecast_math::stats::{mean, round_to};
use serde::{Deserialize, Serialize};

/// Accuracy of one algorithm on one holdout split
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    /// Mean Absolute Error
    pub mae: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error over non-zero actuals
    pub mape: f64,
    /// Coefficient of determination, when requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r2: Option<f64>,
    /// Wall-clock seconds spent fitting and predicting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub training_time: Option<f64>,
}

impl MetricsRecord {
    /// All-zero metrics for splits that could not be evaluated
    pub fn zeroed() -> Self {
        Self::default()
    }

    pub fn with_training_time(mut self, seconds: f64) -> Self {
        self.training_time = Some(round_to(seconds, 3));
        self
    }

    pub fn is_zeroed(&self) -> bool {
        self.mae == 0.0 && self.rmse == 0.0 && self.mape == 0.0
    }
}

impl std::fmt::Display for MetricsRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Forecast Accuracy:")?;
        writeln!(f, "  MAE:   {:.2}", self.mae)?;
        writeln!(f, "  RMSE:  {:.2}", self.rmse)?;
        writeln!(f, "  MAPE:  {:.2}%", self.mape)?;
        if let Some(r2) = self.r2 {
            writeln!(f, "  R2:    {:.4}", r2)?;
        }
        if let Some(seconds) = self.training_time {
            writeln!(f, "  Time:  {:.3}s", seconds)?;
        }
        Ok(())
    }
}

/// MAE, RMSE and MAPE over paired values, rounded to two decimals.
///
/// Empty input gives zeroed metrics.
pub fn compute_metrics(actual: &[f64], predicted: &[f64], include_r2: bool) -> Result<MetricsRecord> {
    if actual.len() != predicted.len() {
        return Err(ForecastError::ValidationError(format!(
            "Actual ({}) and predicted ({}) lengths differ",
            actual.len(),
            predicted.len()
        )));
    }
    if actual.is_empty() {
        return Ok(MetricsRecord::zeroed());
    }

    Ok(MetricsRecord {
        mae: round_to(mean_absolute_error(actual, predicted), 2),
        rmse: round_to(root_mean_squared_error(actual, predicted), 2),
        mape: round_to(mean_absolute_percentage_error(actual, predicted), 2),
        r2: if include_r2 {
            r_squared(actual, predicted).map(|r2| round_to(r2, 4))
        } else {
            None
        },
        training_time: None,
    })
}

pub fn mean_absolute_error(actual: &[f64], predicted: &[f64]) -> f64 {
    let errors: Vec<f64> = actual.iter().zip(predicted).map(|(a, p)| (a - p).abs()).collect();
    mean(&errors)
}

pub fn root_mean_squared_error(actual: &[f64], predicted: &[f64]) -> f64 {
    let squared: Vec<f64> = actual.iter().zip(predicted).map(|(a, p)| (a - p).powi(2)).collect();
    mean(&squared).sqrt()
}

/// Percentage error averaged over pairs whose actual is non-zero; 0 when none are.
pub fn mean_absolute_percentage_error(actual: &[f64], predicted: &[f64]) -> f64 {
    let ratios: Vec<f64> = actual
        .iter()
        .zip(predicted)
        .filter(|(a, _)| **a != 0.0)
        .map(|(a, p)| ((a - p) / a).abs() * 100.0)
        .collect();
    if ratios.is_empty() {
        0.0
    } else {
        mean(&ratios)
    }
}

/// R² of the predictions.
///
/// Undefined (`None`) for fewer than two pairs or a constant actual series.
pub fn r_squared(actual: &[f64], predicted: &[f64]) -> Option<f64> {
    if actual.len() < 2 {
        return None;
    }
    let center = mean(actual);
    let total: f64 = actual.iter().map(|a| (a - center).powi(2)).sum();
    if total == 0.0 {
        return None;
    }
    let residual: f64 = actual.iter().zip(predicted).map(|(a, p)| (a - p).powi(2)).sum();
    Some(1.0 - residual / total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_rounded() {
        let metrics = compute_metrics(&[10.0, 20.0, 30.0], &[12.0, 18.0, 33.0], false).unwrap();
        assert_eq!(metrics.mae, 2.33);
        assert_eq!(metrics.rmse, 2.38);
        assert_eq!(metrics.mape, 13.33);
        assert_eq!(metrics.r2, None);
    }

    #[test]
    fn test_mape_ignores_zero_actuals() {
        assert_eq!(mean_absolute_percentage_error(&[0.0, 10.0], &[5.0, 5.0]), 50.0);
        assert_eq!(mean_absolute_percentage_error(&[0.0, 0.0], &[5.0, 5.0]), 0.0);
    }

    #[test]
    fn test_zeroed_serialization_omits_optional_fields() {
        let json = serde_json::to_value(MetricsRecord::zeroed()).unwrap();
        assert_eq!(json, serde_json::json!({"mae": 0.0, "rmse": 0.0, "mape": 0.0}));
    }

    #[test]
    fn test_r2_undefined_for_constant_actuals() {
        let metrics = compute_metrics(&[4.0, 4.0], &[3.0, 5.0], true).unwrap();
        assert_eq!(metrics.r2, None);
        assert_eq!(metrics.mae, 1.0);
    }

    #[test]
    fn test_length_mismatch() {
        assert!(compute_metrics(&[1.0], &[], false).is_err());
    }
}
