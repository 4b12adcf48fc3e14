//! Runtime settings for forecasters and evaluation
//!
//! Every section has working defaults, so a JSON config file only needs to
//! name the values it changes.

use crate::error::{ForecastError, Result};
use forecast_math::tree::{BoostingConfig, ForestConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Settings shared by the calendar-feature regressors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabularConfig {
    /// Add the month column to the feature rows
    pub include_month: bool,
    /// Products with fewer rows in the window are skipped
    pub min_rows: usize,
    /// Normal quantile for the residual interval
    pub confidence_z: f64,
}

impl Default for TabularConfig {
    fn default() -> Self {
        Self {
            include_month: true,
            min_rows: 3,
            confidence_z: 1.96,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArimaConfig {
    /// (p, d, q)
    pub order: (usize, usize, usize),
    pub min_rows: usize,
    /// Interval significance level
    pub alpha: f64,
}

impl Default for ArimaConfig {
    fn default() -> Self {
        Self {
            order: (2, 1, 2),
            min_rows: 5,
            alpha: 0.05,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LstmConfig {
    /// Days of history fed to the network per prediction
    pub lookback: usize,
    pub hidden_units: usize,
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    pub seed: u64,
    pub confidence_z: f64,
}

impl Default for LstmConfig {
    fn default() -> Self {
        Self {
            lookback: 7,
            hidden_units: 32,
            epochs: 50,
            batch_size: 8,
            learning_rate: 0.01,
            seed: 42,
            confidence_z: 1.96,
        }
    }
}

impl LstmConfig {
    /// Fewest rows a product needs before a network is trained for it.
    pub fn min_rows(&self) -> usize {
        self.lookback + 3
    }
}

/// Holdout evaluation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Length of the holdout window
    pub test_weeks: u32,
    /// Below this many training rows the metrics are zeroed
    pub min_train_rows: usize,
    /// Report R² next to MAE/RMSE/MAPE
    pub include_r2: bool,
    /// Windows compared when a request names none
    pub default_windows: Vec<u32>,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            test_weeks: 1,
            min_train_rows: 3,
            include_r2: false,
            default_windows: vec![3, 4, 5, 6, 7, 8],
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Horizon of the predict operation
    pub forecast_weeks: u32,
    pub tabular: TabularConfig,
    pub random_forest: ForestConfig,
    pub gradient_boosting: BoostingConfig,
    pub arima: ArimaConfig,
    pub lstm: LstmConfig,
    pub evaluation: EvaluationConfig,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            forecast_weeks: 4,
            tabular: TabularConfig::default(),
            random_forest: ForestConfig::default(),
            gradient_boosting: BoostingConfig::default(),
            arima: ArimaConfig::default(),
            lstm: LstmConfig::default(),
            evaluation: EvaluationConfig::default(),
        }
    }
}

impl ForecastConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ForecastConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn with_forecast_weeks(mut self, weeks: u32) -> Self {
        self.forecast_weeks = weeks;
        self
    }

    pub fn with_lstm(mut self, lstm: LstmConfig) -> Self {
        self.lstm = lstm;
        self
    }

    pub fn with_random_forest(mut self, forest: ForestConfig) -> Self {
        self.random_forest = forest;
        self
    }

    pub fn with_gradient_boosting(mut self, boosting: BoostingConfig) -> Self {
        self.gradient_boosting = boosting;
        self
    }

    pub fn with_evaluation(mut self, evaluation: EvaluationConfig) -> Self {
        self.evaluation = evaluation;
        self
    }

    /// Reject settings no forecaster can run with
    pub fn validate(&self) -> Result<()> {
        if self.tabular.min_rows == 0 {
            return Err(invalid("tabular.min_rows must be at least 1"));
        }
        if self.tabular.confidence_z.is_nan() || self.tabular.confidence_z < 0.0 {
            return Err(invalid("tabular.confidence_z must be non-negative"));
        }
        if self.random_forest.n_estimators == 0 || self.gradient_boosting.n_estimators == 0 {
            return Err(invalid("ensembles need at least one estimator"));
        }
        let alpha = self.arima.alpha;
        if alpha.is_nan() || alpha <= 0.0 || alpha >= 1.0 {
            return Err(invalid("arima.alpha must lie in (0, 1)"));
        }
        let lstm = &self.lstm;
        if lstm.lookback == 0 || lstm.hidden_units == 0 || lstm.batch_size == 0 {
            return Err(invalid(
                "lstm.lookback, lstm.hidden_units and lstm.batch_size must be positive",
            ));
        }
        if lstm.learning_rate.is_nan() || lstm.learning_rate <= 0.0 {
            return Err(invalid("lstm.learning_rate must be positive"));
        }
        if lstm.confidence_z.is_nan() || lstm.confidence_z < 0.0 {
            return Err(invalid("lstm.confidence_z must be non-negative"));
        }
        if self.evaluation.test_weeks == 0 {
            return Err(invalid("evaluation.test_weeks must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(message: &str) -> ForecastError {
    ForecastError::InvalidParameter(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            ForecastConfig::from_json_str(r#"{"lstm": {"epochs": 5}, "arima": {"order": [1, 1, 0]}}"#)
                .unwrap();
        assert_eq!(config.lstm.epochs, 5);
        assert_eq!(config.lstm.lookback, 7);
        assert_eq!(config.arima.order, (1, 1, 0));
        assert_eq!(config.forecast_weeks, 4);
        assert_eq!(config.random_forest.n_estimators, 100);
    }

    #[test]
    fn test_invalid_alpha_rejected() {
        let result = ForecastConfig::from_json_str(r#"{"arima": {"alpha": 1.5}}"#);
        assert!(matches!(result, Err(ForecastError::InvalidParameter(_))));
    }
}
