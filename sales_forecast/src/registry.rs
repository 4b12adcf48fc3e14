//! Algorithm keys and the factory that builds forecasters from them

use crate::config::ForecastConfig;
use crate::error::{ForecastError, Result};
use crate::models::{
    ArimaForecaster, GradientBoostingModel, LinearRegressionModel, LstmForecaster, ModelFamily,
    Predictor, RandomForestModel, TabularForecaster,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported forecasting algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    LinearRegression,
    RandomForest,
    GradientBoosting,
    Arima,
    Lstm,
}

impl Algorithm {
    /// All algorithms in presentation order
    pub const ALL: [Algorithm; 5] = [
        Algorithm::LinearRegression,
        Algorithm::RandomForest,
        Algorithm::GradientBoosting,
        Algorithm::Arima,
        Algorithm::Lstm,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Algorithm::LinearRegression => "linear_regression",
            Algorithm::RandomForest => "random_forest",
            Algorithm::GradientBoosting => "gradient_boosting",
            Algorithm::Arima => "arima",
            Algorithm::Lstm => "lstm",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Algorithm::LinearRegression => "Linear Regression",
            Algorithm::RandomForest => "Random Forest",
            Algorithm::GradientBoosting => "Gradient Boosting",
            Algorithm::Arima => "ARIMA",
            Algorithm::Lstm => "LSTM",
        }
    }

    pub fn family(&self) -> ModelFamily {
        match self {
            Algorithm::Arima | Algorithm::Lstm => ModelFamily::Sequence,
            _ => ModelFamily::Tabular,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Algorithm {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        Algorithm::ALL
            .iter()
            .copied()
            .find(|a| a.key() == s)
            .ok_or_else(|| ForecastError::InvalidParameter(format!("Unknown algorithm: {}", s)))
    }
}

/// Optional numerical kernels compiled into this build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub arima: bool,
    pub lstm: bool,
}

impl Capabilities {
    pub fn detect() -> Self {
        Self {
            arima: cfg!(feature = "arima"),
            lstm: cfg!(feature = "lstm"),
        }
    }

    /// Only the tabular regressors
    pub fn none() -> Self {
        Self {
            arima: false,
            lstm: false,
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::detect()
    }
}

/// Ordered, read-only set of algorithms plus the settings used to build them
#[derive(Debug, Clone)]
pub struct AlgorithmRegistry {
    algorithms: Vec<Algorithm>,
    config: ForecastConfig,
    capabilities: Capabilities,
}

impl AlgorithmRegistry {
    /// Registry holding every algorithm
    pub fn new(config: ForecastConfig, capabilities: Capabilities) -> Self {
        Self::with_algorithms(Algorithm::ALL.to_vec(), config, capabilities)
    }

    /// Registry holding a subset, in the given order; duplicates are dropped.
    pub fn with_algorithms(
        algorithms: Vec<Algorithm>,
        config: ForecastConfig,
        capabilities: Capabilities,
    ) -> Self {
        let mut unique = Vec::with_capacity(algorithms.len());
        for algorithm in algorithms {
            if !unique.contains(&algorithm) {
                unique.push(algorithm);
            }
        }
        Self {
            algorithms: unique,
            config,
            capabilities,
        }
    }

    pub fn algorithms(&self) -> &[Algorithm] {
        &self.algorithms
    }

    pub fn keys(&self) -> Vec<&'static str> {
        self.algorithms.iter().map(Algorithm::key).collect()
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// The registered algorithm for `key`
    pub fn get(&self, key: &str) -> Option<Algorithm> {
        self.algorithms.iter().copied().find(|a| a.key() == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Build a fresh, unfitted forecaster.
    pub fn create(&self, algorithm: Algorithm) -> Predictor {
        let tabular = self.config.tabular.clone();
        match algorithm {
            Algorithm::LinearRegression => Predictor::Tabular(TabularForecaster::new(
                algorithm.display_name(),
                tabular,
                || Box::new(LinearRegressionModel::new()),
            )),
            Algorithm::RandomForest => {
                let forest = self.config.random_forest.clone();
                Predictor::Tabular(TabularForecaster::new(
                    algorithm.display_name(),
                    tabular,
                    move || Box::new(RandomForestModel::new(forest.clone())),
                ))
            }
            Algorithm::GradientBoosting => {
                let boosting = self.config.gradient_boosting.clone();
                Predictor::Tabular(TabularForecaster::new(
                    algorithm.display_name(),
                    tabular,
                    move || Box::new(GradientBoostingModel::new(boosting.clone())),
                ))
            }
            Algorithm::Arima => Predictor::Sequence(Box::new(ArimaForecaster::new(
                self.config.arima.clone(),
                self.capabilities.arima,
            ))),
            Algorithm::Lstm => Predictor::Sequence(Box::new(LstmForecaster::new(
                self.config.lstm.clone(),
                self.capabilities.lstm,
            ))),
        }
    }

    /// Build the forecaster for `key`, falling back to linear regression
    /// for keys that are not registered.
    pub fn create_or_default(&self, key: &str) -> Predictor {
        self.create(self.get(key).unwrap_or(Algorithm::LinearRegression))
    }
}

impl Default for AlgorithmRegistry {
    fn default() -> Self {
        Self::new(ForecastConfig::default(), Capabilities::detect())
    }
}
