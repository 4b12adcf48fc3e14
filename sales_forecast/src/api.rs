//! Request and response types for the forecasting operations
//!
//! [`ForecastService`] is transport-agnostic: it takes decoded requests (or
//! raw JSON via [`ForecastService::handle_json`]) and returns serializable
//! responses.

use crate::comparison::{AlgorithmComparison, ComparisonDriver, WindowComparison};
use crate::data::{SalesData, SalesRecord};
use crate::error::{ForecastError, Result};
use crate::evaluator::Evaluator;
use crate::metrics::MetricsRecord;
use crate::models::{ForecastRow, SalesForecaster};
use crate::registry::AlgorithmRegistry;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::info;

pub const DEFAULT_TRAINING_WEEKS: u32 = 4;
pub const DEFAULT_ALGORITHM: &str = "linear_regression";

fn default_training_weeks() -> u32 {
    DEFAULT_TRAINING_WEEKS
}

fn default_algorithm() -> String {
    DEFAULT_ALGORITHM.to_string()
}

/// Body of predict, evaluate and compare requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRequest {
    pub sales_data: Vec<SalesRecord>,
    #[serde(default = "default_training_weeks")]
    pub training_weeks: u32,
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
}

impl ForecastRequest {
    pub fn new(sales_data: Vec<SalesRecord>) -> Self {
        Self {
            sales_data,
            training_weeks: DEFAULT_TRAINING_WEEKS,
            algorithm: default_algorithm(),
        }
    }

    pub fn with_training_weeks(mut self, weeks: u32) -> Self {
        self.training_weeks = weeks;
        self
    }

    pub fn with_algorithm(mut self, key: impl Into<String>) -> Self {
        self.algorithm = key.into();
        self
    }
}

/// Body of a training-window sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowComparisonRequest {
    pub sales_data: Vec<SalesRecord>,
    #[serde(default)]
    pub windows: Option<Vec<u32>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionsResponse {
    pub predictions: Vec<ForecastRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResponse {
    pub results: Vec<AlgorithmComparison>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlgorithmsResponse {
    pub algorithms: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Operations the service answers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Predict,
    Evaluate,
    Compare,
    CompareWindows,
    Algorithms,
    Health,
}

impl Operation {
    /// Whether the operation reads a request body
    pub fn takes_body(&self) -> bool {
        !matches!(self, Operation::Algorithms | Operation::Health)
    }
}

impl FromStr for Operation {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "predict" => Ok(Operation::Predict),
            "evaluate" => Ok(Operation::Evaluate),
            "compare" => Ok(Operation::Compare),
            "compare-windows" | "compare_windows" => Ok(Operation::CompareWindows),
            "algorithms" => Ok(Operation::Algorithms),
            "health" => Ok(Operation::Health),
            other => Err(ForecastError::InvalidParameter(format!("Unknown operation: {}", other))),
        }
    }
}

/// Entry point for all forecasting operations
#[derive(Debug, Clone, Default)]
pub struct ForecastService {
    registry: AlgorithmRegistry,
}

impl ForecastService {
    pub fn new(registry: AlgorithmRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &AlgorithmRegistry {
        &self.registry
    }

    /// Forecasts over the configured horizon; unknown algorithms fall back
    /// to linear regression.
    pub fn predict(&self, request: ForecastRequest) -> Result<PredictionsResponse> {
        let data = SalesData::new(request.sales_data)?;
        let forecaster = self.registry.create_or_default(&request.algorithm);
        let predictions = forecaster.predict(
            &data,
            request.training_weeks,
            self.registry.config().forecast_weeks,
        )?;
        info!(
            algorithm = %request.algorithm,
            rows = predictions.len(),
            "predictions generated"
        );
        Ok(PredictionsResponse { predictions })
    }

    pub fn evaluate(&self, request: ForecastRequest) -> Result<MetricsRecord> {
        let data = SalesData::new(request.sales_data)?;
        Evaluator::new(&self.registry).evaluate(&data, request.training_weeks, &request.algorithm)
    }

    pub fn compare(&self, request: ForecastRequest) -> Result<ComparisonResponse> {
        let data = SalesData::new(request.sales_data)?;
        let results = ComparisonDriver::new(&self.registry).compare_all(&data, request.training_weeks)?;
        Ok(ComparisonResponse { results })
    }

    pub fn compare_windows(&self, request: WindowComparisonRequest) -> Result<WindowComparison> {
        let data = SalesData::new(request.sales_data)?;
        ComparisonDriver::new(&self.registry).compare_training_windows(&data, request.windows.as_deref())
    }

    pub fn algorithms(&self) -> AlgorithmsResponse {
        AlgorithmsResponse {
            algorithms: self.registry.keys().into_iter().map(String::from).collect(),
        }
    }

    pub fn health(&self) -> HealthResponse {
        HealthResponse {
            status: "ok".to_string(),
        }
    }

    /// Decode a JSON body, run the operation and encode the response.
    pub fn handle_json(&self, operation: Operation, body: &str) -> Result<String> {
        let response = match operation {
            Operation::Predict => serde_json::to_string(&self.predict(serde_json::from_str(body)?)?)?,
            Operation::Evaluate => serde_json::to_string(&self.evaluate(serde_json::from_str(body)?)?)?,
            Operation::Compare => serde_json::to_string(&self.compare(serde_json::from_str(body)?)?)?,
            Operation::CompareWindows => {
                serde_json::to_string(&self.compare_windows(serde_json::from_str(body)?)?)?
            }
            Operation::Algorithms => serde_json::to_string(&self.algorithms())?,
            Operation::Health => serde_json::to_string(&self.health())?,
        };
        Ok(response)
    }
}
