//! Forecasting models for per-product daily sales
//!
//! Two capabilities live here and stay separate:
//!
//! - [`PointRegressor`]: fit on calendar feature rows, predict values for
//!   new rows. The evaluator drives these directly.
//! - [`SalesForecaster`]: take a sales window and return dated forecast
//!   rows. Everything the service exposes implements this.
//!
//! [`TabularForecaster`] lifts any point regressor into a forecaster;
//! [`Predictor`] tells the two families apart for evaluation.

pub mod arima;
pub mod gradient_boosting;
pub mod linear_regression;
pub mod lstm;
pub mod random_forest;
pub mod tabular;

pub use arima::ArimaForecaster;
pub use gradient_boosting::GradientBoostingModel;
pub use linear_regression::LinearRegressionModel;
pub use lstm::LstmForecaster;
pub use random_forest::RandomForestModel;
pub use tabular::TabularForecaster;

use crate::data::SalesData;
use crate::error::Result;
use chrono::NaiveDate;
use forecast_math::stats::round_to;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Forecast for one product on one future day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    pub date: NaiveDate,
    pub product: String,
    pub predicted_sales: f64,
    /// `[lower, upper]`
    pub confidence_interval: [f64; 2],
}

impl ForecastRow {
    /// Row from a point forecast and explicit bounds.
    ///
    /// Values are rounded to one decimal; the prediction and lower bound
    /// are floored at zero and the upper bound never drops below the lower.
    pub fn from_bounds(
        date: NaiveDate,
        product: impl Into<String>,
        prediction: f64,
        lower: f64,
        upper: f64,
    ) -> Self {
        let lower = round_to(lower, 1).max(0.0);
        Self {
            date,
            product: product.into(),
            predicted_sales: round_to(prediction, 1).max(0.0),
            confidence_interval: [lower, round_to(upper, 1).max(lower)],
        }
    }

    /// Row whose interval is `prediction ± z·residual_std`, centred on the
    /// rounded, non-negative prediction.
    pub fn with_residual_interval(
        date: NaiveDate,
        product: impl Into<String>,
        prediction: f64,
        residual_std: f64,
        z: f64,
    ) -> Self {
        let point = round_to(prediction, 1).max(0.0);
        let margin = z * residual_std;
        Self::from_bounds(date, product, point, point - margin, point + margin)
    }

    pub fn lower(&self) -> f64 {
        self.confidence_interval[0]
    }

    pub fn upper(&self) -> f64 {
        self.confidence_interval[1]
    }
}

/// Regressor over calendar feature rows
pub trait PointRegressor: Debug + Send {
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()>;

    /// Predictions for each row, floored at zero
    fn predict_values(&self, x: &[Vec<f64>]) -> Result<Vec<f64>>;

    fn name(&self) -> &str;
}

/// Produces dated per-product forecasts from a sales window
pub trait SalesForecaster: Debug + Send + Sync {
    /// Forecast `forecast_weeks * 7` days past the latest date in `data`,
    /// fitting on the trailing `training_weeks`.
    ///
    /// Products with too little history are left out rather than failing
    /// the whole call.
    fn predict(
        &self,
        data: &SalesData,
        training_weeks: u32,
        forecast_weeks: u32,
    ) -> Result<Vec<ForecastRow>>;

    fn name(&self) -> &str;
}

/// Model families the evaluator distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelFamily {
    Tabular,
    Sequence,
}

/// A constructed forecaster, tagged by family
#[derive(Debug)]
pub enum Predictor {
    Tabular(TabularForecaster),
    Sequence(Box<dyn SalesForecaster>),
}

impl Predictor {
    pub fn family(&self) -> ModelFamily {
        match self {
            Predictor::Tabular(_) => ModelFamily::Tabular,
            Predictor::Sequence(_) => ModelFamily::Sequence,
        }
    }
}

impl SalesForecaster for Predictor {
    fn predict(
        &self,
        data: &SalesData,
        training_weeks: u32,
        forecast_weeks: u32,
    ) -> Result<Vec<ForecastRow>> {
        match self {
            Predictor::Tabular(model) => model.predict(data, training_weeks, forecast_weeks),
            Predictor::Sequence(model) => model.predict(data, training_weeks, forecast_weeks),
        }
    }

    fn name(&self) -> &str {
        match self {
            Predictor::Tabular(model) => model.name(),
            Predictor::Sequence(model) => model.name(),
        }
    }
}

pub(crate) fn clamp_non_negative(values: Vec<f64>) -> Vec<f64> {
    values.into_iter().map(|v| v.max(0.0)).collect()
}
