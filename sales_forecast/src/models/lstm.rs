//! Recurrent network forecaster over resampled daily series

use super::{ForecastRow, SalesForecaster};
use crate::config::LstmConfig;
use crate::data::{ProductSeries, SalesData};
use crate::error::Result;
use crate::utils::future_dates;
use chrono::NaiveDate;
use forecast_math::scaling::MinMaxScaler;
use forecast_math::stats::std_dev;
use tracing::{debug, warn};

/// Supervised windows built from a scaled series
#[derive(Debug, Clone, PartialEq)]
pub struct Windows {
    pub inputs: Vec<Vec<f64>>,
    pub targets: Vec<f64>,
}

/// Slide a `lookback`-long window over `values`; each window's target is
/// the value right after it.
pub fn sliding_windows(values: &[f64], lookback: usize) -> Windows {
    let (inputs, targets) = (lookback..values.len())
        .map(|i| (values[i - lookback..i].to_vec(), values[i]))
        .unzip();
    Windows { inputs, targets }
}

/// Trains one small LSTM per product on min-max scaled daily sales and
/// rolls it forward one day at a time.
#[derive(Debug, Clone)]
pub struct LstmForecaster {
    config: LstmConfig,
    available: bool,
}

/// Scaled-space outputs of a trained network
struct NetworkOutput {
    forecast: Vec<f64>,
    fitted: Vec<f64>,
}

impl LstmForecaster {
    pub fn new(config: LstmConfig, available: bool) -> Self {
        Self { config, available }
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn config(&self) -> &LstmConfig {
        &self.config
    }

    fn forecast_product(&self, series: &ProductSeries, dates: &[NaiveDate]) -> Result<Option<Vec<ForecastRow>>> {
        let values = series.daily_values();
        let scaler = MinMaxScaler::fit(&values)?;
        let scaled = scaler.transform_all(&values);

        let windows = sliding_windows(&scaled, self.config.lookback);
        if windows.inputs.len() < 2 {
            return Ok(None);
        }

        let output = train_and_roll(&self.config, &windows, &scaled, dates.len())?;

        let actual = scaler.inverse_transform_all(&windows.targets);
        let fitted = scaler.inverse_transform_all(&output.fitted);
        let residuals: Vec<f64> = actual.iter().zip(&fitted).map(|(a, p)| a - p).collect();
        let sigma = std_dev(&residuals);

        let forecast = scaler.inverse_transform_all(&output.forecast);
        Ok(Some(
            dates
                .iter()
                .zip(forecast)
                .map(|(date, value)| {
                    ForecastRow::with_residual_interval(
                        *date,
                        series.product.clone(),
                        value,
                        sigma,
                        self.config.confidence_z,
                    )
                })
                .collect(),
        ))
    }
}

impl Default for LstmForecaster {
    fn default() -> Self {
        Self::new(LstmConfig::default(), cfg!(feature = "lstm"))
    }
}

impl SalesForecaster for LstmForecaster {
    fn predict(
        &self,
        data: &SalesData,
        training_weeks: u32,
        forecast_weeks: u32,
    ) -> Result<Vec<ForecastRow>> {
        if !self.available {
            debug!("LSTM unavailable, returning no forecasts");
            return Ok(Vec::new());
        }
        let Some(last) = data.max_date() else {
            return Ok(Vec::new());
        };
        let window = data.trailing_window(training_weeks);
        let dates = future_dates(last, forecast_weeks as usize * 7);

        let mut rows = Vec::new();
        for series in window.group_by_product() {
            if series.len() < self.config.min_rows() {
                debug!(product = %series.product, rows = series.len(), "skipping product with too few rows");
                continue;
            }
            match self.forecast_product(&series, &dates) {
                Ok(Some(product_rows)) => rows.extend(product_rows),
                Ok(None) => debug!(product = %series.product, "not enough training windows"),
                Err(e) => warn!(product = %series.product, error = %e, "LSTM training failed"),
            }
        }
        Ok(rows)
    }

    fn name(&self) -> &str {
        "LSTM"
    }
}

#[cfg(feature = "lstm")]
fn train_and_roll(
    config: &LstmConfig,
    windows: &Windows,
    scaled: &[f64],
    steps: usize,
) -> Result<NetworkOutput> {
    use forecast_math::lstm::{LstmConfig as NetworkConfig, LstmRegressor};

    let mut network_config = NetworkConfig::default()
        .with_hidden_size(config.hidden_units)
        .with_epochs(config.epochs)
        .with_batch_size(config.batch_size)
        .with_seed(config.seed);
    network_config.learning_rate = config.learning_rate;

    let mut network = LstmRegressor::new(network_config);
    network.fit(&windows.inputs, &windows.targets)?;

    let mut history = scaled.to_vec();
    let mut forecast = Vec::with_capacity(steps);
    for _ in 0..steps {
        let next = network.predict(&history[history.len() - config.lookback..])?;
        forecast.push(next);
        history.push(next);
    }

    Ok(NetworkOutput {
        forecast,
        fitted: network.predict_many(&windows.inputs)?,
    })
}

#[cfg(not(feature = "lstm"))]
fn train_and_roll(
    _config: &LstmConfig,
    _windows: &Windows,
    _scaled: &[f64],
    _steps: usize,
) -> Result<NetworkOutput> {
    Err(crate::error::ForecastError::CapabilityUnavailable(
        "built without the `lstm` feature".to_string(),
    ))
}
