//! ARIMA forecaster over resampled daily series

use super::{ForecastRow, SalesForecaster};
use crate::config::ArimaConfig;
use crate::data::{ProductSeries, SalesData};
use crate::error::Result;
use crate::utils::future_dates;
use chrono::NaiveDate;
use tracing::{debug, warn};

/// Fits one ARIMA model per product.
///
/// When the ARIMA kernel is unavailable the forecaster answers every
/// request with an empty list.
#[derive(Debug, Clone)]
pub struct ArimaForecaster {
    config: ArimaConfig,
    available: bool,
}

impl ArimaForecaster {
    pub fn new(config: ArimaConfig, available: bool) -> Self {
        Self { config, available }
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    fn forecast_product(&self, series: &ProductSeries, dates: &[NaiveDate]) -> Result<Option<Vec<ForecastRow>>> {
        let values = series.daily_values();
        if values.len() < self.config.min_rows {
            return Ok(None);
        }
        let steps = fit_and_forecast(&values, self.config.order, dates.len(), self.config.alpha)?;
        let rows = dates
            .iter()
            .zip(steps)
            .map(|(date, (mean, lower, upper))| {
                ForecastRow::from_bounds(*date, series.product.clone(), mean, lower, upper)
            })
            .collect();
        Ok(Some(rows))
    }
}

impl Default for ArimaForecaster {
    fn default() -> Self {
        Self::new(ArimaConfig::default(), cfg!(feature = "arima"))
    }
}

impl SalesForecaster for ArimaForecaster {
    fn predict(
        &self,
        data: &SalesData,
        training_weeks: u32,
        forecast_weeks: u32,
    ) -> Result<Vec<ForecastRow>> {
        if !self.available {
            debug!("ARIMA unavailable, returning no forecasts");
            return Ok(Vec::new());
        }
        let Some(last) = data.max_date() else {
            return Ok(Vec::new());
        };
        let window = data.trailing_window(training_weeks);
        let dates = future_dates(last, forecast_weeks as usize * 7);

        let mut rows = Vec::new();
        for series in window.group_by_product() {
            if series.len() < self.config.min_rows {
                debug!(product = %series.product, rows = series.len(), "skipping product with too few rows");
                continue;
            }
            match self.forecast_product(&series, &dates) {
                Ok(Some(product_rows)) => rows.extend(product_rows),
                Ok(None) => debug!(product = %series.product, "daily series too short"),
                Err(e) => warn!(product = %series.product, error = %e, "ARIMA fit failed"),
            }
        }
        Ok(rows)
    }

    fn name(&self) -> &str {
        "ARIMA"
    }
}

#[cfg(feature = "arima")]
fn fit_and_forecast(
    values: &[f64],
    order: (usize, usize, usize),
    steps: usize,
    alpha: f64,
) -> Result<Vec<(f64, f64, f64)>> {
    use forecast_math::arima::{Arima, ArimaOrder};

    let (p, d, q) = order;
    let model = Arima::fit(values, ArimaOrder::new(p, d, q))?;
    if model.order() != ArimaOrder::new(p, d, q) {
        debug!(fitted = %model.order(), "short series, lowered ARIMA order");
    }
    let forecast = model.forecast_interval(steps, alpha)?;
    Ok(forecast
        .mean
        .into_iter()
        .zip(forecast.lower)
        .zip(forecast.upper)
        .map(|((mean, lower), upper)| (mean, lower, upper))
        .collect())
}

#[cfg(not(feature = "arima"))]
fn fit_and_forecast(
    _values: &[f64],
    _order: (usize, usize, usize),
    _steps: usize,
    _alpha: f64,
) -> Result<Vec<(f64, f64, f64)>> {
    Err(crate::error::ForecastError::CapabilityUnavailable(
        "built without the `arima` feature".to_string(),
    ))
}
