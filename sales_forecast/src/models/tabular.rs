//! Per-product forecasting with a calendar-feature regressor

use super::{ForecastRow, PointRegressor, SalesForecaster};
use crate::config::TabularConfig;
use crate::data::{ProductSeries, SalesData};
use crate::error::{ForecastError, Result};
use crate::features::FeatureBuilder;
use crate::utils::future_dates;
use chrono::NaiveDate;
use forecast_math::stats::std_dev;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Builds an unfitted regressor
pub type RegressorFactory = Arc<dyn Fn() -> Box<dyn PointRegressor> + Send + Sync>;

/// Fits a fresh regressor for every product and extrapolates the calendar
/// features over the horizon.
#[derive(Clone)]
pub struct TabularForecaster {
    name: String,
    config: TabularConfig,
    factory: RegressorFactory,
}

impl fmt::Debug for TabularForecaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TabularForecaster")
            .field("name", &self.name)
            .field("config", &self.config)
            .finish()
    }
}

impl TabularForecaster {
    pub fn new<F>(name: impl Into<String>, config: TabularConfig, factory: F) -> Self
    where
        F: Fn() -> Box<dyn PointRegressor> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            config,
            factory: Arc::new(factory),
        }
    }

    pub fn config(&self) -> &TabularConfig {
        &self.config
    }

    /// A new, unfitted regressor of this forecaster's kind
    pub fn regressor(&self) -> Box<dyn PointRegressor> {
        (self.factory)()
    }

    /// Fit on `series` and predict the given dates.
    ///
    /// Returns the fitted regressor, the builder the dates must be encoded
    /// with, and the non-negative predictions.
    pub fn fit_predict(
        &self,
        series: &ProductSeries,
        dates: &[NaiveDate],
    ) -> Result<(Box<dyn PointRegressor>, FeatureBuilder, Vec<f64>)> {
        let builder = FeatureBuilder::for_series(series, self.config.include_month).ok_or_else(|| {
            ForecastError::DataError(format!("No observations for {}", series.product))
        })?;
        let (x, y) = builder.design(series);
        let mut model = self.regressor();
        model.fit(&x, &y)?;
        let predictions = model.predict_values(&builder.rows(dates))?;
        Ok((model, builder, predictions))
    }

    fn forecast_product(&self, series: &ProductSeries, dates: &[NaiveDate]) -> Result<Vec<ForecastRow>> {
        let (model, builder, predictions) = self.fit_predict(series, dates)?;

        let (x, y) = builder.design(series);
        let fitted = model.predict_values(&x)?;
        let residuals: Vec<f64> = y.iter().zip(&fitted).map(|(a, p)| a - p).collect();
        let sigma = std_dev(&residuals);

        Ok(dates
            .iter()
            .zip(predictions)
            .map(|(date, value)| {
                ForecastRow::with_residual_interval(
                    *date,
                    series.product.clone(),
                    value,
                    sigma,
                    self.config.confidence_z,
                )
            })
            .collect())
    }
}

impl SalesForecaster for TabularForecaster {
    fn predict(
        &self,
        data: &SalesData,
        training_weeks: u32,
        forecast_weeks: u32,
    ) -> Result<Vec<ForecastRow>> {
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
                Ok(product_rows) => rows.extend(product_rows),
                Err(e) => warn!(product = %series.product, model = %self.name, error = %e, "forecast failed"),
            }
        }
        Ok(rows)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SalesRecord;
    use crate::models::LinearRegressionModel;
    use chrono::Duration;

    fn linear_forecaster() -> TabularForecaster {
        TabularForecaster::new("Linear Regression", TabularConfig::default(), || {
            Box::new(LinearRegressionModel::new())
        })
    }

    #[test]
    fn test_skips_short_products() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut records: Vec<SalesRecord> = (0..10)
            .map(|i| SalesRecord::new(start + Duration::days(i), "Latte", 5.0))
            .collect();
        records.push(SalesRecord::new(start + Duration::days(9), "Scone", 2.0));
        records.push(SalesRecord::new(start + Duration::days(8), "Scone", 2.0));
        let data = SalesData::new(records).unwrap();

        let rows = linear_forecaster().predict(&data, 4, 1).unwrap();
        assert_eq!(rows.len(), 7);
        assert!(rows.iter().all(|r| r.product == "Latte"));
        assert!(rows.iter().all(|r| (r.predicted_sales - 5.0).abs() < 1e-9));
    }

    #[test]
    fn test_empty_data_yields_no_rows() {
        let rows = linear_forecaster().predict(&SalesData::default(), 4, 4).unwrap();
        assert!(rows.is_empty());
    }
}
