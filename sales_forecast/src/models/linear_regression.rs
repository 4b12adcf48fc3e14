//! Ordinary least squares over calendar features

use super::{clamp_non_negative, PointRegressor};
use crate::error::Result;
use forecast_math::linear::LinearRegression;

#[derive(Debug, Clone, Default)]
pub struct LinearRegressionModel {
    inner: LinearRegression,
}

impl LinearRegressionModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn coefficients(&self) -> Option<&[f64]> {
        self.inner.coefficients()
    }

    pub fn intercept(&self) -> f64 {
        self.inner.intercept()
    }
}

impl PointRegressor for LinearRegressionModel {
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()> {
        self.inner.fit(x, y)?;
        Ok(())
    }

    fn predict_values(&self, x: &[Vec<f64>]) -> Result<Vec<f64>> {
        Ok(clamp_non_negative(self.inner.predict(x)?))
    }

    fn name(&self) -> &str {
        "Linear Regression"
    }
}
