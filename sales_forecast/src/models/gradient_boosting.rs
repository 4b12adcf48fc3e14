//! Gradient-boosted shallow trees over calendar features

use super::{clamp_non_negative, PointRegressor};
use crate::error::Result;
use forecast_math::tree::{BoostingConfig, GradientBoosting};

#[derive(Debug, Clone)]
pub struct GradientBoostingModel {
    inner: GradientBoosting,
}

impl GradientBoostingModel {
    pub fn new(config: BoostingConfig) -> Self {
        Self {
            inner: GradientBoosting::new(config),
        }
    }
}

impl Default for GradientBoostingModel {
    fn default() -> Self {
        Self::new(BoostingConfig::default())
    }
}

impl PointRegressor for GradientBoostingModel {
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()> {
        self.inner.fit(x, y)?;
        Ok(())
    }

    fn predict_values(&self, x: &[Vec<f64>]) -> Result<Vec<f64>> {
        Ok(clamp_non_negative(self.inner.predict(x)?))
    }

    fn name(&self) -> &str {
        "Gradient Boosting"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boosting_fits_step() {
        let x: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = (0..10).map(|i| if i < 5 { 1.0 } else { 9.0 }).collect();
        let mut model = GradientBoostingModel::default();
        model.fit(&x, &y).unwrap();

        let predicted = model.predict_values(&[vec![0.0], vec![9.0]]).unwrap();
        assert!((predicted[0] - 1.0).abs() < 0.1);
        assert!((predicted[1] - 9.0).abs() < 0.1);
    }
}
