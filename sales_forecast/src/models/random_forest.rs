//! Bagged regression trees over calendar features

use super::{clamp_non_negative, PointRegressor};
use crate::error::Result;
use forecast_math::tree::{ForestConfig, RandomForest};

#[derive(Debug, Clone)]
pub struct RandomForestModel {
    inner: RandomForest,
}

impl RandomForestModel {
    pub fn new(config: ForestConfig) -> Self {
        Self {
            inner: RandomForest::new(config),
        }
    }

    pub fn n_trees(&self) -> usize {
        self.inner.n_trees()
    }
}

impl Default for RandomForestModel {
    fn default() -> Self {
        Self::new(ForestConfig::default())
    }
}

impl PointRegressor for RandomForestModel {
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()> {
        self.inner.fit(x, y)?;
        Ok(())
    }

    fn predict_values(&self, x: &[Vec<f64>]) -> Result<Vec<f64>> {
        Ok(clamp_non_negative(self.inner.predict(x)?))
    }

    fn name(&self) -> &str {
        "Random Forest"
    }
}
