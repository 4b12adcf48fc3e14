//! Holdout evaluation of a single algorithm
//!
//! The newest `test_weeks` of data form the test window and the
//! `training_weeks` before it the training window. Errors from every
//! product are pooled into one set of metrics.

use crate::data::SalesData;
use crate::error::Result;
use crate::metrics::{compute_metrics, MetricsRecord};
use crate::models::{Predictor, SalesForecaster, TabularForecaster};
use crate::registry::AlgorithmRegistry;
use crate::utils::weeks_before;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info, info_span, warn};

/// Train and test partitions of a sales history
#[derive(Debug, Clone, PartialEq)]
pub struct HoldoutSplit {
    pub train: SalesData,
    pub test: SalesData,
    /// First day of the test window
    pub test_start: NaiveDate,
}

/// Split so the test window holds the last `test_weeks * 7` days and the
/// training window the `training_weeks * 7` days immediately before it.
pub fn holdout_split(data: &SalesData, training_weeks: u32, test_weeks: u32) -> Option<HoldoutSplit> {
    let last = data.max_date()?;
    let test_start = weeks_before(last, test_weeks).succ_opt().unwrap_or(NaiveDate::MAX);
    let train_start = weeks_before(test_start, training_weeks);
    Some(HoldoutSplit {
        train: data.between(train_start, test_start),
        test: data.since(test_start),
        test_start,
    })
}

/// Paired actual and predicted values pooled over products
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PooledPairs {
    pub actual: Vec<f64>,
    pub predicted: Vec<f64>,
}

impl PooledPairs {
    fn push(&mut self, actual: f64, predicted: f64) {
        self.actual.push(actual);
        self.predicted.push(predicted);
    }

    pub fn len(&self) -> usize {
        self.actual.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actual.is_empty()
    }
}

/// Scores registry algorithms on a holdout split
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    registry: &'a AlgorithmRegistry,
}

impl<'a> Evaluator<'a> {
    pub fn new(registry: &'a AlgorithmRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'a AlgorithmRegistry {
        self.registry
    }

    /// Holdout metrics for `algorithm_key`.
    ///
    /// Unknown keys and splits with too little data give zeroed metrics
    /// without a training time.
    pub fn evaluate(&self, data: &SalesData, training_weeks: u32, algorithm_key: &str) -> Result<MetricsRecord> {
        let span = info_span!("evaluate", algorithm = algorithm_key, training_weeks);
        let _guard = span.enter();

        let Some(algorithm) = self.registry.get(algorithm_key) else {
            warn!("unknown algorithm, reporting zeroed metrics");
            return Ok(MetricsRecord::zeroed());
        };
        let settings = &self.registry.config().evaluation;
        let Some(split) = holdout_split(data, training_weeks, settings.test_weeks) else {
            debug!("no data to evaluate");
            return Ok(MetricsRecord::zeroed());
        };
        if split.train.len() < settings.min_train_rows || split.test.is_empty() {
            debug!(
                train_rows = split.train.len(),
                test_rows = split.test.len(),
                "split too small to evaluate"
            );
            return Ok(MetricsRecord::zeroed());
        }

        let started = Instant::now();
        let predictor = self.registry.create(algorithm);
        let pairs = match &predictor {
            Predictor::Tabular(model) => pair_tabular(model, &split),
            Predictor::Sequence(model) => {
                pair_sequence(model.as_ref(), &split, training_weeks, settings.test_weeks)?
            }
        };
        let elapsed = started.elapsed().as_secs_f64();

        let metrics = compute_metrics(&pairs.actual, &pairs.predicted, settings.include_r2)?
            .with_training_time(elapsed);
        info!(
            pairs = pairs.len(),
            mae = metrics.mae,
            rmse = metrics.rmse,
            mape = metrics.mape,
            "evaluation finished"
        );
        Ok(metrics)
    }
}

/// Fit each product on its training rows and predict its test dates.
///
/// Test dates are encoded against the training window's first date.
pub fn pair_tabular(model: &TabularForecaster, split: &HoldoutSplit) -> PooledPairs {
    let mut test_by_product: HashMap<String, _> = split
        .test
        .group_by_product()
        .into_iter()
        .map(|series| (series.product.clone(), series))
        .collect();

    let mut pairs = PooledPairs::default();
    for series in split.train.group_by_product() {
        if series.len() < model.config().min_rows {
            continue;
        }
        let Some(test) = test_by_product.remove(&series.product) else {
            continue;
        };
        match model.fit_predict(&series, &test.dates()) {
            Ok((_, _, predicted)) => {
                for (actual, value) in test.values().into_iter().zip(predicted) {
                    pairs.push(actual, value);
                }
            }
            Err(e) => warn!(product = %series.product, error = %e, "fit failed during evaluation"),
        }
    }
    pairs
}

/// Forecast from the training rows and match forecasts to test rows on
/// date and product. Test rows without a matching forecast are left out.
pub fn pair_sequence(
    model: &dyn SalesForecaster,
    split: &HoldoutSplit,
    training_weeks: u32,
    test_weeks: u32,
) -> Result<PooledPairs> {
    let forecasts = model.predict(&split.train, training_weeks, test_weeks)?;
    let lookup: HashMap<(NaiveDate, &str), f64> = forecasts
        .iter()
        .map(|row| ((row.date, row.product.as_str()), row.predicted_sales))
        .collect();

    let mut pairs = PooledPairs::default();
    for record in split.test.records() {
        if let Some(predicted) = lookup.get(&(record.date, record.product.as_str())) {
            pairs.push(record.units_sold, *predicted);
        }
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SalesRecord;
    use chrono::Duration;

    fn daily(days: i64) -> SalesData {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        SalesData::new(
            (0..days)
                .map(|i| SalesRecord::new(start + Duration::days(i), "Latte", 10.0 + i as f64))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_split_boundaries() {
        let split = holdout_split(&daily(40), 3, 1).unwrap();
        assert_eq!(split.test.len(), 7);
        assert_eq!(split.train.len(), 21);
        assert_eq!(split.test_start, NaiveDate::from_ymd_opt(2024, 2, 3).unwrap());
        assert!(split.train.max_date().unwrap() < split.test_start);
    }

    #[test]
    fn test_short_history_zeroed() {
        let registry = AlgorithmRegistry::default();
        let metrics = Evaluator::new(&registry)
            .evaluate(&daily(8), 4, "linear_regression")
            .unwrap();
        assert_eq!(metrics, MetricsRecord::zeroed());
    }

    #[test]
    fn test_linear_trend_scores_near_zero() {
        let registry = AlgorithmRegistry::default();
        let metrics = Evaluator::new(&registry)
            .evaluate(&daily(31), 4, "linear_regression")
            .unwrap();
        assert!(metrics.mae < 0.01);
        assert!(metrics.training_time.is_some());
    }
}
