mod common;

use chrono::Duration;
use common::{cafe_sales, date, linear_sales, quick_registry, series};
use pretty_assertions::assert_eq;
use rstest::rstest;
use sales_forecast::config::{EvaluationConfig, ForecastConfig};
use sales_forecast::data::{SalesData, SalesRecord};
use sales_forecast::evaluator::{holdout_split, pair_sequence, Evaluator};
use sales_forecast::models::{ArimaForecaster, ForecastRow, SalesForecaster};
use sales_forecast::registry::{Algorithm, AlgorithmRegistry, Capabilities};
use sales_forecast::MetricsRecord;

#[test]
fn test_holdout_split_is_disjoint() {
    let data = cafe_sales(60);
    let split = holdout_split(&data, 4, 1).unwrap();

    assert_eq!(split.test.len(), 2 * 7);
    assert_eq!(split.train.len(), 2 * 28);
    let last_train = split.train.max_date().unwrap();
    assert!(last_train < split.test_start);
    assert_eq!(split.test.min_date(), Some(split.test_start));
}

#[test]
fn test_unknown_algorithm_zeroed_without_timing() {
    let registry = quick_registry();
    let metrics = Evaluator::new(&registry)
        .evaluate(&cafe_sales(35), 4, "prophet")
        .unwrap();
    assert_eq!(metrics, MetricsRecord::zeroed());
    assert_eq!(metrics.training_time, None);
}

#[rstest]
#[case(0)]
#[case(2)]
#[case(9)]
fn test_degenerate_splits_zeroed(#[case] days: i64) {
    let registry = quick_registry();
    let data = linear_sales(days);
    for algorithm in Algorithm::ALL {
        let metrics = Evaluator::new(&registry)
            .evaluate(&data, 4, algorithm.key())
            .unwrap();
        assert!(metrics.is_zeroed(), "{} on {} days", algorithm, days);
        assert_eq!(metrics.training_time, None);
    }
}

#[test]
fn test_zero_test_actuals_give_zero_mape() {
    let data = SalesData::new(series("Latte", 35, |i| if i < 28 { 10.0 + i as f64 } else { 0.0 })).unwrap();
    let registry = quick_registry();
    let metrics = Evaluator::new(&registry)
        .evaluate(&data, 4, "linear_regression")
        .unwrap();
    assert_eq!(metrics.mape, 0.0);
    assert!(metrics.mae > 0.0);
    assert!(metrics.training_time.is_some());
}

#[test]
fn test_linear_trend_evaluates_perfectly() {
    let registry = quick_registry();
    let metrics = Evaluator::new(&registry)
        .evaluate(&linear_sales(31), 3, "linear_regression")
        .unwrap();
    assert_eq!(metrics.mae, 0.0);
    assert_eq!(metrics.rmse, 0.0);
    assert_eq!(metrics.mape, 0.0);
}

/// Latte is flat at 10 throughout. Scone sells 4 a day for four weeks,
/// then 10 on only three days of the final week.
fn uneven_products() -> (Vec<SalesRecord>, Vec<SalesRecord>) {
    let latte = series("Latte", 35, |_| 10.0);
    let mut scone = series("Scone", 28, |_| 4.0);
    for day in [28, 30, 33] {
        scone.push(SalesRecord::new(date(2024, 1, 1) + Duration::days(day), "Scone", 10.0));
    }
    (latte, scone)
}

#[test]
fn test_metrics_pool_pairs_across_products() {
    let registry = AlgorithmRegistry::new(ForecastConfig::default(), Capabilities::none());
    let (latte, scone) = uneven_products();
    let data = SalesData::new(latte.into_iter().chain(scone).collect()).unwrap();

    let split = holdout_split(&data, 4, 1).unwrap();
    assert_eq!(split.test.len(), 7 + 3);

    let metrics = Evaluator::new(&registry)
        .evaluate(&data, 4, "linear_regression")
        .unwrap();

    // 7 exact Latte pairs and 3 Scone pairs that miss by 6
    assert_eq!(metrics.mae, 1.8);
    assert_eq!(metrics.rmse, 3.29);
    assert_eq!(metrics.mape, 18.0);

    // Averaging per-product scores would weight both products equally
    let per_product_mae = (0.0 + 6.0) / 2.0;
    let per_product_mape = (0.0 + 60.0) / 2.0;
    assert_ne!(metrics.mae, per_product_mae);
    assert_ne!(metrics.mape, per_product_mape);
}

#[test]
fn test_r2_reported_when_enabled() {
    let config = ForecastConfig::default().with_evaluation(EvaluationConfig {
        include_r2: true,
        ..EvaluationConfig::default()
    });
    let registry = AlgorithmRegistry::new(config, Capabilities::none());
    let metrics = Evaluator::new(&registry)
        .evaluate(&cafe_sales(42), 4, "gradient_boosting")
        .unwrap();
    assert!(metrics.r2.is_some());
}

#[test]
fn test_unavailable_sequence_model_has_no_pairs() {
    let registry = AlgorithmRegistry::new(ForecastConfig::default(), Capabilities::none());
    let metrics = Evaluator::new(&registry)
        .evaluate(&cafe_sales(42), 4, "arima")
        .unwrap();
    assert!(metrics.is_zeroed());
    assert!(metrics.training_time.is_some());
}

#[derive(Debug)]
struct FixedForecaster(Vec<ForecastRow>);

impl SalesForecaster for FixedForecaster {
    fn predict(&self, _: &SalesData, _: u32, _: u32) -> sales_forecast::error::Result<Vec<ForecastRow>> {
        Ok(self.0.clone())
    }

    fn name(&self) -> &str {
        "Fixed"
    }
}

#[test]
fn test_sequence_pairs_match_on_date_and_product() {
    let data = cafe_sales(35);
    let split = holdout_split(&data, 4, 1).unwrap();
    let start = split.test_start;
    let forecaster = FixedForecaster(vec![
        ForecastRow::from_bounds(start, "Latte", 1.0, 0.0, 2.0),
        ForecastRow::from_bounds(start, "Espresso", 1.0, 0.0, 2.0),
        ForecastRow::from_bounds(start - Duration::days(1), "Scone", 1.0, 0.0, 2.0),
    ]);

    let pairs = pair_sequence(&forecaster, &split, 4, 1).unwrap();
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs.predicted, vec![1.0]);
}

#[test]
fn test_unavailable_arima_pairs_nothing() {
    let data = cafe_sales(35);
    let split = holdout_split(&data, 4, 1).unwrap();
    let forecaster = ArimaForecaster::new(Default::default(), false);
    let pairs = pair_sequence(&forecaster, &split, 4, 1).unwrap();
    assert!(pairs.is_empty());
}
