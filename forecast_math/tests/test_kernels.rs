use approx::assert_abs_diff_eq;
use forecast_math::linear::LinearRegression;
use forecast_math::scaling::MinMaxScaler;
use forecast_math::stats::{round_to, std_dev};
use forecast_math::tree::{BoostingConfig, ForestConfig, GradientBoosting, RandomForest};
use forecast_math::MathError;
use rstest::rstest;

fn plane() -> (Vec<Vec<f64>>, Vec<f64>) {
    let x: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64, (i % 4) as f64]).collect();
    let y = x.iter().map(|r| 3.0 + 2.0 * r[0] - r[1]).collect();
    (x, y)
}

#[test]
fn test_linear_regression_recovers_plane() {
    let (x, y) = plane();
    let mut model = LinearRegression::new();
    model.fit(&x, &y).unwrap();

    let coefficients = model.coefficients().unwrap();
    assert_abs_diff_eq!(coefficients[0], 2.0, epsilon = 1e-9);
    assert_abs_diff_eq!(coefficients[1], -1.0, epsilon = 1e-9);
    assert_abs_diff_eq!(model.intercept(), 3.0, epsilon = 1e-9);
}

#[rstest]
#[case(vec![], vec![])]
#[case(vec![vec![1.0], vec![2.0, 3.0]], vec![1.0, 2.0])]
#[case(vec![vec![1.0]], vec![1.0, 2.0])]
fn test_invalid_designs_rejected(#[case] x: Vec<Vec<f64>>, #[case] y: Vec<f64>) {
    assert!(LinearRegression::new().fit(&x, &y).is_err());
    assert!(RandomForest::new(ForestConfig::default()).fit(&x, &y).is_err());
}

#[test]
fn test_ensembles_require_fit() {
    let forest = RandomForest::new(ForestConfig::default());
    assert_eq!(forest.predict(&[vec![1.0]]), Err(MathError::NotFitted));
    let boosting = GradientBoosting::new(BoostingConfig::default());
    assert_eq!(boosting.predict(&[vec![1.0]]), Err(MathError::NotFitted));
}

#[test]
fn test_scaler_roundtrip_on_constant_series() {
    let scaler = MinMaxScaler::fit(&[4.0, 4.0, 4.0]).unwrap();
    assert_eq!(scaler.transform_all(&[4.0]), vec![0.0]);
    assert_eq!(scaler.inverse_transform(0.5), 4.5);
}

#[rstest]
#[case(2.25, 1, 2.3)]
#[case(-1.25, 1, -1.3)]
#[case(0.1234, 3, 0.123)]
fn test_round_to(#[case] value: f64, #[case] decimals: i32, #[case] expected: f64) {
    assert_eq!(round_to(value, decimals), expected);
}

#[test]
fn test_population_std_dev() {
    assert_abs_diff_eq!(std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]), 2.0, epsilon = 1e-12);
}

#[cfg(feature = "arima")]
#[test]
fn test_arima_interval_contains_point_forecast() {
    use forecast_math::arima::{Arima, ArimaOrder};

    let series: Vec<f64> = (0..40).map(|i| 50.0 + (i as f64 * 0.7).sin() * 5.0 + i as f64 * 0.3).collect();
    let model = Arima::fit(&series, ArimaOrder::default()).unwrap();
    let forecast = model.forecast_interval(10, 0.05).unwrap();
    for h in 0..10 {
        assert!(forecast.lower[h] <= forecast.mean[h]);
        assert!(forecast.mean[h] <= forecast.upper[h]);
    }
}

#[cfg(feature = "neural")]
#[test]
fn test_lstm_learns_constant_target() {
    use forecast_math::lstm::{LstmConfig, LstmRegressor};

    let windows: Vec<Vec<f64>> = (0..16).map(|i| vec![(i % 4) as f64 / 4.0; 3]).collect();
    let targets = vec![0.5; 16];
    let mut model = LstmRegressor::new(LstmConfig::default().with_hidden_size(4).with_epochs(40));
    model.fit(&windows, &targets).unwrap();

    let history = model.loss_history();
    assert!(history.last().unwrap() < history.first().unwrap());
}
