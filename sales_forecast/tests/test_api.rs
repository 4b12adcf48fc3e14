mod common;

use common::{cafe_sales, linear_sales, quick_registry};
use pretty_assertions::assert_eq;
use sales_forecast::api::{
    ForecastRequest, ForecastService, Operation, WindowComparisonRequest,
};
use sales_forecast::config::ForecastConfig;
use sales_forecast::error::ForecastError;
use sales_forecast::registry::{AlgorithmRegistry, Capabilities};
use serde_json::{json, Value};

fn service() -> ForecastService {
    ForecastService::new(quick_registry())
}

fn tabular_service() -> ForecastService {
    ForecastService::new(AlgorithmRegistry::new(ForecastConfig::default(), Capabilities::none()))
}

fn body(days: i64) -> String {
    json!({ "sales_data": cafe_sales(days).records() }).to_string()
}

#[test]
fn test_predict_response_shape() {
    let response: Value = serde_json::from_str(
        &service().handle_json(Operation::Predict, &body(35)).unwrap(),
    )
    .unwrap();

    let predictions = response["predictions"].as_array().unwrap();
    assert_eq!(predictions.len(), 2 * 28);
    let first = &predictions[0];
    assert_eq!(first["date"], "2024-02-05");
    assert_eq!(first["product"], "Latte");
    assert!(first["predicted_sales"].as_f64().unwrap() >= 0.0);
    assert_eq!(first["confidence_interval"].as_array().unwrap().len(), 2);
}

#[test]
fn test_unknown_algorithm_predicts_like_linear_regression() {
    let records = linear_sales(28).records().to_vec();
    let service = service();
    let fallback = service
        .predict(ForecastRequest::new(records.clone()).with_algorithm("prophet"))
        .unwrap();
    let linear = service.predict(ForecastRequest::new(records)).unwrap();
    assert_eq!(fallback, linear);
    assert_eq!(linear.predictions[0].predicted_sales, 38.0);
}

#[test]
fn test_negative_units_rejected() {
    let body = r#"{"sales_data": [{"date": "2024-01-01", "product": "Latte", "unitsSold": -4}]}"#;
    let result = service().handle_json(Operation::Predict, body);
    assert!(matches!(result, Err(ForecastError::DataError(_))));
}

#[test]
fn test_negative_training_weeks_rejected() {
    let body = r#"{"sales_data": [], "training_weeks": -1}"#;
    assert!(service().handle_json(Operation::Evaluate, body).is_err());
}

#[test]
fn test_huge_training_weeks_uses_whole_history() {
    let sales = cafe_sales(35);
    let records = sales.records();
    let huge = json!({ "sales_data": records, "training_weeks": 4_000_000_000u32 }).to_string();
    let covering = json!({ "sales_data": records, "training_weeks": 10 }).to_string();
    let service = tabular_service();

    for operation in [Operation::Predict, Operation::Evaluate] {
        let expected: Value =
            serde_json::from_str(&service.handle_json(operation, &covering).unwrap()).unwrap();
        let actual: Value =
            serde_json::from_str(&service.handle_json(operation, &huge).unwrap()).unwrap();
        if operation == Operation::Predict {
            assert_eq!(actual, expected);
        } else {
            for key in ["mae", "rmse", "mape"] {
                assert_eq!(actual[key], expected[key], "{}", key);
            }
        }
    }

    let compared = service.handle_json(Operation::Compare, &huge);
    assert!(compared.is_ok());

    let windows = WindowComparisonRequest {
        sales_data: records.to_vec(),
        windows: Some(vec![4_000_000_000]),
    };
    let comparison = service.compare_windows(windows).unwrap();
    assert_eq!(comparison.windows, vec![4_000_000_000]);
}

#[test]
fn test_evaluate_returns_flat_metrics() {
    let request = json!({
        "sales_data": cafe_sales(42).records(),
        "training_weeks": 3,
        "algorithm": "random_forest"
    });
    let response: Value = serde_json::from_str(
        &tabular_service()
            .handle_json(Operation::Evaluate, &request.to_string())
            .unwrap(),
    )
    .unwrap();

    for key in ["mae", "rmse", "mape", "training_time"] {
        assert!(response[key].is_number(), "missing {}", key);
    }
    assert!(response.get("r2").is_none());
}

#[test]
fn test_compare_lists_every_algorithm_in_order() {
    let response = service()
        .compare(ForecastRequest::new(cafe_sales(42).records().to_vec()))
        .unwrap();
    let keys: Vec<&str> = response.results.iter().map(|r| r.algorithm.as_str()).collect();
    assert_eq!(
        keys,
        vec!["linear_regression", "random_forest", "gradient_boosting", "arima", "lstm"]
    );
    let names: Vec<&str> = response.results.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names[3], "ARIMA");
}

#[test]
fn test_compare_windows_keeps_requested_windows() {
    let request = WindowComparisonRequest {
        sales_data: cafe_sales(70).records().to_vec(),
        windows: Some(vec![3, 4]),
    };
    let comparison = service().compare_windows(request).unwrap();

    assert_eq!(comparison.windows, vec![3, 4]);
    assert_eq!(comparison.results.len(), 5);
    for key in comparison.results.keys() {
        let series = comparison.results.get(key).unwrap();
        let windows: Vec<u32> = series.data.iter().map(|d| d.window).collect();
        assert_eq!(windows, vec![3, 4]);
    }

    let json = serde_json::to_value(&comparison).unwrap();
    assert_eq!(json["results"]["lstm"]["name"], "LSTM");
    assert_eq!(json["results"]["linear_regression"]["data"][1]["window"], 4);
}

#[test]
fn test_compare_windows_defaults() {
    let body = json!({ "sales_data": [] }).to_string();
    let response: Value = serde_json::from_str(
        &tabular_service()
            .handle_json(Operation::CompareWindows, &body)
            .unwrap(),
    )
    .unwrap();
    assert_eq!(response["windows"], json!([3, 4, 5, 6, 7, 8]));
    assert_eq!(response["results"]["arima"]["data"][0]["mae"], 0.0);
}

#[test]
fn test_algorithms_and_health() {
    let service = service();
    assert_eq!(
        service.handle_json(Operation::Algorithms, "").unwrap(),
        r#"{"algorithms":["linear_regression","random_forest","gradient_boosting","arima","lstm"]}"#
    );
    assert_eq!(service.health().status, "ok");
}
