use forecast_math::MathError;
use pretty_assertions::assert_eq;
use sales_forecast::error::ForecastError;
use std::io;

#[test]
fn test_error_conversion() {
    let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
    assert!(matches!(ForecastError::from(io_error), ForecastError::IoError(_)));

    let json_error = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
    assert!(matches!(ForecastError::from(json_error), ForecastError::Json(_)));

    let chrono_error = chrono::NaiveDate::parse_from_str("2024-13-40", "%Y-%m-%d").unwrap_err();
    assert!(matches!(ForecastError::from(chrono_error), ForecastError::ParseError(_)));

    assert!(matches!(
        ForecastError::from(MathError::NotFitted),
        ForecastError::Math(_)
    ));
}

#[test]
fn test_error_display() {
    let error = ForecastError::InvalidParameter("arima.alpha must lie in (0, 1)".to_string());
    assert_eq!(error.to_string(), "Invalid parameter: arima.alpha must lie in (0, 1)");

    let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "permission denied");
    let error_string = ForecastError::from(io_error).to_string();
    assert!(error_string.contains("IO error"));
    assert!(error_string.contains("permission denied"));

    let error = ForecastError::CapabilityUnavailable("built without the `lstm` feature".to_string());
    assert!(error.to_string().starts_with("Capability unavailable"));
}

#[test]
fn test_error_creation() {
    let data_error = ForecastError::DataError("Record 3 has invalid unitsSold -1".to_string());
    let model_error = ForecastError::ModelError("Failed to converge".to_string());

    assert!(matches!(data_error, ForecastError::DataError(_)));
    assert!(matches!(model_error, ForecastError::ModelError(_)));

    if let ForecastError::DataError(msg) = data_error {
        assert_eq!(msg, "Record 3 has invalid unitsSold -1");
    }
}
