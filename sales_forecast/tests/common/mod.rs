#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use sales_forecast::config::{ForecastConfig, LstmConfig};
use sales_forecast::{AlgorithmRegistry, Capabilities, SalesData, SalesRecord};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// `days` consecutive records starting 2024-01-01 with units `f(i)`
pub fn series<F: Fn(i64) -> f64>(product: &str, days: i64, f: F) -> Vec<SalesRecord> {
    let start = date(2024, 1, 1);
    (0..days)
        .map(|i| SalesRecord::new(start + Duration::days(i), product, f(i)))
        .collect()
}

pub fn linear_sales(days: i64) -> SalesData {
    SalesData::new(series("Latte", days, |i| 10.0 + i as f64)).unwrap()
}

/// Two products with weekly seasonality and a gentle trend
pub fn cafe_sales(days: i64) -> SalesData {
    let mut records = series("Latte", days, |i| 20.0 + (i % 7) as f64 * 2.0 + i as f64 * 0.1);
    records.extend(series("Scone", days, |i| if i % 7 >= 5 { 12.0 } else { 4.0 }));
    SalesData::new(records).unwrap()
}

/// Full registry with a small, fast network
pub fn quick_registry() -> AlgorithmRegistry {
    let config = ForecastConfig::default().with_lstm(LstmConfig {
        hidden_units: 8,
        epochs: 5,
        ..LstmConfig::default()
    });
    AlgorithmRegistry::new(config, Capabilities::detect())
}
