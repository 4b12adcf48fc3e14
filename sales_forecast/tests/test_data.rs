mod common;

use common::date;
use pretty_assertions::assert_eq;
use rstest::rstest;
use sales_forecast::data::{DataLoader, SalesData, SalesRecord};
use sales_forecast::error::ForecastError;
use sales_forecast::utils::date_parser;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_data_loader_from_csv() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "Date,Product Name,Units Sold").unwrap();
    writeln!(file, "01/02/2024,Latte,12").unwrap();
    writeln!(file, "02/02/2024,Latte,oops").unwrap();
    writeln!(file, "02/02/2024,,7").unwrap();
    writeln!(file, "03/02/2024, Scone ,4").unwrap();

    let data = DataLoader::from_csv(file.path()).unwrap();

    assert_eq!(data.len(), 3);
    assert_eq!(data.records()[0], SalesRecord::new(date(2024, 2, 1), "Latte", 12.0));
    assert_eq!(data.records()[1].units_sold, 0.0);
    assert_eq!(data.products(), vec!["Latte", "Scone"]);
}

#[test]
fn test_data_loader_product_header() {
    let csv = "Date,Product,Units Sold\n2024-03-01,Mocha,5\n";
    let data = DataLoader::from_reader(csv.as_bytes()).unwrap();
    assert_eq!(data.records()[0], SalesRecord::new(date(2024, 3, 1), "Mocha", 5.0));
}

#[test]
fn test_data_loader_error_handling() {
    assert!(matches!(
        DataLoader::from_csv("nonexistent_file.csv"),
        Err(ForecastError::IoError(_))
    ));

    let csv = "Date,Product,Units Sold\nyesterday,Mocha,5\n";
    assert!(matches!(
        DataLoader::from_reader(csv.as_bytes()),
        Err(ForecastError::ParseError(_))
    ));

    let csv = "Date,Product,Units Sold\n2024-03-01,Mocha,-5\n";
    assert!(matches!(
        DataLoader::from_reader(csv.as_bytes()),
        Err(ForecastError::DataError(_))
    ));
}

#[rstest]
#[case("2024-02-29")]
#[case("29/02/2024")]
#[case("2024-02-29T08:30:00")]
#[case("2024-02-29T08:30:00.000Z")]
fn test_record_date_formats(#[case] raw: &str) {
    let json = format!(r#"{{"date": "{}", "product": "Latte", "unitsSold": 2}}"#, raw);
    let record: SalesRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(record.date, date(2024, 2, 29));
    assert_eq!(date_parser::format_date(record.date), "2024-02-29");
}

#[test]
fn test_record_serializes_units_sold_camel_case() {
    let record = SalesRecord::new(date(2024, 1, 5), "Latte", 3.0);
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"date": "2024-01-05", "product": "Latte", "unitsSold": 3.0})
    );
}

#[test]
fn test_non_finite_units_rejected() {
    let result = SalesData::new(vec![SalesRecord::new(date(2024, 1, 1), "Latte", f64::NAN)]);
    assert!(matches!(result, Err(ForecastError::DataError(_))));
}

#[test]
fn test_trailing_window_is_inclusive() {
    let data = common::linear_sales(30);
    let window = data.trailing_window(2);
    // 2024-01-30 minus 14 days is 2024-01-16
    assert_eq!(window.len(), 15);
    assert_eq!(window.min_date(), Some(date(2024, 1, 16)));
    assert_eq!(data.trailing_window(52).len(), 30);
}

#[test]
fn test_between_and_since() {
    let data = common::linear_sales(10);
    assert_eq!(data.between(date(2024, 1, 3), date(2024, 1, 6)).len(), 3);
    assert_eq!(data.since(date(2024, 1, 8)).len(), 3);
    assert!(SalesData::default().trailing_window(4).is_empty());
}

#[test]
fn test_daily_values_sum_duplicates_and_fill_gaps() {
    let data = SalesData::new(vec![
        SalesRecord::new(date(2024, 1, 4), "Latte", 6.0),
        SalesRecord::new(date(2024, 1, 1), "Latte", 1.0),
        SalesRecord::new(date(2024, 1, 1), "Latte", 2.0),
    ])
    .unwrap();

    let series = &data.group_by_product()[0];
    assert_eq!(series.len(), 3);
    assert_eq!(series.daily_values(), vec![3.0, 3.0, 3.0, 6.0]);
}
