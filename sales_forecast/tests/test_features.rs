mod common;

use common::date;
use pretty_assertions::assert_eq;
use rstest::rstest;
use sales_forecast::features::{CalendarFeatures, FeatureBuilder};

#[rstest]
#[case(date(2024, 1, 1), 0, 1, 1)]
#[case(date(2024, 1, 7), 6, 7, 1)]
#[case(date(2020, 12, 31), 3, 31, 53)]
#[case(date(2021, 1, 3), 6, 3, 53)]
fn test_calendar_encoding(#[case] day: chrono::NaiveDate, #[case] dow: u32, #[case] dom: u32, #[case] week: u32) {
    let features = CalendarFeatures::encode(day, day);
    assert_eq!(features.day_of_week, dow);
    assert_eq!(features.day_of_month, dom);
    assert_eq!(features.week_of_year, week);
    assert_eq!(features.days_since_start, 0);
}

#[test]
fn test_design_uses_series_origin() {
    let data = common::linear_sales(10).trailing_window(1);
    let series = &data.group_by_product()[0];
    let builder = FeatureBuilder::for_series(series, true).unwrap();
    assert_eq!(builder.origin(), date(2024, 1, 3));

    let (x, y) = builder.design(series);
    assert_eq!(x.len(), 8);
    assert_eq!(y[0], 12.0);
    assert_eq!(x[0], vec![2.0, 3.0, 1.0, 1.0, 0.0]);
    assert_eq!(x[7][4], 7.0);
}

#[test]
fn test_inference_dates_share_origin() {
    let builder = FeatureBuilder::new(date(2024, 1, 1), false);
    let rows = builder.rows(&[date(2024, 2, 1), date(2023, 12, 31)]);
    assert_eq!(rows[0], vec![3.0, 1.0, 5.0, 31.0]);
    assert_eq!(rows[1][3], -1.0);
    assert_eq!(builder.feature_names(), vec!["day_of_week", "day_of_month", "week_of_year", "days_since_start"]);
}
