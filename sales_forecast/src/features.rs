//! Calendar features for the tabular regressors

use crate::data::ProductSeries;
use chrono::{Datelike, NaiveDate};

/// Column names, in row order. `month` is present only when enabled.
pub const FEATURE_NAMES: [&str; 5] = [
    "day_of_week",
    "day_of_month",
    "week_of_year",
    "month",
    "days_since_start",
];

/// Calendar encoding of a single date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarFeatures {
    /// Monday = 0 .. Sunday = 6
    pub day_of_week: u32,
    pub day_of_month: u32,
    /// ISO-8601 week number
    pub week_of_year: u32,
    pub month: u32,
    /// Signed day offset from the builder's origin
    pub days_since_start: i64,
}

impl CalendarFeatures {
    pub fn encode(date: NaiveDate, origin: NaiveDate) -> Self {
        Self {
            day_of_week: date.weekday().num_days_from_monday(),
            day_of_month: date.day(),
            week_of_year: date.iso_week().week(),
            month: date.month(),
            days_since_start: (date - origin).num_days(),
        }
    }

    pub fn to_row(&self, include_month: bool) -> Vec<f64> {
        let mut row = vec![
            f64::from(self.day_of_week),
            f64::from(self.day_of_month),
            f64::from(self.week_of_year),
        ];
        if include_month {
            row.push(f64::from(self.month));
        }
        row.push(self.days_since_start as f64);
        row
    }
}

/// Encodes dates against a fixed origin.
///
/// The origin is the earliest date of the fitting window, and the same
/// builder must encode the dates the fitted model is later asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureBuilder {
    origin: NaiveDate,
    include_month: bool,
}

impl FeatureBuilder {
    pub fn new(origin: NaiveDate, include_month: bool) -> Self {
        Self {
            origin,
            include_month,
        }
    }

    /// Builder anchored at the series' first date, or `None` for an empty series.
    pub fn for_series(series: &ProductSeries, include_month: bool) -> Option<Self> {
        series
            .first_date()
            .map(|origin| Self::new(origin, include_month))
    }

    pub fn origin(&self) -> NaiveDate {
        self.origin
    }

    pub fn width(&self) -> usize {
        if self.include_month {
            5
        } else {
            4
        }
    }

    pub fn feature_names(&self) -> Vec<&'static str> {
        FEATURE_NAMES
            .iter()
            .copied()
            .filter(|name| self.include_month || *name != "month")
            .collect()
    }

    pub fn encode(&self, date: NaiveDate) -> CalendarFeatures {
        CalendarFeatures::encode(date, self.origin)
    }

    pub fn row(&self, date: NaiveDate) -> Vec<f64> {
        self.encode(date).to_row(self.include_month)
    }

    pub fn rows(&self, dates: &[NaiveDate]) -> Vec<Vec<f64>> {
        dates.iter().map(|d| self.row(*d)).collect()
    }

    /// Feature matrix and targets for every observation in the series.
    pub fn design(&self, series: &ProductSeries) -> (Vec<Vec<f64>>, Vec<f64>) {
        series
            .observations()
            .iter()
            .map(|(date, value)| (self.row(*date), *value))
            .unzip()
    }
}
