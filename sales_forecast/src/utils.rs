//! Utility functions for the sales_forecast crate

use chrono::{Days, Duration, NaiveDate};

/// Consecutive calendar days following `last`, one per forecast step.
pub fn future_dates(last: NaiveDate, days: usize) -> Vec<NaiveDate> {
    (1..=days as i64).map(|i| last + Duration::days(i)).collect()
}

/// The date `weeks` whole weeks before `date`, saturating at the earliest
/// representable date.
pub fn weeks_before(date: NaiveDate, weeks: u32) -> NaiveDate {
    date.checked_sub_days(Days::new(u64::from(weeks) * 7))
        .unwrap_or(NaiveDate::MIN)
}

/// Date parsing and formatting helpers
pub mod date_parser {
    use crate::error::{ForecastError, Result};
    use chrono::{DateTime, NaiveDate, NaiveDateTime};
    use serde::{Deserialize, Deserializer};

    const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];
    const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

    /// Parse a calendar date; any time-of-day part is discarded.
    pub fn parse_date(input: &str) -> Result<NaiveDate> {
        let s = input.trim();
        for format in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(s, format) {
                return Ok(date);
            }
        }
        for format in DATETIME_FORMATS {
            if let Ok(datetime) = NaiveDateTime::parse_from_str(s, format) {
                return Ok(datetime.date());
            }
        }
        if let Ok(datetime) = DateTime::parse_from_rfc3339(s) {
            return Ok(datetime.date_naive());
        }
        Err(ForecastError::ParseError(format!("Unrecognised date: '{}'", input)))
    }

    /// ISO `YYYY-MM-DD` rendering
    pub fn format_date(date: NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> std::result::Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_date(&raw).map_err(serde::de::Error::custom)
    }
}
