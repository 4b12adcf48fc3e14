//! Sales record handling
//!
//! Records arrive unsorted and may mix products. [`SalesData`] validates
//! them once; everything downstream works on trailing windows and
//! per-product [`ProductSeries`] carved out of it.

use crate::error::{ForecastError, Result};
use crate::utils::{date_parser, weeks_before};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// One day of sales for one product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    #[serde(deserialize_with = "date_parser::deserialize")]
    pub date: NaiveDate,
    pub product: String,
    #[serde(rename = "unitsSold")]
    pub units_sold: f64,
}

impl SalesRecord {
    pub fn new(date: NaiveDate, product: impl Into<String>, units_sold: f64) -> Self {
        Self {
            date,
            product: product.into(),
            units_sold,
        }
    }
}

/// A validated set of sales records
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SalesData {
    records: Vec<SalesRecord>,
}

impl SalesData {
    /// Validate records: units must be finite and non-negative, products non-empty.
    pub fn new(records: Vec<SalesRecord>) -> Result<Self> {
        for (i, record) in records.iter().enumerate() {
            if !record.units_sold.is_finite() || record.units_sold < 0.0 {
                return Err(ForecastError::DataError(format!(
                    "Record {} ({} on {}) has invalid unitsSold {}",
                    i, record.product, record.date, record.units_sold
                )));
            }
            if record.product.trim().is_empty() {
                return Err(ForecastError::DataError(format!(
                    "Record {} on {} has an empty product",
                    i, record.date
                )));
            }
        }
        Ok(Self { records })
    }

    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn min_date(&self) -> Option<NaiveDate> {
        self.records.iter().map(|r| r.date).min()
    }

    pub fn max_date(&self) -> Option<NaiveDate> {
        self.records.iter().map(|r| r.date).max()
    }

    /// Records dated on or after `max_date - weeks`. Spans reaching past the
    /// earliest representable date keep the whole history.
    pub fn trailing_window(&self, weeks: u32) -> SalesData {
        match self.max_date() {
            Some(max) => {
                let start = weeks_before(max, weeks);
                self.filter(|r| r.date >= start)
            }
            None => SalesData::default(),
        }
    }

    /// Records with `start <= date < end`.
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> SalesData {
        self.filter(|r| r.date >= start && r.date < end)
    }

    /// Records dated on or after `start`.
    pub fn since(&self, start: NaiveDate) -> SalesData {
        self.filter(|r| r.date >= start)
    }

    fn filter<F: Fn(&SalesRecord) -> bool>(&self, keep: F) -> SalesData {
        SalesData {
            records: self.records.iter().filter(|r| keep(r)).cloned().collect(),
        }
    }

    /// Distinct products in order of first appearance.
    pub fn products(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .map(|r| r.product.as_str())
            .filter(|product| seen.insert(*product))
            .collect()
    }

    /// One date-sorted series per product, in order of first appearance.
    pub fn group_by_product(&self) -> Vec<ProductSeries> {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut groups: Vec<ProductSeries> = Vec::new();
        for record in &self.records {
            let slot = *index.entry(record.product.as_str()).or_insert_with(|| {
                groups.push(ProductSeries::new(record.product.clone()));
                groups.len() - 1
            });
            groups[slot].observations.push((record.date, record.units_sold));
        }
        for group in &mut groups {
            group.observations.sort_by_key(|(date, _)| *date);
        }
        groups
    }
}

/// Observations of one product, sorted by date
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSeries {
    pub product: String,
    observations: Vec<(NaiveDate, f64)>,
}

impl ProductSeries {
    fn new(product: String) -> Self {
        Self {
            product,
            observations: Vec::new(),
        }
    }

    /// Build a series from unsorted observations.
    pub fn from_observations(product: impl Into<String>, mut observations: Vec<(NaiveDate, f64)>) -> Self {
        observations.sort_by_key(|(date, _)| *date);
        Self {
            product: product.into(),
            observations,
        }
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn observations(&self) -> &[(NaiveDate, f64)] {
        &self.observations
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.observations.iter().map(|(d, _)| *d).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.observations.iter().map(|(_, v)| *v).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.observations.first().map(|(d, _)| *d)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.observations.last().map(|(d, _)| *d)
    }

    /// One value per calendar day from the first to the last observation.
    ///
    /// Same-day observations are summed. Gaps are forward-filled, then
    /// backward-filled, then zero-filled.
    pub fn daily_values(&self) -> Vec<f64> {
        let (Some(first), Some(last)) = (self.first_date(), self.last_date()) else {
            return Vec::new();
        };
        let days = (last - first).num_days() as usize + 1;
        let mut slots: Vec<Option<f64>> = vec![None; days];
        for (date, value) in &self.observations {
            let slot = &mut slots[(*date - first).num_days() as usize];
            *slot = Some(slot.unwrap_or(0.0) + value);
        }

        let mut carry = None;
        for slot in slots.iter_mut() {
            match slot {
                Some(v) => carry = Some(*v),
                None => *slot = carry,
            }
        }
        let mut carry = None;
        for slot in slots.iter_mut().rev() {
            match slot {
                Some(v) => carry = Some(*v),
                None => *slot = carry,
            }
        }
        slots.into_iter().map(|v| v.unwrap_or(0.0)).collect()
    }
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Date", alias = "date")]
    date: String,
    #[serde(rename = "Product", alias = "Product Name", alias = "product", default)]
    product: Option<String>,
    #[serde(rename = "Units Sold", alias = "unitsSold", default)]
    units_sold: Option<String>,
}

/// Data loader for sales exports
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load sales records from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<SalesData> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Load sales records from any CSV source with a header row.
    ///
    /// Expected columns are `Date` (`DD/MM/YYYY` or ISO), `Product` or
    /// `Product Name`, and `Units Sold`. Rows without a product are dropped
    /// and unreadable unit counts become zero.
    pub fn from_reader<R: Read>(reader: R) -> Result<SalesData> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut records = Vec::new();
        for row in csv_reader.deserialize::<CsvRow>() {
            let row = row?;
            let product = row.product.unwrap_or_default();
            if product.is_empty() || row.date.is_empty() {
                continue;
            }
            let date = date_parser::parse_date(&row.date)?;
            let units_sold = row
                .units_sold
                .and_then(|u| u.parse::<f64>().ok())
                .map(f64::trunc)
                .unwrap_or(0.0);
            records.push(SalesRecord::new(date, product, units_sold));
        }

        SalesData::new(records)
    }
}
