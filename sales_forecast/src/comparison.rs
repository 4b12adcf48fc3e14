//! Side-by-side evaluation across algorithms and training windows

use crate::data::SalesData;
use crate::error::Result;
use crate::evaluator::Evaluator;
use crate::metrics::MetricsRecord;
use crate::registry::AlgorithmRegistry;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use tracing::info;

/// Metrics of one algorithm on one split
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlgorithmComparison {
    pub algorithm: String,
    pub name: String,
    #[serde(flatten)]
    pub metrics: MetricsRecord,
}

/// Metrics of one algorithm at one training window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowMetrics {
    pub window: u32,
    #[serde(flatten)]
    pub metrics: MetricsRecord,
}

/// One algorithm's metrics over every requested window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowSeries {
    pub name: String,
    pub data: Vec<WindowMetrics>,
}

/// Per-algorithm window series keyed by algorithm, in registry order.
///
/// Serializes as a JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WindowResults(Vec<(String, WindowSeries)>);

impl WindowResults {
    pub fn get(&self, key: &str) -> Option<&WindowSeries> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> Vec<&str> {
        self.0.iter().map(|(k, _)| k.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for WindowResults {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, series) in &self.0 {
            map.serialize_entry(key, series)?;
        }
        map.end()
    }
}

/// Result of sweeping training windows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowComparison {
    pub windows: Vec<u32>,
    pub results: WindowResults,
}

/// Runs the evaluator for every registered algorithm
#[derive(Debug, Clone, Copy)]
pub struct ComparisonDriver<'a> {
    evaluator: Evaluator<'a>,
}

impl<'a> ComparisonDriver<'a> {
    pub fn new(registry: &'a AlgorithmRegistry) -> Self {
        Self {
            evaluator: Evaluator::new(registry),
        }
    }

    /// One row per registered algorithm, in registry order.
    pub fn compare_all(&self, data: &SalesData, training_weeks: u32) -> Result<Vec<AlgorithmComparison>> {
        let registry = self.evaluator.registry();
        let mut rows = Vec::with_capacity(registry.algorithms().len());
        for algorithm in registry.algorithms() {
            let metrics = self.evaluator.evaluate(data, training_weeks, algorithm.key())?;
            rows.push(AlgorithmComparison {
                algorithm: algorithm.key().to_string(),
                name: algorithm.display_name().to_string(),
                metrics,
            });
        }
        info!(algorithms = rows.len(), training_weeks, "comparison finished");
        Ok(rows)
    }

    /// Evaluate every algorithm at each window, keeping the window order
    /// given. `None` uses the configured default windows.
    pub fn compare_training_windows(&self, data: &SalesData, windows: Option<&[u32]>) -> Result<WindowComparison> {
        let registry = self.evaluator.registry();
        let windows = match windows {
            Some(w) => w.to_vec(),
            None => registry.config().evaluation.default_windows.clone(),
        };

        let mut results = Vec::with_capacity(registry.algorithms().len());
        for algorithm in registry.algorithms() {
            let mut series = Vec::with_capacity(windows.len());
            for &window in &windows {
                series.push(WindowMetrics {
                    window,
                    metrics: self.evaluator.evaluate(data, window, algorithm.key())?,
                });
            }
            results.push((
                algorithm.key().to_string(),
                WindowSeries {
                    name: algorithm.display_name().to_string(),
                    data: series,
                },
            ));
        }
        info!(windows = ?windows, "window sweep finished");
        Ok(WindowComparison {
            windows,
            results: WindowResults(results),
        })
    }
}
