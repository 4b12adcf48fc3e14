//! # Sales Forecast
//!
//! Per-product daily sales forecasting and model evaluation.
//!
//! ## Features
//!
//! - Sales history ingestion from JSON requests or CSV exports
//! - Calendar-feature regressors (Linear Regression, Random Forest, Gradient Boosting)
//! - Sequence models (ARIMA, LSTM) behind the `arima` and `lstm` features
//! - Holdout evaluation with MAE, RMSE and MAPE
//! - Comparison across algorithms and training-window lengths
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sales_forecast::api::{ForecastRequest, ForecastService};
//! use sales_forecast::data::DataLoader;
//!
//! let data = DataLoader::from_csv("sales.csv")?;
//! let service = ForecastService::default();
//!
//! let request = ForecastRequest::new(data.records().to_vec())
//!     .with_training_weeks(6)
//!     .with_algorithm("random_forest");
//!
//! for row in service.predict(request.clone())?.predictions {
//!     println!("{} {} {:.1}", row.date, row.product, row.predicted_sales);
//! }
//! println!("{}", service.evaluate(request)?);
//! # Ok::<(), sales_forecast::ForecastError>(())
//! ```

pub mod api;
pub mod comparison;
pub mod config;
pub mod data;
pub mod error;
pub mod evaluator;
pub mod features;
pub mod metrics;
pub mod models;
pub mod registry;
pub mod utils;

// Re-export commonly used types
pub use crate::api::ForecastService;
pub use crate::config::ForecastConfig;
pub use crate::data::{DataLoader, SalesData, SalesRecord};
pub use crate::error::ForecastError;
pub use crate::metrics::MetricsRecord;
pub use crate::models::{ForecastRow, PointRegressor, SalesForecaster};
pub use crate::registry::{Algorithm, AlgorithmRegistry, Capabilities};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
