//! # Sales Forecast Workspace
//!
//! Umbrella crate re-exporting the workspace members:
//!
//! - [`sales_forecast`]: data handling, forecasters, evaluation and the service layer
//! - [`forecast_math`]: the numerical kernels behind the forecasters
//!
//! ## Example
//!
//! ```
//! use sales_forecast_workspace::sales_forecast::{AlgorithmRegistry, ForecastService};
//!
//! let service = ForecastService::new(AlgorithmRegistry::default());
//! assert_eq!(service.health().status, "ok");
//! assert_eq!(service.algorithms().algorithms[0], "linear_regression");
//! ```

pub use forecast_math;
pub use sales_forecast;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_members_reachable() {
        assert_eq!(sales_forecast::NAME, "sales_forecast");
        assert_eq!(forecast_math::stats::round_to(2.345, 1), 2.3);
    }
}
