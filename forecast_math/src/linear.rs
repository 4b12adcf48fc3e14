//! Ordinary least squares regression
//!
//! Features are centered before solving so the intercept is recovered from
//! the means. The system is solved through an SVD with a relative cut-off,
//! which yields the minimum-norm solution when calendar features are
//! collinear (for example day-of-month and days-since-start inside one
//! month).

use crate::{check_design, MathError, Result};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// Least-squares solution of `a * x = b`, minimum norm when `a` is rank deficient.
pub fn least_squares(a: &DMatrix<f64>, b: &DVector<f64>) -> Result<DVector<f64>> {
    if a.nrows() != b.len() {
        return Err(MathError::InvalidInput(format!(
            "Design rows ({}) don't match target length ({})",
            a.nrows(),
            b.len()
        )));
    }
    if a.ncols() == 0 {
        return Ok(DVector::zeros(0));
    }

    let svd = a.clone().svd(true, true);
    let max_sv = svd.singular_values.max();
    if !max_sv.is_finite() {
        return Err(MathError::CalculationError(
            "Design matrix contains non-finite values".to_string(),
        ));
    }
    if max_sv == 0.0 {
        return Ok(DVector::zeros(a.ncols()));
    }

    let eps = max_sv * a.nrows().max(a.ncols()) as f64 * f64::EPSILON;
    svd.solve(b, eps)
        .map_err(|e| MathError::CalculationError(e.to_string()))
}

/// Linear regression with an intercept term
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinearRegression {
    coefficients: Option<Vec<f64>>,
    intercept: f64,
}

impl LinearRegression {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit coefficients and intercept to the rows of `x` and targets `y`.
    pub fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()> {
        let width = check_design(x, y)?;
        let n = x.len();

        let x_mean: Vec<f64> = (0..width)
            .map(|j| x.iter().map(|row| row[j]).sum::<f64>() / n as f64)
            .collect();
        let y_mean = y.iter().sum::<f64>() / n as f64;

        let a = DMatrix::from_fn(n, width, |i, j| x[i][j] - x_mean[j]);
        let b = DVector::from_fn(n, |i, _| y[i] - y_mean);
        let beta = least_squares(&a, &b)?;

        let coefficients: Vec<f64> = beta.iter().cloned().collect();
        if coefficients.iter().any(|c| !c.is_finite()) {
            return Err(MathError::CalculationError(
                "Least squares produced non-finite coefficients".to_string(),
            ));
        }

        self.intercept = y_mean
            - x_mean
                .iter()
                .zip(coefficients.iter())
                .map(|(m, c)| m * c)
                .sum::<f64>();
        self.coefficients = Some(coefficients);
        Ok(())
    }

    /// Predict one value per row of `x`.
    pub fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>> {
        let coefficients = self.coefficients.as_ref().ok_or(MathError::NotFitted)?;
        x.iter()
            .map(|row| {
                if row.len() != coefficients.len() {
                    return Err(MathError::InvalidInput(format!(
                        "Expected {} features, got {}",
                        coefficients.len(),
                        row.len()
                    )));
                }
                Ok(self.intercept
                    + row
                        .iter()
                        .zip(coefficients.iter())
                        .map(|(v, c)| v * c)
                        .sum::<f64>())
            })
            .collect()
    }

    pub fn coefficients(&self) -> Option<&[f64]> {
        self.coefficients.as_deref()
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}
