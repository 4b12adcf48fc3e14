//! ARIMA models for time series forecasting
//!
//! Parameters are estimated with the Hannan-Rissanen two-stage procedure:
//! a long autoregression supplies proxy innovations, then the ARMA
//! coefficients come from one least-squares regression on lagged values and
//! lagged proxy innovations. A constant is only estimated when `d == 0`.
//!
//! Prediction intervals use the psi-weights of the integrated model, so
//! they widen with the horizon.
//!
//! Short series are not rejected outright. When too few differenced values
//! remain to estimate the requested ARMA part, the MA and then the AR order
//! are lowered until the regression is identified; [`Arima::order`] reports
//! the order that was actually fitted.

use crate::linear::least_squares;
use crate::{stats, MathError, Result};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

/// ARIMA order `(p, d, q)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArimaOrder {
    /// AR order
    pub p: usize,
    /// Differencing order
    pub d: usize,
    /// MA order
    pub q: usize,
}

impl ArimaOrder {
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }
}

impl Default for ArimaOrder {
    fn default() -> Self {
        Self::new(2, 1, 2)
    }
}

impl std::fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ARIMA({},{},{})", self.p, self.d, self.q)
    }
}

/// Point forecast with symmetric prediction bounds
#[derive(Debug, Clone, PartialEq)]
pub struct ArimaForecast {
    pub mean: Vec<f64>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

/// Fitted ARIMA model
#[derive(Debug, Clone)]
pub struct Arima {
    order: ArimaOrder,
    ar: Vec<f64>,
    ma: Vec<f64>,
    mu: f64,
    sigma2: f64,
    /// Differenced, centered series the ARMA part was fitted on
    z: Vec<f64>,
    /// Innovations of `z`
    residuals: Vec<f64>,
    /// Last value of each differencing level, outermost first
    anchors: Vec<f64>,
}

impl Arima {
    /// Estimate an ARIMA model of the given order.
    pub fn fit(series: &[f64], order: ArimaOrder) -> Result<Self> {
        if series.iter().any(|v| !v.is_finite()) {
            return Err(MathError::InvalidInput(
                "Series contains non-finite values".to_string(),
            ));
        }
        let ArimaOrder { p, d, q } = order;
        if series.len() < d + 2 {
            return Err(MathError::InsufficientData(format!(
                "{} needs at least {} observations, got {}",
                order,
                d + 2,
                series.len()
            )));
        }

        let mut anchors = Vec::with_capacity(d);
        let mut w = series.to_vec();
        for _ in 0..d {
            anchors.push(*w.last().ok_or_else(|| {
                MathError::InsufficientData("Series too short to difference".to_string())
            })?);
            w = difference(&w);
        }

        let mu = if d == 0 { stats::mean(&w) } else { 0.0 };
        let z: Vec<f64> = w.iter().map(|v| v - mu).collect();

        let (ar, ma) = estimate_reduced(&z, p, q)?;
        let order = ArimaOrder::new(ar.len(), d, ma.len());

        let residuals = innovations(&z, &ar, &ma);
        let effective = &residuals[ar.len().min(residuals.len())..];
        let sigma2 = if effective.is_empty() {
            0.0
        } else {
            effective.iter().map(|e| e * e).sum::<f64>() / effective.len() as f64
        };
        if !sigma2.is_finite() {
            return Err(MathError::CalculationError(format!(
                "{} residual variance diverged",
                order
            )));
        }

        Ok(Self {
            order,
            ar,
            ma,
            mu,
            sigma2,
            z,
            residuals,
            anchors,
        })
    }

    /// Order that was fitted, which may be lower than the one requested
    pub fn order(&self) -> ArimaOrder {
        self.order
    }

    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar
    }

    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma
    }

    /// Innovation variance
    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }

    /// Point forecasts for the next `steps` observations on the original scale.
    pub fn forecast(&self, steps: usize) -> Vec<f64> {
        let mut z = self.z.clone();
        let mut e = self.residuals.clone();
        let mut out = Vec::with_capacity(steps);

        for _ in 0..steps {
            let t = z.len();
            let mut value = 0.0;
            for (i, phi) in self.ar.iter().enumerate() {
                if t > i {
                    value += phi * z[t - 1 - i];
                }
            }
            for (j, theta) in self.ma.iter().enumerate() {
                if t > j {
                    value += theta * e[t - 1 - j];
                }
            }
            z.push(value);
            e.push(0.0);
            out.push(value + self.mu);
        }

        for &anchor in self.anchors.iter().rev() {
            out = integrate(&out, anchor);
        }
        out
    }

    /// Point forecasts with a `1 - alpha` prediction interval.
    pub fn forecast_interval(&self, steps: usize, alpha: f64) -> Result<ArimaForecast> {
        if alpha.is_nan() || alpha <= 0.0 || alpha >= 1.0 {
            return Err(MathError::InvalidInput(
                "alpha must be between 0 and 1".to_string(),
            ));
        }
        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| MathError::CalculationError(e.to_string()))?;
        let z_crit = normal.inverse_cdf(1.0 - alpha / 2.0);

        let mean = self.forecast(steps);
        let psi = self.psi_weights(steps);

        let mut cumulative = 0.0;
        let mut lower = Vec::with_capacity(steps);
        let mut upper = Vec::with_capacity(steps);
        for (h, point) in mean.iter().enumerate() {
            cumulative += psi[h] * psi[h];
            let half_width = z_crit * (self.sigma2 * cumulative).sqrt();
            lower.push(point - half_width);
            upper.push(point + half_width);
        }

        if mean.iter().chain(&lower).chain(&upper).any(|v| !v.is_finite()) {
            return Err(MathError::CalculationError(format!(
                "{} forecast diverged",
                self.order
            )));
        }

        Ok(ArimaForecast { mean, lower, upper })
    }

    /// MA(infinity) weights of the integrated model.
    fn psi_weights(&self, steps: usize) -> Vec<f64> {
        // phi*(B) = phi(B) (1 - B)^d, stored as 1 - sum c_i B^i
        let mut poly = Vec::with_capacity(self.ar.len() + 1);
        poly.push(1.0);
        poly.extend(self.ar.iter().map(|phi| -phi));
        for _ in 0..self.order.d {
            let mut next = vec![0.0; poly.len() + 1];
            for (i, coef) in poly.iter().enumerate() {
                next[i] += coef;
                next[i + 1] -= coef;
            }
            poly = next;
        }
        let c: Vec<f64> = poly.iter().skip(1).map(|v| -v).collect();

        let mut psi = Vec::with_capacity(steps);
        for j in 0..steps {
            if j == 0 {
                psi.push(1.0);
                continue;
            }
            let mut value = if j <= self.ma.len() { self.ma[j - 1] } else { 0.0 };
            for i in 1..=j.min(c.len()) {
                value += c[i - 1] * psi[j - i];
            }
            psi.push(value);
        }
        psi
    }
}

/// First difference of a series
pub fn difference(data: &[f64]) -> Vec<f64> {
    data.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Undo one difference, continuing from `start`
fn integrate(diff: &[f64], start: f64) -> Vec<f64> {
    let mut level = start;
    diff.iter()
        .map(|d| {
            level += d;
            level
        })
        .collect()
}

/// Residuals of a zero-mean ARMA recursion; the first `p` are zero.
fn innovations(z: &[f64], ar: &[f64], ma: &[f64]) -> Vec<f64> {
    let p = ar.len();
    let mut e = vec![0.0; z.len()];
    for t in p..z.len() {
        let mut fitted = 0.0;
        for (i, phi) in ar.iter().enumerate() {
            fitted += phi * z[t - 1 - i];
        }
        for (j, theta) in ma.iter().enumerate() {
            if t > j {
                fitted += theta * e[t - 1 - j];
            }
        }
        e[t] = z[t] - fitted;
    }
    e
}

/// Regress `z[t]` on its own lags without intercept, returning coefficients.
fn fit_autoregression(z: &[f64], order: usize) -> Result<Vec<f64>> {
    let rows = z.len().saturating_sub(order);
    if order == 0 || rows <= order {
        return Err(MathError::InsufficientData(format!(
            "AR({}) needs more than {} observations",
            order,
            2 * order
        )));
    }
    let a = DMatrix::from_fn(rows, order, |r, i| z[r + order - 1 - i]);
    let b = DVector::from_fn(rows, |r, _| z[r + order]);
    Ok(least_squares(&a, &b)?.iter().cloned().collect())
}

/// Fit the highest ARMA order not above `(p, q)` that the data identifies.
///
/// Candidates are tried by total order, preferring AR terms over MA terms at
/// equal size; ARMA(0,0) always succeeds.
fn estimate_reduced(z: &[f64], p: usize, q: usize) -> Result<(Vec<f64>, Vec<f64>)> {
    for total in (1..=p + q).rev() {
        for ar in (0..=p.min(total)).rev() {
            let ma = total - ar;
            if ma > q {
                continue;
            }
            match hannan_rissanen(z, ar, ma) {
                Ok(coefs) => return Ok(coefs),
                Err(MathError::InsufficientData(_)) => continue,
                Err(e) => return Err(e),
            }
        }
    }
    Ok((Vec::new(), Vec::new()))
}

fn hannan_rissanen(z: &[f64], p: usize, q: usize) -> Result<(Vec<f64>, Vec<f64>)> {
    let n = z.len();

    // Stage 1: proxy innovations from a long autoregression
    let (proxy, start) = if q > 0 {
        let long_order = (p + q).max(3).min(n / 3);
        let coefs = fit_autoregression(z, long_order)?;
        let mut proxy = vec![0.0; n];
        for t in long_order..n {
            let fitted: f64 = coefs
                .iter()
                .enumerate()
                .map(|(i, a)| a * z[t - 1 - i])
                .sum();
            proxy[t] = z[t] - fitted;
        }
        (proxy, long_order + q.max(p))
    } else {
        (vec![0.0; n], p)
    };

    // Stage 2: joint regression on lagged values and lagged innovations
    let rows = n.saturating_sub(start);
    if rows < p + q + 1 {
        return Err(MathError::InsufficientData(format!(
            "ARMA({},{}) needs at least {} usable observations, got {}",
            p,
            q,
            p + q + 1,
            rows
        )));
    }
    let a = DMatrix::from_fn(rows, p + q, |r, k| {
        let t = start + r;
        if k < p {
            z[t - 1 - k]
        } else {
            proxy[t - 1 - (k - p)]
        }
    });
    let b = DVector::from_fn(rows, |r, _| z[start + r]);
    let beta = least_squares(&a, &b)?;

    let ar: Vec<f64> = beta.iter().take(p).cloned().collect();
    let ma: Vec<f64> = beta.iter().skip(p).cloned().collect();
    Ok((ar, ma))
}
