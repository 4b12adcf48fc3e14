//! Univariate LSTM regressor
//!
//! One LSTM layer reads a window of scalar observations and a linear head
//! maps the last hidden state to the next value. Training minimises the mean
//! squared error with mini-batch Adam and full backpropagation through time.
//! Gate rows are laid out as `[input, forget, cell, output]`.

use crate::{MathError, Result};
use ndarray::{s, Array, Array1, Array2, ArrayView1, Dimension, Zip};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_distr::{Distribution, Uniform};
use serde::{Deserialize, Serialize};

const BETA1: f64 = 0.9;
const BETA2: f64 = 0.999;
const ADAM_EPS: f64 = 1e-8;

/// Network and training settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LstmConfig {
    pub hidden_size: usize,
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    pub seed: u64,
}

impl Default for LstmConfig {
    fn default() -> Self {
        Self {
            hidden_size: 32,
            epochs: 50,
            batch_size: 8,
            learning_rate: 0.01,
            seed: 42,
        }
    }
}

impl LstmConfig {
    pub fn with_hidden_size(mut self, hidden_size: usize) -> Self {
        self.hidden_size = hidden_size;
        self
    }

    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.hidden_size == 0 || self.batch_size == 0 {
            return Err(MathError::InvalidInput(
                "hidden_size and batch_size must be positive".to_string(),
            ));
        }
        if self.learning_rate.is_nan() || self.learning_rate <= 0.0 {
            return Err(MathError::InvalidInput(
                "learning_rate must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct Params {
    w_ih: Array1<f64>,
    w_hh: Array2<f64>,
    b: Array1<f64>,
    w_out: Array1<f64>,
    b_out: Array1<f64>,
}

impl Params {
    fn init(hidden: usize, rng: &mut StdRng) -> Self {
        let k = 1.0 / (hidden as f64).sqrt();
        let dist = Uniform::new_inclusive(-k, k);

        let w_ih = Array1::from_shape_fn(4 * hidden, |_| dist.sample(&mut *rng));
        let w_hh = Array2::from_shape_fn((4 * hidden, hidden), |_| dist.sample(&mut *rng));
        let b = Array1::from_shape_fn(4 * hidden, |_| dist.sample(&mut *rng));
        let w_out = Array1::from_shape_fn(hidden, |_| dist.sample(&mut *rng));
        let b_out = Array1::from_shape_fn(1, |_| dist.sample(&mut *rng));
        Self {
            w_ih,
            w_hh,
            b,
            w_out,
            b_out,
        }
    }

    fn zeros_like(&self) -> Self {
        Self {
            w_ih: Array1::zeros(self.w_ih.raw_dim()),
            w_hh: Array2::zeros(self.w_hh.raw_dim()),
            b: Array1::zeros(self.b.raw_dim()),
            w_out: Array1::zeros(self.w_out.raw_dim()),
            b_out: Array1::zeros(self.b_out.raw_dim()),
        }
    }
}

/// Activations kept from the forward pass for one time step
struct StepCache {
    x: f64,
    h_prev: Array1<f64>,
    c_prev: Array1<f64>,
    i: Array1<f64>,
    f: Array1<f64>,
    g: Array1<f64>,
    o: Array1<f64>,
    tanh_c: Array1<f64>,
}

struct AdamState {
    m: Params,
    v: Params,
    step: i32,
}

/// LSTM trained to map a window of values to the next value
#[derive(Debug, Clone)]
pub struct LstmRegressor {
    config: LstmConfig,
    params: Option<Params>,
    loss_history: Vec<f64>,
}

impl LstmRegressor {
    pub fn new(config: LstmConfig) -> Self {
        Self {
            config,
            params: None,
            loss_history: Vec::new(),
        }
    }

    /// Mean training loss per epoch from the last call to [`fit`](Self::fit).
    pub fn loss_history(&self) -> &[f64] {
        &self.loss_history
    }

    /// Train on `windows[k] -> targets[k]` pairs.
    pub fn fit(&mut self, windows: &[Vec<f64>], targets: &[f64]) -> Result<()> {
        self.config.validate()?;
        if windows.is_empty() || windows.len() != targets.len() {
            return Err(MathError::InvalidInput(format!(
                "Need matching non-empty windows and targets, got {} and {}",
                windows.len(),
                targets.len()
            )));
        }
        let lookback = windows[0].len();
        if lookback == 0 || windows.iter().any(|w| w.len() != lookback) {
            return Err(MathError::InvalidInput(
                "Windows must share one non-zero length".to_string(),
            ));
        }

        let hidden = self.config.hidden_size;
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut params = Params::init(hidden, &mut rng);
        let mut adam = AdamState {
            m: params.zeros_like(),
            v: params.zeros_like(),
            step: 0,
        };

        let mut order: Vec<usize> = (0..windows.len()).collect();
        let mut history = Vec::with_capacity(self.config.epochs);

        for _ in 0..self.config.epochs {
            order.shuffle(&mut rng);
            let mut epoch_loss = 0.0;

            for batch in order.chunks(self.config.batch_size) {
                let mut grads = params.zeros_like();
                let scale = 1.0 / batch.len() as f64;

                for &k in batch {
                    let (output, cache) = forward(&params, &windows[k]);
                    let err = output - targets[k];
                    epoch_loss += err * err;
                    backward(&params, &cache, 2.0 * err * scale, &mut grads);
                }

                adam_step(&mut params, &grads, &mut adam, self.config.learning_rate);
            }

            let mean_loss = epoch_loss / windows.len() as f64;
            if !mean_loss.is_finite() {
                return Err(MathError::CalculationError(
                    "LSTM training loss diverged".to_string(),
                ));
            }
            history.push(mean_loss);
        }

        self.params = Some(params);
        self.loss_history = history;
        Ok(())
    }

    /// Predict the value following `window`.
    pub fn predict(&self, window: &[f64]) -> Result<f64> {
        let params = self.params.as_ref().ok_or(MathError::NotFitted)?;
        if window.is_empty() {
            return Err(MathError::InvalidInput("Empty input window".to_string()));
        }
        let (output, _) = forward(params, window);
        Ok(output)
    }

    pub fn predict_many(&self, windows: &[Vec<f64>]) -> Result<Vec<f64>> {
        windows.iter().map(|w| self.predict(w)).collect()
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn forward(params: &Params, window: &[f64]) -> (f64, Vec<StepCache>) {
    let hidden = params.w_out.len();
    let mut h = Array1::<f64>::zeros(hidden);
    let mut c = Array1::<f64>::zeros(hidden);
    let mut cache = Vec::with_capacity(window.len());

    for &x in window {
        let a = &params.w_ih * x + params.w_hh.dot(&h) + &params.b;
        let i = a.slice(s![0..hidden]).mapv(sigmoid);
        let f = a.slice(s![hidden..2 * hidden]).mapv(sigmoid);
        let g = a.slice(s![2 * hidden..3 * hidden]).mapv(f64::tanh);
        let o = a.slice(s![3 * hidden..4 * hidden]).mapv(sigmoid);

        let c_next = &f * &c + &i * &g;
        let tanh_c = c_next.mapv(f64::tanh);
        let h_next = &o * &tanh_c;

        cache.push(StepCache {
            x,
            h_prev: h,
            c_prev: c,
            i,
            f,
            g,
            o,
            tanh_c,
        });
        h = h_next;
        c = c_next;
    }

    let output = params.w_out.dot(&h) + params.b_out[0];
    (output, cache)
}

fn backward(params: &Params, cache: &[StepCache], d_out: f64, grads: &mut Params) {
    let hidden = params.w_out.len();
    let last_h = match cache.last() {
        Some(step) => &step.o * &step.tanh_c,
        None => return,
    };

    grads.w_out.scaled_add(d_out, &last_h);
    grads.b_out[0] += d_out;

    let mut dh = &params.w_out * d_out;
    let mut dc = Array1::<f64>::zeros(hidden);

    for step in cache.iter().rev() {
        let d_o = &dh * &step.tanh_c;
        dc = dc + &dh * &step.o * step.tanh_c.mapv(|t| 1.0 - t * t);

        let d_i = &dc * &step.g;
        let d_g = &dc * &step.i;
        let d_f = &dc * &step.c_prev;

        let mut da = Array1::<f64>::zeros(4 * hidden);
        da.slice_mut(s![0..hidden])
            .assign(&(d_i * step.i.mapv(|v| v * (1.0 - v))));
        da.slice_mut(s![hidden..2 * hidden])
            .assign(&(d_f * step.f.mapv(|v| v * (1.0 - v))));
        da.slice_mut(s![2 * hidden..3 * hidden])
            .assign(&(d_g * step.g.mapv(|v| 1.0 - v * v)));
        da.slice_mut(s![3 * hidden..4 * hidden])
            .assign(&(d_o * step.o.mapv(|v| v * (1.0 - v))));

        grads.w_ih.scaled_add(step.x, &da);
        grads.b += &da;
        add_outer(&mut grads.w_hh, da.view(), step.h_prev.view());

        dh = params.w_hh.t().dot(&da);
        dc = &dc * &step.f;
    }
}

fn add_outer(target: &mut Array2<f64>, col: ArrayView1<f64>, row: ArrayView1<f64>) {
    for (r, &a) in col.iter().enumerate() {
        target.row_mut(r).scaled_add(a, &row);
    }
}

fn adam_step(params: &mut Params, grads: &Params, state: &mut AdamState, lr: f64) {
    state.step += 1;
    let bc1 = 1.0 - BETA1.powi(state.step);
    let bc2 = 1.0 - BETA2.powi(state.step);

    adam_update(&mut params.w_ih, &grads.w_ih, &mut state.m.w_ih, &mut state.v.w_ih, lr, bc1, bc2);
    adam_update(&mut params.w_hh, &grads.w_hh, &mut state.m.w_hh, &mut state.v.w_hh, lr, bc1, bc2);
    adam_update(&mut params.b, &grads.b, &mut state.m.b, &mut state.v.b, lr, bc1, bc2);
    adam_update(&mut params.w_out, &grads.w_out, &mut state.m.w_out, &mut state.v.w_out, lr, bc1, bc2);
    adam_update(&mut params.b_out, &grads.b_out, &mut state.m.b_out, &mut state.v.b_out, lr, bc1, bc2);
}

fn adam_update<D: Dimension>(
    param: &mut Array<f64, D>,
    grad: &Array<f64, D>,
    m: &mut Array<f64, D>,
    v: &mut Array<f64, D>,
    lr: f64,
    bc1: f64,
    bc2: f64,
) {
    Zip::from(param)
        .and(grad)
        .and(m)
        .and(v)
        .for_each(|p, &g, m, v| {
            *m = BETA1 * *m + (1.0 - BETA1) * g;
            *v = BETA2 * *v + (1.0 - BETA2) * g * g;
            let m_hat = *m / bc1;
            let v_hat = *v / bc2;
            *p -= lr * m_hat / (v_hat.sqrt() + ADAM_EPS);
        });
}
