//! Regression trees and the ensembles built on them
//!
//! Splits minimise the summed squared error of the two children and use the
//! midpoint between adjacent distinct feature values as threshold.

use crate::{check_design, stats, MathError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Growth limits for a single tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TreeConfig {
    /// Maximum depth (`None` grows until leaves are pure or too small)
    pub max_depth: Option<usize>,
    /// Minimum samples a node needs before it may split
    pub min_samples_split: usize,
    /// Minimum samples on each side of a split
    pub min_samples_leaf: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

impl TreeConfig {
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.min_samples_split < 2 || self.min_samples_leaf < 1 {
            return Err(MathError::InvalidInput(
                "min_samples_split must be >= 2 and min_samples_leaf >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn predict(&self, row: &[f64]) -> f64 {
        match self {
            Node::Leaf { value } => *value,
            Node::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if row[*feature] <= *threshold {
                    left.predict(row)
                } else {
                    right.predict(row)
                }
            }
        }
    }

    fn depth(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    sse: f64,
}

/// CART regression tree
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegressionTree {
    config: TreeConfig,
    root: Option<Node>,
    n_features: usize,
}

impl RegressionTree {
    pub fn new(config: TreeConfig) -> Self {
        Self {
            config,
            root: None,
            n_features: 0,
        }
    }

    pub fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()> {
        let indices: Vec<usize> = (0..x.len()).collect();
        self.fit_indices(x, y, &indices)
    }

    /// Fit on a subset of rows; indices may repeat (bootstrap samples).
    pub fn fit_indices(&mut self, x: &[Vec<f64>], y: &[f64], indices: &[usize]) -> Result<()> {
        self.config.validate()?;
        self.n_features = check_design(x, y)?;
        if indices.is_empty() {
            return Err(MathError::InsufficientData(
                "Cannot grow a tree from zero samples".to_string(),
            ));
        }
        self.root = Some(self.grow(x, y, indices, 0));
        Ok(())
    }

    pub fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>> {
        x.iter().map(|row| self.predict_row(row)).collect()
    }

    pub fn predict_row(&self, row: &[f64]) -> Result<f64> {
        let root = self.root.as_ref().ok_or(MathError::NotFitted)?;
        if row.len() != self.n_features {
            return Err(MathError::InvalidInput(format!(
                "Expected {} features, got {}",
                self.n_features,
                row.len()
            )));
        }
        Ok(root.predict(row))
    }

    pub fn depth(&self) -> usize {
        self.root.as_ref().map_or(0, Node::depth)
    }

    fn grow(&self, x: &[Vec<f64>], y: &[f64], indices: &[usize], depth: usize) -> Node {
        let targets: Vec<f64> = indices.iter().map(|&i| y[i]).collect();
        let value = stats::mean(&targets);

        let depth_reached = self.config.max_depth.map_or(false, |max| depth >= max);
        if depth_reached
            || indices.len() < self.config.min_samples_split
            || stats::variance(&targets) <= f64::EPSILON * value.abs().max(1.0)
        {
            return Node::Leaf { value };
        }

        let Some(best) = self.best_split(x, y, indices) else {
            return Node::Leaf { value };
        };

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| x[i][best.feature] <= best.threshold);

        Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left: Box::new(self.grow(x, y, &left, depth + 1)),
            right: Box::new(self.grow(x, y, &right, depth + 1)),
        }
    }

    fn best_split(&self, x: &[Vec<f64>], y: &[f64], indices: &[usize]) -> Option<SplitCandidate> {
        let n = indices.len();
        let min_leaf = self.config.min_samples_leaf;
        if n < 2 * min_leaf {
            return None;
        }

        let total_sum: f64 = indices.iter().map(|&i| y[i]).sum();
        let total_sq: f64 = indices.iter().map(|&i| y[i] * y[i]).sum();
        let mut best: Option<SplitCandidate> = None;

        for feature in 0..self.n_features {
            let mut sorted = indices.to_vec();
            sorted.sort_by(|&a, &b| x[a][feature].total_cmp(&x[b][feature]));

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;
            for k in 1..n {
                let prev = sorted[k - 1];
                left_sum += y[prev];
                left_sq += y[prev] * y[prev];

                if k < min_leaf || n - k < min_leaf {
                    continue;
                }
                let lo = x[prev][feature];
                let hi = x[sorted[k]][feature];
                if lo >= hi {
                    continue;
                }

                let right_sum = total_sum - left_sum;
                let right_sq = total_sq - left_sq;
                let sse = (left_sq - left_sum * left_sum / k as f64)
                    + (right_sq - right_sum * right_sum / (n - k) as f64);

                if best.as_ref().map_or(true, |b| sse < b.sse) {
                    let mut threshold = (lo + hi) / 2.0;
                    if threshold >= hi {
                        threshold = lo;
                    }
                    best = Some(SplitCandidate {
                        feature,
                        threshold,
                        sse,
                    });
                }
            }
        }

        best
    }
}

/// Random forest settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ForestConfig {
    pub n_estimators: usize,
    pub seed: u64,
    pub tree: TreeConfig,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            seed: 42,
            tree: TreeConfig::default(),
        }
    }
}

impl ForestConfig {
    pub fn with_estimators(mut self, n_estimators: usize) -> Self {
        self.n_estimators = n_estimators;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Bagged ensemble of regression trees averaged at prediction time
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RandomForest {
    config: ForestConfig,
    trees: Vec<RegressionTree>,
}

impl RandomForest {
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
        }
    }

    pub fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()> {
        check_design(x, y)?;
        if self.config.n_estimators == 0 {
            return Err(MathError::InvalidInput(
                "A forest needs at least one tree".to_string(),
            ));
        }

        let n = x.len();
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut trees = Vec::with_capacity(self.config.n_estimators);
        for _ in 0..self.config.n_estimators {
            let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
            let mut tree = RegressionTree::new(self.config.tree.clone());
            tree.fit_indices(x, y, &sample)?;
            trees.push(tree);
        }
        self.trees = trees;
        Ok(())
    }

    pub fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>> {
        if self.trees.is_empty() {
            return Err(MathError::NotFitted);
        }
        x.iter()
            .map(|row| {
                let mut total = 0.0;
                for tree in &self.trees {
                    total += tree.predict_row(row)?;
                }
                Ok(total / self.trees.len() as f64)
            })
            .collect()
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

/// Gradient boosting settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BoostingConfig {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub tree: TreeConfig,
}

impl Default for BoostingConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            tree: TreeConfig::default().with_max_depth(Some(3)),
        }
    }
}

impl BoostingConfig {
    pub fn with_estimators(mut self, n_estimators: usize) -> Self {
        self.n_estimators = n_estimators;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }
}

/// Squared-error gradient boosting starting from the target mean
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GradientBoosting {
    config: BoostingConfig,
    init: Option<f64>,
    stages: Vec<RegressionTree>,
}

impl GradientBoosting {
    pub fn new(config: BoostingConfig) -> Self {
        Self {
            config,
            init: None,
            stages: Vec::new(),
        }
    }

    pub fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()> {
        check_design(x, y)?;
        if self.config.learning_rate <= 0.0 || self.config.learning_rate > 1.0 {
            return Err(MathError::InvalidInput(
                "Learning rate must be in (0, 1]".to_string(),
            ));
        }

        let init = stats::mean(y);
        let mut current = vec![init; y.len()];
        let mut stages = Vec::with_capacity(self.config.n_estimators);

        for _ in 0..self.config.n_estimators {
            let residuals: Vec<f64> = y.iter().zip(&current).map(|(t, p)| t - p).collect();
            let mut tree = RegressionTree::new(self.config.tree.clone());
            tree.fit(x, &residuals)?;
            for (pred, row) in current.iter_mut().zip(x) {
                *pred += self.config.learning_rate * tree.predict_row(row)?;
            }
            stages.push(tree);
        }

        self.init = Some(init);
        self.stages = stages;
        Ok(())
    }

    pub fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>> {
        let init = self.init.ok_or(MathError::NotFitted)?;
        x.iter()
            .map(|row| {
                let mut value = init;
                for tree in &self.stages {
                    value += self.config.learning_rate * tree.predict_row(row)?;
                }
                Ok(value)
            })
            .collect()
    }
}
