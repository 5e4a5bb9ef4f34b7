//! Gradient-boosted churn classifier
//!
//! Trained once, synchronously, at process start on a seeded 80/20 split of
//! the feature store. Logistic loss with Newton leaf weights; no row or
//! feature subsampling, so training is deterministic for a fixed seed.
//! Validation metrics are logged but do not gate anything.

use ndarray::{Array2, ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::tree::Tree;

/// Fraction of rows held out for validation.
const VALIDATION_FRACTION: f64 = 0.2;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("empty dataset")]
    EmptyDataset,

    #[error("label count {labels} does not match row count {rows}")]
    LabelCount { rows: usize, labels: usize },

    #[error("row {row}: label {value} is not binary")]
    NonBinaryLabel { row: usize, value: f64 },
}

/// Boosting hyperparameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GbdtParams {
    /// Number of boosting iterations (trees)
    pub n_trees: usize,
    /// Maximum depth of each tree
    pub max_depth: usize,
    /// Learning rate (shrinkage)
    pub learning_rate: f64,
    /// L2 regularization on leaf weights
    pub lambda: f64,
    /// Minimum samples required in a leaf
    pub min_samples_leaf: usize,
}

impl Default for GbdtParams {
    fn default() -> Self {
        Self {
            n_trees: 50,
            max_depth: 3,
            learning_rate: 0.1,
            lambda: 1.0,
            min_samples_leaf: 1,
        }
    }
}

/// Held-out metrics computed after training. Informational only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationMetrics {
    pub accuracy: f64,
    pub log_loss: f64,
    pub held_out: usize,
}

/// Gradient-boosted decision-tree classifier for churn probability.
#[derive(Debug)]
pub struct GbdtClassifier {
    params: GbdtParams,
    trees: Vec<Tree>,
    base_score: f64,
    schema_hash: u32,
    metrics: Option<ValidationMetrics>,
}

impl GbdtClassifier {
    /// Train on the full feature matrix and binary labels. `schema_hash`
    /// records which feature layout the model was fitted under.
    pub fn fit(
        x: &Array2<f64>,
        y: &[f64],
        schema_hash: u32,
        params: GbdtParams,
        seed: u64,
    ) -> Result<Self, ModelError> {
        let n = x.nrows();
        if n == 0 {
            return Err(ModelError::EmptyDataset);
        }
        if y.len() != n {
            return Err(ModelError::LabelCount { rows: n, labels: y.len() });
        }
        for (row, &value) in y.iter().enumerate() {
            if value != 0.0 && value != 1.0 {
                return Err(ModelError::NonBinaryLabel { row, value });
            }
        }

        let mut indices: Vec<usize> = (0..n).collect();
        indices.shuffle(&mut StdRng::seed_from_u64(seed));

        // Hold out 20% for validation; skip for tiny datasets.
        let n_val = if n >= 5 {
            ((n as f64) * VALIDATION_FRACTION).round() as usize
        } else {
            0
        };
        let (val_idx, train_idx) = indices.split_at(n_val);

        let x_train = x.select(Axis(0), train_idx);
        let y_train: Vec<f64> = train_idx.iter().map(|&i| y[i]).collect();
        let n_train = y_train.len();

        log::info!(
            "Training churn model: {} rows ({} features), {} held out",
            n_train,
            x.ncols(),
            n_val
        );

        let positive_rate = y_train.iter().sum::<f64>() / n_train as f64;
        let prior = positive_rate.clamp(1e-6, 1.0 - 1e-6);
        let base_score = (prior / (1.0 - prior)).ln();

        let mut margins = vec![base_score; n_train];
        let mut trees = Vec::with_capacity(params.n_trees);

        for _ in 0..params.n_trees {
            let mut grad = vec![0.0; n_train];
            let mut hess = vec![0.0; n_train];
            for i in 0..n_train {
                let p = sigmoid(margins[i]);
                grad[i] = p - y_train[i];
                hess[i] = (p * (1.0 - p)).max(1e-12);
            }

            let tree = Tree::fit(x_train.view(), &grad, &hess, &params);
            for (i, margin) in margins.iter_mut().enumerate() {
                *margin += params.learning_rate * tree.leaf_estimate_at(x_train.view(), i);
            }
            trees.push(tree);
        }

        let mut model = Self {
            params,
            trees,
            base_score,
            schema_hash,
            metrics: None,
        };

        if n_val > 0 {
            let metrics = model.evaluate(x.view(), y, val_idx);
            log::info!(
                "Validation: accuracy {:.3}, log-loss {:.3} ({} rows)",
                metrics.accuracy,
                metrics.log_loss,
                metrics.held_out
            );
            model.metrics = Some(metrics);
        }

        Ok(model)
    }

    /// Raw log-odds output for one feature row.
    /// Precondition: `values` follows the training schema.
    pub fn predict_margin(&self, values: &[f64]) -> f64 {
        let mut margin = self.base_score;
        for tree in &self.trees {
            margin += self.params.learning_rate * tree.leaf_estimate(values);
        }
        margin
    }

    /// Churn probability in [0, 1] for one feature row.
    pub fn predict_proba(&self, values: &[f64]) -> f64 {
        sigmoid(self.predict_margin(values))
    }

    pub fn params(&self) -> &GbdtParams {
        &self.params
    }

    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }

    pub fn base_score(&self) -> f64 {
        self.base_score
    }

    pub fn learning_rate(&self) -> f64 {
        self.params.learning_rate
    }

    /// Layout hash of the schema the model was trained under.
    pub fn schema_hash(&self) -> u32 {
        self.schema_hash
    }

    /// Held-out metrics from training, if a validation slice existed.
    pub fn metrics(&self) -> Option<&ValidationMetrics> {
        self.metrics.as_ref()
    }

    fn evaluate(&self, x: ArrayView2<'_, f64>, y: &[f64], val_idx: &[usize]) -> ValidationMetrics {
        let mut correct = 0;
        let mut loss = 0.0;
        for &i in val_idx {
            let row = x.row(i).to_vec();
            let p = self.predict_proba(&row).clamp(1e-12, 1.0 - 1e-12);
            let label = y[i];
            if (p >= 0.5) == (label >= 0.5) {
                correct += 1;
            }
            loss -= label * p.ln() + (1.0 - label) * (1.0 - p).ln();
        }
        ValidationMetrics {
            accuracy: correct as f64 / val_idx.len() as f64,
            log_loss: loss / val_idx.len() as f64,
            held_out: val_idx.len(),
        }
    }
}

pub(crate) fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
