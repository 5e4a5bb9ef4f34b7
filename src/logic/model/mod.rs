//! Risk Model - gradient-boosted churn classifier
//!
//! - `gbdt` - boosting loop, holdout split, validation metrics
//! - `tree` - single regression tree with per-node Newton estimates

pub mod gbdt;
pub mod tree;

pub use gbdt::{GbdtClassifier, GbdtParams, ModelError, ValidationMetrics};
pub use tree::Tree;
