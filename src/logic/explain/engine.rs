//! Attribution Engine - per-feature contributions for one prediction
//!
//! Decomposes a boosted-tree prediction by walking each tree's decision
//! path: at every split the change in node estimate is charged to the split
//! feature. The decomposition is exactly additive: the engine baseline
//! plus the sum of all contributions equals the model's raw margin.
//!
//! No caching: every call recomputes from scratch. Fine for single-user
//! interactive use; the per-request tree traversal is the most expensive
//! step and would need caching before any batch use.

use std::sync::Arc;

use crate::logic::model::GbdtClassifier;
use crate::logic::store::FeatureSchema;

use super::types::Attribution;

#[derive(Debug)]
pub struct AttributionEngine {
    model: Arc<GbdtClassifier>,
    schema: FeatureSchema,
}

impl AttributionEngine {
    pub fn new(model: Arc<GbdtClassifier>, schema: FeatureSchema) -> Self {
        Self { model, schema }
    }

    /// Expected raw output with no feature information: the model's base
    /// score plus the learning-rate-scaled sum of root estimates.
    pub fn baseline(&self) -> f64 {
        let roots: f64 = self.model.trees().iter().map(|t| t.root_estimate()).sum();
        self.model.base_score() + self.model.learning_rate() * roots
    }

    /// Full per-feature contribution vector for one row, in schema order.
    /// Invariant: `baseline() + sum(contributions) == predict_margin(values)`.
    pub fn contributions(&self, values: &[f64]) -> Vec<f64> {
        let mut out = vec![0.0; self.schema.len()];
        let scale = self.model.learning_rate();
        for tree in self.model.trees() {
            tree.path_contributions(values, scale, &mut out);
        }
        out
    }

    /// Ranked attributions: descending absolute contribution, ties broken
    /// by original feature order (stable sort), truncated to `top_n`.
    /// A `top_n` larger than the feature count returns all features.
    pub fn attribute(&self, values: &[f64], top_n: usize) -> Vec<Attribution> {
        let mut attributions: Vec<Attribution> = self
            .contributions(values)
            .iter()
            .zip(self.schema.names())
            .map(|(&value, name)| Attribution {
                feature: name.clone(),
                value,
            })
            .collect();

        attributions.sort_by(|a, b| {
            b.value
                .abs()
                .partial_cmp(&a.value.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        attributions.truncate(top_n);
        attributions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::model::{GbdtParams, GbdtClassifier};
    use ndarray::Array2;

    /// Churn driven by short tenure and high charges; third feature inert.
    fn fixture() -> (AttributionEngine, Arc<GbdtClassifier>) {
        let n = 120;
        let mut flat = Vec::with_capacity(n * 3);
        let mut labels = Vec::with_capacity(n);
        for i in 0..n {
            let tenure = (i % 60) as f64;
            let charges = 20.0 + ((i * 7) % 80) as f64;
            flat.extend_from_slice(&[tenure, charges, 1.0]);
            labels.push(if tenure < 12.0 && charges > 60.0 { 1.0 } else { 0.0 });
        }
        let x = Array2::from_shape_vec((n, 3), flat).unwrap();

        let schema = FeatureSchema::new(vec![
            "tenure".to_string(),
            "monthly_charges".to_string(),
            "constant".to_string(),
        ]);
        let model = Arc::new(
            GbdtClassifier::fit(&x, &labels, schema.hash(), GbdtParams::default(), 42).unwrap(),
        );
        (AttributionEngine::new(model.clone(), schema), model)
    }

    #[test]
    fn test_additivity() {
        let (engine, model) = fixture();

        for sample in [[3.0, 90.0, 1.0], [45.0, 30.0, 1.0], [11.0, 62.0, 1.0]] {
            let total: f64 = engine.contributions(&sample).iter().sum();
            let margin = model.predict_margin(&sample);
            assert!(
                (engine.baseline() + total - margin).abs() < 1e-6,
                "baseline {} + contributions {} != margin {}",
                engine.baseline(),
                total,
                margin
            );
        }
    }

    #[test]
    fn test_ranked_by_absolute_value() {
        let (engine, _) = fixture();
        let ranked = engine.attribute(&[2.0, 95.0, 1.0], 3);

        for pair in ranked.windows(2) {
            assert!(pair[0].value.abs() >= pair[1].value.abs());
        }
    }

    #[test]
    fn test_truncation_and_overflow() {
        let (engine, _) = fixture();

        assert_eq!(engine.attribute(&[2.0, 95.0, 1.0], 2).len(), 2);
        // top_n beyond the feature count returns all features
        assert_eq!(engine.attribute(&[2.0, 95.0, 1.0], 50).len(), 3);
    }

    #[test]
    fn test_inert_feature_contributes_nothing() {
        let (engine, _) = fixture();
        let contributions = engine.contributions(&[5.0, 80.0, 1.0]);
        assert_eq!(contributions[2], 0.0, "constant feature is never split on");
    }

    #[test]
    fn test_deterministic_across_calls() {
        let (engine, _) = fixture();
        let sample = [7.0, 75.0, 1.0];
        assert_eq!(engine.attribute(&sample, 5), engine.attribute(&sample, 5));
    }

    #[test]
    fn test_tie_break_preserves_feature_order() {
        let (engine, _) = fixture();
        // Zero-contribution entries tie; the stable sort keeps schema order.
        let ranked = engine.attribute(&[30.0, 40.0, 1.0], 3);
        let zeros: Vec<&str> = ranked
            .iter()
            .filter(|a| a.value == 0.0)
            .map(|a| a.feature.as_str())
            .collect();
        let mut sorted_by_schema = zeros.clone();
        sorted_by_schema.sort_by_key(|name| {
            ["tenure", "monthly_charges", "constant"]
                .iter()
                .position(|n| n == name)
                .unwrap()
        });
        assert_eq!(zeros, sorted_by_schema);
    }
}
