//! Explanation Pipeline - score, attribute, narrate
//!
//! Composes the feature store, risk model, attribution engine, and
//! narrative generator into one call. The store and model are shared,
//! immutable, and built once at start-up; every request constructs fresh
//! values. No retries, no caching: repeated calls are independent and
//! idempotent apart from the endpoint's own sampling nondeterminism.

use std::sync::Arc;

use thiserror::Error;

use super::explain::{Attribution, AttributionEngine};
use super::model::GbdtClassifier;
use super::narrative::{Narrative, NarrativeGenerator};
use super::store::FeatureStore;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("customer index {index} out of range (dataset has {len} rows)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("feature schema mismatch: store {store:08x}, model {model:08x}")]
    SchemaMismatch { store: u32, model: u32 },
}

/// One completed explanation request. Attributions are empty when the
/// narrative is degraded.
#[derive(Debug)]
pub struct Explanation {
    pub customer_index: usize,
    pub risk_score: f64,
    pub narrative: Narrative,
    pub attributions: Vec<Attribution>,
}

impl Explanation {
    /// Rendered text for display and persistence. Degraded narration is
    /// flattened into an inline error marker.
    pub fn text(&self) -> String {
        match &self.narrative {
            Narrative::Generated(text) => text.clone(),
            Narrative::Degraded(cause) => format!("(Error generating explanation: {})", cause),
        }
    }
}

#[derive(Debug)]
pub struct ExplanationPipeline {
    store: Arc<FeatureStore>,
    model: Arc<GbdtClassifier>,
    engine: AttributionEngine,
    generator: NarrativeGenerator,
    top_n: usize,
}

impl ExplanationPipeline {
    /// Wire the pipeline together. The store and model layout hashes are
    /// compared once here; per-request rows come from the same store the
    /// model trained on, so no per-call validation is done.
    pub fn new(
        store: Arc<FeatureStore>,
        model: Arc<GbdtClassifier>,
        generator: NarrativeGenerator,
        top_n: usize,
    ) -> Result<Self, PipelineError> {
        if store.schema().hash() != model.schema_hash() {
            return Err(PipelineError::SchemaMismatch {
                store: store.schema().hash(),
                model: model.schema_hash(),
            });
        }
        let engine = AttributionEngine::new(model.clone(), store.schema().clone());
        Ok(Self {
            store,
            model,
            engine,
            generator,
            top_n,
        })
    }

    /// Explain one customer: look up the row, score it, attribute the
    /// score, narrate. A degraded narration still yields `Ok`, with the
    /// failure cause inside the `Explanation`.
    pub async fn explain(&self, customer_index: usize) -> Result<Explanation, PipelineError> {
        let row = self
            .store
            .row(customer_index)
            .ok_or(PipelineError::IndexOutOfRange {
                index: customer_index,
                len: self.store.len(),
            })?;

        let risk_score = self.model.predict_proba(row.values());
        let attributions = self.engine.attribute(row.values(), self.top_n);

        log::debug!(
            "Customer {}: risk {:.4}, top attribution {:?}",
            customer_index,
            risk_score,
            attributions.first()
        );

        match self.generator.narrate(risk_score, &attributions).await {
            Narrative::Generated(text) => Ok(Explanation {
                customer_index,
                risk_score,
                narrative: Narrative::Generated(text),
                attributions,
            }),
            degraded => Ok(Explanation {
                customer_index,
                risk_score,
                narrative: degraded,
                attributions: Vec::new(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::model::GbdtParams;
    use crate::logic::narrative::{ChatConfig, NarrativeError};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn sample_store() -> Arc<FeatureStore> {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "tenure,monthly_charges,churned").unwrap();
        for i in 0..100 {
            let tenure = i % 60;
            let charges = 20 + (i * 7) % 80;
            let churned = u8::from(tenure < 12 && charges > 60);
            writeln!(file, "{tenure},{charges},{churned}").unwrap();
        }
        let store = FeatureStore::load(file.path(), "churned").unwrap();
        Arc::new(store)
    }

    fn trained_model(store: &FeatureStore) -> Arc<GbdtClassifier> {
        Arc::new(
            GbdtClassifier::fit(
                store.matrix(),
                store.labels(),
                store.schema().hash(),
                GbdtParams::default(),
                42,
            )
            .unwrap(),
        )
    }

    fn generator_for(api_base: String) -> NarrativeGenerator {
        NarrativeGenerator::new(ChatConfig {
            api_base,
            api_key: Some("test-key".to_string()),
            model: "test-model".to_string(),
            temperature: 0.7,
            timeout_seconds: 5,
        })
    }

    async fn completion_mock(server: &mut mockito::Server) -> mockito::Mock {
        let body = serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": "Risk is driven by tenure." } }]
        });
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(body.to_string())
            .create_async()
            .await
    }

    #[tokio::test]
    async fn test_explain_returns_ranked_bounded_attributions() {
        let mut server = mockito::Server::new_async().await;
        let _m = completion_mock(&mut server).await;

        let store = sample_store();
        let model = trained_model(&store);
        let pipeline =
            ExplanationPipeline::new(store, model, generator_for(server.url()), 5).unwrap();

        let explanation = pipeline.explain(0).await.unwrap();

        assert!(explanation.attributions.len() <= 5);
        assert!(!explanation.attributions.is_empty());
        for pair in explanation.attributions.windows(2) {
            assert!(pair[0].value.abs() >= pair[1].value.abs());
        }
        assert_eq!(explanation.text(), "Risk is driven by tenure.");
    }

    #[tokio::test]
    async fn test_repeated_calls_identical_score_and_attributions() {
        let mut server = mockito::Server::new_async().await;
        let _m = completion_mock(&mut server).await;

        let store = sample_store();
        let model = trained_model(&store);
        let pipeline =
            ExplanationPipeline::new(store, model, generator_for(server.url()), 5).unwrap();

        let first = pipeline.explain(7).await.unwrap();
        let second = pipeline.explain(7).await.unwrap();

        assert_eq!(first.risk_score, second.risk_score);
        assert_eq!(first.attributions, second.attributions);
    }

    #[tokio::test]
    async fn test_narrative_failure_degrades_without_raising() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/chat/completions")
            .with_status(503)
            .create_async()
            .await;

        let store = sample_store();
        let model = trained_model(&store);
        let pipeline =
            ExplanationPipeline::new(store, model, generator_for(server.url()), 5).unwrap();

        let explanation = pipeline.explain(3).await.unwrap();

        assert!(explanation.narrative.is_degraded());
        assert!(explanation.attributions.is_empty());
        assert!(explanation.text().contains("Error generating explanation"));
        assert_eq!(
            explanation.narrative,
            Narrative::Degraded(NarrativeError::Server(503))
        );
    }

    #[tokio::test]
    async fn test_out_of_range_index_is_a_defined_failure() {
        let server = mockito::Server::new_async().await;
        let store = sample_store();
        let model = trained_model(&store);
        let pipeline =
            ExplanationPipeline::new(store, model, generator_for(server.url()), 5).unwrap();

        let err = pipeline.explain(100).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::IndexOutOfRange { index: 100, len: 100 }
        ));
    }

    #[tokio::test]
    async fn test_schema_mismatch_rejected_at_construction() {
        let server = mockito::Server::new_async().await;
        let store = sample_store();
        let model = Arc::new(
            GbdtClassifier::fit(
                store.matrix(),
                store.labels(),
                0xBAD0BAD0, // a hash from some other layout
                GbdtParams::default(),
                42,
            )
            .unwrap(),
        );

        let err =
            ExplanationPipeline::new(store, model, generator_for(server.url()), 5).unwrap_err();
        assert!(matches!(err, PipelineError::SchemaMismatch { .. }));
    }
}
