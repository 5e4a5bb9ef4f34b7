//! Narrative Generator - turns attributions into plain-English text
//!
//! Builds a deterministic prompt from the risk score and ranked
//! attributions, then makes one chat-completion call. Every failure at this
//! boundary is caught and carried as an explicit `Degraded` variant: the
//! caller always receives a `Narrative`, never an error.

pub mod client;
pub mod prompt;

use serde::{Deserialize, Serialize};

pub use client::{ChatClient, ChatConfig, NarrativeError};

use crate::logic::explain::Attribution;

/// Outcome of one narration attempt. `Degraded` carries the structured
/// cause so callers can tell real model output from a failure placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Narrative {
    Generated(String),
    Degraded(NarrativeError),
}

impl Narrative {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Narrative::Degraded(_))
    }
}

#[derive(Debug)]
pub struct NarrativeGenerator {
    client: ChatClient,
}

impl NarrativeGenerator {
    pub fn new(config: ChatConfig) -> Self {
        Self {
            client: ChatClient::new(config),
        }
    }

    /// Narrate one prediction. Never returns an error: network, auth, and
    /// parse failures all collapse into `Narrative::Degraded`.
    pub async fn narrate(&self, risk_score: f64, attributions: &[Attribution]) -> Narrative {
        let prompt = prompt::build_prompt(risk_score, attributions);
        log::debug!("Narrative prompt for model {}:\n{}", self.client.model(), prompt);

        match self.client.complete(&prompt).await {
            Ok(text) => Narrative::Generated(text),
            Err(e) => {
                log::error!("Failed to generate explanation: {}", e);
                Narrative::Degraded(e)
            }
        }
    }
}
