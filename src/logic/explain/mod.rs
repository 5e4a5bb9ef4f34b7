//! Attribution Engine - additive feature attribution over the risk model

pub mod engine;
pub mod types;

pub use engine::AttributionEngine;
pub use types::Attribution;
