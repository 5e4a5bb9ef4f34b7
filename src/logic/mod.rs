//! Logic Module - the churn explanation engines
//!
//! - `store/` - encoded dataset loading and feature schema
//! - `model/` - gradient-boosted churn classifier
//! - `explain/` - additive per-feature attribution
//! - `narrative/` - plain-English narration via a chat endpoint
//! - `pipeline` - one-call composition of the above
//! - `report/` - explanation log and per-customer artifacts
//! - `mailer` - report delivery over SMTP

pub mod config;
pub mod explain;
pub mod mailer;
pub mod model;
pub mod narrative;
pub mod pipeline;
pub mod report;
pub mod store;
