//! Report outputs - append-only explanation log and per-customer artifacts

pub mod artifact;
pub mod log;

pub use artifact::ReportWriter;
pub use log::{ExplanationLog, LogRecord};
