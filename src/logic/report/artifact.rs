//! Per-customer report artifact
//!
//! A small plain-text file per explained customer, written whole and
//! overwritten on re-explain. The artifact is what gets attached to the
//! outbound email.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;

use super::super::pipeline::Explanation;

pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    pub fn new(dir: &Path) -> std::io::Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Render and write the report, returning its path. Re-explaining the
    /// same customer replaces the previous artifact.
    pub fn write(&self, explanation: &Explanation) -> std::io::Result<PathBuf> {
        let path = self
            .dir
            .join(format!("churn_report_{}.txt", explanation.customer_index));
        fs::write(&path, render(explanation))?;
        log::info!("Report written: {}", path.display());
        Ok(path)
    }
}

fn render(explanation: &Explanation) -> String {
    let mut body = String::new();

    body.push_str(&format!(
        "Churn Risk Report for Customer {}\n",
        explanation.customer_index
    ));
    body.push_str(&format!(
        "Date: {}\n\n",
        Local::now().format("%Y-%m-%d %H:%M")
    ));
    body.push_str(&format!(
        "Predicted churn probability: {:.2}\n\n",
        explanation.risk_score
    ));
    body.push_str("Explanation:\n");
    body.push_str(&explanation.text());
    body.push('\n');

    if !explanation.attributions.is_empty() {
        body.push_str("\nTop contributing features:\n");
        for attribution in &explanation.attributions {
            body.push_str(&format!(
                "- {}: {:.3}\n",
                attribution.feature, attribution.value
            ));
        }
    }

    body
}
