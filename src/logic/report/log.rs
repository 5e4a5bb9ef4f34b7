//! Append-only explanation log
//!
//! Every completed explanation is recorded as one JSON line in
//! `explanations.jsonl` under the log directory. The file handle is held
//! behind a mutex so concurrent appends cannot interleave partial lines.
//! Records are never rewritten; a failed append loses that record only.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::super::pipeline::Explanation;

const LOG_FILE_NAME: &str = "explanations.jsonl";

/// One logged explanation. `explanation` holds the rendered text, including
/// the inline error marker when narration was degraded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    pub timestamp: String,
    pub customer_index: usize,
    pub risk_score: f64,
    pub explanation: String,
}

pub struct ExplanationLog {
    file: Mutex<File>,
    path: PathBuf,
}

impl ExplanationLog {
    /// Open (or create) the log under `dir`, appending to any existing file.
    pub fn open(dir: &Path) -> std::io::Result<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(LOG_FILE_NAME);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        log::debug!("Explanation log: {}", path.display());
        Ok(Self {
            file: Mutex::new(file),
            path,
        })
    }

    /// Append one record. The timestamp is taken at append time.
    pub fn append(&self, explanation: &Explanation) -> std::io::Result<()> {
        let record = LogRecord {
            timestamp: Utc::now().to_rfc3339(),
            customer_index: explanation.customer_index,
            risk_score: explanation.risk_score,
            explanation: explanation.text(),
        };
        let line = serde_json::to_string(&record)?;

        let mut file = self.file.lock();
        writeln!(file, "{}", line)?;
        file.flush()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
