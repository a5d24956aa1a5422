use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::HarnessError;

/// One scalar summary record, keyed by global step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub step: u64,
    pub train_loss: f64,
    pub learning_rate: f64,
}

/// Appends time-series scalars to `summaries.jsonl` in the summary
/// directory, one JSON object per line.
#[derive(Debug, Clone)]
pub struct SummaryWriter {
    path: PathBuf,
}

impl SummaryWriter {
    pub fn new(dir: impl Into<PathBuf>) -> SummaryWriter {
        SummaryWriter { path: dir.into().join("summaries.jsonl") }
    }

    pub fn append(&self, step: u64, train_loss: f64, learning_rate: f64) -> Result<(), HarnessError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let record = SummaryRecord { step, train_loss, learning_rate };
        let line = serde_json::to_string(&record)?;
        writeln!(file, "{}", line)?;
        Ok(())
    }
}
