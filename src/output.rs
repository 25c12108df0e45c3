//! Run results: the miss report, per-run statistics and the final report.

use crate::pipeline::parse::CardRequest;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Requests that produced no usable candidate, in input order.
///
/// Entries are `name` or `name(SET)`, one per line when written out, so the
/// file can be fed back in as a deck list on a later run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissReport {
    entries: Vec<String>,
}

impl MissReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a miss and return the entry that was added.
    pub fn record(&mut self, request: &CardRequest) -> &str {
        self.entries.push(request.canonical());
        self.entries.last().map(String::as_str).unwrap_or_default()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Newline-joined report text.
    pub fn to_text(&self) -> String {
        self.entries.join("\n")
    }

    /// Write the report to `path`. Does nothing for an empty report.
    pub async fn write_to(&self, path: &Path) -> std::io::Result<bool> {
        if self.is_empty() {
            return Ok(false);
        }
        tokio::fs::write(path, self.to_text()).await?;
        Ok(true)
    }
}

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Every line read from the input, blank or not.
    pub lines_read: usize,
    pub blank_lines: usize,
    /// Non-blank lines the parser rejected.
    pub unparsed_lines: usize,
    /// Parsed requests sent to the search collaborator.
    pub requests: usize,
    pub images_downloaded: usize,
    /// Candidates that had no art, failed to fetch or failed to write.
    pub image_failures: usize,
    pub missing: usize,
    pub total_duration_ms: u64,
}

/// Everything a completed run produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    pub missing: MissReport,
    /// Files written, in download order.
    pub downloaded: Vec<PathBuf>,
    /// Where the miss report went, if one was written.
    pub missing_report_path: Option<PathBuf>,
    pub stats: RunStats,
}
