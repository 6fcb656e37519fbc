//! Session archive
//!
//! Append-only record of finished sessions. The archive itself is unbounded;
//! readers only ever look at the most recent entries.

use crate::types::SessionSummary;

#[derive(Debug, Clone, Default)]
pub struct SessionArchive {
    summaries: Vec<SessionSummary>,
}

impl SessionArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, summary: SessionSummary) {
        self.summaries.push(summary);
    }

    /// The last `limit` summaries, most recent last
    pub fn recent(&self, limit: usize) -> &[SessionSummary] {
        let start = self.summaries.len().saturating_sub(limit);
        &self.summaries[start..]
    }

    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }
}
