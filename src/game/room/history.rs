//! Append-only, human-readable room event log.
//!
//! Kept across hands and shipped to clients inside every snapshot; the
//! actor never rewrites past entries.

use chrono::Utc;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryLog {
    entries: Vec<String>,
}

impl HistoryLog {
    pub fn push(&mut self, entry: impl AsRef<str>) {
        self.entries
            .push(format!("[{}] {}", Utc::now().format("%H:%M:%S"), entry.as_ref()));
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

    /// True if any entry mentions `needle`. Test convenience.
    pub fn mentions(&self, needle: &str) -> bool {
        self.entries.iter().any(|e| e.contains(needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_are_appended_in_order() {
        let mut log = HistoryLog::default();
        log.push("first");
        log.push("second");
        assert_eq!(log.len(), 2);
        assert!(log.entries()[0].contains("first"));
        assert!(log.entries()[1].contains("second"));
        assert!(log.mentions("second"));
    }
}
