//! Bounded probe log and configuration history.

use crate::config::{HISTORY_CAP, LOG_CAP, PERSISTED_LOG_CAP};
use crate::store::{
    next_id, HistoryDetails, HistoryEntry, HistoryEventKind, ProbeResult,
};

use chrono::Utc;

/// Prepend-ordered probe results, capped in memory at [`LOG_CAP`].
#[derive(Debug, Default)]
pub struct LogStore {
    entries: Vec<ProbeResult>,
}

impl LogStore {
    pub fn new(entries: Vec<ProbeResult>) -> Self {
        let mut store = Self { entries };
        store.entries.truncate(LOG_CAP);
        store
    }

    /// Prepend a result, dropping the oldest entry past the cap.
    pub fn append(&mut self, result: ProbeResult) {
        self.entries.insert(0, result);
        self.entries.truncate(LOG_CAP);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// All entries, or only those captured under the given target name,
    /// newest first.
    pub fn filter(&self, target_name: Option<&str>) -> Vec<ProbeResult> {
        match target_name {
            Some(name) => self
                .entries
                .iter()
                .filter(|e| e.target_name == name)
                .cloned()
                .collect(),
            None => self.entries.clone(),
        }
    }

    pub fn entries(&self) -> &[ProbeResult] {
        &self.entries
    }

    /// The slice written to storage, capped at [`PERSISTED_LOG_CAP`].
    pub fn persisted_view(&self) -> &[ProbeResult] {
        &self.entries[..self.entries.len().min(PERSISTED_LOG_CAP)]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Prepend-ordered audit trail of lifecycle events, capped at
/// [`HISTORY_CAP`].
///
/// Lifecycle callers record events explicitly; nothing is derived from the
/// probe log.
#[derive(Debug, Default)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
}

impl HistoryLog {
    pub fn new(entries: Vec<HistoryEntry>) -> Self {
        let mut log = Self { entries };
        log.entries.truncate(HISTORY_CAP);
        log
    }

    pub fn record(&mut self, kind: HistoryEventKind, details: HistoryDetails) {
        let entry = HistoryEntry {
            id: next_id(),
            timestamp: Utc::now(),
            kind,
            details,
        };
        self.entries.insert(0, entry);
        self.entries.truncate(HISTORY_CAP);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }
}
