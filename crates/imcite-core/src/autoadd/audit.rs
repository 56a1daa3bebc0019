//! Append-only audit trail for auto-add attempts
//!
//! One immutable record per attempt, whatever the outcome. An explicit
//! log structure instead of shared counters keeps concurrent attempts
//! simple and post-hoc analysis possible.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Terminal state of one auto-add attempt
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum AttemptStatus {
    TranslationFailed,
    Rejected,
    Registered,
    Persisted,
    PersistFailed,
}

/// One attempt, never mutated after append
#[derive(Clone, Debug, Serialize)]
pub struct AuditRecord {
    pub url: String,
    pub status: AttemptStatus,
    pub warnings: Vec<String>,
    pub resulting_entry_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl AuditRecord {
    pub fn new(url: impl Into<String>, status: AttemptStatus) -> Self {
        Self {
            url: url.into(),
            status,
            warnings: Vec::new(),
            resulting_entry_id: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }

    pub fn with_entry_id(mut self, id: impl Into<String>) -> Self {
        self.resulting_entry_id = Some(id.into());
        self
    }
}

/// The append-only log; records are only ever added, never rewritten
#[derive(Debug, Default)]
pub struct AuditLog {
    records: Vec<AuditRecord>,
}

impl AuditLog {
    pub fn append(&mut self, record: AuditRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[AuditRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Machine-readable export, one array of records
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.records)
    }
}
