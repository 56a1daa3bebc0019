//! Validation issue types

use serde::{Deserialize, Serialize};

/// Severity of a validation issue
///
/// Critical issues mean the entry must not be trusted or written back;
/// warnings mean the entry is usable but defective.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum IssueSeverity {
    Critical,
    Warning,
}

/// A single validation finding for a bibliography entry
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Issue {
    pub field: String,
    pub message: String,
    pub severity: IssueSeverity,
    /// Optional structural fix, e.g. "store as organizational author"
    pub suggestion: Option<String>,
}

impl Issue {
    pub fn critical(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            severity: IssueSeverity::Critical,
            suggestion: None,
        }
    }

    pub fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            severity: IssueSeverity::Warning,
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn is_critical(&self) -> bool {
        self.severity == IssueSeverity::Critical
    }
}
