//! Citation and match-result types
//!
//! A Citation is produced by the upstream extractor and consumed exactly
//! once by the matcher; a MatchResult records the outcome. These types are
//! serializable so they can cross the pipeline boundary as JSON.

use serde::{Deserialize, Serialize};

use crate::{BibliographyEntry, Issue};

/// One in-text reference extracted from the manuscript
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Citation {
    /// The citation as written, e.g. "Smith (2020)"
    pub raw_text: String,
    /// The URL as written in the source document
    pub url: String,
    /// Line number in the source document, for reporting
    pub line: u32,
}

impl Citation {
    pub fn new(raw_text: impl Into<String>, url: impl Into<String>, line: u32) -> Self {
        Self {
            raw_text: raw_text.into(),
            url: url.into(),
            line,
        }
    }

    /// Serialize to JSON for cross-component transfer
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Which strategy resolved a citation
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum MatchStrategy {
    Doi,
    Isbn,
    Arxiv,
    Url,
    AutoAdded,
    Unresolved,
}

impl MatchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStrategy::Doi => "doi",
            MatchStrategy::Isbn => "isbn",
            MatchStrategy::Arxiv => "arxiv",
            MatchStrategy::Url => "url",
            MatchStrategy::AutoAdded => "auto-added",
            MatchStrategy::Unresolved => "unresolved",
        }
    }
}

/// Outcome of resolving one citation
///
/// Invariant: `strategy == Unresolved` iff `entry.is_none()`. The
/// constructors are the only way downstream code builds one, so the
/// invariant holds by construction.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MatchResult {
    pub citation: Citation,
    pub entry: Option<BibliographyEntry>,
    pub strategy: MatchStrategy,
    pub warnings: Vec<Issue>,
}

impl MatchResult {
    /// A citation resolved to an entry via the given strategy
    pub fn resolved(citation: Citation, entry: BibliographyEntry, strategy: MatchStrategy) -> Self {
        debug_assert!(strategy != MatchStrategy::Unresolved);
        Self {
            citation,
            entry: Some(entry),
            strategy,
            warnings: Vec::new(),
        }
    }

    /// A citation no strategy could resolve
    pub fn unresolved(citation: Citation) -> Self {
        Self {
            citation,
            entry: None,
            strategy: MatchStrategy::Unresolved,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<Issue>) -> Self {
        self.warnings = warnings;
        self
    }

    pub fn is_resolved(&self) -> bool {
        self.entry.is_some()
    }
}
