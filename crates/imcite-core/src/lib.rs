//! imcite-core: Citation resolution against a canonical bibliography
//!
//! This library provides pure Rust implementations of:
//! - Bibliography loading (Zotero RDF/XML, BibTeX, CSL-JSON)
//! - Identifier extraction and normalization (DOI, arXiv, ISBN, URL)
//! - Deterministic identifier indices and ordered citation matching
//! - Entry quality assessment and near-duplicate flagging
//! - Missing-citation reporting with scholarly-link classification
//! - Auto-add of unresolved citations via a translation service

pub mod autoadd;
pub mod dedup;
pub mod error;
pub mod http;
pub mod identifiers;
pub mod index;
pub mod loader;
pub mod matcher;
pub mod pipeline;
pub mod quality;
pub mod report;

// Re-export main types for convenience
pub use autoadd::{
    AttemptStatus, AuditLog, AuditRecord, AutoAddConfig, AutoAddResolver, RetryPolicy, Translator,
    WriteBack,
};
pub use dedup::{DedupConfig, NearDuplicate};
pub use error::{AutoAddError, LoadError, RunError};
pub use index::{CitationIndex, IndexCollision};
pub use loader::{LoadOutcome, SkippedRecord, SourceFormat};
pub use pipeline::{RunOptions, RunReport};
pub use report::{ClassifierRules, MatchRow, MissingReport, ReportedCitation};
