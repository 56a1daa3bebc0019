//! Bibliography source loaders
//!
//! Contract: given a source and a declared format, produce every entry the
//! source truly contains. A loader that silently drops entries makes every
//! downstream citation referencing them falsely report as unresolved, so
//! each format is parsed as a tagged union of known record shapes and
//! non-item records are excluded by an explicit allow-list, never by an
//! exclusion heuristic.

mod bibtex;
mod csl_json;
mod rdf;

use std::path::Path;

use serde::Serialize;

use imcite_domain::BibliographyEntry;

use crate::error::LoadError;

/// Declared format of the canonical bibliography source
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceFormat {
    ZoteroRdf,
    BibTex,
    CslJson,
}

/// One source record that was skipped, with the reason; surfaced in
/// diagnostics, never silently dropped.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct SkippedRecord {
    /// Record label: cite key, rdf:about, or positional index
    pub label: String,
    pub reason: String,
}

/// Result of loading a source
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub entries: Vec<BibliographyEntry>,
    pub skipped: Vec<SkippedRecord>,
}

/// Load and fully re-parse a bibliography file. No partial or incremental
/// loads: determinism requires the whole source every run.
pub fn load_path(path: &Path, format: SourceFormat) -> Result<LoadOutcome, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|e| LoadError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    load_str(&content, format)
}

/// Parse an in-memory source.
///
/// Zero entries from a non-empty source is treated as a loader bug, not
/// an empty library, and is fatal.
pub fn load_str(content: &str, format: SourceFormat) -> Result<LoadOutcome, LoadError> {
    if content.trim().is_empty() {
        return Err(LoadError::EmptySource);
    }

    let outcome = match format {
        SourceFormat::ZoteroRdf => rdf::parse(content)?,
        SourceFormat::BibTex => bibtex::parse(content)?,
        SourceFormat::CslJson => csl_json::parse(content)?,
    };

    if outcome.entries.is_empty() {
        return Err(LoadError::NoEntries);
    }

    tracing::info!(
        entries = outcome.entries.len(),
        skipped = outcome.skipped.len(),
        "Loaded bibliography source"
    );
    Ok(outcome)
}

/// Best-effort format detection for string input
pub fn detect_format(content: &str) -> Option<SourceFormat> {
    let trimmed = content.trim_start();
    if trimmed.starts_with('@') {
        return Some(SourceFormat::BibTex);
    }
    if trimmed.starts_with('<') {
        return Some(SourceFormat::ZoteroRdf);
    }
    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        return Some(SourceFormat::CslJson);
    }
    None
}

/// Pull a 4-digit year out of a free-form date field
pub(crate) fn year_from_text(date: &str) -> Option<i32> {
    let chars: Vec<char> = date.chars().collect();
    let mut run_start = None;
    for (i, c) in chars.iter().enumerate() {
        if c.is_ascii_digit() {
            let start = *run_start.get_or_insert(i);
            if i - start == 3 {
                return chars[start..=i].iter().collect::<String>().parse().ok();
            }
        } else {
            run_start = None;
        }
    }
    None
}
