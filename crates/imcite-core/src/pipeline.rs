//! End-to-end resolution runs
//!
//! A run loads the canonical source, builds the identifier indices,
//! resolves every citation in order, and assembles the reports. The
//! offline run touches no network at all; the auto-add run consults a
//! translator for unresolved scholarly citations, subject to the
//! auto-add configuration.

use imcite_domain::{Citation, MatchResult};

use crate::autoadd::{AuditRecord, AutoAddResolver, Translator, WriteBack};
use crate::dedup::{find_near_duplicates, DedupConfig, NearDuplicate};
use crate::error::RunError;
use crate::index::{CitationIndex, IndexCollision};
use crate::loader::LoadOutcome;
use crate::matcher;
use crate::report::{
    build_match_table, build_missing_report, is_scholarly, ClassifierRules, MatchRow,
    MissingReport,
};

/// Options for a resolution run
#[derive(Debug, Default)]
pub struct RunOptions {
    pub classifier: ClassifierRules,
    pub dedup: DedupConfig,
    /// When set, fail the run if more than this many citations stay
    /// unresolved; for CI-style gating
    pub strict_unresolved_limit: Option<usize>,
}

/// Everything a run produces
#[derive(Debug)]
pub struct RunReport {
    pub results: Vec<MatchResult>,
    pub table: Vec<MatchRow>,
    pub missing: MissingReport,
    pub near_duplicates: Vec<NearDuplicate>,
    pub collisions: Vec<IndexCollision>,
    pub skipped_records: Vec<crate::loader::SkippedRecord>,
    pub audit: Vec<AuditRecord>,
}

/// Resolve citations against an already-loaded source without any network
pub fn resolve_offline(
    outcome: &LoadOutcome,
    citations: &[Citation],
    options: &RunOptions,
) -> Result<RunReport, RunError> {
    let index = CitationIndex::build(&outcome.entries);
    let results = matcher::resolve_all(citations, &index);
    finish(outcome, &index, results, Vec::new(), options)
}

/// Resolve citations, consulting the translator for unresolved scholarly
/// links. Non-scholarly links are never sent to the network.
pub async fn resolve_with_autoadd<T: Translator, W: WriteBack>(
    outcome: &LoadOutcome,
    citations: &[Citation],
    options: &RunOptions,
    resolver: &mut AutoAddResolver<T, W>,
) -> Result<RunReport, RunError> {
    let index = CitationIndex::build(&outcome.entries);

    let mut results = Vec::with_capacity(citations.len());
    for citation in citations {
        let offline = matcher::resolve(citation, &index);
        if offline.is_resolved() || !is_scholarly(citation, &options.classifier) {
            results.push(offline);
        } else {
            results.push(resolver.resolve(citation).await);
        }
    }

    let audit = resolver.audit_log().records().to_vec();
    finish(outcome, &index, results, audit, options)
}

fn finish(
    outcome: &LoadOutcome,
    index: &CitationIndex,
    results: Vec<MatchResult>,
    audit: Vec<AuditRecord>,
    options: &RunOptions,
) -> Result<RunReport, RunError> {
    if let Some(limit) = options.strict_unresolved_limit {
        let count = results.iter().filter(|r| !r.is_resolved()).count();
        if count > limit {
            return Err(RunError::TooManyUnresolved { count, limit });
        }
    }

    let report = RunReport {
        table: build_match_table(&results),
        missing: build_missing_report(&results, &options.classifier),
        near_duplicates: find_near_duplicates(&outcome.entries, &options.dedup),
        collisions: index.collisions().to_vec(),
        skipped_records: outcome.skipped.clone(),
        audit,
        results,
    };

    tracing::info!(
        citations = report.results.len(),
        unresolved = report.missing.missing.len(),
        near_duplicates = report.near_duplicates.len(),
        "Resolution run complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use imcite_domain::{BibliographyEntry, EntryType, Identifiers};

    fn sample_outcome() -> LoadOutcome {
        let entry = BibliographyEntry::new(
            "Structured Knowledge".to_string(),
            EntryType::JournalArticle,
            Identifiers {
                doi: Some("10.1000/xyz".to_string()),
                ..Default::default()
            },
        );
        LoadOutcome {
            entries: vec![entry],
            skipped: Vec::new(),
        }
    }

    #[test]
    fn test_offline_run_resolves_and_reports() {
        let outcome = sample_outcome();
        let citations = vec![
            Citation::new("Chen 2020", "https://doi.org/10.1000/xyz", 3),
            Citation::new("Mystery (2021)", "https://example.org/paper", 9),
        ];
        let report =
            resolve_offline(&outcome, &citations, &RunOptions::default()).unwrap();
        assert!(report.results[0].is_resolved());
        assert!(!report.results[1].is_resolved());
        assert_eq!(report.missing.missing.len(), 1);
        assert!(report.audit.is_empty());
    }

    #[test]
    fn test_strict_limit_fails_run() {
        let outcome = sample_outcome();
        let citations = vec![Citation::new(
            "Mystery (2021)",
            "https://example.org/paper",
            1,
        )];
        let options = RunOptions {
            strict_unresolved_limit: Some(0),
            ..Default::default()
        };
        let result = resolve_offline(&outcome, &citations, &options);
        assert!(matches!(
            result,
            Err(RunError::TooManyUnresolved { count: 1, limit: 0 })
        ));
    }
}
