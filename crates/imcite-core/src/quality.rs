//! Entry quality validation
//!
//! Scores a candidate or auto-added entry for structural defects before it
//! is trusted. Checks are independent and composable; the validator flags,
//! it never repairs semantic content. The one permitted recovery is
//! replacing a junk title with the canonical source's own title for the
//! same identifier; it never fabricates a field with no source value.

use chrono::Datelike;
use lazy_static::lazy_static;
use regex::Regex;

use imcite_domain::{Author, BibliographyEntry, Issue};

use crate::identifiers::{is_valid_arxiv_id, is_valid_doi, is_valid_isbn};
use crate::index::CitationIndex;

/// Titles shorter than this are junk regardless of content
pub const MIN_TITLE_CHARS: usize = 4;

const EARLIEST_SANE_YEAR: i32 = 1450;

lazy_static! {
    // A bare domain name stored as a title, e.g. "example.com"
    static ref HOSTNAME_TITLE: Regex =
        Regex::new(r"^[A-Za-z0-9][A-Za-z0-9.-]*\.[A-Za-z]{2,}$").unwrap();

    // Generic scraper stubs: "Web page by Acme", "Web article by Acme"
    static ref STUB_TITLE: Regex = Regex::new(r"(?i)^web (?:page|article) by\b").unwrap();

    // Placeholder and truncation markers
    static ref PLACEHOLDER_TITLE: Regex =
        Regex::new(r"(?i)^(?:untitled|\[no title\]|\[placeholder\]|tbd|n/a)$|(?:\.{3}|…)$").unwrap();
}

/// Validate an entry, returning whether it is acceptable (no critical
/// issues) plus every issue found.
pub fn assess_entry(entry: &BibliographyEntry) -> (bool, Vec<Issue>) {
    let mut issues = Vec::new();

    check_title(&entry.title, &mut issues);
    check_authors(&entry.authors, &mut issues);
    check_year(entry.year, &mut issues);
    check_identifiers(entry, &mut issues);

    let acceptable = !issues.iter().any(Issue::is_critical);
    (acceptable, issues)
}

fn check_title(title: &str, issues: &mut Vec<Issue>) {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        issues.push(Issue::critical("title", "Title is missing"));
        return;
    }
    if trimmed.chars().count() < MIN_TITLE_CHARS {
        issues.push(Issue::critical(
            "title",
            format!("Title '{}' is shorter than {} characters", trimmed, MIN_TITLE_CHARS),
        ));
        return;
    }
    if HOSTNAME_TITLE.is_match(trimmed) {
        issues.push(Issue::critical(
            "title",
            format!("Title '{}' is a bare domain name", trimmed),
        ));
    } else if STUB_TITLE.is_match(trimmed) {
        issues.push(Issue::critical(
            "title",
            format!("Title '{}' is a generic stub", trimmed),
        ));
    } else if PLACEHOLDER_TITLE.is_match(trimmed) {
        issues.push(Issue::critical(
            "title",
            format!("Title '{}' is a placeholder or truncated", trimmed),
        ));
    }
}

fn check_authors(authors: &[Author], issues: &mut Vec<Issue>) {
    if authors.is_empty() {
        // Many legitimate web sources lack a named author; downstream may
        // substitute a publisher or organization name.
        issues.push(Issue::warning("authors", "Author list is empty"));
        return;
    }

    for author in authors {
        if let Author::Person { given: None, family } = author {
            if imcite_domain::looks_like_organization(family) {
                issues.push(
                    Issue::warning(
                        "authors",
                        format!("'{}' looks like an institution stored as a personal name", family),
                    )
                    .with_suggestion("store as an organizational author so renderers do not split it into given/family tokens"),
                );
            }
        }
    }
}

fn check_year(year: Option<i32>, issues: &mut Vec<Issue>) {
    let next_year = chrono::Utc::now().year() + 1;
    match year {
        None => issues.push(Issue::warning("year", "Year is missing")),
        Some(y) if y < EARLIEST_SANE_YEAR || y > next_year => {
            issues.push(Issue::warning(
                "year",
                format!("Year {} is outside the sane range {}..{}", y, EARLIEST_SANE_YEAR, next_year),
            ));
        }
        Some(_) => {}
    }
}

fn check_identifiers(entry: &BibliographyEntry, issues: &mut Vec<Issue>) {
    if let Some(ref doi) = entry.identifiers.doi {
        if !is_valid_doi(doi) {
            issues.push(Issue::warning("doi", format!("Malformed DOI '{}'", doi)));
        }
    }
    if let Some(ref arxiv) = entry.identifiers.arxiv_id {
        if !is_valid_arxiv_id(arxiv) {
            issues.push(Issue::warning(
                "arxiv_id",
                format!("Malformed arXiv id '{}'", arxiv),
            ));
        }
    }
    if let Some(ref isbn) = entry.identifiers.isbn {
        if !is_valid_isbn(isbn) {
            issues.push(Issue::warning("isbn", format!("Malformed ISBN '{}'", isbn)));
        }
    }
}

/// Replace a junk title with the canonical source's title for the same
/// identifier, when one exists and is itself clean.
///
/// Returns true if the title was replaced. Only applies to entries whose
/// title fails a critical check; never touches an acceptable title and
/// never invents one.
pub fn recover_title(entry: &mut BibliographyEntry, canonical: &CitationIndex) -> bool {
    let mut title_issues = Vec::new();
    check_title(&entry.title, &mut title_issues);
    if !title_issues.iter().any(Issue::is_critical) {
        return false;
    }

    let Some(source) = canonical.lookup_by_identifiers(&entry.identifiers) else {
        return false;
    };

    let mut source_issues = Vec::new();
    check_title(&source.title, &mut source_issues);
    if source_issues.iter().any(Issue::is_critical) {
        return false;
    }

    tracing::debug!(id = %entry.id, from = %entry.title, to = %source.title, "Recovered title from canonical source");
    entry.title = source.title.clone();
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use imcite_domain::{EntryType, Identifiers, IssueSeverity};

    fn valid_entry() -> BibliographyEntry {
        BibliographyEntry::new(
            "A Sound Treatise on Citation Matching",
            EntryType::JournalArticle,
            Identifiers {
                doi: Some("10.1038/nature12373".to_string()),
                ..Default::default()
            },
        )
        .with_authors(vec![Author::person("Smith").with_given("Jo")])
        .with_year(2020)
    }

    #[test]
    fn test_valid_entry_is_acceptable() {
        let (acceptable, issues) = assess_entry(&valid_entry());
        assert!(acceptable, "unexpected issues: {:?}", issues);
        assert!(issues.is_empty());
    }

    #[test]
    fn test_bare_hostname_title_is_critical() {
        let mut entry = valid_entry();
        entry.title = "example.com".to_string();
        let (acceptable, issues) = assess_entry(&entry);
        assert!(!acceptable);
        assert!(issues.iter().any(|i| i.field == "title" && i.is_critical()));
    }

    #[test]
    fn test_stub_title_is_critical() {
        let mut entry = valid_entry();
        entry.title = "Web page by Acme".to_string();
        let (acceptable, _) = assess_entry(&entry);
        assert!(!acceptable);
    }

    #[test]
    fn test_truncated_title_is_critical() {
        let mut entry = valid_entry();
        entry.title = "The study of...".to_string();
        let (acceptable, _) = assess_entry(&entry);
        assert!(!acceptable);
    }

    #[test]
    fn test_empty_authors_is_warning_only() {
        let mut entry = valid_entry();
        entry.authors.clear();
        let (acceptable, issues) = assess_entry(&entry);
        assert!(acceptable);
        assert!(issues
            .iter()
            .any(|i| i.field == "authors" && i.severity == IssueSeverity::Warning));
    }

    #[test]
    fn test_institution_as_person_suggests_fix() {
        let mut entry = valid_entry();
        entry.authors = vec![Author::person("World Health Organization")];
        let (acceptable, issues) = assess_entry(&entry);
        assert!(acceptable);
        let issue = issues.iter().find(|i| i.field == "authors").unwrap();
        assert!(issue.suggestion.is_some());
    }

    #[test]
    fn test_year_out_of_range_is_warning() {
        let mut entry = valid_entry();
        entry.year = Some(1203);
        let (acceptable, issues) = assess_entry(&entry);
        assert!(acceptable);
        assert!(issues.iter().any(|i| i.field == "year"));
    }

    #[test]
    fn test_malformed_doi_is_warning() {
        let mut entry = valid_entry();
        entry.identifiers.doi = Some("not-a-doi".to_string());
        let (acceptable, issues) = assess_entry(&entry);
        assert!(acceptable);
        assert!(issues.iter().any(|i| i.field == "doi"));
    }

    #[test]
    fn test_recover_title_from_canonical() {
        let canonical_entry = valid_entry();
        let index = CitationIndex::build(&[canonical_entry]);

        let mut junk = valid_entry();
        junk.title = "nature.com".to_string();
        assert!(recover_title(&mut junk, &index));
        assert_eq!(junk.title, "A Sound Treatise on Citation Matching");
    }

    #[test]
    fn test_recover_title_leaves_good_title_alone() {
        let index = CitationIndex::build(&[valid_entry()]);
        let mut entry = valid_entry();
        entry.title = "A Different but Fine Title".to_string();
        assert!(!recover_title(&mut entry, &index));
        assert_eq!(entry.title, "A Different but Fine Title");
    }
}
