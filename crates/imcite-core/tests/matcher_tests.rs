//! Citation matching integration tests

use imcite_core::index::CitationIndex;
use imcite_core::matcher::{resolve, resolve_all};
use imcite_domain::{BibliographyEntry, Citation, EntryType, Identifiers, MatchStrategy};

fn article(title: &str, doi: &str) -> BibliographyEntry {
    BibliographyEntry::new(
        title,
        EntryType::JournalArticle,
        Identifiers {
            doi: Some(doi.to_string()),
            ..Default::default()
        },
    )
}

fn entry_with(ids: Identifiers, title: &str) -> BibliographyEntry {
    BibliographyEntry::new(title, EntryType::Other, ids)
}

#[test]
fn test_doi_citation_resolves_despite_url_mismatch() {
    // The library knows the work by DOI; the manuscript links a
    // publisher landing page that shares the DOI path
    let entries = vec![article("Array programming", "10.1038/s41586-020-2649-2")];
    let index = CitationIndex::build(&entries);

    let citation = Citation::new(
        "Harris et al. (2020)",
        "https://doi.org/10.1038/s41586-020-2649-2",
        12,
    );
    let result = resolve(&citation, &index);
    assert!(result.is_resolved());
    assert_eq!(result.strategy, MatchStrategy::Doi);
}

#[test]
fn test_short_registrant_doi_resolves() {
    // Some legacy registrants are a single digit; lookup and extraction
    // must agree on them
    let entries = vec![article("Early Work", "10.1/x")];
    let index = CitationIndex::build(&entries);

    let result = resolve(
        &Citation::new("Author (1998)", "https://doi.org/10.1/x", 3),
        &index,
    );
    assert!(result.is_resolved());
    assert_eq!(result.strategy, MatchStrategy::Doi);
}

#[test]
fn test_bookseller_locale_variants_resolve_to_same_book() {
    let entries = vec![entry_with(
        Identifiers {
            url: Some("https://www.amazon.com/dp/0262033844".to_string()),
            ..Default::default()
        },
        "Introduction to Algorithms",
    )];
    let index = CitationIndex::build(&entries);

    let de = Citation::new(
        "Cormen (2009)",
        "https://www.amazon.de/gp/product/0262033844?tag=ref",
        4,
    );
    let result = resolve(&de, &index);
    assert!(result.is_resolved());
    assert_eq!(result.strategy, MatchStrategy::Isbn);
}

#[test]
fn test_arxiv_pdf_and_abs_links_are_equivalent() {
    let entries = vec![entry_with(
        Identifiers {
            arxiv_id: Some("2101.05001".to_string()),
            ..Default::default()
        },
        "A Preprint",
    )];
    let index = CitationIndex::build(&entries);

    for url in [
        "https://arxiv.org/abs/2101.05001",
        "https://arxiv.org/pdf/2101.05001v2.pdf",
        "https://arxiv.org/abs/2101.05001v3",
    ] {
        let result = resolve(&Citation::new("Doe (2021)", url, 1), &index);
        assert!(result.is_resolved(), "failed for {url}");
        assert_eq!(result.strategy, MatchStrategy::Arxiv);
    }
}

#[test]
fn test_doi_wins_over_url_when_both_would_match() {
    // One entry matchable by DOI, another by the exact URL. The DOI
    // lookup runs first, so it decides.
    let by_doi = article("Work A", "10.1000/alpha");
    let by_url = entry_with(
        Identifiers {
            url: Some("https://journal.example/alpha".to_string()),
            ..Default::default()
        },
        "Work B",
    );
    let entries = vec![by_url.clone(), by_doi.clone()];
    let index = CitationIndex::build(&entries);

    let citation = Citation::new(
        "Someone (2020)",
        "https://journal.example/alpha?doi=10.1000/alpha",
        7,
    );
    let result = resolve(&citation, &index);
    assert_eq!(result.strategy, MatchStrategy::Doi);
    assert_eq!(result.entry.unwrap().id, by_doi.id);
}

#[test]
fn test_resolution_is_independent_of_entry_order() {
    let a = article("Work A", "10.1000/alpha");
    let b = entry_with(
        Identifiers {
            url: Some("https://example.org/b".to_string()),
            ..Default::default()
        },
        "Work B",
    );
    let c = entry_with(
        Identifiers {
            arxiv_id: Some("2101.05001".to_string()),
            ..Default::default()
        },
        "Work C",
    );

    let citations = vec![
        Citation::new("A (2020)", "https://doi.org/10.1000/alpha", 1),
        Citation::new("B (2021)", "https://example.org/b", 2),
        Citation::new("C (2021)", "https://arxiv.org/abs/2101.05001", 3),
        Citation::new("D (2022)", "https://example.org/unknown", 4),
    ];

    let forward = CitationIndex::build(&[a.clone(), b.clone(), c.clone()]);
    let backward = CitationIndex::build(&[c, b, a]);

    let first = resolve_all(&citations, &forward);
    let second = resolve_all(&citations, &backward);
    assert_eq!(first, second);
    assert!(!first[3].is_resolved());
}

#[test]
fn test_identifier_collision_keeps_first_seen() {
    let first = article("First In", "10.1000/shared");
    let mut second = article("Second In", "10.1000/shared");
    // Same DOI would derive the same id; make the duplicate visible
    second.id = format!("{}-dup", second.id);
    let index = CitationIndex::build(&[first.clone(), second]);

    assert_eq!(index.collisions().len(), 1);
    let result = resolve(
        &Citation::new("X (2020)", "https://doi.org/10.1000/shared", 1),
        &index,
    );
    assert_eq!(result.entry.unwrap().title, first.title);
}

#[test]
fn test_unmatched_citation_reports_unresolved() {
    let index = CitationIndex::build(&[article("Only", "10.1000/only")]);
    let result = resolve(
        &Citation::new("Nobody (1999)", "https://example.org/nothing", 9),
        &index,
    );
    assert!(!result.is_resolved());
    assert_eq!(result.strategy, MatchStrategy::Unresolved);
}
