//! Per-identifier lookup tables over the loaded bibliography
//!
//! Built once per run, read-only afterwards. `BTreeMap` keeps rebuilds
//! byte-identical for the same entry collection.

use std::collections::BTreeMap;

use serde::Serialize;

use imcite_domain::BibliographyEntry;

use crate::identifiers::{
    canonical_url, extract_arxiv_id, extract_doi, extract_isbn_key, normalize_arxiv_id,
    normalize_doi, normalize_isbn_key,
};

/// A key that two distinct entries normalized to within one index.
///
/// A data-quality defect in the source collection, not a matching bug:
/// the first-seen entry is kept so the outcome is order-stable.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct IndexCollision {
    pub index: &'static str,
    pub key: String,
    pub kept: String,
    pub dropped: String,
}

/// The four parallel identifier-to-entry mappings
#[derive(Debug, Default)]
pub struct CitationIndex {
    doi: BTreeMap<String, BibliographyEntry>,
    isbn: BTreeMap<String, BibliographyEntry>,
    arxiv: BTreeMap<String, BibliographyEntry>,
    url: BTreeMap<String, BibliographyEntry>,
    collisions: Vec<IndexCollision>,
}

impl CitationIndex {
    /// Build all four indices from the loaded entries.
    ///
    /// Idempotent: rebuilding from the same collection yields identical
    /// mappings.
    pub fn build(entries: &[BibliographyEntry]) -> Self {
        let mut index = CitationIndex::default();

        for entry in entries {
            if let Some(ref doi) = entry.identifiers.doi {
                index.insert("doi", normalize_doi(doi), entry);
            }
            if let Some(ref isbn) = entry.identifiers.isbn {
                index.insert("isbn", normalize_isbn_key(isbn), entry);
            }
            if let Some(ref arxiv) = entry.identifiers.arxiv_id {
                index.insert("arxiv", normalize_arxiv_id(arxiv), entry);
            }
            if let Some(ref url) = entry.identifiers.url {
                index.insert("url", canonical_url(url), entry);
                // The URL itself may carry identifier keys the source
                // record never declared as structured fields
                if entry.identifiers.doi.is_none() {
                    if let Some(doi) = extract_doi(url) {
                        index.insert("doi", doi, entry);
                    }
                }
                if entry.identifiers.arxiv_id.is_none() {
                    if let Some(id) = extract_arxiv_id(url) {
                        index.insert("arxiv", id, entry);
                    }
                }
                if entry.identifiers.isbn.is_none() {
                    if let Some(key) = extract_isbn_key(url) {
                        index.insert("isbn", key, entry);
                    }
                }
            }
        }

        tracing::debug!(
            doi = index.doi.len(),
            isbn = index.isbn.len(),
            arxiv = index.arxiv.len(),
            url = index.url.len(),
            collisions = index.collisions.len(),
            "Built citation index"
        );
        index
    }

    fn insert(&mut self, which: &'static str, key: String, entry: &BibliographyEntry) {
        if key.is_empty() {
            return;
        }
        let map = match which {
            "doi" => &mut self.doi,
            "isbn" => &mut self.isbn,
            "arxiv" => &mut self.arxiv,
            _ => &mut self.url,
        };
        if let Some(existing) = map.get(&key) {
            if existing.id != entry.id {
                self.collisions.push(IndexCollision {
                    index: which,
                    key,
                    kept: existing.id.clone(),
                    dropped: entry.id.clone(),
                });
            }
            return;
        }
        map.insert(key, entry.clone());
    }

    pub fn lookup_doi(&self, key: &str) -> Option<&BibliographyEntry> {
        self.doi.get(key)
    }

    pub fn lookup_isbn(&self, key: &str) -> Option<&BibliographyEntry> {
        self.isbn.get(key)
    }

    pub fn lookup_arxiv(&self, key: &str) -> Option<&BibliographyEntry> {
        self.arxiv.get(key)
    }

    pub fn lookup_url(&self, key: &str) -> Option<&BibliographyEntry> {
        self.url.get(key)
    }

    /// Find an entry by any identifier it might share with `other`.
    /// Used by the title-recovery path of the quality validator.
    pub fn lookup_by_identifiers(
        &self,
        identifiers: &imcite_domain::Identifiers,
    ) -> Option<&BibliographyEntry> {
        if let Some(ref doi) = identifiers.doi {
            if let Some(entry) = self.lookup_doi(&normalize_doi(doi)) {
                return Some(entry);
            }
        }
        if let Some(ref arxiv) = identifiers.arxiv_id {
            if let Some(entry) = self.lookup_arxiv(&normalize_arxiv_id(arxiv)) {
                return Some(entry);
            }
        }
        if let Some(ref isbn) = identifiers.isbn {
            if let Some(entry) = self.lookup_isbn(&normalize_isbn_key(isbn)) {
                return Some(entry);
            }
        }
        if let Some(ref url) = identifiers.url {
            if let Some(entry) = self.lookup_url(&canonical_url(url)) {
                return Some(entry);
            }
        }
        None
    }

    pub fn collisions(&self) -> &[IndexCollision] {
        &self.collisions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imcite_domain::{EntryType, Identifiers};

    fn entry_with_doi(doi: &str, title: &str) -> BibliographyEntry {
        BibliographyEntry::new(
            title,
            EntryType::JournalArticle,
            Identifiers {
                doi: Some(doi.to_string()),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_lookup_uses_normalized_keys() {
        let entries = vec![entry_with_doi("10.1038/Nature12373", "T1")];
        let index = CitationIndex::build(&entries);
        assert!(index.lookup_doi("10.1038/Nature12373").is_some());
        assert!(index.lookup_doi(&normalize_doi("10.1038/Nature12373")).is_some());
    }

    #[test]
    fn test_collision_keeps_first_seen() {
        let a = entry_with_doi("10.1/x", "First");
        let mut b = entry_with_doi("10.1/x", "Second");
        // Force distinct ids so the collision is visible.
        b.id = "doi:10.1/x-second".to_string();

        let index = CitationIndex::build(&[a, b]);
        assert_eq!(index.lookup_doi("10.1/x").map(|e| e.title.as_str()), Some("First"));
        assert_eq!(index.collisions().len(), 1);
        assert_eq!(index.collisions()[0].kept, "doi:10.1/x");
    }

    #[test]
    fn test_rebuild_is_identical() {
        let entries = vec![
            entry_with_doi("10.1/a", "A"),
            entry_with_doi("10.1/b", "B"),
        ];
        let first = CitationIndex::build(&entries);
        let second = CitationIndex::build(&entries);
        assert_eq!(
            first.doi.keys().collect::<Vec<_>>(),
            second.doi.keys().collect::<Vec<_>>()
        );
    }
}
