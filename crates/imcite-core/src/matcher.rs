//! Citation matcher
//!
//! Resolves one citation to at most one entry via a strictly ordered
//! strategy search: doi, isbn, arxiv, canonical URL. First hit wins; the
//! ordering itself is the tie-break. Registry-assigned identifiers are
//! collision-free by construction and therefore outrank raw URL equality,
//! which is vulnerable to locale subdomains and tracking parameters the
//! canonicalizer cannot anticipate for every publisher.
//!
//! Identity comes only from externally-assigned identifiers or canonical
//! URL equality. No locally-generated keys, no title similarity: those are
//! not stable across runs.

use imcite_domain::{Citation, MatchResult, MatchStrategy};

use crate::identifiers::{canonical_url, extract_arxiv_id, extract_doi, extract_isbn_key};
use crate::index::CitationIndex;

/// Resolve one citation against the built index.
///
/// Pure with respect to the index and carries no cross-citation state, so
/// resolving a citation list in any order yields the same per-citation
/// results.
pub fn resolve(citation: &Citation, index: &CitationIndex) -> MatchResult {
    if let Some(doi) = extract_doi(&citation.url) {
        if let Some(entry) = index.lookup_doi(&doi) {
            tracing::debug!(url = %citation.url, %doi, "Resolved via DOI");
            return MatchResult::resolved(citation.clone(), entry.clone(), MatchStrategy::Doi);
        }
    }

    if let Some(isbn) = extract_isbn_key(&citation.url) {
        if let Some(entry) = index.lookup_isbn(&isbn) {
            tracing::debug!(url = %citation.url, %isbn, "Resolved via ISBN");
            return MatchResult::resolved(citation.clone(), entry.clone(), MatchStrategy::Isbn);
        }
    }

    if let Some(arxiv) = extract_arxiv_id(&citation.url) {
        if let Some(entry) = index.lookup_arxiv(&arxiv) {
            tracing::debug!(url = %citation.url, %arxiv, "Resolved via arXiv id");
            return MatchResult::resolved(citation.clone(), entry.clone(), MatchStrategy::Arxiv);
        }
    }

    let url_key = canonical_url(&citation.url);
    if let Some(entry) = index.lookup_url(&url_key) {
        tracing::debug!(url = %citation.url, key = %url_key, "Resolved via canonical URL");
        return MatchResult::resolved(citation.clone(), entry.clone(), MatchStrategy::Url);
    }

    tracing::debug!(url = %citation.url, "Unresolved");
    MatchResult::unresolved(citation.clone())
}

/// Resolve a batch of citations. Order of the input list does not affect
/// any individual result.
pub fn resolve_all(citations: &[Citation], index: &CitationIndex) -> Vec<MatchResult> {
    citations.iter().map(|c| resolve(c, index)).collect()
}
