//! Near-duplicate flagging for human review
//!
//! Canonical sources accumulate near-duplicates when the same work is
//! re-scraped on different dates. Pairs are only ever flagged, never
//! merged: merging risks conflating genuinely distinct editions.

use serde::{Deserialize, Serialize};
use strsim::jaro_winkler;
use unicode_normalization::UnicodeNormalization;

use imcite_domain::BibliographyEntry;

/// Tunable knobs for the flagging heuristic
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DedupConfig {
    /// Minimum normalized-title similarity for a pair to be flagged.
    /// Stricter than cross-source search matching since a false flag
    /// costs reviewer time.
    pub title_threshold: f64,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            title_threshold: 0.9,
        }
    }
}

/// One flagged pair, by entry id
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct NearDuplicate {
    pub first: String,
    pub second: String,
    pub score: f64,
    pub reason: String,
}

/// Scan the collection for likely duplicates.
///
/// Shared registry identifiers short-circuit to a certain flag; otherwise
/// a pair is flagged when normalized titles exceed the threshold and the
/// years are within one (publication vs preprint skew).
pub fn find_near_duplicates(
    entries: &[BibliographyEntry],
    config: &DedupConfig,
) -> Vec<NearDuplicate> {
    let normalized: Vec<String> = entries.iter().map(|e| normalize_title(&e.title)).collect();
    let mut flagged = Vec::new();

    for i in 0..entries.len() {
        for j in (i + 1)..entries.len() {
            let (a, b) = (&entries[i], &entries[j]);

            if shares_identifier(a, b) {
                flagged.push(NearDuplicate {
                    first: a.id.clone(),
                    second: b.id.clone(),
                    score: 1.0,
                    reason: "Shared registry identifier".to_string(),
                });
                continue;
            }

            let score = jaro_winkler(&normalized[i], &normalized[j]);
            if score >= config.title_threshold && years_close(a.year, b.year) {
                flagged.push(NearDuplicate {
                    first: a.id.clone(),
                    second: b.id.clone(),
                    score,
                    reason: format!("Title similarity {:.0}%", score * 100.0),
                });
            }
        }
    }

    flagged
}

fn shares_identifier(a: &BibliographyEntry, b: &BibliographyEntry) -> bool {
    matches_some(&a.identifiers.doi, &b.identifiers.doi)
        || matches_some(&a.identifiers.arxiv_id, &b.identifiers.arxiv_id)
        || matches_some(&a.identifiers.isbn, &b.identifiers.isbn)
}

fn matches_some(a: &Option<String>, b: &Option<String>) -> bool {
    match (a, b) {
        (Some(x), Some(y)) => x.eq_ignore_ascii_case(y),
        _ => false,
    }
}

fn years_close(a: Option<i32>, b: Option<i32>) -> bool {
    match (a, b) {
        (Some(x), Some(y)) => (x - y).abs() <= 1,
        // A missing year must not suppress a strong title match.
        _ => true,
    }
}

/// NFKD-fold a title to lower-case alphanumerics with collapsed spaces
fn normalize_title(title: &str) -> String {
    let folded: String = title
        .nfkd()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use imcite_domain::{EntryType, Identifiers};

    fn entry(title: &str, year: i32, doi: Option<&str>) -> BibliographyEntry {
        BibliographyEntry::new(
            title,
            EntryType::JournalArticle,
            Identifiers {
                doi: doi.map(String::from),
                url: Some(format!("example.org/{}", title.len())),
                ..Default::default()
            },
        )
        .with_year(year)
    }

    #[test]
    fn test_shared_doi_flags_with_certainty() {
        let a = entry("Paper One", 2020, Some("10.1/x"));
        let mut b = entry("Totally Different Name", 2021, Some("10.1/x"));
        b.id = "doi:10.1/x-rescrape".to_string();

        let flagged = find_near_duplicates(&[a, b], &DedupConfig::default());
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].score, 1.0);
    }

    #[test]
    fn test_similar_titles_flagged_not_merged() {
        let a = entry("Deep Learning for Citation Matching", 2020, None);
        let b = entry("Deep Learning for Citation Matching.", 2020, None);
        let entries = vec![a, b];

        let flagged = find_near_duplicates(&entries, &DedupConfig::default());
        assert_eq!(flagged.len(), 1);
        // The collection itself is untouched.
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_dissimilar_titles_not_flagged() {
        let a = entry("Graph Algorithms", 2019, None);
        let b = entry("The Economics of Fisheries", 2019, None);
        assert!(find_near_duplicates(&[a, b], &DedupConfig::default()).is_empty());
    }

    #[test]
    fn test_threshold_is_configurable() {
        let a = entry("An Overview of Topic Models", 2020, None);
        let b = entry("An Overview of Topical Modes", 2020, None);
        let strict = DedupConfig {
            title_threshold: 0.999,
        };
        assert!(find_near_duplicates(&[a, b], &strict).is_empty());
    }
}
