//! CSL-JSON loader
//!
//! Accepts either a top-level array of items or an object wrapping the
//! array under `items`, which covers the common citeproc export shapes.

use serde::Deserialize;

use imcite_domain::{Author, BibliographyEntry, EntryType, Identifiers};

use super::{LoadOutcome, SkippedRecord};
use crate::error::LoadError;
use crate::identifiers::{canonical_url, normalize_doi, normalize_isbn_key};

#[derive(Debug, Deserialize)]
struct CslItem {
    id: Option<serde_json::Value>,
    #[serde(rename = "type")]
    item_type: Option<String>,
    title: Option<String>,
    #[serde(default)]
    author: Vec<CslName>,
    issued: Option<CslDate>,
    #[serde(rename = "DOI")]
    doi: Option<String>,
    #[serde(rename = "ISBN")]
    isbn: Option<String>,
    #[serde(rename = "URL")]
    url: Option<String>,
    #[serde(rename = "container-title")]
    container_title: Option<String>,
    publisher: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CslName {
    family: Option<String>,
    given: Option<String>,
    literal: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CslDate {
    #[serde(rename = "date-parts", default)]
    date_parts: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CslDocument {
    Array(Vec<CslItem>),
    Wrapped { items: Vec<CslItem> },
}

/// CSL types that denote bibliographic items
const ALLOWED_TYPES: &[&str] = &[
    "article-journal",
    "article-magazine",
    "article-newspaper",
    "book",
    "chapter",
    "paper-conference",
    "report",
    "thesis",
    "webpage",
    "post-weblog",
    "document",
    "manuscript",
    "dataset",
];

pub(super) fn parse(content: &str) -> Result<LoadOutcome, LoadError> {
    let document: CslDocument =
        serde_json::from_str(content).map_err(|e| LoadError::Malformed {
            format: "CSL-JSON",
            message: e.to_string(),
        })?;
    let items = match document {
        CslDocument::Array(items) => items,
        CslDocument::Wrapped { items } => items,
    };

    let mut outcome = LoadOutcome::default();
    for (index, item) in items.into_iter().enumerate() {
        convert(item, index, &mut outcome);
    }
    Ok(outcome)
}

fn convert(item: CslItem, index: usize, outcome: &mut LoadOutcome) {
    let label = item
        .id
        .as_ref()
        .map(label_from_id)
        .unwrap_or_else(|| format!("item #{index}"));

    let title = item.title.as_deref().map(str::trim).unwrap_or_default();
    if title.is_empty() {
        outcome.skipped.push(SkippedRecord {
            label,
            reason: "missing title".to_string(),
        });
        return;
    }

    let authors: Vec<Author> = item.author.iter().filter_map(author_from_name).collect();
    let type_recognized = item
        .item_type
        .as_deref()
        .map(|t| ALLOWED_TYPES.contains(&t))
        .unwrap_or(false);
    if !type_recognized && authors.is_empty() {
        outcome.skipped.push(SkippedRecord {
            label,
            reason: format!(
                "unrecognized item type {:?} and no authors",
                item.item_type.as_deref().unwrap_or("")
            ),
        });
        return;
    }

    let mut ids = Identifiers::default();
    ids.doi = item.doi.as_deref().map(normalize_doi);
    ids.isbn = item.isbn.as_deref().map(normalize_isbn_key);
    ids.url = item.url.as_deref().map(canonical_url);

    let entry_type = item
        .item_type
        .as_deref()
        .map(entry_type_from_csl)
        .unwrap_or(EntryType::Other);

    let mut entry =
        BibliographyEntry::new(title.to_string(), entry_type, ids).with_authors(authors);
    entry.year = item.issued.as_ref().and_then(year_from_issued);
    entry.container = item.container_title;
    entry.publisher = item.publisher;
    outcome.entries.push(entry);
}

fn author_from_name(name: &CslName) -> Option<Author> {
    if let Some(family) = name.family.as_deref().filter(|f| !f.trim().is_empty()) {
        return Some(Author::Person {
            given: name.given.clone().filter(|g| !g.trim().is_empty()),
            family: family.trim().to_string(),
        });
    }
    // A literal name is one the producer could not split into given and
    // family parts; treat it as organizational rather than re-splitting it
    let literal = name.literal.as_deref()?.trim();
    (!literal.is_empty()).then(|| Author::Organization {
        name: literal.to_string(),
    })
}

fn year_from_issued(date: &CslDate) -> Option<i32> {
    let first = date.date_parts.first()?.first()?;
    match first {
        serde_json::Value::Number(n) => n.as_i64().map(|y| y as i32),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn label_from_id(id: &serde_json::Value) -> String {
    match id {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn entry_type_from_csl(item_type: &str) -> EntryType {
    match item_type {
        "article-journal" | "article-magazine" | "article-newspaper" => EntryType::JournalArticle,
        "book" => EntryType::Book,
        "chapter" => EntryType::BookSection,
        "paper-conference" => EntryType::ConferencePaper,
        "report" => EntryType::Report,
        "thesis" => EntryType::Thesis,
        "webpage" | "post-weblog" => EntryType::Webpage,
        _ => EntryType::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_array_document() {
        let input = r#"[
            {
                "id": "chen2020",
                "type": "article-journal",
                "title": "Structured Knowledge",
                "author": [{"family": "Chen", "given": "Wei"}],
                "issued": {"date-parts": [[2020, 5]]},
                "DOI": "10.1000/xyz",
                "container-title": "Journal of Examples"
            }
        ]"#;
        let outcome = parse(input).unwrap();
        assert_eq!(outcome.entries.len(), 1);
        let entry = &outcome.entries[0];
        assert_eq!(entry.year, Some(2020));
        assert_eq!(entry.identifiers.doi.as_deref(), Some("10.1000/xyz"));
        assert_eq!(entry.authors[0].display_name(), "Wei Chen");
    }

    #[test]
    fn test_parses_wrapped_document_and_literal_author() {
        let input = r#"{"items": [
            {
                "id": 7,
                "title": "Global Health Report",
                "author": [{"literal": "World Health Organization"}],
                "type": "report"
            }
        ]}"#;
        let outcome = parse(input).unwrap();
        assert_eq!(outcome.entries.len(), 1);
        let author = &outcome.entries[0].authors[0];
        assert!(author.is_organization());
        assert_eq!(author.display_name(), "World Health Organization");
    }

    #[test]
    fn test_titleless_item_counted_as_skipped() {
        let input = r#"[{"id": "x1", "type": "book"}]"#;
        let outcome = parse(input).unwrap();
        assert!(outcome.entries.is_empty());
        assert_eq!(outcome.skipped[0].label, "x1");
        assert_eq!(outcome.skipped[0].reason, "missing title");
    }

    #[test]
    fn test_invalid_json_is_fatal() {
        let result = parse("{not json");
        assert!(matches!(result, Err(LoadError::Malformed { .. })));
    }
}
