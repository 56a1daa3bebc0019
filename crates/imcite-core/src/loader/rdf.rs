//! Zotero RDF/XML loader
//!
//! A Zotero RDF export is a flat sequence of top-level records of several
//! shapes: typed bibliographic elements (`bib:Article`, `bib:Book`, ...),
//! generic `rdf:Description` records carrying a `z:itemType`, and structural
//! records (`z:Attachment`, `z:Collection`, journal descriptions) that are
//! not library items. Records are included by an allow-list of item types;
//! everything else is either structural (excluded silently) or counted as a
//! skipped record with a reason.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use imcite_domain::{parse_author, Author, BibliographyEntry, EntryType, Identifiers};

use super::{year_from_text, LoadOutcome, SkippedRecord};
use crate::error::LoadError;
use crate::identifiers::{
    canonical_url, extract_arxiv_id, extract_doi, extract_isbn_key, normalize_arxiv_id,
    normalize_doi, normalize_isbn_key,
};

/// Item types that denote real bibliographic items. Attachments, notes and
/// collection records fall outside this list and are never loaded as entries.
const ALLOWED_ITEM_TYPES: &[&str] = &[
    "journalArticle",
    "book",
    "bookSection",
    "conferencePaper",
    "preprint",
    "report",
    "thesis",
    "webpage",
    "blogPost",
    "document",
    "magazineArticle",
    "newspaperArticle",
    "manuscript",
    "dataset",
];

/// Top-level shapes that are structural metadata rather than items.
/// These are excluded without being counted as skipped.
const STRUCTURAL_SHAPES: &[&str] = &[
    "Attachment",
    "Collection",
    "Memo",
    "Person",
    "Organization",
    "Journal",
    "Series",
    "Periodical",
];

#[derive(Debug, Default)]
struct RawRecord {
    shape: String,
    about: Option<String>,
    item_type: Option<String>,
    title: Option<String>,
    container: Option<String>,
    publisher: Option<String>,
    date: Option<String>,
    authors: Vec<Author>,
    identifier_texts: Vec<String>,
    urls: Vec<String>,
}

pub(super) fn parse(content: &str) -> Result<LoadOutcome, LoadError> {
    let mut reader = Reader::from_str(content);
    reader.trim_text(true);
    let mut buf = Vec::new();

    let mut outcome = LoadOutcome::default();
    let mut record: Option<RawRecord> = None;
    // Local element names from the record root down to the current element
    let mut path: Vec<String> = Vec::new();
    // (given, family) of the foaf:Person currently being read
    let mut person: Option<(Option<String>, Option<String>)> = None;
    let mut index = 0usize;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let local = local_name(e);
                match record {
                    None => {
                        if local != "RDF" {
                            let mut rec = RawRecord {
                                shape: local,
                                about: attr_value(e, b"rdf:about"),
                                ..Default::default()
                            };
                            if let Some(about) = &rec.about {
                                if about.starts_with("http") {
                                    rec.urls.push(about.clone());
                                }
                            }
                            record = Some(rec);
                        }
                    }
                    Some(_) => {
                        if local == "Person" {
                            person = Some((None, None));
                        }
                        path.push(local);
                    }
                }
            }
            Ok(Event::End(_)) => {
                if record.is_some() {
                    if path.is_empty() {
                        index += 1;
                        if let Some(rec) = record.take() {
                            finalize(rec, index, &mut outcome);
                        }
                    } else {
                        if path.last().map(String::as_str) == Some("Person") {
                            if let Some((given, family)) = person.take() {
                                // Creators under bib:editors are not authors
                                if path.iter().any(|p| p == "authors") {
                                    if let Some(family) = family {
                                        if let Some(rec) = record.as_mut() {
                                            rec.authors.push(Author::Person { given, family });
                                        }
                                    }
                                }
                            }
                        }
                        path.pop();
                    }
                }
            }
            Ok(Event::Text(e)) => {
                if let Some(rec) = record.as_mut() {
                    let text = e.unescape().unwrap_or_default().trim().to_string();
                    if !text.is_empty() {
                        collect_text(rec, &path, &mut person, text);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(LoadError::Malformed {
                    format: "RDF/XML",
                    message: e.to_string(),
                })
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(outcome)
}

/// Route a text node into the record based on the element path around it
fn collect_text(
    rec: &mut RawRecord,
    path: &[String],
    person: &mut Option<(Option<String>, Option<String>)>,
    text: String,
) {
    let last = match path.last() {
        Some(l) => l.as_str(),
        None => return,
    };
    let inside = |name: &str| path.iter().any(|p| p == name);

    match last {
        "itemType" => rec.item_type = Some(text),
        "title" => {
            // dc:title also appears inside dcterms:isPartOf for the
            // containing journal or book; only the direct child is ours
            if inside("isPartOf") {
                if rec.container.is_none() {
                    rec.container = Some(text);
                }
            } else if path.len() == 1 && rec.title.is_none() {
                rec.title = Some(text);
            }
        }
        "date" => rec.date = Some(text),
        "identifier" => rec.identifier_texts.push(text),
        "value" => {
            // dcterms:URI wraps the actual URL in an rdf:value child
            if inside("identifier") {
                rec.urls.push(text);
            }
        }
        "surname" => {
            if let Some((_, family)) = person.as_mut() {
                *family = Some(text);
            }
        }
        "givenName" => {
            if let Some((given, _)) = person.as_mut() {
                *given = Some(text);
            }
        }
        "li" => {
            // Bare rdf:li author names without a foaf:Person wrapper
            if inside("authors") {
                rec.authors.push(parse_author(&text));
            }
        }
        "publisher" | "name" => {
            if (last == "publisher" || inside("publisher")) && rec.publisher.is_none() {
                rec.publisher = Some(text);
            }
        }
        _ => {}
    }
}

fn finalize(rec: RawRecord, index: usize, outcome: &mut LoadOutcome) {
    if STRUCTURAL_SHAPES.contains(&rec.shape.as_str()) {
        return;
    }

    let item_type = rec
        .item_type
        .clone()
        .or_else(|| implied_item_type(&rec.shape));
    let type_recognized = item_type
        .as_deref()
        .map(|t| ALLOWED_ITEM_TYPES.contains(&t))
        .unwrap_or(false);

    // Explicitly typed non-items (attachmentItem, note) are structural
    if let Some(t) = item_type.as_deref() {
        if !type_recognized && matches!(t, "attachment" | "note" | "annotation") {
            return;
        }
    }

    let label = rec
        .about
        .clone()
        .unwrap_or_else(|| format!("record #{index}"));

    let title = match rec.title.as_deref().map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => {
            outcome.skipped.push(SkippedRecord {
                label,
                reason: "missing title".to_string(),
            });
            return;
        }
    };

    if !type_recognized && rec.authors.is_empty() {
        outcome.skipped.push(SkippedRecord {
            label,
            reason: format!(
                "unrecognized item type {:?} and no authors",
                item_type.as_deref().unwrap_or(&rec.shape)
            ),
        });
        return;
    }

    let identifiers = assemble_identifiers(&rec);
    let entry_type = item_type
        .as_deref()
        .map(entry_type_from_item_type)
        .unwrap_or(EntryType::Other);

    let mut entry = BibliographyEntry::new(title, entry_type, identifiers);
    entry.authors = rec.authors;
    entry.year = rec.date.as_deref().and_then(year_from_text);
    entry.container = rec.container;
    entry.publisher = rec.publisher;
    outcome.entries.push(entry);
}

/// Merge dc:identifier texts and URL candidates into structured identifiers
fn assemble_identifiers(rec: &RawRecord) -> Identifiers {
    let mut ids = Identifiers::default();

    for text in &rec.identifier_texts {
        let text = text.trim();
        if let Some(rest) = strip_label(text, "DOI") {
            if ids.doi.is_none() {
                ids.doi = Some(normalize_doi(rest));
            }
        } else if let Some(rest) = strip_label(text, "ISBN") {
            if ids.isbn.is_none() {
                ids.isbn = Some(normalize_isbn_key(rest));
            }
        } else if text.starts_with("arXiv:") {
            if ids.arxiv_id.is_none() {
                ids.arxiv_id = Some(normalize_arxiv_id(text));
            }
        } else if text.starts_with("http") && ids.url.is_none() {
            ids.url = Some(canonical_url(text));
        }
    }

    for url in &rec.urls {
        if ids.doi.is_none() {
            ids.doi = extract_doi(url);
        }
        if ids.arxiv_id.is_none() {
            ids.arxiv_id = extract_arxiv_id(url);
        }
        if ids.isbn.is_none() {
            ids.isbn = extract_isbn_key(url);
        }
        if ids.url.is_none() {
            ids.url = Some(canonical_url(url));
        }
    }

    ids
}

/// "DOI 10.1234/x" or "DOI: 10.1234/x" style identifier labels
fn strip_label<'a>(text: &'a str, label: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(label)?;
    let rest = rest.trim_start_matches(':').trim();
    (!rest.is_empty()).then_some(rest)
}

/// Typed bib: elements imply an item type without a z:itemType child
fn implied_item_type(shape: &str) -> Option<String> {
    let implied = match shape {
        "Article" => "journalArticle",
        "Book" => "book",
        "BookSection" => "bookSection",
        "ConferenceProceedings" | "ConferencePaper" => "conferencePaper",
        "Report" => "report",
        "Thesis" => "thesis",
        "Document" => "document",
        "Manuscript" => "manuscript",
        "Data" => "dataset",
        _ => return None,
    };
    Some(implied.to_string())
}

fn entry_type_from_item_type(item_type: &str) -> EntryType {
    match item_type {
        "journalArticle" | "magazineArticle" | "newspaperArticle" => EntryType::JournalArticle,
        "book" => EntryType::Book,
        "bookSection" => EntryType::BookSection,
        "conferencePaper" => EntryType::ConferencePaper,
        "preprint" => EntryType::Preprint,
        "report" => EntryType::Report,
        "thesis" => EntryType::Thesis,
        "webpage" | "blogPost" => EntryType::Webpage,
        _ => EntryType::Other,
    }
}

fn local_name(e: &BytesStart) -> String {
    let name = e.name();
    let raw = name.as_ref();
    let local = match raw.iter().position(|&b| b == b':') {
        Some(pos) => &raw[pos + 1..],
        None => raw,
    };
    String::from_utf8_lossy(local).to_string()
}

fn attr_value(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .map(|a| String::from_utf8_lossy(&a.value).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:dc="http://purl.org/dc/elements/1.1/"
         xmlns:dcterms="http://purl.org/dc/terms/"
         xmlns:bib="http://purl.org/net/biblio#"
         xmlns:foaf="http://xmlns.com/foaf/0.1/"
         xmlns:z="http://www.zotero.org/namespaces/export#">
  <bib:Article rdf:about="https://doi.org/10.1000/xyz">
    <dc:title>Structured Knowledge</dc:title>
    <bib:authors>
      <rdf:Seq>
        <rdf:li>
          <foaf:Person>
            <foaf:surname>Chen</foaf:surname>
            <foaf:givenName>Wei</foaf:givenName>
          </foaf:Person>
        </rdf:li>
      </rdf:Seq>
    </bib:authors>
    <dc:date>2020-05-01</dc:date>
    <dc:identifier>DOI 10.1000/xyz</dc:identifier>
    <dcterms:isPartOf>
      <bib:Journal>
        <dc:title>Journal of Examples</dc:title>
      </bib:Journal>
    </dcterms:isPartOf>
  </bib:Article>
  <z:Attachment rdf:about="#item_2">
    <dc:title>Full Text PDF</dc:title>
  </z:Attachment>
  <rdf:Description rdf:about="https://example.org/report">
    <z:itemType>report</z:itemType>
    <dc:title>Annual Survey</dc:title>
    <dc:date>2019</dc:date>
  </rdf:Description>
  <rdf:Description rdf:about="#item_9">
    <z:itemType>custom</z:itemType>
    <dc:date>2018</dc:date>
  </rdf:Description>
</rdf:RDF>"##;

    #[test]
    fn test_parses_typed_and_description_records() {
        let outcome = parse(SAMPLE).unwrap();
        assert_eq!(outcome.entries.len(), 2);

        let article = &outcome.entries[0];
        assert_eq!(article.title, "Structured Knowledge");
        assert_eq!(article.identifiers.doi.as_deref(), Some("10.1000/xyz"));
        assert_eq!(article.year, Some(2020));
        assert_eq!(article.container.as_deref(), Some("Journal of Examples"));
        assert_eq!(article.authors.len(), 1);
        assert_eq!(article.authors[0].display_name(), "Wei Chen");

        let report = &outcome.entries[1];
        assert_eq!(report.entry_type, EntryType::Report);
        assert!(report.identifiers.url.is_some());
    }

    #[test]
    fn test_attachment_excluded_without_skip_record() {
        let outcome = parse(SAMPLE).unwrap();
        assert!(outcome
            .entries
            .iter()
            .all(|e| e.title != "Full Text PDF"));
        // The attachment is structural; only the titleless custom record
        // is counted as skipped
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].label, "#item_9");
        assert_eq!(outcome.skipped[0].reason, "missing title");
    }

    #[test]
    fn test_journal_title_does_not_leak_into_record_title() {
        let outcome = parse(SAMPLE).unwrap();
        assert!(outcome
            .entries
            .iter()
            .all(|e| e.title != "Journal of Examples"));
    }

    #[test]
    fn test_malformed_xml_is_fatal() {
        let result = parse("<rdf:RDF><bib:Article></rdf:RDF>");
        assert!(matches!(result, Err(LoadError::Malformed { .. })));
    }
}
