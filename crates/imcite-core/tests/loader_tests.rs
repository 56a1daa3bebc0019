//! Bibliography loader integration tests
//!
//! The contract under test: every record the source truly contains is
//! either loaded as an entry or accounted for as a skipped record, and
//! structural records (attachments, collections, contained journals) are
//! excluded without ever being counted as library items.

use std::io::Write;

use imcite_core::error::LoadError;
use imcite_core::loader::{detect_format, load_path, load_str, SourceFormat};

const RDF_EXPORT: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:dc="http://purl.org/dc/elements/1.1/"
         xmlns:dcterms="http://purl.org/dc/terms/"
         xmlns:bib="http://purl.org/net/biblio#"
         xmlns:foaf="http://xmlns.com/foaf/0.1/"
         xmlns:z="http://www.zotero.org/namespaces/export#">
  <bib:Article rdf:about="https://doi.org/10.1038/s41586-020-2649-2">
    <dc:title>Array programming with NumPy</dc:title>
    <bib:authors>
      <rdf:Seq>
        <rdf:li>
          <foaf:Person>
            <foaf:surname>Harris</foaf:surname>
            <foaf:givenName>Charles R.</foaf:givenName>
          </foaf:Person>
        </rdf:li>
      </rdf:Seq>
    </bib:authors>
    <dc:date>2020-09-16</dc:date>
    <dc:identifier>DOI 10.1038/s41586-020-2649-2</dc:identifier>
    <dcterms:isPartOf>
      <bib:Journal>
        <dc:title>Nature</dc:title>
      </bib:Journal>
    </dcterms:isPartOf>
  </bib:Article>
  <bib:Book rdf:about="urn:isbn:9780262033848">
    <dc:title>Introduction to Algorithms</dc:title>
    <bib:authors>
      <rdf:Seq>
        <rdf:li>
          <foaf:Person>
            <foaf:surname>Cormen</foaf:surname>
            <foaf:givenName>Thomas H.</foaf:givenName>
          </foaf:Person>
        </rdf:li>
      </rdf:Seq>
    </bib:authors>
    <dc:identifier>ISBN 978-0-262-03384-8</dc:identifier>
    <dc:date>2009</dc:date>
  </bib:Book>
  <rdf:Description rdf:about="https://www.who.int/publications/world-report">
    <z:itemType>report</z:itemType>
    <dc:title>World Report</dc:title>
    <dc:publisher>World Health Organization</dc:publisher>
    <dc:date>2021</dc:date>
  </rdf:Description>
  <z:Attachment rdf:about="#attachment_1">
    <dc:title>Full Text PDF</dc:title>
  </z:Attachment>
  <z:Collection rdf:about="#collection_1">
    <dc:title>My Papers</dc:title>
  </z:Collection>
  <rdf:Description rdf:about="#item_44">
    <z:itemType>presentation</z:itemType>
    <dc:title>Slides Without Authors</dc:title>
  </rdf:Description>
</rdf:RDF>"##;

#[test]
fn test_rdf_export_loads_all_item_shapes() {
    let outcome = load_str(RDF_EXPORT, SourceFormat::ZoteroRdf).unwrap();

    // Three real items: typed article, typed book, Description report
    assert_eq!(outcome.entries.len(), 3);

    let article = &outcome.entries[0];
    assert_eq!(article.title, "Array programming with NumPy");
    assert_eq!(
        article.identifiers.doi.as_deref(),
        Some("10.1038/s41586-020-2649-2")
    );
    assert_eq!(article.container.as_deref(), Some("Nature"));
    assert_eq!(article.year, Some(2020));

    let book = &outcome.entries[1];
    assert_eq!(book.identifiers.isbn.as_deref(), Some("9780262033848"));

    let report = &outcome.entries[2];
    assert_eq!(report.publisher.as_deref(), Some("World Health Organization"));
    assert_eq!(
        report.identifiers.url.as_deref(),
        Some("who.int/publications/world-report")
    );
}

#[test]
fn test_rdf_structural_records_excluded_silently() {
    let outcome = load_str(RDF_EXPORT, SourceFormat::ZoteroRdf).unwrap();

    for entry in &outcome.entries {
        assert_ne!(entry.title, "Full Text PDF");
        assert_ne!(entry.title, "My Papers");
        assert_ne!(entry.title, "Nature");
    }
    // Only the authorless presentation record is accounted as skipped
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].label, "#item_44");
}

#[test]
fn test_bibtex_source_loads() {
    let input = r#"
        @article{harris2020,
            title = {Array programming with {NumPy}},
            author = {Harris, Charles R. and van der Walt, Stefan},
            journal = {Nature},
            year = {2020},
            doi = {10.1038/s41586-020-2649-2},
        }
        @book{clrs,
            title = {Introduction to Algorithms},
            author = {Cormen, Thomas H.},
            isbn = {978-0-262-03384-8},
            year = {2009},
        }
    "#;
    let outcome = load_str(input, SourceFormat::BibTex).unwrap();
    assert_eq!(outcome.entries.len(), 2);
    assert_eq!(outcome.entries[0].authors.len(), 2);
    assert_eq!(
        outcome.entries[1].identifiers.isbn.as_deref(),
        Some("9780262033848")
    );
}

#[test]
fn test_csl_json_source_loads() {
    let input = r#"[
        {
            "id": "harris2020",
            "type": "article-journal",
            "title": "Array programming with NumPy",
            "author": [{"family": "Harris", "given": "Charles R."}],
            "issued": {"date-parts": [[2020, 9, 16]]},
            "DOI": "10.1038/s41586-020-2649-2"
        }
    ]"#;
    let outcome = load_str(input, SourceFormat::CslJson).unwrap();
    assert_eq!(outcome.entries.len(), 1);
    assert_eq!(outcome.entries[0].year, Some(2020));
}

#[test]
fn test_load_path_reads_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        "@book{{b1,\n title = {{T}},\n author = {{Doe, Jane}},\n year = {{2001}},\n}}"
    )
    .unwrap();

    let outcome = load_path(file.path(), SourceFormat::BibTex).unwrap();
    assert_eq!(outcome.entries.len(), 1);
}

#[test]
fn test_load_path_missing_file_is_io_error() {
    let result = load_path(
        std::path::Path::new("/nonexistent/library.bib"),
        SourceFormat::BibTex,
    );
    assert!(matches!(result, Err(LoadError::Io { .. })));
}

#[test]
fn test_nonempty_source_with_zero_entries_is_fatal() {
    // A comment-only file parses but yields nothing; treating that as an
    // empty library would mass-report every citation as missing
    let result = load_str("% just a comment\n", SourceFormat::BibTex);
    assert!(matches!(result, Err(LoadError::NoEntries)));
}

#[test]
fn test_detect_format_for_each_source_kind() {
    assert_eq!(detect_format(RDF_EXPORT), Some(SourceFormat::ZoteroRdf));
    assert_eq!(
        detect_format("@article{k, title={T}}"),
        Some(SourceFormat::BibTex)
    );
    assert_eq!(detect_format("[{}]"), Some(SourceFormat::CslJson));
}

#[test]
fn test_entry_ids_are_stable_across_reloads() {
    let first = load_str(RDF_EXPORT, SourceFormat::ZoteroRdf).unwrap();
    let second = load_str(RDF_EXPORT, SourceFormat::ZoteroRdf).unwrap();
    let first_ids: Vec<&str> = first.entries.iter().map(|e| e.id.as_str()).collect();
    let second_ids: Vec<&str> = second.entries.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(first_ids, second_ids);
}
