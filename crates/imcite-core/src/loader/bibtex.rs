//! BibTeX loader
//!
//! Handles standard BibTeX: @string definitions, @comment and @preamble
//! blocks, braced and quoted field values with nested braces, and string
//! concatenation with #. A record that fails to parse is counted as
//! skipped and parsing resumes at the next @, so one bad record never
//! hides the rest of the file.

use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, multispace0},
    combinator::map,
    IResult,
};
use std::collections::HashMap;

use imcite_domain::{parse_author_list, BibliographyEntry, EntryType, Identifiers};

use super::{year_from_text, LoadOutcome, SkippedRecord};
use crate::error::LoadError;
use crate::identifiers::{canonical_url, normalize_arxiv_id, normalize_doi, normalize_isbn_key};

#[derive(Debug)]
struct RawBibRecord {
    entry_type: String,
    cite_key: String,
    fields: HashMap<String, String>,
}

pub(super) fn parse(content: &str) -> Result<LoadOutcome, LoadError> {
    let mut outcome = LoadOutcome::default();
    let mut strings: HashMap<String, String> = HashMap::new();
    let mut remaining = content;

    while !remaining.is_empty() {
        remaining = skip_to_at(remaining);
        if remaining.is_empty() {
            break;
        }

        match parse_at_block(remaining, &strings) {
            Ok((rest, block)) => {
                match block {
                    AtBlock::Record(record) => convert(record, &mut outcome),
                    AtBlock::String(key, value) => {
                        strings.insert(key, value);
                    }
                    AtBlock::Ignored => {}
                }
                remaining = rest;
            }
            Err(_) => {
                let label = preview(remaining);
                outcome.skipped.push(SkippedRecord {
                    label,
                    reason: "malformed record".to_string(),
                });
                // Resume at the next @ so the rest of the file still loads
                match remaining[1..].find('@') {
                    Some(pos) => remaining = &remaining[pos + 1..],
                    None => break,
                }
            }
        }
    }

    Ok(outcome)
}

/// Map a parsed record to a bibliography entry, or account for the skip
fn convert(record: RawBibRecord, outcome: &mut LoadOutcome) {
    // Drop protective braces, e.g. "with {NumPy}"
    let title = record
        .fields
        .get("title")
        .map(|t| {
            t.chars()
                .filter(|c| *c != '{' && *c != '}')
                .collect::<String>()
                .trim()
                .to_string()
        })
        .unwrap_or_default();
    if title.is_empty() {
        outcome.skipped.push(SkippedRecord {
            label: record.cite_key,
            reason: "missing title".to_string(),
        });
        return;
    }

    let authors = record
        .fields
        .get("author")
        .map(|a| parse_author_list(a))
        .unwrap_or_default();

    let (entry_type, recognized) = entry_type_from_bibtex(&record.entry_type);
    if !recognized && authors.is_empty() {
        outcome.skipped.push(SkippedRecord {
            label: record.cite_key,
            reason: format!("unrecognized entry type {:?} and no authors", record.entry_type),
        });
        return;
    }

    let mut ids = Identifiers::default();
    if let Some(doi) = record.fields.get("doi") {
        ids.doi = Some(normalize_doi(doi));
    }
    if let Some(isbn) = record.fields.get("isbn") {
        ids.isbn = Some(normalize_isbn_key(isbn));
    }
    if let Some(eprint) = record.fields.get("eprint") {
        let is_arxiv = record
            .fields
            .get("archiveprefix")
            .map(|p| p.eq_ignore_ascii_case("arxiv"))
            .unwrap_or(true);
        if is_arxiv {
            ids.arxiv_id = Some(normalize_arxiv_id(eprint));
        }
    }
    if let Some(url) = record.fields.get("url") {
        ids.url = Some(canonical_url(url));
    }

    let mut entry = BibliographyEntry::new(title, entry_type, ids).with_authors(authors);
    entry.year = record.fields.get("year").and_then(|y| year_from_text(y));
    entry.container = record
        .fields
        .get("journal")
        .or_else(|| record.fields.get("booktitle"))
        .cloned();
    entry.publisher = record.fields.get("publisher").cloned();
    outcome.entries.push(entry);
}

fn entry_type_from_bibtex(entry_type: &str) -> (EntryType, bool) {
    let mapped = match entry_type.to_lowercase().as_str() {
        "article" => EntryType::JournalArticle,
        "book" => EntryType::Book,
        "inbook" | "incollection" => EntryType::BookSection,
        "inproceedings" | "conference" => EntryType::ConferencePaper,
        "techreport" => EntryType::Report,
        "phdthesis" | "mastersthesis" => EntryType::Thesis,
        "online" | "electronic" => EntryType::Webpage,
        "unpublished" | "misc" => EntryType::Other,
        _ => return (EntryType::Other, false),
    };
    (mapped, true)
}

/// Skip whitespace and % line comments up to the next @
fn skip_to_at(input: &str) -> &str {
    let mut pos = 0;
    let bytes = input.as_bytes();
    while pos < bytes.len() {
        match bytes[pos] {
            b'@' => return &input[pos..],
            b'%' => {
                while pos < bytes.len() && bytes[pos] != b'\n' {
                    pos += 1;
                }
            }
            _ => pos += 1,
        }
    }
    ""
}

fn preview(input: &str) -> String {
    let snippet: String = input.chars().take(40).collect();
    snippet.split_whitespace().collect::<Vec<_>>().join(" ")
}

enum AtBlock {
    Record(RawBibRecord),
    String(String, String),
    Ignored,
}

fn parse_at_block<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, AtBlock> {
    let (rest, _) = char('@')(input)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, entry_type) = take_while1(|c: char| c.is_ascii_alphanumeric())(rest)?;

    match entry_type.to_lowercase().as_str() {
        "string" => {
            let (rest, (key, value)) = parse_string_definition(rest, strings)?;
            Ok((rest, AtBlock::String(key, value)))
        }
        "preamble" | "comment" => {
            let (rest, _) = parse_skipped_block(rest)?;
            Ok((rest, AtBlock::Ignored))
        }
        _ => {
            let (rest, record) = parse_record_body(rest, entry_type, strings)?;
            Ok((rest, AtBlock::Record(record)))
        }
    }
}

fn parse_string_definition<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, (String, String)> {
    let (rest, _) = multispace0(input)?;
    let (rest, _) = char('{')(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, key) =
        take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-')(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char('=')(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, value) = parse_field_value(rest, strings)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char('}')(rest)?;

    Ok((rest, (key.to_string(), value)))
}

/// @preamble and @comment bodies carry no entries
fn parse_skipped_block(input: &str) -> IResult<&str, ()> {
    let (rest, _) = multispace0(input)?;
    if rest.starts_with('{') {
        let (rest, _) = parse_braced_content(rest)?;
        Ok((rest, ()))
    } else {
        let pos = rest.find('\n').unwrap_or(rest.len());
        Ok((&rest[pos..], ()))
    }
}

fn parse_record_body<'a>(
    input: &'a str,
    entry_type: &str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, RawBibRecord> {
    let (rest, _) = multispace0(input)?;
    let (rest, _) = char('{')(rest)?;
    let (rest, _) = multispace0(rest)?;

    let (rest, cite_key) =
        take_while1(|c: char| c.is_ascii_alphanumeric() || "_-:./".contains(c))(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char(',')(rest)?;

    let (rest, fields) = parse_fields(rest, strings)?;

    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char('}')(rest)?;

    let mut record = RawBibRecord {
        entry_type: entry_type.to_string(),
        cite_key: cite_key.to_string(),
        fields: HashMap::new(),
    };
    for (key, value) in fields {
        // Field names are case-insensitive
        record.fields.insert(key.to_lowercase(), value);
    }

    Ok((rest, record))
}

fn parse_fields<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, Vec<(String, String)>> {
    let mut fields = Vec::new();
    let mut remaining = input;

    loop {
        let (rest, _) = multispace0(remaining)?;

        if rest.starts_with('}') {
            return Ok((rest, fields));
        }

        match parse_single_field(rest, strings) {
            Ok((rest, (key, value))) => {
                fields.push((key, value));
                let (rest, _) = multispace0(rest)?;
                remaining = rest.strip_prefix(',').unwrap_or(rest);
            }
            Err(_) => {
                return Ok((remaining, fields));
            }
        }
    }
}

fn parse_single_field<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, (String, String)> {
    let (rest, _) = multispace0(input)?;
    let (rest, key) =
        take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-')(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char('=')(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, value) = parse_field_value(rest, strings)?;

    Ok((rest, (key.to_string(), value)))
}

/// Braced, quoted, numeric, or @string-reference value, possibly
/// concatenated with #
fn parse_field_value<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, String> {
    let mut result = String::new();
    let mut remaining = input;

    loop {
        let (rest, _) = multispace0(remaining)?;

        let (rest, part) = alt((
            parse_braced_value,
            parse_quoted_value,
            map(take_while1(|c: char| c.is_ascii_digit()), |s: &str| {
                s.to_string()
            }),
            map(
                take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-'),
                |s: &str| strings.get(s).cloned().unwrap_or_else(|| s.to_string()),
            ),
        ))(rest)?;

        result.push_str(&part);

        let (rest, _) = multispace0(rest)?;
        if let Some(stripped) = rest.strip_prefix('#') {
            remaining = stripped;
        } else {
            return Ok((rest, result));
        }
    }
}

fn parse_braced_value(input: &str) -> IResult<&str, String> {
    let (rest, content) = parse_braced_content(input)?;
    let inner = &content[1..content.len() - 1];
    Ok((rest, inner.to_string()))
}

/// Braced content including nested braces, outer braces kept
fn parse_braced_content(input: &str) -> IResult<&str, &str> {
    if !input.starts_with('{') {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Char,
        )));
    }

    let mut depth = 0;
    let mut pos = 0;
    let bytes = input.as_bytes();

    while pos < bytes.len() {
        match bytes[pos] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok((&input[pos + 1..], &input[..pos + 1]));
                }
            }
            b'\\' => pos += 1,
            _ => {}
        }
        pos += 1;
    }

    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Char,
    )))
}

fn parse_quoted_value(input: &str) -> IResult<&str, String> {
    if !input.starts_with('"') {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Char,
        )));
    }

    let mut result = String::new();
    let mut pos = 1;
    let bytes = input.as_bytes();
    let mut brace_depth = 0;

    while pos < bytes.len() {
        match bytes[pos] {
            b'"' if brace_depth == 0 => {
                return Ok((&input[pos + 1..], result));
            }
            b'{' => {
                brace_depth += 1;
                result.push('{');
            }
            b'}' => {
                brace_depth -= 1;
                result.push('}');
            }
            b'\\' if pos + 1 < bytes.len() => {
                result.push('\\');
                pos += 1;
                result.push(bytes[pos] as char);
            }
            c => result.push(c as char),
        }
        pos += 1;
    }

    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Char,
    )))
}
