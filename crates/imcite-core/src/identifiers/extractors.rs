//! Identifier extraction from citation URLs and free text

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // DOI: 10.<registrant>/<suffix> from doi.org URLs or bare text
    static ref DOI_RE: Regex = Regex::new(
        r#"(?i)(?:doi[:\s]*)?(?:https?://(?:dx\.)?doi\.org/)?(?P<doi>10\.\d+/[^\s\]}>"',;?#]+)"#
    ).unwrap();

    // arXiv URL: abs/, pdf/, and html/ path variants are equivalent
    static ref ARXIV_URL_RE: Regex = Regex::new(
        r"(?i)arxiv\.org/(?:abs|pdf|html)/(?P<id>[^\s?#]+)"
    ).unwrap();

    // Bare arXiv id: new YYMM.NNNNN form or legacy category/YYMMNNN form
    static ref ARXIV_ID_RE: Regex = Regex::new(
        r"(?i)^(?:arxiv:)?(?P<id>(?:\d{4}\.\d{4,5})|(?:[a-z-]+(?:\.[a-z-]+)?/\d{7}))(?:v\d+)?$"
    ).unwrap();

    // Bookseller catalog token after a recognized path marker
    static ref CATALOG_TOKEN_RE: Regex = Regex::new(
        r"(?i)/(?:dp|gp/product)/(?P<token>[A-Za-z0-9]{10})(?:[/?#]|$)"
    ).unwrap();

    static ref ARXIV_VERSION_RE: Regex = Regex::new(r"(?i)v\d+$").unwrap();
}

/// Extract a DOI from a URL or free text, normalized for lookup
pub fn extract_doi(text: &str) -> Option<String> {
    DOI_RE
        .captures(text)
        .and_then(|cap| cap.name("doi"))
        .map(|m| normalize_doi(m.as_str()))
}

/// Normalize a DOI: strip resolver prefixes and trailing punctuation,
/// lower-case the registrant, keep the suffix case as-is.
///
/// DOIs are case-sensitive in registries but conventionally compared
/// case-insensitively at the prefix; suffix case is preserved so the
/// stored value stays faithful to the source.
pub fn normalize_doi(doi: &str) -> String {
    let mut result = doi.trim().to_string();

    let prefixes = [
        "https://doi.org/",
        "http://doi.org/",
        "https://dx.doi.org/",
        "http://dx.doi.org/",
        "doi:",
        "DOI:",
    ];
    for prefix in prefixes {
        if let Some(stripped) = result.strip_prefix(prefix) {
            result = stripped.to_string();
            break;
        }
    }

    while let Some(c) = result.chars().last() {
        if c == '.' || c == ',' || c == ';' || c == ')' || c == ']' {
            result.pop();
        } else {
            break;
        }
    }

    match result.find('/') {
        Some(slash) => format!("{}{}", result[..slash].to_lowercase(), &result[slash..]),
        None => result,
    }
}

/// Extract an arXiv id from a URL or bare text, version-stripped
pub fn extract_arxiv_id(text: &str) -> Option<String> {
    if let Some(cap) = ARXIV_URL_RE.captures(text) {
        let raw = cap
            .name("id")
            .map(|m| m.as_str())
            .unwrap_or_default()
            .trim_end_matches(".pdf")
            .trim_end_matches('/');
        let id = normalize_arxiv_id(raw);
        if ARXIV_ID_RE.is_match(&id) {
            return Some(id);
        }
        return None;
    }

    ARXIV_ID_RE
        .captures(text.trim())
        .and_then(|cap| cap.name("id"))
        .map(|m| m.as_str().to_lowercase())
}

/// Normalize an arXiv id: strip the `arXiv:` prefix and any `vN` suffix
pub fn normalize_arxiv_id(id: &str) -> String {
    let trimmed = id.trim();
    let without_prefix = trimmed
        .strip_prefix("arXiv:")
        .or_else(|| trimmed.strip_prefix("arxiv:"))
        .unwrap_or(trimmed);
    ARXIV_VERSION_RE
        .replace(without_prefix, "")
        .to_lowercase()
}

/// Extract the 10-character catalog token from a bookseller URL
///
/// The same book listed on two country domains of the same bookseller
/// yields the same key: only the path marker and token matter, never the
/// host.
pub fn extract_isbn_key(url: &str) -> Option<String> {
    CATALOG_TOKEN_RE
        .captures(url)
        .and_then(|cap| cap.name("token"))
        .map(|m| m.as_str().to_uppercase())
}

/// Normalize a declared ISBN field: drop separators, upper-case
pub fn normalize_isbn_key(isbn: &str) -> String {
    isbn.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_uppercase()
}

/// Canonical URL for fallback matching: strip scheme, `www.` prefix,
/// query string, fragment, and trailing slash; lower-case the host.
/// A pure string transform, never a network operation.
pub fn canonical_url(raw: &str) -> String {
    let mut s = raw.trim().to_string();

    // Loop so the transform is a fixpoint even on junk input
    while let Some(pos) = s.find("://") {
        if s[..pos].contains('/') {
            break;
        }
        s = s[pos + 3..].to_string();
    }
    while let Some(stripped) = s.strip_prefix("www.") {
        s = stripped.to_string();
    }
    if let Some(pos) = s.find(['?', '#']) {
        s.truncate(pos);
    }
    while s.ends_with('/') {
        s.pop();
    }

    match s.find('/') {
        Some(slash) => format!("{}{}", s[..slash].to_lowercase(), &s[slash..]),
        None => s.to_lowercase(),
    }
}
