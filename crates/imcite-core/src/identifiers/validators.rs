//! Identifier format validation

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DOI_PATTERN: Regex = Regex::new(r"^10\.\d+/\S+$").unwrap();
    static ref ARXIV_NEW_PATTERN: Regex = Regex::new(r"^\d{4}\.\d{4,5}$").unwrap();
    static ref ARXIV_OLD_PATTERN: Regex = Regex::new(r"^[a-z-]+(\.[a-z-]+)?/\d{7}$").unwrap();
    static ref CATALOG_TOKEN_PATTERN: Regex = Regex::new(r"^[A-Z0-9]{10}$").unwrap();
}

pub fn is_valid_doi(doi: &str) -> bool {
    DOI_PATTERN.is_match(doi)
}

/// Version-stripped arXiv id, new or legacy form
pub fn is_valid_arxiv_id(arxiv_id: &str) -> bool {
    ARXIV_NEW_PATTERN.is_match(arxiv_id) || ARXIV_OLD_PATTERN.is_match(arxiv_id)
}

/// Accepts a checksummed ISBN-10/13 or a 10-character bookseller catalog
/// token (the locale-agnostic key used for URL-based book matching).
pub fn is_valid_isbn(isbn: &str) -> bool {
    let normalized: String = isbn
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_uppercase();

    match normalized.len() {
        10 if normalized.chars().all(|c| c.is_ascii_digit() || c == 'X') => {
            validate_isbn10(&normalized)
        }
        10 => CATALOG_TOKEN_PATTERN.is_match(&normalized),
        13 => validate_isbn13(&normalized),
        _ => false,
    }
}

fn validate_isbn10(isbn: &str) -> bool {
    let chars: Vec<char> = isbn.chars().collect();
    if chars.len() != 10 {
        return false;
    }
    for (i, &c) in chars.iter().enumerate() {
        if i < 9 {
            if !c.is_ascii_digit() {
                return false;
            }
        } else if !c.is_ascii_digit() && c != 'X' {
            return false;
        }
    }

    let sum: u32 = chars
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            let value = if c == 'X' {
                10
            } else {
                c.to_digit(10).unwrap_or(0)
            };
            value * (10 - i as u32)
        })
        .sum();
    sum % 11 == 0
}

fn validate_isbn13(isbn: &str) -> bool {
    if isbn.len() != 13 || !isbn.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }

    let sum: u32 = isbn
        .chars()
        .enumerate()
        .map(|(i, c)| {
            let value = c.to_digit(10).unwrap_or(0);
            if i % 2 == 0 {
                value
            } else {
                value * 3
            }
        })
        .sum();
    sum % 10 == 0
}
