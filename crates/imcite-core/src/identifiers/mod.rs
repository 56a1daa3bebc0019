//! Identifier extraction, normalization, and validation
//!
//! All matching correctness rests on these functions being exact,
//! deterministic, and idempotent: the index builder and the matcher key
//! both sides of every lookup through them.

mod extractors;
mod validators;

pub use extractors::{
    canonical_url, extract_arxiv_id, extract_doi, extract_isbn_key, normalize_arxiv_id,
    normalize_doi, normalize_isbn_key,
};
pub use validators::{is_valid_arxiv_id, is_valid_doi, is_valid_isbn};
