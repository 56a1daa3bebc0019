//! Bibliography entry domain model

use serde::{Deserialize, Serialize};

use crate::{Author, Identifiers};

/// Kind of bibliographic work
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum EntryType {
    JournalArticle,
    Book,
    BookSection,
    ConferencePaper,
    Preprint,
    Report,
    Thesis,
    Webpage,
    Other,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::JournalArticle => "journal-article",
            EntryType::Book => "book",
            EntryType::BookSection => "book-section",
            EntryType::ConferencePaper => "conference-paper",
            EntryType::Preprint => "preprint",
            EntryType::Report => "report",
            EntryType::Thesis => "thesis",
            EntryType::Webpage => "webpage",
            EntryType::Other => "other",
        }
    }
}

/// One work from the canonical bibliography source
///
/// Entries are created by a loader, indexed once, and never mutated after
/// indexing. The id is stable across runs: derived from the strongest
/// identifier the entry carries (see [`BibliographyEntry::derive_id`]).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BibliographyEntry {
    pub id: String,
    pub title: String,
    pub authors: Vec<Author>,
    pub year: Option<i32>,
    pub entry_type: EntryType,
    pub identifiers: Identifiers,
    /// Journal, proceedings, or site name the work appeared in
    pub container: Option<String>,
    pub publisher: Option<String>,
}

impl BibliographyEntry {
    /// Create an entry with required fields; the id is derived from the
    /// identifiers present at construction time.
    pub fn new(title: impl Into<String>, entry_type: EntryType, identifiers: Identifiers) -> Self {
        let id = Self::derive_id(&identifiers);
        Self {
            id,
            title: title.into(),
            authors: Vec::new(),
            year: None,
            entry_type,
            identifiers,
            container: None,
            publisher: None,
        }
    }

    pub fn with_authors(mut self, authors: Vec<Author>) -> Self {
        self.authors = authors;
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_container(mut self, container: impl Into<String>) -> Self {
        self.container = Some(container.into());
        self
    }

    pub fn with_publisher(mut self, publisher: impl Into<String>) -> Self {
        self.publisher = Some(publisher.into());
        self
    }

    /// Derive the process-local stable id from the strongest identifier.
    ///
    /// DOI, arXiv, and ISBN ids are prefixed registry values; URL-only
    /// entries get an FNV-1a hash of the canonical URL so the id is
    /// deterministic across runs (a random UUID would not be).
    pub fn derive_id(identifiers: &Identifiers) -> String {
        match identifiers.primary() {
            Some(("url", url)) => format!("url:{:016x}", fnv1a_64(url.as_bytes())),
            Some((kind, value)) => format!("{}:{}", kind, value),
            None => "untitled:0".to_string(),
        }
    }
}

/// FNV-1a, 64-bit. Fixed offset basis and prime keep entry ids stable
/// across runs and platforms.
fn fnv1a_64(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x1000_0000_01b3;
    let mut hash = OFFSET;
    for &b in bytes {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}
