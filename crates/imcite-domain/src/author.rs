//! Author representation

use serde::{Deserialize, Serialize};

/// A creator of a bibliographic entry
///
/// Personal authors carry a structured given/family split so renderers can
/// abbreviate or reorder them; organizational authors are a single name that
/// must never be split into name tokens.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Author {
    Person {
        given: Option<String>,
        family: String,
    },
    Organization {
        name: String,
    },
}

impl Author {
    /// Create a personal author with just a family name
    pub fn person(family: impl Into<String>) -> Self {
        Author::Person {
            given: None,
            family: family.into(),
        }
    }

    /// Builder method to add a given name
    pub fn with_given(self, given: impl Into<String>) -> Self {
        match self {
            Author::Person { family, .. } => Author::Person {
                given: Some(given.into()),
                family,
            },
            org => org,
        }
    }

    /// Create an organizational author
    pub fn organization(name: impl Into<String>) -> Self {
        Author::Organization { name: name.into() }
    }

    pub fn is_organization(&self) -> bool {
        matches!(self, Author::Organization { .. })
    }

    /// Format as "Given Family" (or the organization name) for display
    pub fn display_name(&self) -> String {
        match self {
            Author::Person {
                given: Some(given),
                family,
            } => format!("{} {}", given, family),
            Author::Person {
                given: None,
                family,
            } => family.clone(),
            Author::Organization { name } => name.clone(),
        }
    }

    /// Family name (or full organization name) used for sorting
    pub fn sort_key(&self) -> &str {
        match self {
            Author::Person { family, .. } => family,
            Author::Organization { name } => name,
        }
    }
}

/// Parse a single author string into an Author
///
/// Handles "Family, Given" and "Given Family" forms. A multi-word string
/// without a comma where no token looks like an initial is ambiguous between
/// a personal name and an institution; this parser still yields a Person
/// (last word as family) and leaves institution detection to the quality
/// validator, which flags suspect cases rather than guessing.
pub fn parse_author(input: &str) -> Author {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Author::person("Unknown");
    }

    if let Some(comma_pos) = trimmed.find(',') {
        let family = trimmed[..comma_pos].trim();
        let given = trimmed[comma_pos + 1..].trim();
        let author = Author::person(family);
        if given.is_empty() {
            return author;
        }
        return author.with_given(given);
    }

    let parts: Vec<&str> = trimmed.split_whitespace().collect();
    if parts.len() == 1 {
        return Author::person(parts[0]);
    }

    let family = (*parts.last().unwrap_or(&"Unknown")).to_string();
    let given = parts[..parts.len() - 1].join(" ");
    Author::person(family).with_given(given)
}

/// Split an author list string on " and " separators and parse each one
pub fn parse_author_list(input: &str) -> Vec<Author> {
    input
        .split(" and ")
        .filter(|part| !part.trim().is_empty())
        .map(parse_author)
        .collect()
}

/// Heuristic: does a single unstructured creator string look like an
/// institution rather than a personal name?
///
/// Three or more words with no comma and no initials is the signature of
/// "World Health Organization" stored as a person.
pub fn looks_like_organization(name: &str) -> bool {
    if name.contains(',') {
        return false;
    }
    let words: Vec<&str> = name.split_whitespace().collect();
    if words.len() < 3 {
        return false;
    }
    // Lowercase connectives ("of", "and") are normal in institution
    // names; only uppercase abbreviations count as personal initials
    !words.iter().any(|w| {
        let bare = w.trim_end_matches('.');
        !bare.is_empty() && bare.len() <= 2 && bare.chars().all(|c| c.is_ascii_uppercase())
    })
}
