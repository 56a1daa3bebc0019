//! Bibliographic identifiers

use serde::{Deserialize, Serialize};

/// Registry-assigned identifiers carried by a bibliography entry
///
/// `arxiv_id` is stored version-stripped; `url` is the canonical form
/// (no scheme, no query, no fragment).
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identifiers {
    pub doi: Option<String>,
    pub arxiv_id: Option<String>,
    pub isbn: Option<String>,
    pub url: Option<String>,
}

impl Identifiers {
    /// Check if no identifier is present
    pub fn is_empty(&self) -> bool {
        self.doi.is_none() && self.arxiv_id.is_none() && self.isbn.is_none() && self.url.is_none()
    }

    /// Returns the strongest identifier (priority order: doi, arxiv, isbn, url)
    pub fn primary(&self) -> Option<(&'static str, &str)> {
        if let Some(ref doi) = self.doi {
            return Some(("doi", doi));
        }
        if let Some(ref arxiv) = self.arxiv_id {
            return Some(("arxiv", arxiv));
        }
        if let Some(ref isbn) = self.isbn {
            return Some(("isbn", isbn));
        }
        if let Some(ref url) = self.url {
            return Some(("url", url));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_empty() {
        assert!(Identifiers::default().is_empty());

        let with_doi = Identifiers {
            doi: Some("10.1038/nature12373".to_string()),
            ..Default::default()
        };
        assert!(!with_doi.is_empty());
    }

    #[test]
    fn test_primary_priority() {
        let both = Identifiers {
            doi: Some("10.1/x".to_string()),
            arxiv_id: Some("2401.00001".to_string()),
            ..Default::default()
        };
        assert_eq!(both.primary(), Some(("doi", "10.1/x")));

        let url_only = Identifiers {
            url: Some("example.org/page".to_string()),
            ..Default::default()
        };
        assert_eq!(url_only.primary(), Some(("url", "example.org/page")));
    }
}
