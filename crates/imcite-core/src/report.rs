//! Missing-citation reporting and the matched-citation table
//!
//! Unresolved citations are classified before they reach the missing
//! bucket: a hyperlink to a code repository or a social-media post is not
//! a scholarly citation and must never be surfaced as one. The rule set
//! behind that boundary is versioned configuration, not compiled-in
//! constants, since new non-academic domains appear constantly.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use imcite_domain::{Citation, MatchResult, MatchStrategy};

use crate::identifiers::{canonical_url, extract_arxiv_id, extract_doi, extract_isbn_key};

lazy_static! {
    // "Smith (2020)"-style year hint in the citation text
    static ref YEAR_HINT: Regex = Regex::new(r"\((?:1[6-9]|20)\d{2}\)").unwrap();
}

/// Versioned classifier rule set
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierRules {
    pub version: String,
    /// Domains (matched by suffix) that never host scholarly works
    pub non_academic_domains: Vec<String>,
    /// Require an author-year pattern in the citation text for links
    /// without a structured identifier
    pub require_year_hint: bool,
}

impl Default for ClassifierRules {
    fn default() -> Self {
        Self {
            version: "2026-08".to_string(),
            non_academic_domains: [
                "github.com",
                "gitlab.com",
                "bitbucket.org",
                "codeberg.org",
                "sourceforge.net",
                "twitter.com",
                "x.com",
                "mastodon.social",
                "bsky.app",
                "facebook.com",
                "instagram.com",
                "linkedin.com",
                "youtube.com",
                "reddit.com",
                "news.ycombinator.com",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            require_year_hint: false,
        }
    }
}

impl ClassifierRules {
    /// Load from a TOML document; missing keys fall back to the defaults
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    fn domain_is_non_academic(&self, url: &str) -> bool {
        let canonical = canonical_url(url);
        let host = canonical.split('/').next().unwrap_or_default();
        self.non_academic_domains
            .iter()
            .any(|domain| host == domain || host.ends_with(&format!(".{}", domain)))
    }
}

/// Is this citation plausibly a reference to a scholarly work?
///
/// Runs before a citation is ever placed in the missing bucket, and before
/// it may consume an auto-add attempt.
pub fn is_scholarly(citation: &Citation, rules: &ClassifierRules) -> bool {
    if rules.domain_is_non_academic(&citation.url) {
        return false;
    }
    // A structured identifier in the URL settles it.
    if extract_doi(&citation.url).is_some()
        || extract_arxiv_id(&citation.url).is_some()
        || extract_isbn_key(&citation.url).is_some()
    {
        return true;
    }
    if rules.require_year_hint && !YEAR_HINT.is_match(&citation.raw_text) {
        return false;
    }
    true
}

/// One line of either report bucket
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportedCitation {
    pub raw_text: String,
    pub url: String,
    pub line: u32,
}

impl From<&Citation> for ReportedCitation {
    fn from(citation: &Citation) -> Self {
        Self {
            raw_text: citation.raw_text.clone(),
            url: citation.url.clone(),
            line: citation.line,
        }
    }
}

/// The two buckets of unresolved citations, sorted and deduplicated
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MissingReport {
    /// Genuine citations to works the canonical source should gain
    pub missing: Vec<ReportedCitation>,
    /// Links classified as not scholarly citations at all
    pub non_academic: Vec<ReportedCitation>,
    pub classifier_version: String,
}

impl MissingReport {
    /// Human-readable rendering
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "Missing citations ({}):\n",
            self.missing.len()
        ));
        for item in &self.missing {
            out.push_str(&format!(
                "  line {:>4}  {}  {}\n",
                item.line, item.raw_text, item.url
            ));
        }
        out.push_str(&format!(
            "Non-academic links ({}):\n",
            self.non_academic.len()
        ));
        for item in &self.non_academic {
            out.push_str(&format!("  line {:>4}  {}\n", item.line, item.url));
        }
        out
    }

    /// Machine-readable rendering
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Partition unresolved results into the two buckets
pub fn build_missing_report(results: &[MatchResult], rules: &ClassifierRules) -> MissingReport {
    let mut missing = Vec::new();
    let mut non_academic = Vec::new();

    for result in results {
        if result.strategy != MatchStrategy::Unresolved {
            continue;
        }
        if is_scholarly(&result.citation, rules) {
            missing.push(ReportedCitation::from(&result.citation));
        } else {
            non_academic.push(ReportedCitation::from(&result.citation));
        }
    }

    sort_and_dedup(&mut missing);
    sort_and_dedup(&mut non_academic);

    MissingReport {
        missing,
        non_academic,
        classifier_version: rules.version.clone(),
    }
}

fn sort_and_dedup(bucket: &mut Vec<ReportedCitation>) {
    bucket.sort_by(|a, b| a.line.cmp(&b.line).then_with(|| a.url.cmp(&b.url)));
    let mut seen = std::collections::BTreeSet::new();
    bucket.retain(|c| seen.insert(canonical_url(&c.url)));
}

/// One row of the matched-citation table consumed by the downstream
/// renderer
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchRow {
    pub raw_text: String,
    pub line: u32,
    pub entry_id: Option<String>,
    pub strategy: MatchStrategy,
}

/// Build the citation → entry id → strategy table, sorted by position
pub fn build_match_table(results: &[MatchResult]) -> Vec<MatchRow> {
    let mut rows: Vec<MatchRow> = results
        .iter()
        .map(|r| MatchRow {
            raw_text: r.citation.raw_text.clone(),
            line: r.citation.line,
            entry_id: r.entry.as_ref().map(|e| e.id.clone()),
            strategy: r.strategy,
        })
        .collect();
    rows.sort_by(|a, b| a.line.cmp(&b.line).then_with(|| a.raw_text.cmp(&b.raw_text)));
    rows
}
