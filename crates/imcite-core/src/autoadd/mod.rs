//! Auto-add resolver: the strictly-gated online fallback
//!
//! For a citation unresolved by the matcher, attempt to obtain metadata
//! from the translation collaborator, validate it, and register it as a
//! new entry. Per citation this is a state machine:
//!
//! `Unresolved -> Translating -> {TranslationFailed | Validating} ->
//! {Valid -> Registered -> [Persisting -> Persisted | PersistFailed] |
//! Invalid -> Rejected}`
//!
//! Guarantees: a hard attempt cap per run; a dry-run mode that stops
//! before persistence; one immutable audit record per attempt; emergency
//! mode in which no network call ever happens; per-URL de-duplication so
//! re-running never double-registers.

mod audit;
mod publishers;
mod retry;
mod translator;
mod writeback;

pub use audit::{AttemptStatus, AuditLog, AuditRecord};
pub use publishers::publisher_for_url;
pub use retry::RetryPolicy;
pub use translator::{
    CandidateResolver, HttpTranslator, Translation, TranslatedCreator, TranslatedMetadata,
    Translator,
};
pub use writeback::{HttpWriteBack, WriteBack};

use std::collections::BTreeMap;

use imcite_domain::{
    parse_author, Author, BibliographyEntry, Citation, EntryType, Identifiers, Issue, MatchResult,
    MatchStrategy,
};

use crate::error::AutoAddError;
use crate::http::HttpError;
use crate::identifiers::{canonical_url, extract_arxiv_id, normalize_doi, normalize_isbn_key};
use crate::quality;

/// Configuration for the auto-add component
#[derive(Clone, Debug)]
pub struct AutoAddConfig {
    /// Auto-add runs only when explicitly enabled
    pub enabled: bool,
    /// Execute the full state machine but stop before persistence
    pub dry_run: bool,
    /// Hard cap on attempts per run; exceeding it halts further auto-add
    pub attempt_cap: u32,
    /// Forbids all network activity regardless of `enabled`
    pub emergency: bool,
    /// Optional collection tag passed to the write-back API
    pub collection: Option<String>,
    pub retry: RetryPolicy,
}

impl Default for AutoAddConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dry_run: false,
            attempt_cap: 25,
            emergency: false,
            collection: None,
            retry: RetryPolicy::default(),
        }
    }
}

/// Per-run auto-add state: attempt budget, audit log, and the entries
/// registered so far (keyed by canonical URL for de-duplication).
pub struct AutoAddResolver<T, W> {
    config: AutoAddConfig,
    translator: T,
    writeback: Option<W>,
    audit: AuditLog,
    attempts: u32,
    halted: bool,
    registered: BTreeMap<String, BibliographyEntry>,
}

impl<T: Translator, W: WriteBack> AutoAddResolver<T, W> {
    pub fn new(config: AutoAddConfig, translator: T, writeback: Option<W>) -> Self {
        Self {
            config,
            translator,
            writeback,
            audit: AuditLog::default(),
            attempts: 0,
            halted: false,
            registered: BTreeMap::new(),
        }
    }

    /// Whether this resolver will still attempt anything
    pub fn is_active(&self) -> bool {
        self.config.enabled && !self.config.emergency && !self.halted
    }

    pub fn audit_log(&self) -> &AuditLog {
        &self.audit
    }

    /// Entries registered during this run, in canonical-URL order
    pub fn registered_entries(&self) -> Vec<&BibliographyEntry> {
        self.registered.values().collect()
    }

    /// Run the state machine for one unresolved citation.
    pub async fn resolve(&mut self, citation: &Citation) -> MatchResult {
        if self.config.emergency || !self.config.enabled {
            return MatchResult::unresolved(citation.clone());
        }

        let url_key = canonical_url(&citation.url);
        if let Some(entry) = self.registered.get(&url_key) {
            // Already registered this run; never double-register.
            return MatchResult::resolved(
                citation.clone(),
                entry.clone(),
                MatchStrategy::AutoAdded,
            );
        }

        if self.attempts >= self.config.attempt_cap {
            if !self.halted {
                tracing::warn!(cap = self.config.attempt_cap, "Auto-add attempt cap exhausted");
                self.halted = true;
            }
            return MatchResult::unresolved(citation.clone()).with_warnings(vec![Issue::warning(
                "auto-add",
                format!(
                    "{}; citation left unresolved",
                    AutoAddError::ThresholdExceeded
                ),
            )]);
        }
        self.attempts += 1;

        // TRANSLATING
        let metadata = match self.translate_with_retry(&citation.url).await {
            Ok(metadata) => metadata,
            Err(e) => {
                let err = AutoAddError::Translation {
                    message: e.to_string(),
                };
                self.audit.append(
                    AuditRecord::new(&citation.url, AttemptStatus::TranslationFailed)
                        .with_warnings(vec![err.to_string()]),
                );
                return MatchResult::unresolved(citation.clone());
            }
        };

        // VALIDATING
        let (entry, fallback_issues) = entry_from_translation(&citation.url, metadata);
        let (acceptable, mut issues) = quality::assess_entry(&entry);
        issues.extend(fallback_issues);

        if !acceptable {
            self.audit.append(
                AuditRecord::new(&citation.url, AttemptStatus::Rejected)
                    .with_warnings(issues.iter().map(|i| i.message.clone()).collect()),
            );
            return MatchResult::unresolved(citation.clone()).with_warnings(issues);
        }

        // REGISTERED
        self.registered.insert(url_key, entry.clone());
        let warnings: Vec<String> = issues.iter().map(|i| i.message.clone()).collect();

        if self.config.dry_run || self.writeback.is_none() {
            self.audit.append(
                AuditRecord::new(&citation.url, AttemptStatus::Registered)
                    .with_warnings(warnings)
                    .with_entry_id(&entry.id),
            );
            return MatchResult::resolved(citation.clone(), entry, MatchStrategy::AutoAdded)
                .with_warnings(issues);
        }

        // PERSISTING
        let status = match self.persist_with_retry(&entry).await {
            Ok(server_key) => {
                tracing::info!(id = %entry.id, %server_key, "Persisted auto-added entry");
                AttemptStatus::Persisted
            }
            Err(e) => {
                tracing::warn!(id = %entry.id, error = %e, "Write-back failed");
                AttemptStatus::PersistFailed
            }
        };
        self.audit.append(
            AuditRecord::new(&citation.url, status)
                .with_warnings(warnings)
                .with_entry_id(&entry.id),
        );

        MatchResult::resolved(citation.clone(), entry, MatchStrategy::AutoAdded)
            .with_warnings(issues)
    }

    /// First translation call plus at most one disambiguation follow-up,
    /// all wrapped in the retry policy.
    async fn translate_once(&self, url: &str) -> Result<TranslatedMetadata, HttpError> {
        match self.translator.translate(url).await? {
            Translation::Resolved(metadata) => Ok(metadata),
            Translation::Ambiguous(candidates) => {
                let first = candidates.first().ok_or_else(|| HttpError::ParseError {
                    message: "Ambiguous response with no candidates".to_string(),
                })?;
                self.translator.translate_with(url, &first.token).await
            }
        }
    }

    async fn translate_with_retry(&self, url: &str) -> Result<TranslatedMetadata, HttpError> {
        let policy = self.config.retry.clone();
        let mut attempt = 0;
        loop {
            match self.translate_once(url).await {
                Ok(metadata) => return Ok(metadata),
                Err(e) => {
                    attempt += 1;
                    if attempt >= policy.max_attempts {
                        return Err(e);
                    }
                    tokio::time::sleep(policy.delay_for(attempt - 1)).await;
                }
            }
        }
    }

    async fn persist_with_retry(&self, entry: &BibliographyEntry) -> Result<String, HttpError> {
        let Some(ref writeback) = self.writeback else {
            return Err(HttpError::RequestFailed {
                message: "No write-back client configured".to_string(),
            });
        };
        let policy = self.config.retry.clone();
        let collection = self.config.collection.as_deref();
        let mut attempt = 0;
        loop {
            match writeback.persist(entry, collection).await {
                Ok(key) => return Ok(key),
                Err(e) => {
                    attempt += 1;
                    if attempt >= policy.max_attempts {
                        return Err(e);
                    }
                    tokio::time::sleep(policy.delay_for(attempt - 1)).await;
                }
            }
        }
    }
}

/// Build a candidate entry from translated metadata.
///
/// Applies the author-fallback policy: no authors in the metadata means a
/// publisher derived from the URL's domain becomes an organizational
/// author; if that also fails the entry stays registrable with a WARNING.
/// A personal name is never fabricated.
fn entry_from_translation(
    citation_url: &str,
    metadata: TranslatedMetadata,
) -> (BibliographyEntry, Vec<Issue>) {
    let mut issues = Vec::new();

    let url = metadata.url.as_deref().unwrap_or(citation_url);
    let identifiers = Identifiers {
        doi: metadata.doi.as_deref().map(normalize_doi),
        arxiv_id: extract_arxiv_id(url),
        isbn: metadata.isbn.as_deref().map(|i| normalize_isbn_key(i)),
        url: Some(canonical_url(url)),
    };

    let entry_type = metadata
        .item_type
        .as_deref()
        .map(entry_type_from_wire)
        .unwrap_or(EntryType::Webpage);

    let mut authors: Vec<Author> = metadata
        .creators
        .iter()
        .filter_map(|creator| match (&creator.family, &creator.name) {
            (Some(family), _) => Some(match &creator.given {
                Some(given) => Author::person(family).with_given(given),
                None => Author::person(family),
            }),
            (None, Some(name)) if imcite_domain::looks_like_organization(name) => {
                Some(Author::organization(name))
            }
            (None, Some(name)) => Some(parse_author(name)),
            // A creator object with no usable name field at all
            (None, None) => None,
        })
        .collect();

    if authors.is_empty() {
        match publisher_for_url(url) {
            Some(publisher) => {
                authors.push(Author::organization(publisher));
                issues.push(Issue::warning(
                    "authors",
                    format!("No author in translated metadata; using publisher '{}'", publisher),
                ));
            }
            None => {
                issues.push(Issue::warning(
                    "authors",
                    "No author in translated metadata and no publisher known for domain",
                ));
            }
        }
    }

    let mut entry = BibliographyEntry::new(
        metadata.title.unwrap_or_default(),
        entry_type,
        identifiers,
    )
    .with_authors(authors);

    if let Some(year) = metadata.date.as_deref().and_then(crate::loader::year_from_text) {
        entry = entry.with_year(year);
    }
    if let Some(publisher) = publisher_for_url(url) {
        entry = entry.with_publisher(publisher);
    }

    (entry, issues)
}

fn entry_type_from_wire(item_type: &str) -> EntryType {
    match item_type {
        "journalArticle" | "magazineArticle" | "newspaperArticle" => EntryType::JournalArticle,
        "book" => EntryType::Book,
        "bookSection" => EntryType::BookSection,
        "conferencePaper" => EntryType::ConferencePaper,
        "preprint" => EntryType::Preprint,
        "report" => EntryType::Report,
        "thesis" => EntryType::Thesis,
        "webpage" | "blogPost" | "forumPost" => EntryType::Webpage,
        _ => EntryType::Other,
    }
}
