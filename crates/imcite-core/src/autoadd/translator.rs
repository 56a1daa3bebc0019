//! Metadata-translation collaborator client
//!
//! A local service that resolves "metadata for this URL" requests. The
//! wire contract: 200 with a metadata object on success; 300 with a
//! `multiple` array when several candidate resolvers apply, requiring one
//! follow-up call with the chosen token; anything else is a failure.
//! Idempotent per URL.

use serde::Deserialize;
use url::Url;

use crate::http::{HttpClient, HttpError};

/// A creator as the translation service reports it
#[derive(Clone, Debug, Deserialize)]
pub struct TranslatedCreator {
    pub given: Option<String>,
    pub family: Option<String>,
    /// Unstructured single-string name, used when the service could not
    /// split the creator
    pub name: Option<String>,
}

/// Structured metadata for one URL
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TranslatedMetadata {
    pub title: Option<String>,
    #[serde(default)]
    pub creators: Vec<TranslatedCreator>,
    pub date: Option<String>,
    pub item_type: Option<String>,
    pub doi: Option<String>,
    pub isbn: Option<String>,
    pub url: Option<String>,
}

/// One candidate resolver in an ambiguous response
#[derive(Clone, Debug, Deserialize)]
pub struct CandidateResolver {
    pub token: String,
    pub label: String,
}

/// Outcome of the first translation call
#[derive(Clone, Debug)]
pub enum Translation {
    Resolved(TranslatedMetadata),
    /// Multiple candidate resolvers; a follow-up disambiguation call is
    /// required
    Ambiguous(Vec<CandidateResolver>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireResponse {
    Ambiguous { multiple: Vec<CandidateResolver> },
    Item(TranslatedMetadata),
}

/// Seam for the translation collaborator so the auto-add state machine is
/// testable without a network.
pub trait Translator {
    fn translate(
        &self,
        url: &str,
    ) -> impl std::future::Future<Output = Result<Translation, HttpError>> + Send;

    fn translate_with(
        &self,
        url: &str,
        token: &str,
    ) -> impl std::future::Future<Output = Result<TranslatedMetadata, HttpError>> + Send;
}

/// The real client
pub struct HttpTranslator {
    client: HttpClient,
    endpoint: Url,
}

impl HttpTranslator {
    pub fn new(base_url: &str) -> Result<Self, HttpError> {
        let endpoint = Url::parse(base_url)
            .and_then(|base| base.join("web"))
            .map_err(|_| HttpError::InvalidUrl {
                url: base_url.to_string(),
            })?;
        Ok(Self {
            client: HttpClient::new("imcite/1.0"),
            endpoint,
        })
    }

    fn parse_body(body: &str) -> Result<WireResponse, HttpError> {
        serde_json::from_str(body).map_err(|e| HttpError::ParseError {
            message: format!("Invalid translation response: {}", e),
        })
    }
}

impl Translator for HttpTranslator {
    async fn translate(&self, url: &str) -> Result<Translation, HttpError> {
        let body = serde_json::json!({ "url": url });
        let response = self
            .client
            .post_json(self.endpoint.as_str(), &body, None)
            .await?;

        match response.status {
            200 => match Self::parse_body(&response.body)? {
                WireResponse::Item(metadata) => Ok(Translation::Resolved(metadata)),
                WireResponse::Ambiguous { multiple } => Ok(Translation::Ambiguous(multiple)),
            },
            300 => match Self::parse_body(&response.body)? {
                WireResponse::Ambiguous { multiple } => Ok(Translation::Ambiguous(multiple)),
                WireResponse::Item(_) => Err(HttpError::ParseError {
                    message: "300 response without candidate list".to_string(),
                }),
            },
            status => Err(HttpError::RequestFailed {
                message: format!("Translation service returned status {}", status),
            }),
        }
    }

    async fn translate_with(&self, url: &str, token: &str) -> Result<TranslatedMetadata, HttpError> {
        let body = serde_json::json!({ "url": url, "token": token });
        let response = self
            .client
            .post_json(self.endpoint.as_str(), &body, None)
            .await?;

        if response.status != 200 {
            return Err(HttpError::RequestFailed {
                message: format!(
                    "Disambiguation call returned status {}",
                    response.status
                ),
            });
        }
        match Self::parse_body(&response.body)? {
            WireResponse::Item(metadata) => Ok(metadata),
            WireResponse::Ambiguous { .. } => Err(HttpError::ParseError {
                message: "Still ambiguous after disambiguation".to_string(),
            }),
        }
    }
}
