//! Canonical-source write-back client
//!
//! Authenticated remote API accepting one new bibliographic record and an
//! optional collection tag, returning a server-assigned key. Only reached
//! in non-dry-run auto-add.

use serde::Deserialize;
use url::Url;

use imcite_domain::BibliographyEntry;

use crate::http::{HttpClient, HttpError};

/// Seam for the write-back API so persistence is testable without a
/// network.
pub trait WriteBack {
    fn persist(
        &self,
        entry: &BibliographyEntry,
        collection: Option<&str>,
    ) -> impl std::future::Future<Output = Result<String, HttpError>> + Send;
}

#[derive(Deserialize)]
struct WriteBackResponse {
    key: String,
}

/// The real client
pub struct HttpWriteBack {
    client: HttpClient,
    endpoint: Url,
    api_key: String,
}

impl HttpWriteBack {
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self, HttpError> {
        let endpoint = Url::parse(base_url)
            .and_then(|base| base.join("items"))
            .map_err(|_| HttpError::InvalidUrl {
                url: base_url.to_string(),
            })?;
        Ok(Self {
            client: HttpClient::new("imcite/1.0"),
            endpoint,
            api_key: api_key.into(),
        })
    }
}

impl WriteBack for HttpWriteBack {
    async fn persist(
        &self,
        entry: &BibliographyEntry,
        collection: Option<&str>,
    ) -> Result<String, HttpError> {
        let body = serde_json::json!({
            "entry": entry,
            "collection": collection,
        });
        let response = self
            .client
            .post_json(self.endpoint.as_str(), &body, Some(&self.api_key))
            .await?;

        if !(200..300).contains(&response.status) {
            return Err(HttpError::RequestFailed {
                message: format!("Write-back returned status {}", response.status),
            });
        }

        let parsed: WriteBackResponse =
            serde_json::from_str(&response.body).map_err(|e| HttpError::ParseError {
                message: format!("Invalid write-back response: {}", e),
            })?;
        Ok(parsed.key)
    }
}
