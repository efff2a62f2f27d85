use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const GOOGLE_BOOKS_API_BASE: &str = "https://www.googleapis.com/books/v1";

const HTTP_TIMEOUT_SECS: u64 = 10;

#[derive(Error, Debug)]
pub enum GoogleBooksError {
    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    ParseError(#[from] serde_json::Error),
}

impl GoogleBooksError {
    /// True when the request never reached the API at all, so the caller
    /// can report missing connectivity separately from a failed lookup.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, GoogleBooksError::NetworkError(e) if e.is_connect() || e.is_timeout())
    }
}

pub type Result<T> = std::result::Result<T, GoogleBooksError>;

pub struct GoogleBooksClient {
    client: reqwest::Client,
    base_url: String,
}

impl GoogleBooksClient {
    pub fn new() -> Self {
        Self::with_base_url(GOOGLE_BOOKS_API_BASE.to_string())
    }

    /// For test servers and API mirrors
    pub fn with_base_url(base_url: String) -> Self {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("Alexandria/0.1.0"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .expect("Failed to build HTTP client");

        Self { client, base_url }
    }

    /// Look up a volume by ISBN-13
    ///
    /// Issues a single `GET /volumes?q=isbn:<ean>` and returns the best
    /// (first) match. An empty result set is `Ok(None)`, not an error -
    /// "no such book" is an answer, not a failure.
    pub async fn lookup_isbn(&self, isbn: &str) -> Result<Option<Volume>> {
        let url = format!("{}/volumes", self.base_url);
        let isbn_query = format!("isbn:{}", isbn);

        let response = self
            .client
            .get(&url)
            .query(&[("q", isbn_query.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GoogleBooksError::RequestFailed(format!(
                "Status {}: {}",
                status, body
            )));
        }

        let body = response.text().await?;
        let volumes: VolumesResponse = serde_json::from_str(&body)?;

        debug!(isbn, total_items = volumes.total_items, "volume lookup");
        Ok(volumes.into_best_match())
    }
}

impl Default for GoogleBooksClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Top-level volumes search response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumesResponse {
    #[serde(default)]
    pub total_items: u32,
    /// Absent entirely when the query matched nothing
    #[serde(default)]
    pub items: Option<Vec<Volume>>,
}

impl VolumesResponse {
    /// The API orders by relevance; the first item is the best match.
    pub fn into_best_match(self) -> Option<Volume> {
        self.items.and_then(|items| items.into_iter().next())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    pub id: Option<String>,
    #[serde(default)]
    pub volume_info: VolumeInfo,
}

/// The consumed subset of a volume's metadata. Everything except the title
/// is routinely missing from the API, hence the defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeInfo {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    pub image_links: Option<ImageLinks>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageLinks {
    pub small_thumbnail: Option<String>,
    pub thumbnail: Option<String>,
}
