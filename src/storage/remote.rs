//! Spreadsheet-backed remote mirror over plain HTTP.
//!
//! The endpoint is a single URL (typically a published sheet script):
//!
//! ```text
//! GET  {url}  → {"itinerary"?: [...], "checklist"?: [...], "wishlist"?: [...]}
//! POST {url}  ← same shape, partial or full; merged by key server-side
//! ```
//!
//! Bodies are posted as `text/plain` so the script endpoint treats them as a
//! simple request.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header, Client as HttpClient};

use super::RemoteStore;
use crate::model::RemoteDocument;

const POST_CONTENT_TYPE: &str = "text/plain;charset=utf-8";

pub struct HttpRemote {
    http_client: HttpClient,
    endpoint: String,
}

impl HttpRemote {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let http_client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http_client,
            endpoint: endpoint.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RemoteStore for HttpRemote {
    fn backend_name(&self) -> &str {
        "sheets"
    }

    async fn fetch_all(&self) -> Result<RemoteDocument> {
        tracing::debug!("Fetching remote document from {}", self.endpoint);
        let response = self
            .http_client
            .get(&self.endpoint)
            .send()
            .await
            .context("Remote fetch request failed")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Remote fetch returned HTTP {status}");
        }

        let body = response.text().await.context("Failed to read remote response")?;
        // `null` is a valid JSON body but not a document
        let document: Option<RemoteDocument> =
            serde_json::from_str(&body).context("Remote document is malformed")?;
        document.context("Remote returned an empty (null) document")
    }

    async fn push(&self, document: &RemoteDocument) -> Result<()> {
        let body = serde_json::to_string(document).context("Failed to serialize remote document")?;
        let response = self
            .http_client
            .post(&self.endpoint)
            .header(header::CONTENT_TYPE, POST_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .context("Remote write request failed")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Remote write returned HTTP {status}");
        }
        Ok(())
    }
}
