//! Knowledge lookup for free text no keyword matched
//!
//! Backed by the DuckDuckGo Instant Answer API; the runtime only sees the
//! [`KnowledgeLookup`] trait.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_LOOKUP_URL: &str = "https://api.duckduckgo.com/";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("lookup request failed: {0}")]
    Request(String),
    #[error("lookup returned HTTP {0}")]
    Status(u16),
    #[error("lookup response was not understood: {0}")]
    Decode(String),
    #[error("no answer found")]
    NoAnswer,
}

/// Answers a free-text question with a short summary
#[async_trait]
pub trait KnowledgeLookup: Send + Sync {
    async fn lookup(&self, query: &str) -> Result<String, LookupError>;

    /// Name used in logs
    fn name(&self) -> &str;
}

#[derive(Debug, Deserialize)]
struct InstantAnswer {
    #[serde(rename = "AbstractText", default)]
    abstract_text: String,
    #[serde(rename = "Heading", default)]
    heading: String,
}

impl InstantAnswer {
    fn summary(self) -> Result<String, LookupError> {
        [self.abstract_text, self.heading]
            .into_iter()
            .map(|s| s.trim().to_string())
            .find(|s| !s.is_empty())
            .ok_or(LookupError::NoAnswer)
    }
}

pub struct DuckDuckGoLookup {
    client: reqwest::Client,
    base_url: String,
}

impl DuckDuckGoLookup {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn parse(body: &str) -> Result<String, LookupError> {
        let answer: InstantAnswer =
            serde_json::from_str(body).map_err(|e| LookupError::Decode(e.to_string()))?;
        answer.summary()
    }
}

#[async_trait]
impl KnowledgeLookup for DuckDuckGoLookup {
    async fn lookup(&self, query: &str) -> Result<String, LookupError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await
            .map_err(|e| LookupError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        // DuckDuckGo answers with application/x-javascript, so parse the text
        let body = response
            .text()
            .await
            .map_err(|e| LookupError::Request(e.to_string()))?;
        Self::parse(&body)
    }

    fn name(&self) -> &str {
        "duckduckgo"
    }
}

/// Logging wrapper for lookups
pub struct LoggingLookup {
    inner: Arc<dyn KnowledgeLookup>,
}

impl LoggingLookup {
    pub fn new(inner: Arc<dyn KnowledgeLookup>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl KnowledgeLookup for LoggingLookup {
    async fn lookup(&self, query: &str) -> Result<String, LookupError> {
        let start = std::time::Instant::now();
        let result = self.inner.lookup(query).await;
        let duration = start.elapsed();

        match &result {
            Ok(summary) => {
                tracing::info!(
                    source = %self.inner.name(),
                    duration_ms = %duration.as_millis(),
                    summary_len = summary.len(),
                    "Lookup completed"
                );
            }
            Err(LookupError::NoAnswer) => {
                tracing::info!(
                    source = %self.inner.name(),
                    duration_ms = %duration.as_millis(),
                    "Lookup found no answer"
                );
            }
            Err(e) => {
                tracing::warn!(
                    source = %self.inner.name(),
                    duration_ms = %duration.as_millis(),
                    error = %e,
                    "Lookup failed"
                );
            }
        }

        result
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
