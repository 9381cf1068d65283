//! HTTP client for the provider's situation endpoint.
//!
//! The provider answers a fixed filter body with an obfuscated payload; the
//! client only moves bytes and leaves decoding to the `feed` crate.

use std::time::Duration;

use http::header::{ACCEPT, CONTENT_TYPE};

/// Filter body the provider expects: "other roads", every cause.
pub const REQUEST_BODY: &str = r#"{"filtrosVia":["Otras vialidades"],"filtrosCausa":[]}"#;

/// Error type for upstream fetches.
#[derive(Debug)]
pub struct UpstreamError {
    pub message: String,
    pub status: Option<u16>,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl std::fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} (HTTP {status})", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for UpstreamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as _)
    }
}

impl UpstreamError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            status: None,
            source: Some(Box::new(source)),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            message: "upstream rejected the request".to_string(),
            status: Some(status),
            source: None,
        }
    }
}

pub struct UpstreamClient {
    url: String,
    http: reqwest::Client,
}

impl UpstreamClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, UpstreamError> {
        let url = url.into();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(UpstreamError::new(format!(
                "upstream url must be http(s): {url}"
            )));
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UpstreamError::with_source("failed to build http client", e))?;
        Ok(Self { url, http })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST the filter body and return the raw response bytes.
    pub async fn fetch(&self) -> Result<Vec<u8>, UpstreamError> {
        let resp = self
            .http
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json, text/plain, */*")
            .body(REQUEST_BODY)
            .send()
            .await
            .map_err(|e| UpstreamError::with_source("upstream request failed", e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(UpstreamError::status(status.as_u16()));
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| UpstreamError::with_source("failed to read upstream body", e))?;
        Ok(body.to_vec())
    }
}
