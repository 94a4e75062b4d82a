//! HTTP client capability
//!
//! Spec fetches and the webhook POST both go through [`HttpClient`] so the
//! pipeline can be driven by a fake client in tests. TLS relaxation is a
//! property of a single client instance, never of the process.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Errors from an outbound HTTP call
#[derive(Error, Debug)]
pub enum HttpError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },
}

/// Outbound HTTP operations the task needs
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// GET `url` and return the body as text
    async fn get_text(&self, url: &str) -> Result<String, HttpError>;

    /// POST `body` as JSON to `url` and return the response status
    async fn post_json(&self, url: &str, body: &Value) -> Result<u16, HttpError>;
}

/// Per-client options
#[derive(Debug, Clone, Default)]
pub struct HttpClientOptions {
    /// Skip TLS certificate verification for requests made by this client only
    pub accept_invalid_certs: bool,

    /// Whole-request timeout; `None` waits indefinitely
    pub timeout: Option<Duration>,
}

/// [`HttpClient`] backed by reqwest
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    pub fn new(options: &HttpClientOptions) -> Result<Self, HttpError> {
        let mut builder =
            reqwest::Client::builder().danger_accept_invalid_certs(options.accept_invalid_certs);
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get_text(&self, url: &str) -> Result<String, HttpError> {
        debug!(url = %url, "GET");
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(HttpError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(resp.text().await?)
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<u16, HttpError> {
        debug!(url = %url, "POST");
        let resp = self.client.post(url).json(body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(HttpError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(status.as_u16())
    }
}
