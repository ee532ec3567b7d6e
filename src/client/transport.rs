//! HTTP transport used to talk to the controller
//!
//! The client only needs plain `GET` requests returning a status code and a
//! text body. [`HttpTransport`] is the seam between the client logic and
//! the network; [`ReqwestTransport`] is the production implementation.

use crate::config::ClientConfig;
use crate::error::{MeinEtaError, Result};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Status line and body of a completed request
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new<S: Into<String>>(status: u16, body: S) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Network-level failure: no usable response was received
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::Connect(err.to_string())
        } else {
            Self::Request(err.to_string())
        }
    }
}

/// Performs a single HTTP GET
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &Url) -> std::result::Result<HttpResponse, TransportError>;
}

/// [`HttpTransport`] backed by a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a transport whose requests are bounded by `config.timeout`
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(config.timeout)
            .user_agent(format!("meineta-rust/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MeinEtaError::connection(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &Url) -> std::result::Result<HttpResponse, TransportError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status().as_u16();
        debug!(%url, status, "HTTP response received");

        let body = if status == 200 {
            response.text().await?
        } else {
            response.text().await.unwrap_or_default()
        };

        Ok(HttpResponse { status, body })
    }
}
