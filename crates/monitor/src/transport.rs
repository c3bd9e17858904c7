//! HTTP transport for the jobs endpoint.
//!
//! [`JobsTransport`] is the seam the monitor talks through;
//! [`HttpTransport`] is the production implementation on top of
//! [`reqwest`]. A transport only moves bytes: it returns the raw body of
//! a 2xx response and leaves interpretation to the monitor.

use std::time::Duration;

use async_trait::async_trait;
use jobwatch_core::types::JobId;

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from the transport layer. Any of these halts automatic polling.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The jobs endpoint returned a non-2xx status code.
    #[error("Jobs endpoint error ({status}): {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

impl TransportError {
    /// Status code of the failed response, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Request(e) => e.status().map(|s| s.as_u16()),
            TransportError::HttpStatus { status, .. } => Some(*status),
        }
    }
}

/// Fetches job statuses for a list of ids.
#[async_trait]
pub trait JobsTransport: Send + Sync {
    /// Send `GET url?id=<id1>&id=<id2>...` and return the body of a 2xx
    /// response.
    async fn fetch_statuses(&self, url: &str, ids: &[JobId]) -> Result<String, TransportError>;
}

/// [`reqwest`]-backed transport.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport with its own client and the given request timeout.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Reuse an existing [`reqwest::Client`] (shares its connection pool).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`TransportError::HttpStatus`]
    /// containing the status and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, TransportError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(TransportError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl JobsTransport for HttpTransport {
    async fn fetch_statuses(&self, url: &str, ids: &[JobId]) -> Result<String, TransportError> {
        let query: Vec<(&str, &str)> = ids.iter().map(|id| ("id", id.as_str())).collect();

        let response = self.client.get(url).query(&query).send().await?;
        let response = Self::ensure_success(response).await?;

        Ok(response.text().await?)
    }
}
