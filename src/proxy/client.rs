//! HTTP client abstraction layer.
//!
//! The forwarder never talks to the network directly; it goes through an injected
//! [`HttpClient`], so tests can substitute a stub.

use super::types::{FailureKind, InboundResponse, OutboundRequest};
use reqwest::header::CONTENT_TYPE;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Failure to obtain any response from the remote.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("Request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Request failed: {0}")]
    Request(String),
}

impl TransportError {
    pub fn kind(&self) -> FailureKind {
        match self {
            TransportError::Timeout => FailureKind::Timeout,
            TransportError::Connect(_) => FailureKind::ConnectionFailed,
            TransportError::Request(_) => FailureKind::RequestFailed,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_connect() {
            TransportError::Connect(e.to_string())
        } else {
            TransportError::Request(e.to_string())
        }
    }
}

pub type SendFuture<'a> =
    Pin<Box<dyn Future<Output = Result<InboundResponse, TransportError>> + Send + 'a>>;

/// Capability that performs exactly one outbound HTTP exchange.
pub trait HttpClient: Send + Sync {
    /// Sends the request and buffers the full response body.
    fn send(&self, request: OutboundRequest) -> SendFuture<'_>;
}

/// Default client backed by `reqwest`.
#[derive(Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Creates a client whose every call is bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Request(format!("Failed to build client: {}", e)))?;
        Ok(Self { client })
    }

    pub fn arc(timeout: Duration) -> Result<Arc<Self>, TransportError> {
        Self::new(timeout).map(Arc::new)
    }
}

impl HttpClient for ReqwestClient {
    fn send(&self, request: OutboundRequest) -> SendFuture<'_> {
        Box::pin(async move {
            let mut builder = self.client.request(request.method, &request.url);
            for header in &request.headers {
                builder = builder.header(header.key.as_str(), header.value.as_str());
            }
            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let response = builder.send().await?;
            let status = response.status().as_u16();
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let body = response.bytes().await?.to_vec();

            Ok(InboundResponse {
                status,
                content_type,
                body,
            })
        })
    }
}
