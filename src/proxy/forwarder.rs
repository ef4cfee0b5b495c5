//! Forwards a validated request to its target and normalizes the outcome.
//!
//! Exactly one outbound attempt is made. Any HTTP response from the remote, error
//! statuses included, is relayed as a [`ResponseEnvelope::Remote`]; only the absence of
//! a response becomes a [`ResponseEnvelope::TransportFailure`].

use super::client::{HttpClient, TransportError};
use super::types::{InboundResponse, OutboundRequest, Payload, ResponseEnvelope};
use crate::model::{Body, Header, HttpMethod, RequestDescriptor};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;

/// Default outbound timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30000;

pub struct RequestForwarder {
    client: Arc<dyn HttpClient>,
    timeout: Duration,
}

impl RequestForwarder {
    pub fn new(client: Arc<dyn HttpClient>, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Performs the outbound call for `request`, which must already be validated.
    pub async fn forward(&self, request: &RequestDescriptor) -> ResponseEnvelope {
        let outbound = build_outbound(request);
        let safe_url = sanitize_url_for_logging(&outbound.url);
        let method = outbound.method.clone();
        let start = Instant::now();

        let result = match timeout(self.timeout, self.client.send(outbound)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout),
        };
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(response) => {
                tracing::info!(
                    method = %method,
                    url = %safe_url,
                    outcome = "remote",
                    status = response.status,
                    elapsed_ms,
                    "Forwarded request"
                );
                normalize(response)
            }
            Err(e) => {
                let kind = e.kind();
                tracing::warn!(
                    method = %method,
                    url = %safe_url,
                    outcome = kind.outcome(),
                    error = %e,
                    elapsed_ms,
                    "Forwarding failed"
                );
                ResponseEnvelope::TransportFailure {
                    kind,
                    diagnostic: e.to_string(),
                }
            }
        }
    }
}

/// Builds the outbound call: headers verbatim plus the bearer token, body only when
/// present and permitted by the method.
pub fn build_outbound(request: &RequestDescriptor) -> OutboundRequest {
    let mut headers = request.outbound_headers();

    let body = request
        .body
        .as_ref()
        .filter(|_| request.method.permits_body())
        .filter(|b| !b.is_empty());

    if body.is_some_and(Body::is_json) && request.header("content-type").is_none() {
        headers.push(Header::new("Content-Type", "application/json"));
    }

    OutboundRequest {
        method: to_reqwest_method(request),
        url: request.url.clone(),
        headers,
        body: body.map(|b| b.to_wire().into_bytes()),
    }
}

fn to_reqwest_method(request: &RequestDescriptor) -> reqwest::Method {
    match request.method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Delete => reqwest::Method::DELETE,
        HttpMethod::Patch => reqwest::Method::PATCH,
    }
}

/// True for `application/json` and `+json` media types.
pub fn is_json_content(content_type: Option<&str>) -> bool {
    let Some(ct) = content_type else {
        return false;
    };
    let essence = ct.split(';').next().unwrap_or_default().trim().to_lowercase();
    essence == "application/json" || essence.ends_with("+json")
}

/// Converts a raw response into an envelope, keeping the remote's status and body shape.
pub fn normalize(response: InboundResponse) -> ResponseEnvelope {
    let InboundResponse {
        status,
        content_type,
        body,
    } = response;

    let json = if is_json_content(content_type.as_deref()) {
        serde_json::from_slice(&body).ok()
    } else {
        None
    };

    let payload = match json {
        Some(value) => Payload::Json(value),
        None => Payload::Text(String::from_utf8_lossy(&body).into_owned()),
    };

    ResponseEnvelope::Remote {
        status,
        content_type,
        payload,
    }
}

/// Strips userinfo credentials so URLs can be logged.
pub fn sanitize_url_for_logging(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(mut url) => {
            if !url.username().is_empty() || url.password().is_some() {
                let _ = url.set_username("");
                let _ = url.set_password(None);
            }
            url.to_string()
        }
        Err(_) => "<invalid url>".to_string(),
    }
}
