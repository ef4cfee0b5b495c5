//! Checks over an untrusted [`ProxyRequest`].
//!
//! Checks run in a fixed order and the first failing one determines the rejection.

use super::types::ProxyRequest;
use crate::model::{Body, Header, HttpMethod, RequestDescriptor};
use serde_json::Value;
use thiserror::Error;

/// Why a proxy request was refused. The display text is what the client sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("Missing required fields")]
    MissingFields,

    #[error("Invalid endpoint URL")]
    InvalidEndpoint,

    #[error("Invalid HTTP method")]
    InvalidMethod,

    #[error("Invalid headers")]
    InvalidHeaders,
}

pub type ValidationResult = Result<(), Rejection>;

/// Validates a proxy request. The body is never required.
pub fn validate(request: &ProxyRequest) -> ValidationResult {
    let (Some(end_point), Some(method), Some(headers)) = (
        non_empty(&request.end_point),
        non_empty(&request.http_method),
        request.headers.as_ref(),
    ) else {
        return Err(Rejection::MissingFields);
    };

    if !is_valid_endpoint(end_point) {
        return Err(Rejection::InvalidEndpoint);
    }

    if method.parse::<HttpMethod>().is_err() {
        return Err(Rejection::InvalidMethod);
    }

    if headers.is_empty() || headers.values().any(|v| header_value(v).is_none()) {
        return Err(Rejection::InvalidHeaders);
    }

    Ok(())
}

/// Absolute URL with an http(s) scheme and a non-empty host.
pub fn is_valid_endpoint(end_point: &str) -> bool {
    match url::Url::parse(end_point) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https")
                && url.host_str().is_some_and(|h| !h.is_empty())
        }
        Err(_) => false,
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

/// Header values may be strings, numbers or booleans; numbers and booleans are sent in
/// their JSON text form.
fn header_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

impl TryFrom<ProxyRequest> for RequestDescriptor {
    type Error = Rejection;

    /// Validates and converts; GET requests lose any supplied body.
    fn try_from(request: ProxyRequest) -> Result<Self, Self::Error> {
        validate(&request)?;

        let method: HttpMethod = request
            .http_method
            .as_deref()
            .unwrap_or_default()
            .parse()
            .map_err(|_| Rejection::InvalidMethod)?;

        let mut headers: Vec<Header> = request
            .headers
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(key, value)| header_value(&value).map(|value| Header { key, value }))
            .collect();
        headers.sort_by(|a, b| a.key.cmp(&b.key));

        let body = request
            .body
            .and_then(Body::from_value)
            .filter(|_| method.permits_body());

        Ok(RequestDescriptor {
            method,
            url: request.end_point.unwrap_or_default(),
            headers,
            body,
            auth_token: request.auth_token.filter(|t| !t.is_empty()),
        })
    }
}
