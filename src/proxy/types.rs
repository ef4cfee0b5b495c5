use crate::model::Header;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Incoming proxy request from the frontend.
///
/// Every field is optional here; presence is checked by the validator so that a missing
/// field is reported as such rather than as a malformed body.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRequest {
    pub end_point: Option<String>,
    pub http_method: Option<String>,
    /// Values stay loosely typed here; the validator decides which ones are usable.
    pub headers: Option<HashMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    /// Bearer credential applied at send time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
}

/// Fully resolved outbound call handed to an [`HttpClient`](super::client::HttpClient).
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    pub method: reqwest::Method,
    pub url: String,
    pub headers: Vec<Header>,
    /// `None` means no body at all, not an empty one.
    pub body: Option<Vec<u8>>,
}

/// Raw response as received from the remote.
#[derive(Debug, Clone)]
pub struct InboundResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

/// Remote body, in the shape the remote sent it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Json(Value),
    Text(String),
}

/// Classes of transport failure: no response was received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    Timeout,
    ConnectionFailed,
    RequestFailed,
}

impl FailureKind {
    /// Error code returned to the caller.
    pub fn code(&self) -> &'static str {
        match self {
            FailureKind::Timeout => "TIMEOUT",
            FailureKind::ConnectionFailed => "CONNECTION_FAILED",
            FailureKind::RequestFailed => "REQUEST_FAILED",
        }
    }

    /// Outcome class used in logs.
    pub fn outcome(&self) -> &'static str {
        match self {
            FailureKind::Timeout => "timeout",
            FailureKind::ConnectionFailed => "connect",
            FailureKind::RequestFailed => "request",
        }
    }
}

/// Outcome of a forwarded call.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseEnvelope {
    /// The remote answered; its status and body are relayed unchanged, errors included.
    Remote {
        status: u16,
        content_type: Option<String>,
        payload: Payload,
    },
    /// Nothing was received from the remote.
    TransportFailure {
        kind: FailureKind,
        /// Internal diagnostic, only exposed in development.
        diagnostic: String,
    },
}

impl ResponseEnvelope {
    /// Generic status reported for transport failures.
    pub const FAILURE_STATUS: u16 = 500;

    /// Status to relay: the remote's own when one was received.
    pub fn status(&self) -> u16 {
        match self {
            ResponseEnvelope::Remote { status, .. } => *status,
            ResponseEnvelope::TransportFailure { .. } => Self::FAILURE_STATUS,
        }
    }

    pub fn payload(&self) -> Option<&Payload> {
        match self {
            ResponseEnvelope::Remote { payload, .. } => Some(payload),
            ResponseEnvelope::TransportFailure { .. } => None,
        }
    }

    pub fn is_transport_failure(&self) -> bool {
        matches!(self, ResponseEnvelope::TransportFailure { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_proxy_request_wire_names() {
        let req: ProxyRequest = serde_json::from_value(json!({
            "endPoint": "https://x.io",
            "httpMethod": "GET",
            "headers": {"Accept": "application/json"},
            "authToken": "t"
        }))
        .unwrap();
        assert_eq!(req.end_point.as_deref(), Some("https://x.io"));
        assert_eq!(req.http_method.as_deref(), Some("GET"));
        assert_eq!(req.headers.unwrap()["Accept"], "application/json");
        assert_eq!(req.body, None);
        assert_eq!(req.auth_token.as_deref(), Some("t"));
    }

    #[test]
    fn test_non_string_header_values_deserialize() {
        let req: ProxyRequest = serde_json::from_value(json!({
            "headers": {"X-Count": 1, "X-Nested": {"a": 1}}
        }))
        .unwrap();
        let headers = req.headers.unwrap();
        assert_eq!(headers["X-Count"], json!(1));
        assert_eq!(headers["X-Nested"], json!({"a": 1}));
    }

    #[test]
    fn test_failure_kind_labels() {
        let labels: Vec<_> = [
            FailureKind::Timeout,
            FailureKind::ConnectionFailed,
            FailureKind::RequestFailed,
        ]
        .iter()
        .map(|k| (k.code(), k.outcome()))
        .collect();
        assert_eq!(
            labels,
            vec![
                ("TIMEOUT", "timeout"),
                ("CONNECTION_FAILED", "connect"),
                ("REQUEST_FAILED", "request"),
            ]
        );
    }

    #[test]
    fn test_missing_fields_still_deserialize() {
        let req: ProxyRequest = serde_json::from_value(json!({})).unwrap();
        assert!(req.end_point.is_none());
        assert!(req.headers.is_none());
    }

    #[test]
    fn test_envelope_status() {
        let remote = ResponseEnvelope::Remote {
            status: 404,
            content_type: None,
            payload: Payload::Text("nope".into()),
        };
        assert_eq!(remote.status(), 404);
        assert!(!remote.is_transport_failure());

        let failure = ResponseEnvelope::TransportFailure {
            kind: FailureKind::Timeout,
            diagnostic: "timed out".into(),
        };
        assert_eq!(failure.status(), 500);
        assert!(failure.payload().is_none());
    }
}
