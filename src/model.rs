//! Request data model shared by the curl translator, the proxy and the history store.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// HTTP methods the composer can issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 5] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }

    /// GET requests never carry a body.
    pub fn permits_body(&self) -> bool {
        !matches!(self, HttpMethod::Get)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for method names outside the supported set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported HTTP method: {0}")]
pub struct UnknownMethod(pub String);

impl FromStr for HttpMethod {
    type Err = UnknownMethod;

    /// Case-insensitive: the name is upper-cased before matching.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        HttpMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == upper)
            .ok_or(UnknownMethod(s.to_string()))
    }
}

/// A single authored header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub key: String,
    pub value: String,
}

impl Header {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Request payload: structured JSON or an opaque string.
///
/// On the wire a JSON string is always read back as [`Body::Text`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Body {
    Text(String),
    Json(Value),
}

impl Body {
    /// Maps a loosely typed JSON value to a body. `null` and `""` mean no body.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(Body::Text(s)),
            other => Some(Body::Json(other)),
        }
    }

    /// Interprets raw text as JSON when it parses to a non-string value, retrying once
    /// with `\"` unescaped. Anything else is kept verbatim.
    pub fn from_raw(raw: &str) -> Self {
        let as_json = |text: &str| {
            serde_json::from_str::<Value>(text)
                .ok()
                .filter(|value| !value.is_string())
        };
        let value = as_json(raw).or_else(|| {
            raw.contains("\\\"")
                .then(|| as_json(&raw.replace("\\\"", "\"")))
                .flatten()
        });
        match value {
            Some(value) => Body::Json(value),
            None => Body::Text(raw.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Body::Text(s) => s.is_empty(),
            Body::Json(_) => false,
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self, Body::Json(_))
    }

    /// Serialized form as sent on the wire.
    pub fn to_wire(&self) -> String {
        match self {
            Body::Text(s) => s.clone(),
            Body::Json(v) => v.to_string(),
        }
    }
}

/// Structured representation of one HTTP request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDescriptor {
    #[serde(default)]
    pub method: HttpMethod,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub headers: Vec<Header>,
    #[serde(default)]
    pub body: Option<Body>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
}

impl RequestDescriptor {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_header(key, value);
        self
    }

    pub fn with_body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    /// Last write wins for an identical (case-sensitive) key.
    pub fn set_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.headers.iter_mut().find(|h| h.key == key) {
            Some(existing) => existing.value = value,
            None => self.headers.push(Header { key, value }),
        }
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.key.eq_ignore_ascii_case(key))
            .map(|h| h.value.as_str())
    }

    /// Headers as they go out: authored headers plus the bearer token, if any.
    pub fn outbound_headers(&self) -> Vec<Header> {
        let mut headers: Vec<Header> = self.headers.clone();
        if let Some(token) = self.auth_token.as_deref().filter(|t| !t.is_empty()) {
            headers.retain(|h| !h.key.eq_ignore_ascii_case("authorization"));
            headers.push(Header::new("Authorization", format!("Bearer {}", token)));
        }
        headers
    }
}
