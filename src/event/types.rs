//! Typed view of the platform's viewer-request event.
//!
//! Only the fields the rewrite reads are typed. Everything else (method,
//! querystring, cookies, context, extra header attributes) is kept in
//! flattened maps and written back unchanged.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single header entry, `{ "value": "..." }`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EdgeHeader {
    pub value: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EdgeHeader {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            extra: Map::new(),
        }
    }
}

/// The `request` object of an edge event.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EdgeRequest {
    pub uri: String,

    #[serde(default)]
    pub headers: BTreeMap<String, EdgeHeader>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EdgeRequest {
    pub fn new(host: &str, uri: impl Into<String>) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("host".to_string(), EdgeHeader::new(host));
        Self {
            uri: uri.into(),
            headers,
            extra: Map::new(),
        }
    }

    /// Value of the host header, matched case-insensitively on the name.
    pub fn host(&self) -> Option<&str> {
        self.headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("host"))
            .map(|(_, header)| header.value.as_str())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Event envelope handed to the function once per request.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EdgeEvent {
    pub request: EdgeRequest,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EdgeEvent {
    pub fn new(request: EdgeRequest) -> Self {
        Self {
            request,
            extra: Map::new(),
        }
    }

    pub fn from_json(input: &str) -> serde_json::Result<Self> {
        serde_json::from_str(input)
    }
}
