//! Request inspection and origin addressing.
//!
//! # Responsibilities
//! - Extract the destination host (no port) from Host header or URI authority
//! - Resolve a rewritten key against the configured origin base URL
//!
//! # Design Decisions
//! - Host header wins over the URI authority (HTTP/1.1 semantics)
//! - Host case is preserved; the rewrite rule prefixes it as received
//! - Query string is carried over verbatim; only the path changes

use std::str::FromStr;

use axum::http::request::Parts;
use axum::http::uri::{Authority, PathAndQuery, Scheme};
use axum::http::{header, Uri};
use url::Url;

use crate::config::OriginConfig;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Destination hostname of a request, without port. `None` when absent or empty.
pub fn request_host(parts: &Parts) -> Option<String> {
    let raw = parts
        .headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| parts.uri.authority().map(|a| a.as_str().to_string()))?;

    strip_port(&raw)
}

fn strip_port(raw: &str) -> Option<String> {
    let host = match Authority::from_str(raw) {
        Ok(authority) => authority.host().to_string(),
        Err(_) => raw.to_string(),
    };
    if host.is_empty() {
        None
    } else {
        Some(host)
    }
}

/// Request ID assigned by the request-id layer, or "unknown".
pub fn request_id(parts: &Parts) -> String {
    parts
        .headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// Error building an origin address.
#[derive(Debug, thiserror::Error)]
pub enum OriginError {
    #[error("invalid origin url {url:?}: {reason}")]
    InvalidBase { url: String, reason: String },

    #[error("invalid object key {0:?}")]
    InvalidKey(String),
}

/// Parsed origin base URL.
#[derive(Debug, Clone)]
pub struct Origin {
    scheme: Scheme,
    authority: Authority,
    base_path: String,
    preserve_host: bool,
}

impl Origin {
    pub fn from_config(config: &OriginConfig) -> Result<Self, OriginError> {
        let invalid = |reason: String| OriginError::InvalidBase {
            url: config.base_url.clone(),
            reason,
        };

        let url = Url::parse(&config.base_url).map_err(|e| invalid(e.to_string()))?;
        let host = url
            .host_str()
            .ok_or_else(|| invalid("missing host".to_string()))?;
        let authority = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };

        Ok(Self {
            scheme: Scheme::from_str(url.scheme()).map_err(|e| invalid(e.to_string()))?,
            authority: Authority::from_str(&authority).map_err(|e| invalid(e.to_string()))?,
            base_path: url.path().trim_end_matches('/').to_string(),
            preserve_host: config.preserve_host,
        })
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    pub fn preserve_host(&self) -> bool {
        self.preserve_host
    }

    /// Absolute origin URI for an object key and optional query string.
    pub fn target_uri(&self, key: &str, query: Option<&str>) -> Result<Uri, OriginError> {
        let mut path = String::with_capacity(self.base_path.len() + key.len() + 1);
        path.push_str(&self.base_path);
        if !key.starts_with('/') {
            path.push('/');
        }
        path.push_str(key);
        if let Some(query) = query {
            path.push('?');
            path.push_str(query);
        }

        let path_and_query =
            PathAndQuery::from_str(&path).map_err(|_| OriginError::InvalidKey(key.to_string()))?;

        Uri::builder()
            .scheme(self.scheme.clone())
            .authority(self.authority.clone())
            .path_and_query(path_and_query)
            .build()
            .map_err(|_| OriginError::InvalidKey(key.to_string()))
    }
}
