//! Input and output values of the rewrite engine.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The two request fields the rewrite rule reads.
///
/// `host` is the destination hostname as received (no port). `uri` is the
/// request path without query string or fragment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct RequestDescriptor {
    pub host: String,
    pub uri: String,
}

impl RequestDescriptor {
    pub fn new(host: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            uri: uri.into(),
        }
    }
}

/// Object-storage key produced for a request. Always starts with `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RewrittenPath(String);

impl RewrittenPath {
    pub(crate) fn new(path: String) -> Self {
        Self(path)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for RewrittenPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RewrittenPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<RewrittenPath> for String {
    fn from(path: RewrittenPath) -> Self {
        path.0
    }
}
