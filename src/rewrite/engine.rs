//! Host-aware path rewriting.
//!
//! # Responsibilities
//! - Classify the host as platform-default or tenant
//! - Resolve directory-like paths to their index document
//! - Prefix tenant paths with the host's storage folder
//!
//! # Design Decisions
//! - Suffix match is case-sensitive `ends_with`, no normalization of the host
//! - A uri "has an extension" iff it contains `.` anywhere, so `/v1.2/status`
//!   is treated as a file and gets no index document
//! - Traversal sequences and unusual characters are passed through untouched
//! - Platform-default paths already carry the tenant folder and are not prefixed

use thiserror::Error;

use crate::rewrite::descriptor::{RequestDescriptor, RewrittenPath};

/// Hostname suffix of the CDN's own generic domain.
pub const DEFAULT_HOST_SUFFIX: &str = ".cloudfront.net";

/// Document served for directory-like paths.
pub const INDEX_DOCUMENT: &str = "index.html";

/// Errors produced by the rewrite engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RewriteError {
    /// The host header was absent or empty; no path can be produced.
    #[error("request has no host header")]
    MissingHost,
}

/// Which branch of the rule a host takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostKind {
    /// The CDN's own hostname; paths already include the tenant folder.
    PlatformDefault,
    /// A custom domain whose folder must be injected.
    Tenant,
}

impl HostKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HostKind::PlatformDefault => "platform_default",
            HostKind::Tenant => "tenant",
        }
    }
}

/// Rewrite rule parameterized by the platform-default host suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteEngine {
    default_host_suffix: String,
}

impl RewriteEngine {
    /// Create an engine that treats hosts ending in `suffix` as platform-default.
    pub fn new(default_host_suffix: impl Into<String>) -> Self {
        Self {
            default_host_suffix: default_host_suffix.into(),
        }
    }

    pub fn default_host_suffix(&self) -> &str {
        &self.default_host_suffix
    }

    /// Classify a host against the configured suffix.
    pub fn classify(&self, host: &str) -> HostKind {
        if host.ends_with(self.default_host_suffix.as_str()) {
            HostKind::PlatformDefault
        } else {
            HostKind::Tenant
        }
    }

    /// Compute the backend object key for a request.
    ///
    /// Total over any non-empty host. The output starts with `/` whenever the
    /// input uri does (or is empty).
    pub fn rewrite(&self, request: RequestDescriptor) -> Result<RewrittenPath, RewriteError> {
        let RequestDescriptor { host, uri } = request;
        if host.is_empty() {
            return Err(RewriteError::MissingHost);
        }

        let path = match self.classify(&host) {
            HostKind::PlatformDefault => default_host_path(uri),
            HostKind::Tenant => tenant_path(&host, uri),
        };
        Ok(RewrittenPath::new(path))
    }
}

impl Default for RewriteEngine {
    fn default() -> Self {
        Self::new(DEFAULT_HOST_SUFFIX)
    }
}

/// Rewrite with the stock `.cloudfront.net` suffix.
pub fn rewrite(host: &str, uri: &str) -> Result<RewrittenPath, RewriteError> {
    RewriteEngine::default().rewrite(RequestDescriptor::new(host, uri))
}

fn has_extension(uri: &str) -> bool {
    uri.contains('.')
}

fn default_host_path(mut uri: String) -> String {
    if uri.is_empty() || uri == "/" {
        return format!("/{INDEX_DOCUMENT}");
    }
    if uri.ends_with('/') {
        uri.push_str(INDEX_DOCUMENT);
    } else if !has_extension(&uri) {
        uri.push('/');
        uri.push_str(INDEX_DOCUMENT);
    }
    uri
}

fn tenant_path(host: &str, mut uri: String) -> String {
    if uri.len() > 1 && uri.ends_with('/') {
        uri.pop();
    }

    if uri.is_empty() || uri == "/" {
        uri = format!("/{INDEX_DOCUMENT}");
    } else if !has_extension(&uri) {
        uri.push('/');
        uri.push_str(INDEX_DOCUMENT);
    }

    let mut path = String::with_capacity(1 + host.len() + uri.len());
    path.push('/');
    path.push_str(host);
    path.push_str(&uri);
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tenant(uri: &str) -> String {
        rewrite("example.com", uri).unwrap().into_string()
    }

    fn platform(uri: &str) -> String {
        rewrite("d111111abcdef8.cloudfront.net", uri)
            .unwrap()
            .into_string()
    }

    #[test]
    fn test_tenant_root() {
        assert_eq!(tenant("/"), "/example.com/index.html");
        assert_eq!(tenant(""), "/example.com/index.html");
    }

    #[test]
    fn test_tenant_file_paths_unchanged() {
        assert_eq!(tenant("/about.html"), "/example.com/about.html");
        assert_eq!(tenant("/assets/logo.png"), "/example.com/assets/logo.png");
    }

    #[test]
    fn test_tenant_directory_paths() {
        assert_eq!(tenant("/docs/"), "/example.com/docs/index.html");
        assert_eq!(tenant("/docs"), "/example.com/docs/index.html");
        assert_eq!(tenant("/a/b/c/"), "/example.com/a/b/c/index.html");
    }

    #[test]
    fn test_tenant_strips_only_one_trailing_slash() {
        assert_eq!(tenant("/docs//"), "/example.com/docs//index.html");
        assert_eq!(tenant("//"), "/example.com/index.html");
    }

    #[test]
    fn test_tenant_dotted_directory_is_treated_as_file() {
        assert_eq!(tenant("/v1.2/status"), "/example.com/v1.2/status");
        assert_eq!(tenant("/v1.2/status/"), "/example.com/v1.2/status");
    }

    #[test]
    fn test_tenant_traversal_passes_through() {
        assert_eq!(tenant("/../secret"), "/example.com/../secret");
    }

    #[test]
    fn test_platform_default_paths() {
        assert_eq!(platform("/"), "/index.html");
        assert_eq!(platform(""), "/index.html");
        assert_eq!(platform("/foo"), "/foo/index.html");
        assert_eq!(platform("/example.com/"), "/example.com/index.html");
        assert_eq!(platform("/example.com/docs/"), "/example.com/docs/index.html");
        // The tenant folder carries a dot, so the folder path counts as a file.
        assert_eq!(platform("/example.com/docs"), "/example.com/docs");
        assert_eq!(platform("/example.com/app.js"), "/example.com/app.js");
    }

    #[test]
    fn test_platform_default_keeps_trailing_slash_run() {
        assert_eq!(platform("/foo//"), "/foo//index.html");
    }

    #[test]
    fn test_missing_host() {
        assert_eq!(rewrite("", "/"), Err(RewriteError::MissingHost));
    }

    #[test]
    fn test_classify_is_case_sensitive() {
        let engine = RewriteEngine::default();
        assert_eq!(engine.classify("abc.cloudfront.net"), HostKind::PlatformDefault);
        assert_eq!(engine.classify("abc.CLOUDFRONT.NET"), HostKind::Tenant);
        assert_eq!(engine.classify("cloudfront.net"), HostKind::Tenant);
    }

    #[test]
    fn test_custom_suffix() {
        let engine = RewriteEngine::new(".edge.test");
        let default_host = engine
            .rewrite(RequestDescriptor::new("cdn.edge.test", "/x"))
            .unwrap();
        assert_eq!(default_host.as_str(), "/x/index.html");

        let tenant_host = engine
            .rewrite(RequestDescriptor::new("abc.cloudfront.net", "/x"))
            .unwrap();
        assert_eq!(tenant_host.as_str(), "/abc.cloudfront.net/x/index.html");
    }

    #[test]
    fn test_tenant_rule_is_not_idempotent() {
        let once = tenant("/docs/");
        let twice = tenant(&once);
        assert_eq!(twice, "/example.com/example.com/docs/index.html");
        assert_ne!(once, twice);
    }

    #[test]
    fn test_host_case_preserved_in_prefix() {
        let path = rewrite("Example.COM", "/").unwrap();
        assert_eq!(path.as_str(), "/Example.COM/index.html");
    }
}
