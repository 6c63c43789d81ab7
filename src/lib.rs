//! Multi-tenant edge URL rewrite library.
//!
//! Maps an inbound `(host, uri)` to the object-storage key that serves it,
//! so several domains share one bucket partitioned into `/<host>/...` folders.

pub mod admin;
pub mod config;
pub mod event;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod rewrite;

pub use config::EdgeConfig;
pub use http::EdgeServer;
pub use lifecycle::Shutdown;
pub use rewrite::{rewrite, RequestDescriptor, RewriteEngine, RewriteError, RewrittenPath};
