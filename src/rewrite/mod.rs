//! URL rewrite subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request (host, uri)
//!     → descriptor.rs (RequestDescriptor, owned and immutable)
//!     → engine.rs (classify host, apply index-document rules)
//!     → Return: RewrittenPath or RewriteError::MissingHost
//! ```
//!
//! # Design Decisions
//! - Pure function of (host, uri): no I/O, no state between requests
//! - Platform-default suffix is injected, never a hidden literal
//! - Extension detection is a single substring scan for `.` over the whole uri
//! - Tenant rule is applied exactly once per request; it is not idempotent

pub mod descriptor;
pub mod engine;

pub use descriptor::{RequestDescriptor, RewrittenPath};
pub use engine::{rewrite, HostKind, RewriteEngine, RewriteError, DEFAULT_HOST_SUFFIX, INDEX_DOCUMENT};
