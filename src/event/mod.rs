//! Edge invocation contract.
//!
//! # Data Flow
//! ```text
//! viewer-request event JSON
//!     → types.rs (EdgeEvent / EdgeRequest, unknown fields preserved)
//!     → handler.rs (extract host + uri, run RewriteEngine)
//!     → EdgeRequest with only `uri` replaced
//! ```

pub mod handler;
pub mod types;

pub use handler::{handle, handle_json, EventError};
pub use types::{EdgeEvent, EdgeHeader, EdgeRequest};
