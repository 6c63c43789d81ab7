//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, timeout)
//!     → request.rs (host + path extraction)
//!     → rewrite engine (exactly once)
//!     → request.rs (origin URI for the rewritten key)
//!     → origin response streamed back to the viewer
//! ```

pub mod request;
pub mod server;

pub use request::{Origin, OriginError, X_REQUEST_ID};
pub use server::{ActiveRule, AppState, EdgeServer};
