//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! rewrite + forward path produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID (x-request-id) is attached to every log line of a request
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
