//! Event handler: the function body the edge platform invokes.

use thiserror::Error;

use crate::event::types::{EdgeEvent, EdgeRequest};
use crate::rewrite::{RequestDescriptor, RewriteEngine, RewriteError};

/// Errors surfaced to the invoking platform.
#[derive(Debug, Error)]
pub enum EventError {
    #[error("invalid event: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Rewrite(#[from] RewriteError),
}

/// Rewrite the request carried by `event`.
///
/// Returns the request with `uri` replaced and every other field untouched.
/// An absent or empty host header aborts without producing a path.
pub fn handle(engine: &RewriteEngine, event: EdgeEvent) -> Result<EdgeRequest, RewriteError> {
    let mut request = event.request;
    let host = request.host().ok_or(RewriteError::MissingHost)?.to_string();
    let uri = std::mem::take(&mut request.uri);
    let host_kind = engine.classify(&host);

    let rewritten = engine.rewrite(RequestDescriptor::new(host.as_str(), uri.as_str()))?;
    tracing::debug!(
        host = %host,
        uri = %uri,
        host_kind = host_kind.as_str(),
        rewritten = %rewritten,
        "Rewrote edge request"
    );

    request.uri = rewritten.into_string();
    Ok(request)
}

/// Parse an event, rewrite it and serialize the resulting request.
pub fn handle_json(engine: &RewriteEngine, input: &str) -> Result<String, EventError> {
    let event = EdgeEvent::from_json(input)?;
    let request = handle(engine, event)?;
    Ok(request.to_json()?)
}
