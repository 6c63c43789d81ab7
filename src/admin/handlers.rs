use std::sync::atomic::Ordering;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

use crate::admin::AdminState;
use crate::config::MissingHostPolicy;
use crate::event::{handle, EdgeEvent};
use crate::observability::metrics;
use crate::rewrite::RewriteError;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub requests_total: u64,
}

#[derive(Serialize)]
pub struct EffectiveConfig {
    pub default_host_suffix: String,
    pub on_missing_host: MissingHostPolicy,
    pub origin: String,
    pub preserve_host: bool,
}

pub async fn get_health(State(state): State<AdminState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        requests_total: state.app.request_count.load(Ordering::Relaxed),
    })
}

pub async fn get_config(State(state): State<AdminState>) -> Json<EffectiveConfig> {
    let rule = state.app.rule.load_full();
    Json(EffectiveConfig {
        default_host_suffix: rule.engine.default_host_suffix().to_string(),
        on_missing_host: rule.on_missing_host,
        origin: state.config.origin.base_url.clone(),
        preserve_host: state.config.origin.preserve_host,
    })
}

/// Run the rewrite against a posted edge event, the way the platform would.
///
/// 200 with the rewritten request, 400 for an unparseable event, 500 when the
/// function itself fails (missing host).
pub async fn post_invoke(State(state): State<AdminState>, body: String) -> Response {
    let event = match EdgeEvent::from_json(&body) {
        Ok(event) => event,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": format!("invalid event: {e}") })),
            )
                .into_response();
        }
    };

    let rule = state.app.rule.load_full();
    match handle(&rule.engine, event) {
        Ok(request) => Json(request).into_response(),
        Err(e @ RewriteError::MissingHost) => {
            metrics::record_failure("missing_host");
            tracing::warn!(error = %e, "Invocation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string(), "type": "MissingHostError" })),
            )
                .into_response()
        }
    }
}
