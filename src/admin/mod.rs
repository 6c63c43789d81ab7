//! Admin API: health, effective config and a local invocation endpoint.

pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};

use self::handlers::*;
use crate::config::EdgeConfig;
use crate::http::server::AppState;

/// State shared by admin handlers.
#[derive(Clone)]
pub struct AdminState {
    pub app: AppState,
    pub config: EdgeConfig,
}

pub fn setup_admin_router(app: AppState, config: EdgeConfig) -> Router {
    Router::new()
        .route("/health", get(get_health))
        .route("/config", get(get_config))
        .route("/invoke", post(post_invoke))
        .with_state(AdminState { app, config })
}
