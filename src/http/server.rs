//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router for viewer traffic and the admin router
//! - Wire up middleware (tracing, timeout, request ID)
//! - Run the rewrite rule exactly once per inbound request
//! - Forward the rewritten request to the storage origin
//! - Apply hot-reloaded rewrite settings without a restart

use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin;
use crate::config::{EdgeConfig, MissingHostPolicy, RewriteConfig};
use crate::http::request::{request_host, request_id, Origin, OriginError};
use crate::lifecycle::shutdown::{wait as wait_for_shutdown, Shutdown};
use crate::observability::metrics;
use crate::rewrite::{RequestDescriptor, RewriteEngine, RewriteError};

/// Rewrite settings in effect; replaced wholesale on config reload.
#[derive(Debug, Clone)]
pub struct ActiveRule {
    pub engine: RewriteEngine,
    pub on_missing_host: MissingHostPolicy,
}

impl ActiveRule {
    pub fn from_config(config: &RewriteConfig) -> Self {
        Self {
            engine: config.engine(),
            on_missing_host: config.on_missing_host,
        }
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub rule: Arc<ArcSwap<ActiveRule>>,
    pub origin: Arc<Origin>,
    pub client: Client<HttpConnector, Body>,
    pub request_count: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(config: &EdgeConfig) -> Result<Self, OriginError> {
        let origin = Origin::from_config(&config.origin)?;

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.timeouts.connect_secs)));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Ok(Self {
            rule: Arc::new(ArcSwap::from_pointee(ActiveRule::from_config(&config.rewrite))),
            origin: Arc::new(origin),
            client,
            request_count: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Swap in new rewrite settings; in-flight requests keep the old ones.
    pub fn apply_rewrite_config(&self, config: &RewriteConfig) {
        self.rule.store(Arc::new(ActiveRule::from_config(config)));
        tracing::info!(
            default_host_suffix = %config.default_host_suffix,
            on_missing_host = ?config.on_missing_host,
            "Rewrite rule reloaded"
        );
    }
}

/// HTTP server for the edge.
pub struct EdgeServer {
    config: EdgeConfig,
    state: AppState,
}

impl EdgeServer {
    /// Create a new server with the given configuration.
    pub fn new(config: EdgeConfig) -> Result<Self, OriginError> {
        let state = AppState::new(&config)?;
        Ok(Self { config, state })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &EdgeConfig {
        &self.config
    }

    /// Router for viewer traffic, with all middleware layers.
    #[allow(deprecated)]
    pub fn edge_router(&self) -> Router {
        Router::new()
            .route("/{*path}", any(edge_handler))
            .route("/", any(edge_handler))
            .with_state(self.state.clone())
            .layer(TimeoutLayer::new(Duration::from_secs(
                self.config.timeouts.request_secs,
            )))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    pub fn admin_router(&self) -> Router {
        admin::setup_admin_router(self.state.clone(), self.config.clone())
    }

    /// Run the server until `shutdown` fires.
    ///
    /// `admin_listener` is optional; config updates received on
    /// `config_updates` replace the active rewrite rule.
    pub async fn run(
        self,
        listener: TcpListener,
        admin_listener: Option<TcpListener>,
        mut config_updates: mpsc::UnboundedReceiver<EdgeConfig>,
        shutdown: Shutdown,
    ) -> Result<(), io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Edge server starting");

        let reload_state = self.state.clone();
        let startup_config = self.config.clone();
        tokio::spawn(async move {
            while let Some(new_config) = config_updates.recv().await {
                if new_config.listener != startup_config.listener
                    || new_config.origin != startup_config.origin
                    || new_config.admin != startup_config.admin
                {
                    tracing::warn!("Listener, origin and admin changes require a restart; applying rewrite section only");
                }
                reload_state.apply_rewrite_config(&new_config.rewrite);
            }
        });

        let admin_task = match admin_listener {
            Some(admin_listener) => {
                let admin_addr = admin_listener.local_addr()?;
                tracing::info!(address = %admin_addr, "Admin API starting");
                let app = self.admin_router();
                let rx = shutdown.subscribe();
                Some(tokio::spawn(async move {
                    axum::serve(admin_listener, app)
                        .with_graceful_shutdown(wait_for_shutdown(rx))
                        .await
                }))
            }
            None => None,
        };

        let app = self.edge_router();
        axum::serve(listener, app)
            .with_graceful_shutdown(wait_for_shutdown(shutdown.subscribe()))
            .await?;

        if let Some(task) = admin_task {
            match task.await {
                Ok(result) => result?,
                Err(e) => tracing::error!(error = %e, "Admin API task failed"),
            }
        }

        tracing::info!("Edge server stopped");
        Ok(())
    }
}

/// Object key for a request, or the rewrite failure.
pub fn resolve_key(
    engine: &RewriteEngine,
    host: Option<&str>,
    path: &str,
) -> Result<String, RewriteError> {
    let host = host.ok_or(RewriteError::MissingHost)?;
    let key = engine.rewrite(RequestDescriptor::new(host, path))?;
    Ok(key.into_string())
}

/// Main edge handler.
/// Rewrites the path once, then forwards to the origin.
async fn edge_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    state.request_count.fetch_add(1, Ordering::Relaxed);

    let (mut parts, body) = request.into_parts();
    let request_id = request_id(&parts);
    let host = request_host(&parts);
    let path = parts.uri.path().to_string();
    let rule = state.rule.load_full();

    let key = match resolve_key(&rule.engine, host.as_deref(), &path) {
        Ok(key) => {
            let host_kind = rule.engine.classify(host.as_deref().unwrap_or_default());
            metrics::record_rewrite(host_kind);
            tracing::debug!(
                request_id = %request_id,
                host = host.as_deref().unwrap_or_default(),
                uri = %path,
                host_kind = host_kind.as_str(),
                rewritten = %key,
                "Rewrote request"
            );
            key
        }
        Err(e) => {
            metrics::record_failure("missing_host");
            match rule.on_missing_host {
                MissingHostPolicy::Reject => {
                    tracing::warn!(request_id = %request_id, uri = %path, error = %e, "Rejecting request");
                    return (StatusCode::BAD_REQUEST, "Missing Host header").into_response();
                }
                MissingHostPolicy::PassThrough => {
                    tracing::warn!(request_id = %request_id, uri = %path, error = %e, "Forwarding request without rewrite");
                    path.clone()
                }
            }
        }
    };

    let target = match state.origin.target_uri(&key, parts.uri.query()) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Cannot address origin");
            metrics::record_failure("invalid_key");
            return (StatusCode::BAD_REQUEST, "Invalid request path").into_response();
        }
    };

    parts.uri = target;
    if !state.origin.preserve_host() {
        if let Ok(value) = HeaderValue::from_str(state.origin.authority().as_str()) {
            parts.headers.insert(header::HOST, value);
        }
    }

    match state.client.request(Request::from_parts(parts, body)).await {
        Ok(response) => {
            let status = response.status();
            metrics::record_origin(status.as_u16(), start_time);
            tracing::debug!(request_id = %request_id, status = %status, "Origin responded");

            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Origin request failed");
            metrics::record_origin(StatusCode::BAD_GATEWAY.as_u16(), start_time);
            (StatusCode::BAD_GATEWAY, "Origin request failed").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_key_missing_host() {
        let engine = RewriteEngine::default();
        assert_eq!(
            resolve_key(&engine, None, "/"),
            Err(RewriteError::MissingHost)
        );
    }

    #[test]
    fn test_resolve_key_tenant() {
        let engine = RewriteEngine::default();
        assert_eq!(
            resolve_key(&engine, Some("example.com"), "/docs/").unwrap(),
            "/example.com/docs/index.html"
        );
    }

    #[test]
    fn test_apply_rewrite_config_swaps_rule() {
        let state = AppState::new(&EdgeConfig::default()).unwrap();
        assert_eq!(state.rule.load().engine.default_host_suffix(), ".cloudfront.net");

        state.apply_rewrite_config(&RewriteConfig {
            default_host_suffix: ".edge.test".into(),
            on_missing_host: MissingHostPolicy::PassThrough,
        });
        let rule = state.rule.load();
        assert_eq!(rule.engine.default_host_suffix(), ".edge.test");
        assert_eq!(rule.on_missing_host, MissingHostPolicy::PassThrough);
    }
}
