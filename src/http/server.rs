//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create one Axum Router per listening port
//! - Wire up middleware (request ID, tracing, timeout, limits, identity)
//! - Bind one listener per distinct site port
//! - Hand each request to the dispatch host and map its outcome
//! - Observability (metrics, correlation IDs)
//!
//! # Design Decisions
//! - Dispatch is synchronous, so it runs on the blocking pool
//! - A router only sees the sites registered for its own port

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::HostConfig;
use crate::dispatch::host::{Dispatched, Host, HostError};
use crate::http::middleware::{concurrency_limit, identity_middleware, IdentityState};
use crate::http::request::{into_dispatch_request, MakeUuidRequestId};
use crate::http::response::into_http_response;
use crate::lifecycle::shutdown::Shutdown;
use crate::observability::metrics;
use crate::observability::tracing::make_request_span;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Sites bound to this router's port.
    pub host: Arc<Host>,
}

/// HTTP front end for a set of sites.
pub struct HttpServer {
    host: Host,
    config: HostConfig,
}

impl HttpServer {
    pub fn new(host: Host, config: HostConfig) -> Self {
        Self { host, config }
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Router serving the sites registered on `port`.
    pub fn router(&self, port: u16) -> Router {
        let state = AppState {
            host: Arc::new(self.host.for_port(port)),
        };
        Self::build_router(&self.config, state)
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &HostConfig, state: AppState) -> Router {
        let limit = Arc::new(Semaphore::new(config.listener.max_connections));
        let identity = IdentityState {
            trust_headers: config.security.trust_identity_headers,
        };

        Router::new()
            .fallback(dispatch_handler)
            .with_state(state)
            .layer(middleware::from_fn_with_state(identity, identity_middleware))
            .layer(middleware::from_fn_with_state(limit, concurrency_limit))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeUuidRequestId))
                    .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
            )
    }

    /// Bind one listener per distinct site port on the configured interface.
    pub async fn bind(&self) -> Result<Vec<TcpListener>, std::io::Error> {
        let mut listeners = Vec::new();
        for port in self.host.ports() {
            let listener = TcpListener::bind((self.config.listener.bind_host.as_str(), port)).await?;
            tracing::info!(
                address = %listener.local_addr()?,
                max_connections = self.config.listener.max_connections,
                "Listener bound"
            );
            listeners.push(listener);
        }
        Ok(listeners)
    }

    /// Serve every listener until shutdown is triggered.
    ///
    /// Each listener serves the sites whose port matches its local port.
    pub async fn run(self, listeners: Vec<TcpListener>, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let mut servers = JoinSet::new();

        for listener in listeners {
            let addr = listener.local_addr()?;
            let app = self.router(addr.port());
            let mut stop = shutdown.subscribe();

            tracing::info!(address = %addr, "HTTP server starting");
            servers.spawn(async move {
                axum::serve(listener, app)
                    .with_graceful_shutdown(async move {
                        let _ = stop.recv().await;
                    })
                    .await
            });
        }

        while let Some(joined) = servers.join_next().await {
            match joined {
                Ok(result) => result?,
                Err(e) => tracing::error!(error = %e, "Server task failed"),
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Translate, dispatch and answer one request.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();

    let request = match into_dispatch_request(request).await {
        Ok(request) => request,
        Err(response) => return response,
    };

    tracing::debug!(
        site = %request.site_name,
        controller = %request.controller_name,
        action = %request.action_name,
        verb = %request.verb,
        "Dispatching request"
    );

    let host = state.host.clone();
    let span = tracing::Span::current();
    let joined = tokio::task::spawn_blocking(move || span.in_scope(|| host.dispatch(request))).await;

    match joined {
        Ok(Ok(Dispatched { site, outcome })) => {
            let label = outcome.label();
            let response = into_http_response(outcome).await;
            let status = response.status().as_u16();

            tracing::info!(site = %site, outcome = label, status = status, "Request dispatched");
            metrics::record_request(&site, status, start);
            response
        }
        Ok(Err(HostError::Unroutable { site_name })) => {
            tracing::warn!(site = %site_name, "No site accepts request");
            metrics::record_unroutable();
            (StatusCode::NOT_FOUND, "No matching site").into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Dispatch task failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}
