//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the gateway handler as catch-all
//! - Wire up middleware (request ID, CORS, tracing)
//! - Bind server to listener and shut down gracefully
//! - Dispatch requests to the route table
//! - Forward matched requests, serve the bundle for the rest

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{GatewayConfig, ValidationError};
use crate::error::GatewayError;
use crate::http::request::{request_id, X_REQUEST_ID};
use crate::proxy::Forwarder;
use crate::routing::{RouteMatch, RouteTable};
use crate::static_files::StaticAssets;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
    pub forwarder: Forwarder,
    pub assets: Arc<StaticAssets>,
}

impl AppState {
    pub fn from_config(config: &GatewayConfig) -> Result<Self, ValidationError> {
        Ok(Self {
            routes: Arc::new(RouteTable::from_rules(&config.upstream_map)?),
            forwarder: Forwarder::new(config.connect_timeout(), config.request_timeout()),
            assets: Arc::new(StaticAssets::new(
                config.static_root.clone(),
                &config.fallback_document,
            )),
        })
    }
}

/// HTTP server for the gateway.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
    routes: Arc<RouteTable>,
}

impl GatewayServer {
    /// Create a new server. Fails if a route cannot be compiled.
    pub fn new(config: GatewayConfig) -> Result<Self, ValidationError> {
        let state = AppState::from_config(&config)?;
        let routes = Arc::clone(&state.routes);
        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            config,
            routes,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let mut router = Router::new().fallback(gateway_handler).with_state(state);

        if config.cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }

        router.layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                        tracing::info_span!(
                            "http.request",
                            method = %req.method(),
                            path = %req.uri().path(),
                            request_id = %request_id(req.headers()),
                        )
                    }),
                )
                .layer(PropagateRequestIdLayer::new(X_REQUEST_ID)),
        )
    }

    /// The router, for serving in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.routes.len(),
            static_root = %self.config.static_root.display(),
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Draining in-flight requests");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Catch-all handler.
/// Matches the route, then forwards upstream or falls back to the bundle.
async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(request.headers()).to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let route = match state.routes.match_path(&path) {
        RouteMatch::Matched(route) => route,
        RouteMatch::Unmatched => {
            tracing::debug!(request_id = %request_id, path = %path, "No route matched, serving bundle");
            return match state.assets.serve(&method, &path).await {
                Ok(response) => response,
                Err(e) => log_failure(&request_id, &path, e).into_response(),
            };
        }
    };

    let client_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    match state.forwarder.forward(route, request, client_ip).await {
        Ok(response) => {
            tracing::info!(
                request_id = %request_id,
                method = %method,
                path = %path,
                route = %route.name,
                upstream = %route.upstream,
                status = response.status().as_u16(),
                elapsed_ms = start_time.elapsed().as_millis() as u64,
                "Proxied request"
            );
            response
        }
        Err(e) => log_failure(&request_id, &path, e).into_response(),
    }
}

fn log_failure(request_id: &str, path: &str, error: GatewayError) -> GatewayError {
    match &error {
        GatewayError::NotFound => {
            tracing::debug!(request_id = %request_id, path = %path, "Not found");
        }
        GatewayError::UpstreamUnreachable { source, .. } | GatewayError::MalformedUpstreamResponse { source, .. } => {
            tracing::error!(request_id = %request_id, path = %path, error = %error, cause = %source, "Upstream error");
        }
        _ => {
            tracing::error!(request_id = %request_id, path = %path, error = %error, "Request failed");
        }
    }
    error
}
