//! Request forwarding to upstream services.
//!
//! # Responsibilities
//! - Build the upstream URI from the matched route
//! - Forward method, headers, query and body unchanged (Host aside)
//! - Enforce the request timeout over the whole round-trip, body included
//! - Map client failures to gateway errors
//!
//! # Design Decisions
//! - Bodies are streamed in both directions, never buffered
//! - No retries, not even for requests canceled on a stale pooled connection
//! - Dropping the returned future aborts the upstream exchange

use std::net::IpAddr;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response, Uri};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use tokio::time::Instant;

use crate::error::GatewayError;
use crate::proxy::deadline::with_deadline;
use crate::proxy::headers::{prepare_upstream_headers, strip_hop_by_hop};
use crate::routing::Route;

/// Relays requests to upstreams over a pooled HTTP client.
#[derive(Clone)]
pub struct Forwarder {
    client: Client<HttpConnector, Body>,
    request_timeout: Duration,
}

impl Forwarder {
    pub fn new(connect_timeout: Duration, request_timeout: Duration) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(connect_timeout));
        connector.set_nodelay(true);

        let client = Client::builder(TokioExecutor::new())
            .retry_canceled_requests(false)
            .build(connector);

        Self {
            client,
            request_timeout,
        }
    }

    /// Forward `request` along `route` and return the upstream response.
    pub async fn forward(
        &self,
        route: &Route,
        request: Request<Body>,
        client_ip: Option<IpAddr>,
    ) -> Result<Response<Body>, GatewayError> {
        let (mut parts, body) = request.into_parts();

        let rewritten = route.rewrite(parts.uri.path());
        let target = route.upstream.path_and_query(&rewritten, parts.uri.query());
        let uri = Uri::builder()
            .scheme(route.upstream.scheme.clone())
            .authority(route.upstream.authority.clone())
            .path_and_query(target)
            .build()?;

        prepare_upstream_headers(&mut parts.headers, &route.upstream.authority, client_ip);

        let mut upstream_request = Request::builder().method(parts.method).uri(uri).body(body)?;
        *upstream_request.headers_mut() = parts.headers;

        tracing::debug!(
            route = %route.name,
            upstream_uri = %upstream_request.uri(),
            "Forwarding request"
        );

        let started = Instant::now();
        let deadline = started + self.request_timeout;
        let response = match tokio::time::timeout_at(deadline, self.client.request(upstream_request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(source)) if source.is_connect() => {
                return Err(GatewayError::UpstreamUnreachable {
                    route: route.name.clone(),
                    source,
                });
            }
            Ok(Err(source)) => {
                return Err(GatewayError::MalformedUpstreamResponse {
                    route: route.name.clone(),
                    source,
                });
            }
            Err(_) => {
                return Err(GatewayError::UpstreamTimeout {
                    route: route.name.clone(),
                    timeout_ms: u64::try_from(self.request_timeout.as_millis()).unwrap_or(u64::MAX),
                });
            }
        };

        tracing::debug!(
            route = %route.name,
            status = %response.status(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Upstream responded"
        );

        let (mut parts, body) = response.into_parts();
        strip_hop_by_hop(&mut parts.headers);
        let body = with_deadline(Body::new(body), deadline, route.name.clone());
        Ok(Response::from_parts(parts, body))
    }
}
