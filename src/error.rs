//! Per-request errors and their JSON responses.
//!
//! Every variant is contained to the request that produced it. The body is
//! always `{ "detail": "<short description>" }`, the shape the backends use.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Header carrying a machine-readable error code.
pub const X_GATEWAY_ERROR: &str = "x-gateway-error";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Upstream '{route}' is unreachable")]
    UpstreamUnreachable {
        route: String,
        #[source]
        source: hyper_util::client::legacy::Error,
    },

    #[error("Upstream '{route}' did not respond within {timeout_ms} ms")]
    UpstreamTimeout { route: String, timeout_ms: u64 },

    #[error("Upstream '{route}' returned an invalid response")]
    MalformedUpstreamResponse {
        route: String,
        #[source]
        source: hyper_util::client::legacy::Error,
    },

    #[error("Could not build upstream request")]
    InvalidUpstreamRequest(#[from] axum::http::Error),

    #[error("Not Found")]
    NotFound,

    #[error("Could not read static asset")]
    StaticAsset(#[source] std::io::Error),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::UpstreamUnreachable { .. } => StatusCode::BAD_GATEWAY,
            GatewayError::UpstreamTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::MalformedUpstreamResponse { .. } => StatusCode::BAD_GATEWAY,
            GatewayError::InvalidUpstreamRequest(_) => StatusCode::BAD_GATEWAY,
            GatewayError::NotFound => StatusCode::NOT_FOUND,
            GatewayError::StaticAsset(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Code for the `x-gateway-error` header.
    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::UpstreamUnreachable { .. } => "UPSTREAM_UNREACHABLE",
            GatewayError::UpstreamTimeout { .. } => "UPSTREAM_TIMEOUT",
            GatewayError::MalformedUpstreamResponse { .. } => "MALFORMED_UPSTREAM_RESPONSE",
            GatewayError::InvalidUpstreamRequest(_) => "INVALID_UPSTREAM_REQUEST",
            GatewayError::NotFound => "NOT_FOUND",
            GatewayError::StaticAsset(_) => "STATIC_ASSET",
        }
    }
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            detail: self.to_string(),
        };
        let json = serde_json::to_vec(&body).unwrap_or_else(|_| br#"{"detail":"Bad Gateway"}"#.to_vec());

        let mut response = (status, json).into_response();
        let headers = response.headers_mut();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(X_GATEWAY_ERROR, HeaderValue::from_static(self.code()));
        response
    }
}
