//! Request identification.
//!
//! # Responsibilities
//! - Name the request id header shared by every layer
//! - Read the id assigned by `SetRequestIdLayer` for logging
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Client-supplied ids are kept so callers can correlate across hops

use axum::http::{HeaderMap, HeaderName};

/// Header carrying the request id.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Request id of an inbound request, or `"unknown"` when none was assigned.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}
