//! Header manipulation for forwarded requests and relayed responses.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers in both directions
//! - Replace Host with the upstream authority
//! - Add X-Forwarded-For, X-Forwarded-Proto, X-Forwarded-Host
//!
//! # Design Decisions
//! - Authorization and cookies pass through untouched
//! - Client-supplied X-Forwarded-For is extended, not replaced

use std::net::IpAddr;

use axum::http::uri::Authority;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue};

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";
pub const X_FORWARDED_HOST: &str = "x-forwarded-host";
pub const X_FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Headers meaningful only for a single transport hop.
const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Remove hop-by-hop headers, including any listed in `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in listed.iter().chain(HOP_BY_HOP.iter()) {
        headers.remove(name);
    }
}

/// Prepare inbound headers for the upstream request.
pub fn prepare_upstream_headers(headers: &mut HeaderMap, upstream: &Authority, client_ip: Option<IpAddr>) {
    let original_host = headers.get(header::HOST).cloned();

    strip_hop_by_hop(headers);

    if let Ok(host) = HeaderValue::from_str(upstream.as_str()) {
        headers.insert(header::HOST, host);
    }

    if let Some(host) = original_host {
        headers.insert(X_FORWARDED_HOST, host);
    }
    headers.insert(X_FORWARDED_PROTO, HeaderValue::from_static("http"));

    if let Some(ip) = client_ip {
        let forwarded_for = match headers.get(X_FORWARDED_FOR).and_then(|v| v.to_str().ok()) {
            Some(existing) if !existing.is_empty() => format!("{existing}, {ip}"),
            _ => ip.to_string(),
        };
        if let Ok(value) = HeaderValue::from_str(&forwarded_for) {
            headers.insert(X_FORWARDED_FOR, value);
        }
    }
}
