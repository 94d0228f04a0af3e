//! Deadline enforcement on relayed response bodies.
//!
//! Once the response head is sent a 502 is no longer possible, so an expired
//! deadline ends the body stream with an error and the connection is aborted.

use std::io;

use axum::body::{Body, Bytes};
use futures_util::{stream, StreamExt};
use tokio::time::Instant;

/// Wrap `body` so that it fails once `deadline` passes.
pub fn with_deadline(body: Body, deadline: Instant, route: String) -> Body {
    let frames = body.into_data_stream();

    let limited = stream::unfold(Some((frames, route)), move |state| async move {
        let (mut frames, route) = state?;
        match tokio::time::timeout_at(deadline, frames.next()).await {
            Ok(Some(Ok(chunk))) => Some((Ok::<Bytes, io::Error>(chunk), Some((frames, route)))),
            Ok(Some(Err(e))) => Some((Err(io::Error::other(e)), None)),
            Ok(None) => None,
            Err(_) => {
                tracing::warn!(route = %route, "Upstream body exceeded the request timeout, aborting relay");
                Some((
                    Err(io::Error::new(io::ErrorKind::TimedOut, "upstream body deadline exceeded")),
                    None,
                ))
            }
        }
    });

    Body::from_stream(limited)
}
