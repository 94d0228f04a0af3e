//! Upstream forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! Matched Route + inbound request
//!     → headers.rs (strip hop-by-hop, rewrite Host, X-Forwarded-*)
//!     → forwarder.rs (rewrite URI, pooled client, timeout)
//!     → deadline.rs (same deadline applied to the relayed body)
//!     → upstream response streamed back unchanged
//! ```

pub mod deadline;
pub mod forwarder;
pub mod headers;

pub use forwarder::Forwarder;
