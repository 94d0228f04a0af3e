//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware: request id, CORS, tracing)
//!     → server.rs gateway_handler
//!         → routing (match + rewrite)
//!         → MATCHED:   proxy::Forwarder → relay upstream response
//!         → UNMATCHED: static_files → asset or fallback document
//!     → Send to client
//! ```

pub mod request;
pub mod server;

pub use request::{request_id, X_REQUEST_ID};
pub use server::{AppState, GatewayServer};
