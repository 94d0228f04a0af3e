//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handlers and subsystems emit tracing events
//!     → tower-http TraceLayer wraps each request in a span (with request id)
//!     → logging.rs subscriber (pretty or JSON) → stdout
//! ```
//!
//! # Design Decisions
//! - Structured fields, not formatted strings
//! - Request ID flows through every event of a request
//! - RUST_LOG overrides the configured level

pub mod logging;

pub use logging::init_logging;
