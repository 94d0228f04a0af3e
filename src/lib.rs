//! Multi-backend API gateway library.
//!
//! Routes browser API calls by path prefix to upstream services and serves
//! the client bundle for everything else.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod routing;
pub mod static_files;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
