//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub listen_host: String,

    /// TCP port to listen on.
    pub listen_port: u16,

    /// Upper bound for a proxied round-trip, relayed body included.
    pub request_timeout_ms: u64,

    /// Upper bound for the upstream TCP handshake.
    pub connect_timeout_ms: u64,

    /// Directory holding the pre-built client bundle.
    pub static_root: PathBuf,

    /// Document served for unmatched navigations, relative to `static_root`.
    pub fallback_document: String,

    /// Allow cross-origin requests from any origin.
    pub cors_enabled: bool,

    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Route rules mapping path prefixes to upstreams.
    pub upstream_map: Vec<RouteRule>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_host: "0.0.0.0".to_string(),
            listen_port: 5000,
            request_timeout_ms: 30_000,
            connect_timeout_ms: 5_000,
            static_root: PathBuf::from("build"),
            fallback_document: "index.html".to_string(),
            cors_enabled: true,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            upstream_map: default_upstream_map(),
        }
    }
}

impl GatewayConfig {
    /// Address the listener binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.listen_host, self.listen_port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

/// Static mapping from an inbound path prefix to an upstream service.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RouteRule {
    /// Route identifier for logging. Defaults to the prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Path prefix to match on a segment boundary (e.g., "/api/auth").
    pub prefix: String,

    /// Base URL of the upstream service (e.g., "http://auth-service:8000").
    pub upstream_base_url: String,

    /// Prefix removed from the forwarded path. Defaults to `prefix`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strip_prefix: Option<String>,

    /// Replacement root put in place of the stripped prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_rewrite: Option<String>,
}

impl RouteRule {
    pub fn new(prefix: impl Into<String>, upstream_base_url: impl Into<String>) -> Self {
        Self {
            name: None,
            prefix: prefix.into(),
            upstream_base_url: upstream_base_url.into(),
            strip_prefix: None,
            path_rewrite: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_rewrite(mut self, path_rewrite: impl Into<String>) -> Self {
        self.path_rewrite = Some(path_rewrite.into());
        self
    }

    pub fn with_strip_prefix(mut self, strip_prefix: impl Into<String>) -> Self {
        self.strip_prefix = Some(strip_prefix.into());
        self
    }

    /// Name used in logs and environment overrides.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.prefix)
    }

    /// Prefix actually removed from the request path.
    pub fn effective_strip_prefix(&self) -> &str {
        self.strip_prefix.as_deref().unwrap_or(&self.prefix)
    }
}

/// The four backend services of the editor deployment.
fn default_upstream_map() -> Vec<RouteRule> {
    vec![
        RouteRule::new("/api/auth", "http://auth-service:8000").with_name("auth"),
        RouteRule::new("/api/projects", "http://project-service:8000").with_name("projects"),
        RouteRule::new("/api/analysis", "http://analysis-service:8000").with_name("analysis"),
        RouteRule::new("/api/ai", "http://ai-core-service:8000")
            .with_name("ai")
            .with_rewrite("/api/v1"),
    ]
}
