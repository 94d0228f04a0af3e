//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate route prefixes and rewrite roots
//! - Validate upstream URLs and value ranges (timeouts > 0, port valid)
//! - Detect duplicate prefixes
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use thiserror::Error;
use url::Url;

use crate::config::schema::{GatewayConfig, RouteRule};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listen_port must be non-zero")]
    ZeroPort,

    #[error("{field} must be greater than zero")]
    ZeroTimeout { field: &'static str },

    #[error("fallback_document must not be empty")]
    EmptyFallbackDocument,

    #[error("route '{route}': {field} '{value}' must start with '/'")]
    NotAbsolute {
        route: String,
        field: &'static str,
        value: String,
    },

    #[error("route '{route}': prefix '{prefix}' must not end with '/'")]
    TrailingSlash { route: String, prefix: String },

    #[error("route '{route}': duplicate prefix '{prefix}'")]
    DuplicatePrefix { route: String, prefix: String },

    #[error("route '{route}': invalid upstream_base_url '{url}': {reason}")]
    InvalidUpstream {
        route: String,
        url: String,
        reason: String,
    },
}

/// Validate a fully loaded configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listen_port == 0 {
        errors.push(ValidationError::ZeroPort);
    }
    if config.request_timeout_ms == 0 {
        errors.push(ValidationError::ZeroTimeout {
            field: "request_timeout_ms",
        });
    }
    if config.connect_timeout_ms == 0 {
        errors.push(ValidationError::ZeroTimeout {
            field: "connect_timeout_ms",
        });
    }
    if config.fallback_document.trim().is_empty() {
        errors.push(ValidationError::EmptyFallbackDocument);
    }

    let mut seen = HashSet::new();
    for rule in &config.upstream_map {
        validate_rule(rule, &mut errors);
        if !seen.insert(rule.prefix.as_str()) {
            errors.push(ValidationError::DuplicatePrefix {
                route: rule.display_name().to_string(),
                prefix: rule.prefix.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_rule(rule: &RouteRule, errors: &mut Vec<ValidationError>) {
    let route = rule.display_name().to_string();

    let absolute_fields = [
        ("prefix", Some(rule.prefix.as_str())),
        ("strip_prefix", rule.strip_prefix.as_deref()),
        ("path_rewrite", rule.path_rewrite.as_deref()),
    ];
    for (field, value) in absolute_fields {
        if let Some(value) = value {
            if !value.starts_with('/') {
                errors.push(ValidationError::NotAbsolute {
                    route: route.clone(),
                    field,
                    value: value.to_string(),
                });
            }
        }
    }

    if rule.prefix.len() > 1 && rule.prefix.ends_with('/') {
        errors.push(ValidationError::TrailingSlash {
            route: route.clone(),
            prefix: rule.prefix.clone(),
        });
    }

    if let Err(reason) = check_upstream_url(&rule.upstream_base_url) {
        errors.push(ValidationError::InvalidUpstream {
            route,
            url: rule.upstream_base_url.clone(),
            reason,
        });
    }
}

fn check_upstream_url(raw: &str) -> Result<(), String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    if url.scheme() != "http" {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err("missing host".to_string());
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err("query and fragment are not allowed".to_string());
    }
    Ok(())
}
