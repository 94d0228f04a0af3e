//! Configuration loading from disk and environment.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Prefix shared by every recognised environment variable.
pub const ENV_PREFIX: &str = "GATEWAY_";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {var}: '{value}'")]
    Env { var: String, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration.
///
/// Without a path the built-in defaults are used. Environment overrides are
/// applied from the process environment before validation.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => parse_file(path)?,
        None => GatewayConfig::default(),
    };

    apply_env_overrides(&mut config, std::env::vars())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

fn parse_file(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

/// Apply `GATEWAY_*` overrides from the given variables.
///
/// `GATEWAY_UPSTREAM_<NAME>` replaces the upstream of the route whose
/// display name normalises to `<NAME>`.
pub fn apply_env_overrides<I, K, V>(config: &mut GatewayConfig, vars: I) -> Result<(), ConfigError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    for (key, value) in vars {
        let Some(name) = key.as_ref().strip_prefix(ENV_PREFIX) else {
            continue;
        };
        let value: String = value.into();

        match name {
            "LISTEN_HOST" => config.listen_host = value,
            "LISTEN_PORT" => config.listen_port = parse_var(key.as_ref(), &value)?,
            "REQUEST_TIMEOUT_MS" => config.request_timeout_ms = parse_var(key.as_ref(), &value)?,
            "CONNECT_TIMEOUT_MS" => config.connect_timeout_ms = parse_var(key.as_ref(), &value)?,
            "STATIC_ROOT" => config.static_root = PathBuf::from(value),
            "FALLBACK_DOCUMENT" => config.fallback_document = value,
            "CORS_ENABLED" => config.cors_enabled = parse_var(key.as_ref(), &value)?,
            "LOG_LEVEL" => config.log_level = value,
            "LOG_FORMAT" => config.log_format = parse_var(key.as_ref(), &value)?,
            other => {
                if let Some(route_name) = other.strip_prefix("UPSTREAM_") {
                    let rule = config
                        .upstream_map
                        .iter_mut()
                        .find(|rule| env_key(rule.display_name()) == route_name);
                    match rule {
                        Some(rule) => {
                            tracing::debug!(route = %rule.display_name(), upstream = %value, "Upstream overridden from environment");
                            rule.upstream_base_url = value;
                        }
                        None => {
                            tracing::warn!(var = %key.as_ref(), "No route matches upstream override");
                        }
                    }
                }
            }
        }
    }
    Ok(())
}

fn parse_var<T: std::str::FromStr>(var: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Env {
        var: var.to_string(),
        value: value.to_string(),
    })
}

/// Normalise a route name into its environment variable suffix.
pub fn env_key(name: &str) -> String {
    name.trim_matches('/')
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}
