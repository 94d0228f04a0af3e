//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store compiled routes
//! - Look up the best matching route for a request path
//! - Return matched route or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Routes sorted once by prefix length, so the first hit is the longest prefix
//! - O(n) path prefix scan (acceptable for typical route counts)
//! - Explicit Unmatched rather than silent default

use axum::http::uri::{Authority, Scheme};
use url::Url;

use crate::config::{RouteRule, ValidationError};
use crate::routing::matcher::PathPrefixMatcher;
use crate::routing::rewrite::rewrite_path;

/// Where a route forwards to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upstream {
    pub scheme: Scheme,
    pub authority: Authority,
    /// Path of the base URL without trailing slash; empty for a bare host.
    pub base_path: String,
}

impl Upstream {
    /// Parse an upstream base URL such as `http://auth-service:8000`.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let url = Url::parse(raw).map_err(|e| e.to_string())?;
        let host = url.host_str().ok_or_else(|| "missing host".to_string())?;
        let authority = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        let authority = authority
            .parse::<Authority>()
            .map_err(|e| e.to_string())?;
        let scheme = url
            .scheme()
            .parse::<Scheme>()
            .map_err(|e| e.to_string())?;

        Ok(Self {
            scheme,
            authority,
            base_path: url.path().trim_end_matches('/').to_string(),
        })
    }

    /// Path-and-query to send upstream for an already rewritten path.
    pub fn path_and_query(&self, rewritten_path: &str, query: Option<&str>) -> String {
        let mut target = String::with_capacity(
            self.base_path.len() + rewritten_path.len() + query.map_or(0, |q| q.len() + 1),
        );
        target.push_str(&self.base_path);
        if self.base_path.is_empty() || rewritten_path != "/" {
            target.push_str(rewritten_path);
        }
        if let Some(query) = query {
            target.push('?');
            target.push_str(query);
        }
        target
    }
}

impl std::fmt::Display for Upstream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}://{}{}", self.scheme, self.authority, self.base_path)
    }
}

/// A compiled route rule.
#[derive(Debug, Clone)]
pub struct Route {
    pub name: String,
    matcher: PathPrefixMatcher,
    strip_prefix: String,
    path_rewrite: Option<String>,
    pub upstream: Upstream,
}

impl Route {
    /// Compile a configured rule.
    pub fn compile(rule: &RouteRule) -> Result<Self, ValidationError> {
        let upstream =
            Upstream::parse(&rule.upstream_base_url).map_err(|reason| ValidationError::InvalidUpstream {
                route: rule.display_name().to_string(),
                url: rule.upstream_base_url.clone(),
                reason,
            })?;

        Ok(Self {
            name: rule.display_name().to_string(),
            matcher: PathPrefixMatcher::new(rule.prefix.clone()),
            strip_prefix: rule.effective_strip_prefix().to_string(),
            path_rewrite: rule.path_rewrite.clone(),
            upstream,
        })
    }

    pub fn prefix(&self) -> &str {
        self.matcher.prefix()
    }

    /// Path forwarded upstream for an inbound path.
    pub fn rewrite(&self, path: &str) -> String {
        rewrite_path(path, &self.strip_prefix, self.path_rewrite.as_deref())
    }
}

/// Result of a route lookup.
#[derive(Debug, Clone, Copy)]
pub enum RouteMatch<'a> {
    Matched(&'a Route),
    Unmatched,
}

impl<'a> RouteMatch<'a> {
    pub fn route(self) -> Option<&'a Route> {
        match self {
            RouteMatch::Matched(route) => Some(route),
            RouteMatch::Unmatched => None,
        }
    }
}

/// Immutable table of compiled routes.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// Compile every rule. Ties on length keep configuration order.
    pub fn from_rules(rules: &[RouteRule]) -> Result<Self, ValidationError> {
        let mut routes = rules.iter().map(Route::compile).collect::<Result<Vec<_>, _>>()?;
        routes.sort_by(|a, b| b.matcher.specificity().cmp(&a.matcher.specificity()));
        Ok(Self { routes })
    }

    /// Find the longest prefix matching `path`.
    pub fn match_path(&self, path: &str) -> RouteMatch<'_> {
        self.routes
            .iter()
            .find(|route| route.matcher.matches(path))
            .map_or(RouteMatch::Unmatched, RouteMatch::Matched)
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
