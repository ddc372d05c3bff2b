//! Route table and path matching
//!
//! Two route classes exist: plain routes match the request path exactly,
//! prefix routes match everything under a prefix and strip it before
//! forwarding (the remainder of the path and the query string pass through
//! verbatim).

use axum::http::{HeaderName, HeaderValue, Method};

/// How a route matches the request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    /// Matches the path exactly.
    Exact(String),
    /// Matches the prefix itself or anything under `prefix + "/"`, and
    /// strips the prefix from the forwarded path.
    StripPrefix(String),
}

impl PathPattern {
    fn matches(&self, path: &str) -> bool {
        match self {
            Self::Exact(p) => path == p,
            Self::StripPrefix(p) => {
                path == p || (path.starts_with(p) && path[p.len()..].starts_with('/'))
            }
        }
    }

    /// Longer patterns win; an exact match beats a prefix match of the
    /// same length.
    fn specificity(&self) -> (usize, u8) {
        match self {
            Self::Exact(p) => (p.len(), 1),
            Self::StripPrefix(p) => (p.len(), 0),
        }
    }

    /// Stable metrics label: the pattern kind plus the configured path.
    /// Never derived from the raw request path, so the label set stays as
    /// bounded as the route table itself.
    pub fn metrics_label(&self) -> String {
        match self {
            Self::Exact(p) => format!("exact:{}", p),
            Self::StripPrefix(p) => format!("strip_prefix:{}", p),
        }
    }
}

/// Per-route SLA, derived from the `<N>r/m` literal in the gateway table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimit {
    pub per_minute: u32,
    /// Zone name; combined with the client id into the counter key.
    pub zone: String,
}

/// A configured route.
#[derive(Debug, Clone)]
pub struct RouteRule {
    pub pattern: PathPattern,
    /// `None` matches any method.
    pub method: Option<Method>,
    /// Upstream base URL, e.g. `http://127.0.0.1:8008`.
    pub upstream: String,
    pub require_auth: bool,
    pub rate_limit: Option<RateLimit>,
    /// Headers set on the forwarded request, overriding the incoming value.
    pub set_headers: Vec<(HeaderName, HeaderValue)>,
}

impl RouteRule {
    /// Path and query to present to the upstream.
    ///
    /// Prefix routes forward the remainder of the path; `/engine/test123`
    /// becomes `/test123`, and the bare prefix becomes `/`. The query
    /// string is never touched.
    pub fn upstream_path_and_query(&self, path: &str, query: Option<&str>) -> String {
        let forwarded = match &self.pattern {
            PathPattern::Exact(_) => path,
            PathPattern::StripPrefix(prefix) => {
                let rest = &path[prefix.len()..];
                if rest.is_empty() { "/" } else { rest }
            }
        };

        match query {
            Some(q) => format!("{}?{}", forwarded, q),
            None => forwarded.to_string(),
        }
    }
}

/// The configured route set, immutable after load.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
}

impl RouteTable {
    pub fn new(rules: Vec<RouteRule>) -> Self {
        Self { rules }
    }

    /// Find the most specific route for a request, if any.
    pub fn matches(&self, method: &Method, path: &str) -> Option<&RouteRule> {
        self.rules
            .iter()
            .filter(|rule| rule.method.as_ref().is_none_or(|m| m == method))
            .filter(|rule| rule.pattern.matches(path))
            .max_by_key(|rule| rule.pattern.specificity())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
