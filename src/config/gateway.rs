//! Gateway table: credential entries and route rules
//!
//! The table is a TOML file with `[[credentials]]` and `[[routes]]`
//! sections. All parsing and validation happens at load time; the request
//! path only ever sees the typed [`CredentialStore`] and [`RouteTable`].

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use axum::http::{HeaderName, HeaderValue, Method};
use serde::Deserialize;

use crate::domain::{
    CredentialStore, GatewayError, PathPattern, RateLimit, RouteRule, RouteTable,
};

/// Requests-per-minute literal in the `<N>r/m` form, e.g. `rate = "2r/m"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatePerMinute(pub u32);

impl FromStr for RatePerMinute {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let count = s
            .strip_suffix("r/m")
            .ok_or_else(|| format!("rate '{}' must use the <N>r/m form", s))?;
        let count: u32 = count
            .trim()
            .parse()
            .map_err(|_| format!("rate '{}' has a non-numeric count", s))?;

        if count == 0 {
            return Err(format!("rate '{}' must be positive", s));
        }

        Ok(Self(count))
    }
}

impl<'de> Deserialize<'de> for RatePerMinute {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One `[[credentials]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialEntry {
    pub api_key: String,
    pub client_id: String,
}

/// One `[[routes]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteEntry {
    pub path: String,
    /// HTTP method, or `"ANY"` to match every method.
    #[serde(default = "default_method")]
    pub method: String,
    pub upstream: String,
    #[serde(default)]
    pub strip_prefix: bool,
    #[serde(default = "default_true")]
    pub require_auth: bool,
    #[serde(default)]
    pub rate: Option<RatePerMinute>,
    /// Zone name; derived from path and method when omitted.
    #[serde(default)]
    pub zone: Option<String>,
    /// Headers set on the forwarded request.
    #[serde(default)]
    pub set_headers: BTreeMap<String, String>,
}

fn default_method() -> String {
    "ANY".to_string()
}

fn default_true() -> bool {
    true
}

/// The deserialized gateway table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub credentials: Vec<CredentialEntry>,
    #[serde(default)]
    pub routes: Vec<RouteEntry>,
}

impl GatewayConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, GatewayError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            GatewayError::configuration(format!(
                "cannot read gateway table {}: {}",
                path.display(),
                e
            ))
        })?;

        toml::from_str(&raw).map_err(|e| {
            GatewayError::configuration(format!(
                "invalid gateway table {}: {}",
                path.display(),
                e
            ))
        })
    }

    pub fn build_credential_store(&self) -> Result<CredentialStore, GatewayError> {
        for entry in &self.credentials {
            if entry.client_id.trim().is_empty() {
                return Err(GatewayError::configuration("credential with empty client_id"));
            }
        }

        CredentialStore::from_entries(
            self.credentials
                .iter()
                .map(|e| (e.api_key.as_str(), e.client_id.as_str())),
        )
    }

    pub fn build_route_table(&self) -> Result<RouteTable, GatewayError> {
        if self.routes.is_empty() {
            return Err(GatewayError::configuration("gateway table has no routes"));
        }

        let rules = self
            .routes
            .iter()
            .map(build_rule)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RouteTable::new(rules))
    }
}

fn build_rule(entry: &RouteEntry) -> Result<RouteRule, GatewayError> {
    if !entry.path.starts_with('/') {
        return Err(GatewayError::configuration(format!(
            "route path '{}' must start with '/'",
            entry.path
        )));
    }

    if !entry.upstream.starts_with("http://") && !entry.upstream.starts_with("https://") {
        return Err(GatewayError::configuration(format!(
            "route '{}' upstream '{}' must be an http(s) URL",
            entry.path, entry.upstream
        )));
    }

    let method = parse_method(&entry.method, &entry.path)?;

    let pattern = if entry.strip_prefix {
        PathPattern::StripPrefix(entry.path.trim_end_matches('/').to_string())
    } else {
        PathPattern::Exact(entry.path.clone())
    };

    let rate_limit = entry.rate.map(|rate| RateLimit {
        per_minute: rate.0,
        zone: entry
            .zone
            .clone()
            .unwrap_or_else(|| derive_zone(&entry.path, &entry.method)),
    });

    let set_headers = entry
        .set_headers
        .iter()
        .map(|(name, value)| {
            let name = HeaderName::from_str(name).map_err(|_| {
                GatewayError::configuration(format!(
                    "route '{}' has invalid header name '{}'",
                    entry.path, name
                ))
            })?;
            let value = HeaderValue::from_str(value).map_err(|_| {
                GatewayError::configuration(format!(
                    "route '{}' has invalid value for header '{}'",
                    entry.path, name
                ))
            })?;
            Ok((name, value))
        })
        .collect::<Result<Vec<_>, GatewayError>>()?;

    Ok(RouteRule {
        pattern,
        method,
        upstream: entry.upstream.trim_end_matches('/').to_string(),
        require_auth: entry.require_auth,
        rate_limit,
        set_headers,
    })
}

fn parse_method(raw: &str, path: &str) -> Result<Option<Method>, GatewayError> {
    if raw.eq_ignore_ascii_case("any") {
        return Ok(None);
    }

    Method::from_bytes(raw.to_ascii_uppercase().as_bytes())
        .map(Some)
        .map_err(|_| {
            GatewayError::configuration(format!(
                "route '{}' has invalid method '{}'",
                path, raw
            ))
        })
}

/// Zone names follow the original SLA convention: the path with separators
/// dropped, suffixed with the method (`/v1/chat/completions` + `POST`
/// becomes `v1chatcompletions_POST`).
fn derive_zone(path: &str, method: &str) -> String {
    let flat: String = path.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    format!("{}_{}", flat, method.to_ascii_uppercase())
}
