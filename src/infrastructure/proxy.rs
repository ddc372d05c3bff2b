//! Upstream forwarding
//!
//! A single forwarding attempt per client request; any connect, timeout,
//! or protocol failure talking to the upstream surfaces immediately as
//! [`GatewayError::UpstreamUnavailable`]. No retries.

use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderMap, HeaderName, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use futures::TryStreamExt;
use tracing::debug;

use crate::config::UpstreamConfig;
use crate::domain::GatewayError;

/// Connection-scoped headers that must not be relayed in either direction.
/// `host` is regenerated for the upstream; `content-length` is recomputed
/// from the relayed body.
const NOT_RELAYED: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "host",
    "content-length",
];

/// The request as presented to the upstream.
#[derive(Debug)]
pub struct ProxyRequest {
    pub method: Method,
    /// Path and query after any prefix stripping, e.g. `/test123?x=1`.
    pub path_and_query: String,
    pub headers: HeaderMap,
    pub body: Body,
}

/// The upstream's answer, relayed to the client as-is.
#[derive(Debug)]
pub struct ProxyResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Body,
}

impl IntoResponse for ProxyResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(self.body);
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// Seam between the request pipeline and the upstream connection.
#[async_trait]
pub trait Forwarder: Send + Sync {
    /// Forward `request` to the upstream at `base_url`. Exactly one attempt.
    async fn forward(
        &self,
        base_url: &str,
        request: ProxyRequest,
    ) -> Result<ProxyResponse, GatewayError>;
}

/// Real forwarder using reqwest
#[derive(Debug, Clone)]
pub struct HttpForwarder {
    client: reqwest::Client,
}

impl HttpForwarder {
    pub fn new() -> Self {
        Self::with_timeouts(Duration::from_secs(5), Duration::from_secs(30))
    }

    pub fn with_timeouts(connect: Duration, request: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .connect_timeout(connect)
                .timeout(request)
                .build()
                .expect("Failed to build HTTP client"),
        }
    }

    pub fn from_config(config: &UpstreamConfig) -> Self {
        Self::with_timeouts(
            Duration::from_secs(config.connect_timeout_secs),
            Duration::from_secs(config.request_timeout_secs),
        )
    }
}

impl Default for HttpForwarder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Forwarder for HttpForwarder {
    async fn forward(
        &self,
        base_url: &str,
        request: ProxyRequest,
    ) -> Result<ProxyResponse, GatewayError> {
        let url = format!("{}{}", base_url, request.path_and_query);

        debug!(method = %request.method, url = %url, "forwarding to upstream");

        let mut builder = self.client.request(request.method, &url);

        for (name, value) in request.headers.iter() {
            if relayed(name) {
                builder = builder.header(name, value);
            }
        }

        let response = builder
            .body(reqwest::Body::wrap_stream(request.body.into_data_stream()))
            .send()
            .await
            .map_err(|e| {
                GatewayError::upstream_unavailable(format!("request to {} failed: {}", url, e))
            })?;

        let status = response.status();
        let mut headers = HeaderMap::new();

        for (name, value) in response.headers() {
            if relayed(name) {
                headers.insert(name.clone(), value.clone());
            }
        }

        let stream = response
            .bytes_stream()
            .map_err(|e| std::io::Error::other(format!("upstream body stream: {}", e)));

        Ok(ProxyResponse {
            status,
            headers,
            body: Body::from_stream(stream),
        })
    }
}

fn relayed(name: &HeaderName) -> bool {
    !NOT_RELAYED.contains(&name.as_str())
}
