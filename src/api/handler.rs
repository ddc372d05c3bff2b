//! The proxy pipeline
//!
//! Per-request state machine: route match, credential verdict, zone
//! acquisition, then a single forwarding attempt. Each stage may
//! short-circuit with its terminal status; 502 only ever originates in the
//! forwarding stage, after authentication and rate limiting have passed.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use crate::api::middleware::auth;
use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::{Acquire, GatewayError};
use crate::infrastructure::observability;
use crate::infrastructure::proxy::ProxyRequest;

/// Catch-all handler for every path not claimed by a gateway self-endpoint.
pub async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    match run_pipeline(&state, request).await {
        Ok(response) => response,
        Err(err) => ApiError::from(err).into_response(),
    }
}

async fn run_pipeline(
    state: &AppState,
    request: Request<Body>,
) -> Result<Response, GatewayError> {
    let (parts, body) = request.into_parts();
    let method = parts.method;
    let path = parts.uri.path().to_string();
    let query = parts.uri.query().map(str::to_string);

    let Some(rule) = state.routes.matches(&method, &path) else {
        // The credential verdict still precedes the 404: a missing or
        // unknown key on an unknown path answers 401/403, not 404.
        auth::authenticate(state, &parts.headers)?;
        return Err(GatewayError::not_found(format!(
            "no route for {} {}",
            method, path
        )));
    };

    let client = if rule.require_auth {
        Some(auth::authenticate(state, &parts.headers)?)
    } else {
        None
    };

    if let Some(limit) = &rule.rate_limit {
        let client_key = client.as_ref().map(|c| c.as_str()).unwrap_or("anonymous");

        match state
            .limiter
            .try_acquire(client_key, &limit.zone, limit.per_minute)
        {
            Acquire::Allowed { remaining } => {
                debug!(client = client_key, zone = %limit.zone, remaining, "slot acquired");
            }
            Acquire::Denied { retry_after_secs } => {
                warn!(client = client_key, zone = %limit.zone, "rate limit exceeded");
                observability::record_rate_limited(&limit.zone);
                return Err(GatewayError::rate_limited(retry_after_secs));
            }
        }
    }

    let mut headers = parts.headers;
    for (name, value) in &rule.set_headers {
        headers.insert(name.clone(), value.clone());
    }

    let proxy_request = ProxyRequest {
        method,
        path_and_query: rule.upstream_path_and_query(&path, query.as_deref()),
        headers,
        body,
    };

    let response = state.forwarder.forward(&rule.upstream, proxy_request).await?;

    Ok(response.into_response())
}
