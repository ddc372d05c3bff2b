//! HTTP metrics middleware

use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request},
    middleware::Next,
    response::Response,
};

use crate::api::state::AppState;
use crate::infrastructure::observability::record_http_request;

/// Record per-request metrics around the rest of the stack.
pub async fn metrics_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let route = route_label(&state, &method, request.uri().path());

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status().as_u16();

    record_http_request(method.as_str(), &route, status, duration);

    response
}

/// Resolve the route label for a request.
///
/// The label comes from the configured route table (pattern kind + path),
/// never from the raw request path: a catch-all proxy sees arbitrary
/// paths, and labelling by them would mint an unbounded number of time
/// series. Everything outside the table collapses into `unmatched`; the
/// gateway's own fixed endpoints keep their literal path.
fn route_label(state: &AppState, method: &Method, path: &str) -> String {
    if path == "/health" || path == "/metrics" {
        return path.to_string();
    }

    state
        .routes
        .matches(method, path)
        .map(|rule| rule.pattern.metrics_label())
        .unwrap_or_else(|| "unmatched".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::http::StatusCode;

    use crate::domain::{CredentialStore, PathPattern, RateLimiter, RouteRule, RouteTable};
    use crate::infrastructure::proxy::mock::MockForwarder;

    fn state() -> AppState {
        let rules = vec![
            RouteRule {
                pattern: PathPattern::Exact("/v1/chat/completions".to_string()),
                method: Some(Method::POST),
                upstream: "http://127.0.0.1:8008".to_string(),
                require_auth: true,
                rate_limit: None,
                set_headers: Vec::new(),
            },
            RouteRule {
                pattern: PathPattern::StripPrefix("/engine".to_string()),
                method: None,
                upstream: "http://127.0.0.1:8080".to_string(),
                require_auth: false,
                rate_limit: None,
                set_headers: Vec::new(),
            },
        ];

        AppState::new(
            Arc::new(CredentialStore::default()),
            Arc::new(RouteTable::new(rules)),
            Arc::new(RateLimiter::new()),
            Arc::new(MockForwarder::respond_with(StatusCode::OK, "")),
        )
    }

    #[test]
    fn test_matched_routes_label_by_pattern() {
        let state = state();

        assert_eq!(
            route_label(&state, &Method::POST, "/v1/chat/completions"),
            "exact:/v1/chat/completions"
        );
        assert_eq!(
            route_label(&state, &Method::GET, "/engine/test123"),
            "strip_prefix:/engine"
        );
    }

    #[test]
    fn test_arbitrary_paths_collapse_into_one_label() {
        let state = state();

        assert_eq!(route_label(&state, &Method::GET, "/aaaa"), "unmatched");
        assert_eq!(route_label(&state, &Method::GET, "/aaab"), "unmatched");
        // Method mismatch falls out of the table too.
        assert_eq!(
            route_label(&state, &Method::GET, "/v1/chat/completions"),
            "unmatched"
        );
    }

    #[test]
    fn test_self_endpoints_keep_their_path() {
        let state = state();

        assert_eq!(route_label(&state, &Method::GET, "/health"), "/health");
        assert_eq!(route_label(&state, &Method::GET, "/metrics"), "/metrics");
    }
}
