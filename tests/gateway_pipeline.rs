//! End-to-end pipeline tests
//!
//! Drives the assembled gateway router against a mock upstream and asserts
//! the status-code contract: 401/403 credential verdicts, 404 for unknown
//! routes, the SLA 429 sequence, 502 when the upstream is down, and
//! verbatim pass-through of the upstream's response.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;
use wiremock::matchers::{header as upstream_header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sla_gateway::api::router::create_router;
use sla_gateway::api::state::AppState;
use sla_gateway::config::GatewayConfig;
use sla_gateway::domain::RateLimiter;
use sla_gateway::infrastructure::proxy::HttpForwarder;
use sla_gateway::infrastructure::tls;

const CLIENT_A_KEY: &str = "9fa0351b6fbcbf4f1bf464e5466b5017";
const CLIENT_B_KEY: &str = "c1ad6bc34cb9bd43d4ed8f8e35b612e1";

#[tokio::test]
async fn missing_api_key_yields_401() {
    let app = gateway_app(&table_for("http://127.0.0.1:1", "10r/m"));

    let response = app
        .oneshot(get_request("/testPath", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn invalid_api_key_yields_403() {
    let app = gateway_app(&table_for("http://127.0.0.1:1", "10r/m"));

    let response = app
        .oneshot(get_request("/testPath", Some("invalid-api-key")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn valid_key_on_unknown_path_yields_404() {
    let app = gateway_app(&table_for("http://127.0.0.1:1", "10r/m"));

    let response = app
        .oneshot(get_request("/clientA_nonExistingEndpoint", Some(CLIENT_A_KEY)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sla_exceeded_yields_429_after_two_requests() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion_body()))
        .expect(2)
        .mount(&upstream)
        .await;

    let app = gateway_app(&table_for(&upstream.uri(), "2r/m"));

    let mut statuses = Vec::new();
    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(chat_request(Some(CLIENT_A_KEY)))
            .await
            .unwrap();
        statuses.push(response.status());
    }

    assert_eq!(
        statuses,
        vec![
            StatusCode::OK,
            StatusCode::OK,
            StatusCode::TOO_MANY_REQUESTS
        ]
    );
}

#[tokio::test]
async fn clients_have_independent_sla_zones() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion_body()))
        .mount(&upstream)
        .await;

    let app = gateway_app(&table_for(&upstream.uri(), "1r/m"));

    let first = app
        .clone()
        .oneshot(chat_request(Some(CLIENT_A_KEY)))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let exhausted = app
        .clone()
        .oneshot(chat_request(Some(CLIENT_A_KEY)))
        .await
        .unwrap();
    assert_eq!(exhausted.status(), StatusCode::TOO_MANY_REQUESTS);

    // clientB's zone is untouched by clientA's burst.
    let other = app
        .oneshot(chat_request(Some(CLIENT_B_KEY)))
        .await
        .unwrap();
    assert_eq!(other.status(), StatusCode::OK);
}

#[tokio::test]
async fn upstream_down_yields_502_after_checks_pass() {
    // Nothing listens on port 1; the connection is refused immediately.
    let app = gateway_app(&table_for("http://127.0.0.1:1", "10r/m"));

    let response = app
        .oneshot(chat_request(Some(CLIENT_A_KEY)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn engine_prefix_is_stripped_and_key_injected() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/test123"))
        .and(upstream_header("apikey", "test-api-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "url": "/test123"
        })))
        .expect(1)
        .mount(&upstream)
        .await;

    let app = gateway_app(&table_for(&upstream.uri(), "10r/m"));

    let response = app
        .oneshot(get_request("/engine/test123", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = read_json(response.into_body()).await;
    assert_eq!(body["url"], "/test123");
}

#[tokio::test]
async fn upstream_response_passes_through() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(chat_completion_body())
                .insert_header("x-upstream", "mock-llm"),
        )
        .mount(&upstream)
        .await;

    let app = gateway_app(&table_for(&upstream.uri(), "10r/m"));

    let response = app
        .oneshot(chat_request(Some(CLIENT_A_KEY)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("x-upstream").unwrap(), "mock-llm");

    let body: serde_json::Value = read_json(response.into_body()).await;
    assert_eq!(body["object"], "chat.completion");
    assert_eq!(body["model"], "Qwen/Qwen2.5-Coder-32B-Instruct");
    assert_eq!(body["choices"][0]["message"]["role"], "assistant");
    assert!(body["usage"]["total_tokens"].is_number());
}

#[tokio::test]
async fn plaintext_listener_redirects_to_https() {
    let app = tls::redirect_router("0.0.0.0".to_string(), 8443);

    let request = Request::builder()
        .method(Method::GET)
        .uri("/v1/chat/completions")
        .header(header::HOST, "alma.test")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);

    let location = response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(location.starts_with("https://"));
    assert_eq!(location, "https://alma.test:8443/v1/chat/completions");
}

// Helpers

fn table_for(upstream: &str, rate: &str) -> String {
    format!(
        r#"
        [[credentials]]
        api_key = "{CLIENT_A_KEY}"
        client_id = "clientA"

        [[credentials]]
        api_key = "{CLIENT_B_KEY}"
        client_id = "clientB"

        [[routes]]
        path = "/v1/chat/completions"
        method = "POST"
        upstream = "{upstream}"
        rate = "{rate}"

        [[routes]]
        path = "/engine"
        upstream = "{upstream}"
        strip_prefix = true
        require_auth = false

        [routes.set_headers]
        apikey = "test-api-key"
        "#
    )
}

fn gateway_app(table: &str) -> Router {
    let gateway: GatewayConfig = toml::from_str(table).unwrap();

    let state = AppState::new(
        Arc::new(gateway.build_credential_store().unwrap()),
        Arc::new(gateway.build_route_table().unwrap()),
        Arc::new(RateLimiter::new()),
        Arc::new(HttpForwarder::new()),
    );

    create_router(state, None)
}

fn get_request(path: &str, api_key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(path);
    if let Some(key) = api_key {
        builder = builder.header("apikey", key);
    }
    builder.body(Body::empty()).unwrap()
}

fn chat_request(api_key: Option<&str>) -> Request<Body> {
    let body = serde_json::json!({
        "model": "Qwen/Qwen2.5-Coder-32B-Instruct",
        "messages": [
            { "role": "user", "content": "ping" }
        ]
    });

    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/v1/chat/completions")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(key) = api_key {
        builder = builder.header("apikey", key);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn chat_completion_body() -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-27d6052fe8524745a551960124863f05",
        "object": "chat.completion",
        "created": 1761755239,
        "model": "Qwen/Qwen2.5-Coder-32B-Instruct",
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": "Hello! How can I assist you today?"
            },
            "finish_reason": "stop"
        }],
        "usage": {
            "prompt_tokens": 35,
            "completion_tokens": 29,
            "total_tokens": 64
        }
    })
}

async fn read_json(body: Body) -> serde_json::Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
