//! API key authentication
//!
//! The credential travels in the `apikey` request header; as a
//! compatibility fallback a `Authorization: Bearer <key>` header is also
//! accepted, with `apikey` winning when both are present.

use axum::http::{header, HeaderMap};
use tracing::debug;

use crate::api::state::AppState;
use crate::domain::{ClientId, GatewayError};

/// Primary credential header.
pub const API_KEY_HEADER: &str = "apikey";

/// Resolve the client identity for a request.
///
/// A missing credential is `Unauthorized` (401); a present but unknown
/// credential is `Forbidden` (403).
pub fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<ClientId, GatewayError> {
    let api_key = extract_api_key(headers)
        .ok_or_else(|| GatewayError::unauthorized("missing api key header"))?;

    debug!(
        key_prefix = %api_key.chars().take(8).collect::<String>(),
        "validating api key"
    );

    state
        .credentials
        .lookup(&api_key)
        .cloned()
        .ok_or_else(|| GatewayError::forbidden("unknown api key"))
}

fn extract_api_key(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(API_KEY_HEADER) {
        return value.to_str().ok().map(|key| key.trim().to_string());
    }

    if let Some(auth) = headers.get(header::AUTHORIZATION) {
        if let Some(token) = auth.to_str().ok().and_then(|s| s.strip_prefix("Bearer ")) {
            return Some(token.trim().to_string());
        }
    }

    None
}
