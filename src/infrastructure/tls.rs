//! TLS front door helpers
//!
//! HTTPS termination itself is handled by `axum-server` in the serve
//! command; this module owns the plaintext companion listener, which
//! answers every request with a permanent redirect to the `https://`
//! equivalent URL.

use axum::http::{header, HeaderMap, Uri};
use axum::response::Redirect;
use axum::Router;

/// Build the `https://` equivalent of a plaintext request URL.
///
/// The host comes from the request's Host header (any port replaced with
/// the HTTPS port, 443 elided), falling back to `fallback_host` for
/// clients that omit it.
pub fn https_location(
    host_header: Option<&str>,
    fallback_host: &str,
    https_port: u16,
    uri: &Uri,
) -> String {
    let host = host_header
        .map(|h| h.split(':').next().unwrap_or(h))
        .unwrap_or(fallback_host);

    let authority = if https_port == 443 {
        host.to_string()
    } else {
        format!("{}:{}", host, https_port)
    };

    let path_and_query = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    format!("https://{}{}", authority, path_and_query)
}

/// Router for the plaintext listener: 308 to HTTPS for every request.
pub fn redirect_router(fallback_host: String, https_port: u16) -> Router {
    Router::new().fallback(move |headers: HeaderMap, uri: Uri| {
        let fallback_host = fallback_host.clone();
        async move {
            let host_header = headers
                .get(header::HOST)
                .and_then(|value| value.to_str().ok());
            let location = https_location(host_header, &fallback_host, https_port, &uri);

            Redirect::permanent(&location)
        }
    })
}
