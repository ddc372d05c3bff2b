use axum::{middleware, routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use super::handler;
use super::health;
use super::middleware as mw;
use super::state::AppState;

/// Assemble the gateway router.
///
/// Self endpoints (`/health`, `/metrics`) are registered before the
/// catch-all proxy fallback, so configured routes cannot shadow them.
pub fn create_router(state: AppState, metrics: Option<PrometheusHandle>) -> Router {
    let mut router = Router::new().route("/health", get(health::health_check));

    if let Some(handle) = metrics {
        router = router.route(
            "/metrics",
            get(move || std::future::ready(handle.render())),
        );
    }

    router
        .fallback(handler::proxy_handler)
        .with_state(state.clone())
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(mw::logging_middleware))
                .layer(middleware::from_fn_with_state(state, mw::metrics_middleware))
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
}
