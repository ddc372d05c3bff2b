//! SLA Gateway
//!
//! An API-key-authenticated reverse proxy enforcing per-client, per-route
//! SLA rate limits:
//! - Path-based routing with prefix stripping
//! - API-key authentication (401 missing / 403 unknown)
//! - Fixed-window rate limiting per (client, route) zone (429)
//! - Single-attempt upstream forwarding with failure propagation (502)
//! - TLS termination with a plaintext-to-HTTPS redirect listener

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use api::state::AppState;
use config::GatewayConfig;
use domain::GatewayError;

/// Build the shared application state from loaded configuration.
pub fn create_app_state(
    config: &AppConfig,
    gateway: &GatewayConfig,
) -> Result<AppState, GatewayError> {
    AppState::from_config(config, gateway)
}
