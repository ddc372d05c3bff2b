//! Application state shared by the request pipeline

use std::sync::Arc;

use crate::config::{AppConfig, GatewayConfig};
use crate::domain::{CredentialStore, GatewayError, RateLimiter, RouteTable};
use crate::infrastructure::proxy::{Forwarder, HttpForwarder};

/// Shared, read-mostly gateway state. The rate limiter is the only
/// component mutated by in-flight requests.
#[derive(Clone)]
pub struct AppState {
    pub credentials: Arc<CredentialStore>,
    pub routes: Arc<RouteTable>,
    pub limiter: Arc<RateLimiter>,
    pub forwarder: Arc<dyn Forwarder>,
}

impl AppState {
    pub fn new(
        credentials: Arc<CredentialStore>,
        routes: Arc<RouteTable>,
        limiter: Arc<RateLimiter>,
        forwarder: Arc<dyn Forwarder>,
    ) -> Self {
        Self {
            credentials,
            routes,
            limiter,
            forwarder,
        }
    }

    /// Build the full state from loaded configuration.
    pub fn from_config(config: &AppConfig, gateway: &GatewayConfig) -> Result<Self, GatewayError> {
        Ok(Self::new(
            Arc::new(gateway.build_credential_store()?),
            Arc::new(gateway.build_route_table()?),
            Arc::new(RateLimiter::new()),
            Arc::new(HttpForwarder::from_config(&config.upstream)),
        ))
    }
}
