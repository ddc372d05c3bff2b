//! Configuration - process settings and the gateway table

mod app_config;
mod gateway;

pub use app_config::{
    AppConfig, GatewayFileConfig, LogFormat, LoggingConfig, ServerConfig, TlsConfig,
    UpstreamConfig,
};
pub use gateway::{CredentialEntry, GatewayConfig, RatePerMinute, RouteEntry};
