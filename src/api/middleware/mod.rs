//! API middleware components

pub mod auth;
pub mod logging;
pub mod metrics;

pub use auth::{authenticate, API_KEY_HEADER};
pub use logging::logging_middleware;
pub use metrics::metrics_middleware;
