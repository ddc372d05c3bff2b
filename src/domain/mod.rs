//! Domain layer - credential store, route table, rate limiter, errors

pub mod credentials;
pub mod error;
pub mod rate_limit;
pub mod route;

pub use credentials::{ClientId, CredentialStore};
pub use error::GatewayError;
pub use rate_limit::{Acquire, RateLimiter};
pub use route::{PathPattern, RateLimit, RouteRule, RouteTable};
