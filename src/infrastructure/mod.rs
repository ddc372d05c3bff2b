//! Infrastructure - logging, metrics, upstream forwarding, TLS front door

pub mod logging;
pub mod observability;
pub mod proxy;
pub mod tls;
