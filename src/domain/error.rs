use thiserror::Error;

/// Core gateway errors
///
/// Every request-time variant is terminal and maps to exactly one HTTP
/// status; `Configuration` can only arise while loading the gateway table
/// and aborts startup.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Upstream unavailable: {message}")]
    UpstreamUnavailable { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl GatewayError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn rate_limited(retry_after_secs: u64) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    pub fn upstream_unavailable(message: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_error() {
        let error = GatewayError::unauthorized("missing api key");
        assert_eq!(error.to_string(), "Unauthorized: missing api key");
    }

    #[test]
    fn test_rate_limited_error() {
        let error = GatewayError::rate_limited(42);
        assert_eq!(error.to_string(), "Rate limited: retry after 42s");
    }

    #[test]
    fn test_upstream_error() {
        let error = GatewayError::upstream_unavailable("connection refused");
        assert_eq!(
            error.to_string(),
            "Upstream unavailable: connection refused"
        );
    }
}
