//! Error types for gateway calls

/// Gateway call failures
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Network-level failure (connect, TLS, timeout, body read)
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Remote answered with a non-success status
    #[error("gateway returned {status}: {body}")]
    Gateway {
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// Response body is not the expected shape
    #[error("failed to decode gateway response: {0}")]
    Decode(#[source] serde_json::Error),

    /// Success response with zero choices
    #[error("gateway returned no choices")]
    EmptyResult,

    /// Caller cancelled before the response completed
    #[error("gateway call cancelled")]
    Cancelled,

    /// Client could not be configured (bad credential header, builder failure)
    #[error("invalid gateway configuration: {0}")]
    InvalidConfig(String),
}

impl GatewayError {
    /// Create gateway status error
    pub fn gateway(status: u16, body: impl Into<String>) -> Self {
        Self::Gateway {
            status,
            body: body.into(),
        }
    }

    /// Check whether the caller cancelled the call
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
