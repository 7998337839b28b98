//! Error types for the streaming proxy.

use thiserror::Error;

/// Errors that can occur before the upstream response headers arrive.
///
/// Failures after streaming has started surface as a body error instead and
/// end the client response; they are never retried here.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error streaming {url}: {source}")]
    Network {
        /// The direct URL being streamed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Connecting to the upstream timed out.
    #[error("timeout connecting to {url}")]
    Timeout {
        /// The direct URL being streamed.
        url: String,
    },

    /// The inbound `Range` header could not be forwarded.
    #[error("invalid Range header for {url}")]
    InvalidRange {
        /// The direct URL being streamed.
        url: String,
    },
}

impl ProxyError {
    /// Classifies a reqwest send error.
    pub fn from_send(url: impl Into<String>, source: reqwest::Error) -> Self {
        let url = url.into();
        if source.is_timeout() {
            Self::Timeout { url }
        } else {
            Self::Network { url, source }
        }
    }

    /// Creates an invalid-range error.
    pub fn invalid_range(url: impl Into<String>) -> Self {
        Self::InvalidRange { url: url.into() }
    }
}
