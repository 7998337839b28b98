//! Error types for origin page resolution.
//!
//! Follows the What/Why/Fix pattern used across the project.

use thiserror::Error;

/// Errors that can occur while resolving an origin page to a direct URL.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// The origin page could not be fetched (network failure or non-success
    /// status). No extraction was attempted.
    #[error("origin connection failed for '{url}': {reason}\n  Suggestion: {suggestion}")]
    OriginUnreachable {
        /// The origin page URL.
        url: String,
        /// Upstream HTTP status, when one was received.
        status: Option<u16>,
        /// Why the fetch failed.
        reason: String,
        /// How to fix the issue.
        suggestion: String,
    },

    /// The page loaded but no extraction rule found a download link.
    #[error("no download link found on '{url}' after {rules_tried} rule(s)\n  Suggestion: {suggestion}")]
    LinkNotFound {
        /// The origin page URL.
        url: String,
        /// Number of rules applied.
        rules_tried: usize,
        /// How to fix the issue.
        suggestion: String,
    },
}

impl ResolveError {
    /// Creates an `OriginUnreachable` error for a non-success HTTP status.
    #[must_use]
    pub fn http_status(url: &str, status: u16) -> Self {
        Self::OriginUnreachable {
            url: url.to_string(),
            status: Some(status),
            reason: format!("origin returned HTTP {status}"),
            suggestion: "Check that the origin link is still public and try again".to_string(),
        }
    }

    /// Creates an `OriginUnreachable` error for a transport failure.
    #[must_use]
    pub fn network(url: &str, error: &reqwest::Error) -> Self {
        let reason = if error.is_timeout() {
            "request timed out".to_string()
        } else if error.is_connect() {
            "could not connect".to_string()
        } else {
            error.to_string()
        };
        Self::OriginUnreachable {
            url: url.to_string(),
            status: None,
            reason,
            suggestion: "Check network connectivity to the origin host".to_string(),
        }
    }

    /// Creates a `LinkNotFound` error.
    #[must_use]
    pub fn link_not_found(url: &str, rules_tried: usize) -> Self {
        Self::LinkNotFound {
            url: url.to_string(),
            rules_tried,
            suggestion: "The file may have been removed, or the origin page layout changed"
                .to_string(),
        }
    }

    /// Returns true for failures to reach the origin page at all.
    #[must_use]
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::OriginUnreachable { .. })
    }
}
